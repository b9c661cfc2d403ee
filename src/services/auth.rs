use crate::error::{PortalError, PortalResult};
use crate::models::config::AdminConfig;
use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::warn;

const MAX_PASSWORD_LEN: usize = 128;

/// Verifies the admin password sent with every privileged report request.
pub struct AdminAuth {
    password_hash: String,
}

impl AdminAuth {
    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        let password_hash = match &config.password_hash {
            Some(hash) => {
                PasswordHash::new(hash).map_err(|e| anyhow!("Invalid admin password hash: {:?}", e))?;
                hash.clone()
            }
            None => {
                warn!("No admin password hash configured, using the default password");
                hash_password(&config.default_password)?
            }
        };

        Ok(Self { password_hash })
    }

    pub fn verify(&self, password: &str) -> bool {
        if password.is_empty() || password.len() > MAX_PASSWORD_LEN {
            return false;
        }

        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn check(&self, password: &str) -> PortalResult<()> {
        if self.verify(password) {
            Ok(())
        } else {
            Err(PortalError::Unauthorized)
        }
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {:?}", e))?;
    Ok(hash.to_string())
}
