use serde::{Deserialize, Serialize};

/// Dashboard login framing. Cosmetic only, nothing is verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    User,
    Admin,
}

impl UserType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(UserType::User),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserType::User => "User",
            UserType::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub user_type: UserType,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub admin_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Query carried by every privileged backend endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PasswordQuery {
    #[serde(default)]
    pub password: String,
}
