use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Layers defaults, an optional `config.toml`/`config.json` in the working
    /// directory and `PORTAL__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("PORTAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Where the page controllers find the report and chart backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Prefix for links handed to the browser. Empty means same origin.
    pub public_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            public_url: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub reports_file: PathBuf,
    /// Candidate chart folders, first existing one wins.
    pub charts_dirs: Vec<PathBuf>,
    pub static_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            reports_file: PathBuf::from("crime_reports.json"),
            charts_dirs: vec![
                PathBuf::from("charts"),
                PathBuf::from("graph"),
                PathBuf::from("static/charts"),
            ],
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Argon2 PHC string. When absent `default_password` is hashed at startup.
    pub password_hash: Option<String>,
    pub default_password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password_hash: None,
            // Should be replaced by a password_hash in production
            default_password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "portal.log".to_string(),
            level: "info,tower_http=warn,hyper=warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub toast_secs: i64,
    pub decrypt_tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_secs: 3,
            decrypt_tick_ms: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_legacy_server() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.admin.default_password, "admin123");
        assert_eq!(config.storage.charts_dirs[0], PathBuf::from("charts"));
        assert_eq!(config.ui.toast_secs, 3);
        assert_eq!(config.ui.decrypt_tick_ms, 30);
    }

    #[test]
    fn defaults_survive_a_config_round_trip() {
        let layered = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>()
            .unwrap();
        assert_eq!(layered.api.base_url, "http://127.0.0.1:5000");
        assert!(layered.admin.password_hash.is_none());
    }
}
