use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub list: ListConfig,
    pub export: ExportConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub items_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub default_file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the persisted token; `None` resolves to
    /// `$HOME/.config/erp-admin` on first use
    pub config_dir: Option<PathBuf>,
}

pub const DEFAULT_API_URL: &str = "http://localhost:5200/api";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("ERP_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("ERP_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("ERP_API_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        if let Ok(v) = env::var("ERP_ITEMS_PER_PAGE") {
            // zero would make the page count undefined
            self.list.items_per_page = v
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .unwrap_or(self.list.items_per_page);
        }

        if let Ok(v) = env::var("ERP_EXPORT_DIR") {
            self.export.output_dir = PathBuf::from(v);
        }

        if let Ok(v) = env::var("ERP_ADMIN_CONFIG_DIR") {
            self.session.config_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                timeout_secs: 30,
                enable_request_logging: true,
            },
            list: ListConfig { items_per_page: 10 },
            export: ExportConfig {
                output_dir: PathBuf::from("."),
                default_file_name: "export.csv".to_string(),
            },
            session: SessionConfig { config_dir: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                timeout_secs: 15,
                enable_request_logging: true,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                timeout_secs: 10,
                enable_request_logging: false,
            },
            ..Self::development()
        }
    }

    /// Resolve the directory holding console state, creating it if needed
    pub fn config_dir(&self) -> std::io::Result<PathBuf> {
        let dir = match &self.session.config_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = env::var("HOME").map_err(|_| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "HOME environment variable not set")
                })?;
                PathBuf::from(home).join(".config").join("erp-admin")
            }
        };

        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(dir)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.list.items_per_page, 10);
        assert_eq!(config.export.default_file_name, "export.csv");
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.list.items_per_page, 10);
    }

    #[test]
    fn explicit_config_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = AppConfig::development();
        config.session.config_dir = Some(tmp.path().join("nested").join("state"));
        let dir = config.config_dir().unwrap();
        assert!(dir.exists());
        assert!(dir.ends_with("state"));
    }
}
