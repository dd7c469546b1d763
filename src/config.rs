//! Configuration management for the GoBarber client
//!
//! TOML-based configuration with defaults and validation.
//! Location: ~/.gobarber/config.toml

use crate::errors::{GoBarberError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "GOBARBER_API_URL";

/// Environment variable overriding the session token
pub const TOKEN_ENV: &str = "GOBARBER_TOKEN";

/// Complete configuration for the client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Signed-in user, as handed over by whatever performed the sign-in
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub avatar_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3333".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply env overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::load_from_file(&config_path)?
        } else {
            Self::load_default()?
        };

        config.apply_env_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        );
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GoBarberError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| GoBarberError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration file path, if a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".gobarber").join("config.toml"))
    }

    /// Apply overrides that normally come from the environment
    pub fn apply_env_overrides(&mut self, api_url: Option<String>, token: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.session.token = Some(token);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(GoBarberError::Config(
                "api.base_url must not be empty".to_string(),
            ));
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GoBarberError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(GoBarberError::Config(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| GoBarberError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GoBarberError::Config(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| GoBarberError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// API base URL without a trailing slash
    pub fn api_url(&self) -> String {
        self.api.base_url.trim().trim_end_matches('/').to_string()
    }
}
