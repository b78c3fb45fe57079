use crate::domain::error::AveoError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `api_base`.
pub const API_BASE_ENV: &str = "AVEO_API_BASE";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_prefix: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConfig {
    /// Unset means the reqwest default (no overall timeout).
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StorageConfig {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_prefix: String::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
            theme: default_theme(),
            http: HttpConfig::default(),
            storage: StorageConfig::default(),
            logging: Logging::default(),
        }
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Base URL requests are resolved against, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "{}{}",
            self.api_base.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/')
        )
    }

    /// Replace `api_base` unless `base` is missing or blank.
    pub fn with_api_base(mut self, base: Option<&str>) -> Self {
        if let Some(base) = base.filter(|b| !b.trim().is_empty()) {
            self.api_base = base.to_string();
        }
        self
    }

    fn apply_env(self) -> Self {
        let base = std::env::var(API_BASE_ENV).ok();
        self.with_api_base(base.as_deref())
    }
}

// Defaults
fn default_api_base() -> String {
    "http://localhost:8000".to_string()
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_theme() -> String {
    "leaf".to_string()
}
fn default_user_agent() -> String {
    concat!("aveo/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aveo").join("config.toml"))
}

/// Key/value store path: `storage.path` or `~/.config/aveo/aveo.db`
pub fn get_database_path(config: &Config) -> PathBuf {
    if let Some(path) = config.storage.path.as_deref().filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aveo")
        .join("aveo.db")
}

pub fn parse_config(content: &str) -> Result<Config, AveoError> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn load_config() -> Result<Config, AveoError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            match parse_config(&content) {
                Ok(config) => return Ok(config.apply_env()),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse config file: {}. Using defaults.",
                        e
                    );
                }
            }
        }
    }

    Ok(Config::default().apply_env())
}

pub fn generate_config_sample() -> Result<(), AveoError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            eprintln!("Config file already exists at: {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let sample = Config::default();
        let toml_content = toml::to_string_pretty(&sample)
            .map_err(|e| AveoError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, toml_content)
            .map_err(|e| AveoError::Config(format!("Failed to write config file: {}", e)))?;
        println!("Generated config file at: {}", path.display());
    } else {
        return Err(AveoError::Config(
            "Cannot determine config directory".to_string(),
        ));
    }

    Ok(())
}
