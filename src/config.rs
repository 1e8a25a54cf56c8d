use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://mandiconnect.onrender.com";
pub const DEFAULT_CONFIG_FILE: &str = "Mandi.toml";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageConfig {
    /// Session file location. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

impl StorageConfig {
    pub fn session_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mandi-connect")
                .join("session.json"),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Mandi.toml (or the file passed on the command line)
    /// 3. Environment variables (prefixed with MANDI_, sections split on `__`,
    ///    e.g. MANDI_LOGGING__LEVEL=debug)
    /// 4. MANDI_API_URL as a shortcut for api.base_url
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(file: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }

    fn figment(file: impl AsRef<std::path::Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file.as_ref()))
            .merge(Env::prefixed("MANDI_").ignore(&["API_URL"]).split("__"))
            .merge(Env::raw().only(&["MANDI_API_URL"]).map(|_| "api.base_url".into()))
    }
}
