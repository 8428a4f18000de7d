use crate::ServerError;
use huntcamp_weather::WeatherConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3100;

/// Server settings, read from an optional TOML file. Every key is optional.
///
/// ```toml
/// port = 3100
/// data_dir = "/var/lib/huntcamp"
/// workers = 4
///
/// [weather]
/// default_location = "Ely,MN"
/// timeout_secs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub public_dir: PathBuf,
    pub workers: usize,
    pub weather: WeatherConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_owned(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("./data"),
            public_dir: PathBuf::from("./public"),
            workers: 4,
            weather: WeatherConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ServerError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ServerError::Config(format!("invalid server config: {e}")))?;
        if config.workers == 0 {
            return Err(ServerError::Config("workers must be at least 1".to_owned()));
        }
        Ok(config)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
