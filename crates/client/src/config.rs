use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::catalog::{Format, Location};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub poll_interval_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub default_format: Format,
    pub default_location: Location,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 2000,
            request_timeout_secs: None,
            default_format: Format::Mp3,
            default_location: Location::Default,
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

pub fn load_config(path: Option<&std::path::Path>) -> Result<ClientConfig> {
    let config = if let Some(config_path) = path {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

            toml::from_str::<ClientConfig>(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", config_path);
            ClientConfig::default()
        }
    } else {
        tracing::debug!("No config path provided, using defaults");
        ClientConfig::default()
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &ClientConfig) -> Result<()> {
    let url = reqwest::Url::parse(&config.server_url)
        .map_err(|e| anyhow::anyhow!("server_url is not a valid URL: {}", e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("server_url must use http or https, got {}", url.scheme());
    }

    if config.poll_interval_ms == 0 {
        anyhow::bail!("poll_interval_ms must be at least 1");
    }

    if config.request_timeout_secs == Some(0) {
        anyhow::bail!("request_timeout_secs must be at least 1 when set");
    }

    Ok(())
}
