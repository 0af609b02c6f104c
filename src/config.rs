use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub api_token: String,
    /// Base URL that relative image/file paths are resolved against.
    pub assets_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                let config: Config = toml::from_str(&contents)
                    .with_context(|| "Failed to parse config.toml")?;
                return Ok(config);
            }
        }

        let api_url = std::env::var("COURSEDESK_API_URL")
            .with_context(|| "COURSEDESK_API_URL not set. Create a config file or set the env var.")?;
        let api_token = std::env::var("COURSEDESK_API_TOKEN")
            .with_context(|| "COURSEDESK_API_TOKEN not set. Create a config file or set the env var.")?;
        let assets_url = std::env::var("COURSEDESK_ASSETS_URL").unwrap_or_else(|_| api_url.clone());

        Ok(Self {
            api_url,
            api_token,
            assets_url,
        })
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let default = Config {
            api_url: "https://admin.your-platform.example".into(),
            api_token: "your-api-token-here".into(),
            assets_url: "https://cdn.your-platform.example".into(),
        };

        let toml_str = toml::to_string_pretty(&default)?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("coursedesk").join("config.toml"))
    }
}
