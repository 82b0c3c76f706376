//! TOML configuration parsing.
//!
//! The service reads one file (by default `./config/farm-advisor.toml`) with
//! a section per collaborator: the SQLite database, the HTTP listener, the
//! language model, and the image search provider.
//!
//! The image provider credential may be left out of the file and supplied
//! through the `UNSPLASH_ACCESS_KEY` environment variable instead.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `[images].access_key` is not set.
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Chat model settings. Defaults target a local Ollama install.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_url")]
    pub url: String,
    #[serde(default = "default_model_name")]
    pub model: String,
    #[serde(default = "default_model_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            model: default_model_name(),
            timeout_secs: default_model_timeout_secs(),
        }
    }
}

fn default_model_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model_name() -> String {
    "tinyllama".to_string()
}
fn default_model_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    #[serde(default = "default_images_provider")]
    pub provider: String,
    #[serde(default = "default_images_url")]
    pub url: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default = "default_images_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            provider: default_images_provider(),
            url: default_images_url(),
            access_key: None,
            timeout_secs: default_images_timeout_secs(),
            max_retries: 0,
        }
    }
}

fn default_images_provider() -> String {
    "disabled".to_string()
}
fn default_images_url() -> String {
    "https://api.unsplash.com".to_string()
}
fn default_images_timeout_secs() -> u64 {
    10
}

impl ImagesConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// The access key from the file, falling back to the environment.
    pub fn resolved_access_key(&self) -> Option<String> {
        self.access_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(ACCESS_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.model.model.trim().is_empty() {
        anyhow::bail!("model.model must not be empty");
    }
    if config.model.timeout_secs == 0 {
        anyhow::bail!("model.timeout_secs must be > 0");
    }
    if config.images.timeout_secs == 0 {
        anyhow::bail!("images.timeout_secs must be > 0");
    }

    match config.images.provider.as_str() {
        "disabled" => {}
        "unsplash" => {
            if config.images.resolved_access_key().is_none() {
                anyhow::bail!(
                    "images.access_key (or {}) must be set when provider is 'unsplash'",
                    ACCESS_KEY_ENV
                );
            }
        }
        other => anyhow::bail!(
            "Unknown image provider: '{}'. Must be disabled or unsplash.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[db]
path = "./data/farming_data.sqlite"

[server]
bind = "127.0.0.1:8000"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.model.url, "http://localhost:11434");
        assert_eq!(config.model.model, "tinyllama");
        assert_eq!(config.model.timeout_secs, 120);
        assert!(!config.images.is_enabled());
        assert_eq!(config.images.max_retries, 0);
    }

    #[test]
    fn test_unsplash_with_key_in_file() {
        let text = format!(
            "{}\n[images]\nprovider = \"unsplash\"\naccess_key = \"abc\"\n",
            MINIMAL
        );
        let config = parse_config(&text).unwrap();
        assert!(config.images.is_enabled());
        assert_eq!(config.images.resolved_access_key().as_deref(), Some("abc"));
    }

    #[test]
    fn test_unknown_image_provider_rejected() {
        let text = format!("{}\n[images]\nprovider = \"bing\"\n", MINIMAL);
        let err = parse_config(&text).unwrap_err();
        assert!(err.to_string().contains("Unknown image provider"));
    }

    #[test]
    fn test_zero_model_timeout_rejected() {
        let text = format!("{}\n[model]\ntimeout_secs = 0\n", MINIMAL);
        assert!(parse_config(&text).is_err());
    }

    #[test]
    fn test_missing_db_section_rejected() {
        assert!(parse_config("[server]\nbind = \"127.0.0.1:8000\"\n").is_err());
    }
}
