//! TOML configuration parsing.
//!
//! The service reads a single TOML file with three sections: `[store]`
//! (SQLite file and collection), `[generation]` (text-completion provider)
//! and `[server]` (bind address and the origin allow-list).

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `server.allowed_origins`
/// (comma-separated list).
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    "forms".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;

    if let Ok(raw) = std::env::var(ALLOWED_ORIGINS_ENV) {
        config.server.allowed_origins = split_origins(&raw);
    }

    validate(&config)?;
    Ok(config)
}

/// Parse TOML content without applying environment overrides or validation.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

/// Split a comma-separated origin list, dropping blanks.
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn validate(config: &Config) -> Result<()> {
    // Validate store
    if !is_identifier(&config.store.collection) {
        anyhow::bail!(
            "store.collection must match [A-Za-z_][A-Za-z0-9_]*, got '{}'",
            config.store.collection
        );
    }

    // Validate server
    if config.server.allowed_origins.is_empty() {
        anyhow::bail!(
            "server.allowed_origins must not be empty (or set {})",
            ALLOWED_ORIGINS_ENV
        );
    }
    for origin in &config.server.allowed_origins {
        if origin.trim().is_empty() {
            anyhow::bail!("server.allowed_origins must not contain empty entries");
        }
        HeaderValue::from_str(origin)
            .with_context(|| format!("invalid origin in allow-list: '{}'", origin))?;
    }

    // Validate generation
    match config.generation.provider.as_str() {
        "openai" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be openai or disabled.",
            other
        ),
    }
    if config.generation.is_enabled() && config.generation.model.trim().is_empty() {
        anyhow::bail!(
            "generation.model must be specified when provider is '{}'",
            config.generation.provider
        );
    }

    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[store]
path = "/tmp/forms.sqlite"

[server]
bind = "127.0.0.1:8000"
allowed_origins = ["http://localhost:3000"]
"#;

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.store.collection, "forms");
        assert_eq!(config.generation.provider, "openai");
        assert_eq!(config.generation.model, "gpt-4o");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_empty_allow_list() {
        let mut config = parse_config(MINIMAL).unwrap();
        config.server.allowed_origins.clear();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("allowed_origins"));
    }

    #[test]
    fn test_rejects_bad_collection_name() {
        let mut config = parse_config(MINIMAL).unwrap();
        config.store.collection = "forms; DROP TABLE x".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let mut config = parse_config(MINIMAL).unwrap();
        config.generation.provider = "llama".to_string();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("Unknown generation provider"));
    }

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins(" http://a.example , ,http://b.example"),
            vec!["http://a.example", "http://b.example"]
        );
    }
}
