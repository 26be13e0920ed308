//! Runtime configuration: JSON file, then environment overrides.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ko-hover.json";

pub const ENV_API_KEY: &str = "DEEPL_API_KEY";
pub const ENV_ENABLED: &str = "KO_HOVER_ENABLED";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gates all hover behaviour. Toggled at runtime by the toggle command.
    pub enabled: bool,
    pub api_key: String,
    pub free_endpoint: String,
    pub paid_endpoint: String,
    pub target_lang: String,
    pub timeout_ms: u64,
    pub comment_debounce_ms: u64,
    pub identifier_debounce_ms: u64,
    pub decoration_ttl_ms: u64,
    /// `None` keeps the cache unbounded.
    pub cache_capacity: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            free_endpoint: "https://api-free.deepl.com/v2/translate".into(),
            paid_endpoint: "https://api.deepl.com/v2/translate".into(),
            target_lang: "KO".into(),
            timeout_ms: 5000,
            comment_debounce_ms: 50,
            identifier_debounce_ms: 100,
            decoration_ttl_ms: 3000,
            cache_capacity: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config IO error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, or defaults;
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None if default_path.is_file() => Self::load_from_file(default_path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        info!(
            enabled = config.enabled,
            key_set = !config.api_key.trim().is_empty(),
            "config_loaded"
        );
        Ok(config)
    }

    /// Override fields from variables resolved by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(raw) = lookup(ENV_ENABLED) {
            match parse_flag(&raw) {
                Some(enabled) => self.enabled = enabled,
                None => warn!(var = ENV_ENABLED, value = %raw, "ignoring unrecognised flag"),
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn comment_debounce(&self) -> Duration {
        Duration::from_millis(self.comment_debounce_ms)
    }

    pub fn identifier_debounce(&self) -> Duration {
        Duration::from_millis(self.identifier_debounce_ms)
    }

    pub fn decoration_ttl(&self) -> Duration {
        Duration::from_millis(self.decoration_ttl_ms)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "api_key": "k:fx", "cache_capacity": 64 }"#).unwrap();
        assert_eq!(config.api_key, "k:fx");
        assert_eq!(config.cache_capacity, Some(64));
        assert!(config.enabled);
        assert_eq!(config.timeout(), Duration::from_millis(5000));
        assert_eq!(config.comment_debounce(), Duration::from_millis(50));
        assert_eq!(config.identifier_debounce(), Duration::from_millis(100));
        assert_eq!(config.decoration_ttl(), Duration::from_millis(3000));
        assert_eq!(config.target_lang, "KO");
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [(ENV_API_KEY, "from-env"), (ENV_ENABLED, "off")].into();
        let mut config = Config::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_key, "from-env");
        assert!(!config.enabled);
    }

    #[test]
    fn bad_enabled_flag_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|name| (name == ENV_ENABLED).then(|| "maybe".to_string()));
        assert!(config.enabled);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load_from_file(Path::new("/nonexistent/ko-hover.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
