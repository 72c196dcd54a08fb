//! Configuration management for prompt-optimizer
//!
//! Supports configuration via:
//! 1. Config file (~/.config/prompt-optimizer/config.toml)
//! 2. Environment variables (PROMPT_OPTIMIZER_MODE, ANTHROPIC_API_KEY, etc.)
//! 3. CLI arguments (override file/env settings)

use crate::formatters::OutputMode;
use crate::optimization::DEFAULT_PLATFORM;
use crate::validation::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for each optimization call
    pub optimizer: OptimizerSettings,

    /// Input limits
    pub validation: ValidationConfig,

    /// Intent cache settings
    pub cache: CacheSettings,

    /// Preview backends
    pub generator: GeneratorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Output mode when none is given
    pub mode: OutputMode,

    /// Target platform when none is given
    pub platform: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            mode: OutputMode::Conversational,
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Memoize intent classification
    pub enabled: bool,

    /// Entries kept before least-recently-used eviction
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: crate::cache::DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Hosted model settings used by `--preview`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Call hosted models; when false every preview uses the local mock
    pub enabled: bool,

    /// Per-request timeout before falling back to the mock
    pub timeout_secs: u64,

    pub max_tokens: u32,

    pub temperature: f32,

    /// API key (can also use ANTHROPIC_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,

    /// API key (can also use OPENAI_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    pub anthropic_model: String,

    pub openai_model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 30,
            max_tokens: 1024,
            temperature: 0.7,
            anthropic_api_key: None,
            openai_api_key: None,
            anthropic_model: "claude-sonnet-4-20250514".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            anthropic_base_url: None,
            openai_base_url: None,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prompt-optimizer")
            .join("config.toml")
    }

    /// Load config from specific path; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::read_file(path.as_ref())?.with_env_overrides())
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value source
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(mode) = lookup("PROMPT_OPTIMIZER_MODE").and_then(|m| m.parse().ok()) {
            self.optimizer.mode = mode;
        }
        if let Some(platform) = lookup("PROMPT_OPTIMIZER_PLATFORM") {
            self.optimizer.platform = platform.trim().to_lowercase();
        }
        if let Some(enabled) = lookup("PROMPT_OPTIMIZER_GENERATOR").and_then(|v| v.parse().ok()) {
            self.generator.enabled = enabled;
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.generator.anthropic_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.generator.openai_api_key = Some(key);
        }

        self
    }

    /// Save config to specific path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.max_chars == 0 {
            return Err(invalid("validation.max_chars", "must be greater than zero"));
        }
        if self.validation.warn_chars > self.validation.max_chars {
            return Err(invalid(
                "validation.warn_chars",
                "must not exceed validation.max_chars",
            ));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(invalid("cache.max_entries", "must be greater than zero"));
        }
        if self.optimizer.platform.trim().is_empty() {
            return Err(ConfigError::MissingRequired("optimizer.platform".to_string()));
        }
        if self.generator.timeout_secs == 0 {
            return Err(invalid("generator.timeout_secs", "must be greater than zero"));
        }
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(invalid("generator.temperature", "must be between 0.0 and 2.0"));
        }

        Ok(())
    }

    /// Copy with API keys replaced by a mask, for display
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if masked.generator.anthropic_api_key.is_some() {
            masked.generator.anthropic_api_key = Some("***".to_string());
        }
        if masked.generator.openai_api_key.is_some() {
            masked.generator.openai_api_key = Some("***".to_string());
        }
        masked
    }

    /// Generate example config content
    pub fn example() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Builder for creating Config programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.config.optimizer.mode = mode;
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.config.optimizer.platform = platform.into();
        self
    }

    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.config.validation.max_chars = max_chars;
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    pub fn cache_max_entries(mut self, max_entries: usize) -> Self {
        self.config.cache.max_entries = max_entries;
        self
    }

    pub fn generator_enabled(mut self, enabled: bool) -> Self {
        self.config.generator.enabled = enabled;
        self
    }

    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.generator.anthropic_api_key = Some(key.into());
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.generator.openai_api_key = Some(key.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.generator.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.optimizer.mode, OutputMode::Conversational);
        assert_eq!(config.optimizer.platform, "claude");
        assert_eq!(config.validation.max_chars, 10_000);
        assert!(config.cache.enabled);
        assert!(!config.generator.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .mode(OutputMode::Structured)
            .platform("gemini")
            .cache_max_entries(50)
            .anthropic_api_key("test-key")
            .build();

        assert_eq!(config.optimizer.mode, OutputMode::Structured);
        assert_eq!(config.optimizer.platform, "gemini");
        assert_eq!(config.cache.max_entries, 50);
        assert_eq!(config.generator.anthropic_api_key, Some("test-key".to_string()));
    }

    #[test]
    fn test_example_config() {
        let example = Config::example();
        assert!(example.contains("[optimizer]"));
        assert!(example.contains("[validation]"));
        assert!(example.contains("[cache]"));
        assert!(example.contains("[generator]"));
        assert!(!example.contains("api_key"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ConfigBuilder::new()
            .mode(OutputMode::Structured)
            .max_chars(2000)
            .build();
        config.save_to(&path).unwrap();

        let loaded = Config::read_file(&path).unwrap();
        assert_eq!(loaded.optimizer.mode, OutputMode::Structured);
        assert_eq!(loaded.validation.max_chars, 2000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::read_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.cache.max_entries, 1000);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[optimizer]\nplatform = \"chatgpt\"\n").unwrap();

        let loaded = Config::read_file(&path).unwrap();
        assert_eq!(loaded.optimizer.platform, "chatgpt");
        assert_eq!(loaded.optimizer.mode, OutputMode::Conversational);
        assert_eq!(loaded.generator.timeout_secs, 30);
    }

    #[test]
    fn test_bad_mode_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[optimizer]\nmode = \"yaml\"\n").unwrap();

        assert!(matches!(Config::read_file(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("PROMPT_OPTIMIZER_MODE", "structured"),
            ("PROMPT_OPTIMIZER_PLATFORM", " Gemini "),
            ("PROMPT_OPTIMIZER_GENERATOR", "true"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::default().with_overrides_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.optimizer.mode, OutputMode::Structured);
        assert_eq!(config.optimizer.platform, "gemini");
        assert!(config.generator.enabled);
        assert_eq!(config.generator.openai_api_key, Some("sk-test".to_string()));
        assert_eq!(config.generator.anthropic_api_key, None);
    }

    #[test]
    fn test_unparseable_override_ignored() {
        let config = Config::default().with_overrides_from(|k| {
            (k == "PROMPT_OPTIMIZER_MODE").then(|| "yaml".to_string())
        });
        assert_eq!(config.optimizer.mode, OutputMode::Conversational);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let config = ConfigBuilder::new().max_chars(0).build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "validation.max_chars"
        ));

        let config = ConfigBuilder::new().max_chars(100).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().timeout_secs(0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked() {
        let config = ConfigBuilder::new().openai_api_key("sk-secret").build();
        let shown = toml::to_string_pretty(&config.masked()).unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("***"));
    }
}
