//! Configuration management for Promptdeck
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PromptdeckError, Result};
use crate::providers::PROVIDER_TYPES;
use crate::template::PlaceholderSyntax;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Promptdeck
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Template database settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chat session behavior
    #[serde(default)]
    pub session: SessionConfig,
    /// Template compilation and naming rules
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "ollama".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model used until another one is selected
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_ollama_timeout")]
    pub timeout_seconds: u64,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_timeout() -> u64 {
    120
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            timeout_seconds: default_ollama_timeout(),
        }
    }
}

/// Template database configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; the per-user data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Chat session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Model selected right after the catalog is fetched
    #[serde(default)]
    pub default_model: Option<String>,

    /// Keep conversations on the server after `run` instead of resetting
    #[serde(default)]
    pub keep_conversations: bool,
}

/// Template rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Treat names differing only in case as distinct
    #[serde(default = "default_case_sensitive_names")]
    pub case_sensitive_names: bool,

    /// Opening placeholder delimiter
    #[serde(default = "default_placeholder_open")]
    pub placeholder_open: char,

    /// Closing placeholder delimiter
    #[serde(default = "default_placeholder_close")]
    pub placeholder_close: char,
}

fn default_case_sensitive_names() -> bool {
    true
}

fn default_placeholder_open() -> char {
    '{'
}

fn default_placeholder_close() -> char {
    '}'
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            case_sensitive_names: default_case_sensitive_names(),
            placeholder_open: default_placeholder_open(),
            placeholder_close: default_placeholder_close(),
        }
    }
}

impl TemplatesConfig {
    /// Placeholder syntax described by this configuration
    pub fn placeholder_syntax(&self) -> Result<PlaceholderSyntax> {
        PlaceholderSyntax::new(self.placeholder_open, self.placeholder_close)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PromptdeckError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PromptdeckError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("PROMPTDECK_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(host) = std::env::var("PROMPTDECK_OLLAMA_HOST") {
            self.provider.ollama.host = host;
        }

        if let Ok(model) = std::env::var("PROMPTDECK_DEFAULT_MODEL") {
            self.session.default_model = Some(model);
        }

        if let Ok(db) = std::env::var(crate::storage::DB_ENV_VAR) {
            self.storage.path = Some(PathBuf::from(db));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db) = &cli.db {
            tracing::debug!("Using database override from CLI: {}", db.display());
            self.storage.path = Some(db.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(PromptdeckError::Config(
                "Provider type cannot be empty".to_string(),
            ));
        }

        if !PROVIDER_TYPES.contains(&self.provider.provider_type.as_str()) {
            return Err(PromptdeckError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                PROVIDER_TYPES.join(", ")
            )));
        }

        if self.provider.ollama.host.trim().is_empty() {
            return Err(PromptdeckError::Config(
                "provider.ollama.host cannot be empty".to_string(),
            ));
        }

        if self.provider.ollama.timeout_seconds == 0 {
            return Err(PromptdeckError::Config(
                "provider.ollama.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if matches!(&self.session.default_model, Some(m) if m.trim().is_empty()) {
            return Err(PromptdeckError::Config(
                "session.default_model cannot be empty".to_string(),
            ));
        }

        self.templates.placeholder_syntax()?;

        Ok(())
    }
}
