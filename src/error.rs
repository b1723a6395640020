//! Error types for Promptdeck
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Promptdeck operations
///
/// Validation failures (`TemplateSyntax`, `MissingVariable`, `DuplicateName`,
/// `InvalidTemplate`) are raised before any remote call or database write.
/// Collaborator failures (`Provider`, `Storage`) are never retried here and
/// carry enough context for the caller to decide what to do.
#[derive(Error, Debug)]
pub enum PromptdeckError {
    /// Malformed or unbalanced placeholder syntax
    #[error("Template syntax error at `{fragment}`: {message}")]
    TemplateSyntax {
        /// The offending fragment of the template text
        fragment: String,
        /// What is wrong with it
        message: String,
    },

    /// A variable referenced by the template has no value
    #[error("Missing value for template variable: {0}")]
    MissingVariable(String),

    /// Model name not present in the cached catalog
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Session operation attempted before the model catalog was fetched
    #[error("Chat session is not initialized: {0}")]
    NotInitialized(String),

    /// Failure reported by the remote chat provider
    #[error("Provider error during {operation}: {source:#}")]
    Provider {
        /// Name of the session operation that failed
        operation: String,
        /// Underlying cause
        #[source]
        source: anyhow::Error,
    },

    /// Template store failure (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Template name already taken by another template
    #[error("A template named '{0}' already exists")]
    DuplicateName(String),

    /// Template record failed field validation (empty topic or name)
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// No template with the given name or id
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSV import errors
    #[error("Import error: {0}")]
    Import(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Interactive input errors
    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl PromptdeckError {
    /// Wrap a provider failure with the name of the operation that triggered it
    ///
    /// # Examples
    ///
    /// ```
    /// use promptdeck::error::PromptdeckError;
    ///
    /// let err = PromptdeckError::provider("query", anyhow::anyhow!("timed out"));
    /// assert_eq!(err.to_string(), "Provider error during query: timed out");
    /// ```
    pub fn provider(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Provider {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Build a storage error that keeps the full context chain of `err`
    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", err))
    }

    /// True for failures detected locally before any side effect
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TemplateSyntax { .. }
                | Self::MissingVariable(_)
                | Self::DuplicateName(_)
                | Self::InvalidTemplate(_)
        )
    }
}

/// Result type alias for Promptdeck operations
pub type Result<T> = std::result::Result<T, PromptdeckError>;
