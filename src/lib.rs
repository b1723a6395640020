//! Promptdeck - prompt template library and chat runner
//!
//! This library provides a persistent catalog of prompt templates with named
//! placeholders, a compiler that turns a template plus values into prompt
//! text, and a session manager that sends the result to a remote chat
//! provider.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `template`: Placeholder extraction and rendering
//! - `storage`: Template records and the SQLite-backed store
//! - `library`: Validating create/update/delete over a store
//! - `import`: Bulk import of role prompts from CSV
//! - `providers`: Chat provider abstraction and the Ollama implementation
//! - `session`: Chat session state machine
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```
//! use promptdeck::TemplateCompiler;
//! use std::collections::HashMap;
//!
//! let compiler = TemplateCompiler::default();
//! let text = "Translate {text} into {language}";
//! assert_eq!(compiler.extract_variables(text).unwrap(), vec!["text", "language"]);
//!
//! let values = HashMap::from([
//!     ("text".to_string(), "good morning".to_string()),
//!     ("language".to_string(), "French".to_string()),
//! ]);
//! assert_eq!(
//!     compiler.render(text, &values).unwrap(),
//!     "Translate good morning into French"
//! );
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod import;
pub mod library;
pub mod principles;
pub mod providers;
pub mod session;
pub mod storage;
pub mod template;

// Re-export commonly used types
pub use config::Config;
pub use error::{PromptdeckError, Result};
pub use library::{NewTemplate, TemplateChanges, TemplateLibrary};
pub use providers::{ChatProvider, Citation, ModelDescriptor};
pub use session::{ChatSessionManager, QueryResult, SessionState};
pub use storage::{PromptTemplate, SqliteTemplateStore, TemplateStore};
pub use template::{PlaceholderSyntax, TemplateCompiler};

#[cfg(test)]
pub mod test_utils;
