//! Provider module for Promptdeck
//!
//! This module contains the remote chat provider abstraction and the
//! bundled Ollama implementation.

pub mod base;
pub mod ollama;

pub use base::{
    ChatProvider, Citation, ConversationInfo, Credential, ModelDescriptor, ProviderReply,
};
pub use ollama::OllamaProvider;

use crate::config::ProviderConfig;
use crate::error::{PromptdeckError, Result};
use crate::storage::SqliteConversationStore;

/// Provider types accepted in configuration
pub const PROVIDER_TYPES: &[&str] = &["ollama"];

/// Create a provider instance based on configuration
///
/// Providers that hold no conversations on their server keep them in
/// `conversations`.
///
/// # Errors
///
/// Returns `Config` if the provider type is unknown and `Provider` if the
/// client cannot be constructed.
pub fn create_provider(
    config: &ProviderConfig,
    conversations: SqliteConversationStore,
) -> Result<Box<dyn ChatProvider>> {
    match config.provider_type.as_str() {
        "ollama" => Ok(Box::new(
            OllamaProvider::new(config.ollama.clone())
                .map_err(|e| PromptdeckError::provider("create provider", e))?
                .with_conversation_store(conversations),
        )),
        other => Err(PromptdeckError::Config(format!(
            "Unknown provider type: {}. Must be one of: {}",
            other,
            PROVIDER_TYPES.join(", ")
        ))),
    }
}
