/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `templates` - template library management and CSV import
- `models`    - model catalog listing
- `run`       - compile a template and send it through a chat session
- `chats`     - stored conversation listing and account-wide cleanup

Handlers open the template database and the chat provider described by the
configuration and print their results; the logic itself lives in the
library modules.
*/

pub mod chats;
pub mod models;
pub mod run;
pub mod templates;

use crate::config::Config;
use crate::error::Result;
use crate::library::TemplateLibrary;
use crate::providers::{create_provider, ChatProvider};
use crate::session::ChatSessionManager;
use crate::storage::{default_db_path, SqliteConversationStore, SqliteTemplateStore};
use crate::template::TemplateCompiler;
use std::path::PathBuf;

/// Database holding templates and locally kept conversations
///
/// # Errors
///
/// Returns `Storage` if no default location can be determined
pub fn database_path(config: &Config) -> Result<PathBuf> {
    match &config.storage.path {
        Some(path) => Ok(path.clone()),
        None => default_db_path(),
    }
}

/// Open the template library configured in `config`
///
/// # Errors
///
/// Returns `Storage` if the database cannot be opened or initialized
pub fn open_library(config: &Config) -> Result<TemplateLibrary<SqliteTemplateStore>> {
    let store = SqliteTemplateStore::new_with_path(database_path(config)?)?;
    tracing::debug!("Using template database {}", store.path().display());
    Ok(TemplateLibrary::new(store).with_case_sensitive_names(config.templates.case_sensitive_names))
}

/// Build the template compiler configured in `config`
///
/// # Errors
///
/// Returns `Config` if the placeholder delimiters are invalid
pub fn compiler(config: &Config) -> Result<TemplateCompiler> {
    Ok(TemplateCompiler::new(config.templates.placeholder_syntax()?))
}

/// Create the configured provider and bring a session to `Ready`
///
/// `model` wins over `session.default_model`; with neither the provider's
/// own default model is used.
///
/// # Errors
///
/// Returns `Storage` if the conversation database cannot be opened,
/// `Provider` if the provider cannot be reached and `UnknownModel` if the
/// requested model is not in the catalog
pub async fn start_session(
    config: &Config,
    model: Option<&str>,
) -> Result<ChatSessionManager<Box<dyn ChatProvider>>> {
    let conversations = SqliteConversationStore::new_with_path(database_path(config)?)?;
    let provider = create_provider(&config.provider, conversations)?;
    let mut session = ChatSessionManager::new(provider);
    session.initialize().await?;

    if let Some(name) = model.or(config.session.default_model.as_deref()) {
        session.select_model(name).await?;
    }

    Ok(session)
}
