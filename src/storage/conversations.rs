//! Conversation persistence for providers without server-side history
//!
//! Conversations live in a `conversations` table next to the templates, so
//! a conversation kept by one CLI invocation is visible to the next one.
//! Messages are stored as a JSON array.

use crate::error::{PromptdeckError, Result};
use crate::storage::types::{StoredConversation, StoredMessage};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

/// SQLite-backed conversation store
#[derive(Debug, Clone)]
pub struct SqliteConversationStore {
    db_path: PathBuf,
}

impl SqliteConversationStore {
    /// Open the store at an explicit path, creating parent directories
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(PromptdeckError::storage)?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(PromptdeckError::storage)
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                model TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                messages JSON NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(PromptdeckError::storage)?;
        Ok(())
    }

    /// Save or update a conversation
    ///
    /// The creation time of an existing conversation is preserved.
    pub fn save(&self, conversation: &StoredConversation) -> Result<()> {
        let messages_json = serde_json::to_string(&conversation.messages)
            .context("Failed to serialize messages")
            .map_err(PromptdeckError::storage)?;

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO conversations (id, title, model, messages)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                model = excluded.model,
                messages = excluded.messages,
                updated_at = datetime('now')",
            params![
                conversation.id,
                conversation.title,
                conversation.model,
                messages_json
            ],
        )
        .context("Failed to save conversation")
        .map_err(PromptdeckError::storage)?;
        Ok(())
    }

    /// Load a conversation by id
    pub fn load(&self, id: &str) -> Result<Option<StoredConversation>> {
        let conn = self.open()?;
        let row = conn
            .query_row(
                "SELECT id, title, model, messages FROM conversations WHERE id = ?",
                params![id],
                row_to_parts,
            )
            .optional()
            .context("Failed to load conversation")
            .map_err(PromptdeckError::storage)?;

        row.map(into_conversation).transpose()
    }

    /// All conversations, oldest first
    pub fn list(&self) -> Result<Vec<StoredConversation>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, model, messages FROM conversations
                 ORDER BY created_at ASC, rowid ASC",
            )
            .context("Failed to prepare statement")
            .map_err(PromptdeckError::storage)?;

        let rows = stmt
            .query_map([], row_to_parts)
            .context("Failed to query conversations")
            .map_err(PromptdeckError::storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read conversation row")
            .map_err(PromptdeckError::storage)?;

        rows.into_iter().map(into_conversation).collect()
    }

    /// Delete one conversation; returns whether it existed
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.open()?;
        let changed = conn
            .execute("DELETE FROM conversations WHERE id = ?", params![id])
            .context("Failed to delete conversation")
            .map_err(PromptdeckError::storage)?;
        Ok(changed > 0)
    }

    /// Delete every conversation; returns how many were removed
    pub fn delete_all(&self) -> Result<usize> {
        let conn = self.open()?;
        conn.execute("DELETE FROM conversations", [])
            .context("Failed to delete conversations")
            .map_err(PromptdeckError::storage)
    }
}

type ConversationParts = (String, String, String, String);

fn row_to_parts(row: &Row<'_>) -> rusqlite::Result<ConversationParts> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_conversation(
    (id, title, model, messages_json): ConversationParts,
) -> Result<StoredConversation> {
    let messages: Vec<StoredMessage> = serde_json::from_str(&messages_json)
        .with_context(|| format!("Failed to deserialize messages of conversation {}", id))
        .map_err(PromptdeckError::storage)?;
    Ok(StoredConversation {
        id,
        title,
        model,
        messages,
    })
}
