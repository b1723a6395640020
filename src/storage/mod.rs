//! Template persistence
//!
//! [`TemplateStore`] is the seam between the application layer and the
//! storage engine. [`SqliteTemplateStore`] is the bundled implementation.
//! [`SqliteConversationStore`] keeps chat conversations in the same database.

use crate::error::{PromptdeckError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

pub mod conversations;
pub mod types;
pub use conversations::SqliteConversationStore;
pub use types::{PromptTemplate, StoredConversation, StoredMessage};

/// Environment variable that overrides the default database location
pub const DB_ENV_VAR: &str = "PROMPTDECK_DB";

/// Default database location
///
/// Honors the `PROMPTDECK_DB` environment variable, otherwise
/// `templates.db` in the user's data directory.
///
/// # Errors
///
/// Returns `Storage` if no data directory can be determined
pub fn default_db_path() -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var(DB_ENV_VAR) {
        return Ok(PathBuf::from(override_path));
    }

    let proj_dirs = ProjectDirs::from("dev", "promptdeck", "promptdeck")
        .ok_or_else(|| PromptdeckError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("templates.db"))
}

/// Persistent keyed collection of prompt templates
///
/// Implementations only persist records. Name uniqueness and field
/// validation belong to [`crate::library::TemplateLibrary`].
pub trait TemplateStore {
    /// Fetch a template by its exact name
    fn get_by_name(&self, name: &str) -> Result<Option<PromptTemplate>>;

    /// Distinct topics in ascending order
    fn list_topics(&self) -> Result<Vec<String>>;

    /// All templates ordered by name
    fn list_all(&self) -> Result<Vec<PromptTemplate>>;

    /// Templates of one topic ordered by name
    fn list_by_topic(&self, topic: &str) -> Result<Vec<PromptTemplate>>;

    /// Insert a new record
    fn create(&self, template: &PromptTemplate) -> Result<()>;

    /// Overwrite the mutable fields of an existing record, matched by id
    fn update(&self, template: &PromptTemplate) -> Result<()>;

    /// Remove a record, matched by id
    fn delete(&self, template: &PromptTemplate) -> Result<()>;
}

/// SQLite-backed template store
pub struct SqliteTemplateStore {
    db_path: PathBuf,
}

impl SqliteTemplateStore {
    /// Open the store at the default location
    ///
    /// Honors the `PROMPTDECK_DB` environment variable, otherwise uses
    /// `templates.db` in the user's data directory.
    pub fn new() -> Result<Self> {
        Self::new_with_path(default_db_path()?)
    }

    /// Open the store at an explicit path, creating parent directories
    ///
    /// # Examples
    ///
    /// ```
    /// use promptdeck::storage::SqliteTemplateStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteTemplateStore::new_with_path(dir.path().join("t.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(PromptdeckError::storage)?;
        }

        let store = Self { db_path };
        store.init()?;
        tracing::debug!("Template store ready at {}", store.db_path.display());
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
            "CREATE TABLE IF NOT EXISTS prompt_templates (
                id TEXT PRIMARY KEY,
                topic TEXT NOT NULL,
                name TEXT NOT NULL,
                purpose TEXT NOT NULL DEFAULT '',
                template TEXT NOT NULL,
                use_web_search INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(PromptdeckError::storage)?;
        Ok(())
    }

    fn query_templates(&self, sql: &str, topic: Option<&str>) -> Result<Vec<PromptTemplate>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(sql)
            .context("Failed to prepare statement")
            .map_err(PromptdeckError::storage)?;

        let rows = match topic {
            Some(topic) => stmt.query_map(params![topic], row_to_template),
            None => stmt.query_map([], row_to_template),
        }
        .context("Failed to query templates")
        .map_err(PromptdeckError::storage)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read template row")
            .map_err(PromptdeckError::storage)
    }
}

fn row_to_template(row: &Row<'_>) -> rusqlite::Result<PromptTemplate> {
    Ok(PromptTemplate {
        id: row.get(0)?,
        topic: row.get(1)?,
        name: row.get(2)?,
        purpose: row.get(3)?,
        template: row.get(4)?,
        use_web_search: row.get(5)?,
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, topic, name, purpose, template, use_web_search FROM prompt_templates";

impl TemplateStore for SqliteTemplateStore {
    fn get_by_name(&self, name: &str) -> Result<Option<PromptTemplate>> {
        let conn = self.open()?;
        conn.query_row(
            &format!("{} WHERE name = ? LIMIT 1", SELECT_COLUMNS),
            params![name],
            row_to_template,
        )
        .optional()
        .context("Failed to query template by name")
        .map_err(PromptdeckError::storage)
    }

    fn list_topics(&self) -> Result<Vec<String>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT topic FROM prompt_templates ORDER BY topic ASC")
            .context("Failed to prepare statement")
            .map_err(PromptdeckError::storage)?;
        let topics = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("Failed to query topics")
            .map_err(PromptdeckError::storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read topic row")
            .map_err(PromptdeckError::storage)?;
        Ok(topics)
    }

    fn list_all(&self) -> Result<Vec<PromptTemplate>> {
        self.query_templates(&format!("{} ORDER BY name ASC", SELECT_COLUMNS), None)
    }

    fn list_by_topic(&self, topic: &str) -> Result<Vec<PromptTemplate>> {
        self.query_templates(
            &format!("{} WHERE topic = ? ORDER BY name ASC", SELECT_COLUMNS),
            Some(topic),
        )
    }

    fn create(&self, template: &PromptTemplate) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO prompt_templates (id, topic, name, purpose, template, use_web_search)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                template.id,
                template.topic,
                template.name,
                template.purpose,
                template.template,
                template.use_web_search
            ],
        )
        .context("Failed to insert template")
        .map_err(PromptdeckError::storage)?;
        Ok(())
    }

    fn update(&self, template: &PromptTemplate) -> Result<()> {
        let conn = self.open()?;
        let changed = conn
            .execute(
                "UPDATE prompt_templates SET
                    topic = ?,
                    name = ?,
                    purpose = ?,
                    template = ?,
                    use_web_search = ?
                WHERE id = ?",
                params![
                    template.topic,
                    template.name,
                    template.purpose,
                    template.template,
                    template.use_web_search,
                    template.id
                ],
            )
            .context("Failed to update template")
            .map_err(PromptdeckError::storage)?;

        if changed == 0 {
            return Err(PromptdeckError::TemplateNotFound(template.id.clone()));
        }
        Ok(())
    }

    fn delete(&self, template: &PromptTemplate) -> Result<()> {
        let conn = self.open()?;
        let changed = conn
            .execute(
                "DELETE FROM prompt_templates WHERE id = ?",
                params![template.id],
            )
            .context("Failed to delete template")
            .map_err(PromptdeckError::storage)?;

        if changed == 0 {
            return Err(PromptdeckError::TemplateNotFound(template.id.clone()));
        }
        Ok(())
    }
}
