//! Test utilities for Promptdeck
//!
//! This module provides common test helpers: temporary directories,
//! error assertions, a throwaway template store and a scripted chat
//! provider.

use crate::error::PromptdeckError;
use crate::providers::{
    ChatProvider, Citation, ConversationInfo, Credential, ModelDescriptor, ProviderReply,
};
use crate::storage::SqliteTemplateStore;

use anyhow::bail;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a template store backed by a database in a fresh temporary directory
///
/// The directory must be kept alive for as long as the store is used.
pub fn temp_store() -> (TempDir, SqliteTemplateStore) {
    let dir = temp_dir();
    let store = SqliteTemplateStore::new_with_path(dir.path().join("templates.db"))
        .expect("Failed to create template store");
    (dir, store)
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T, PromptdeckError>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Scripted in-memory chat provider
///
/// Replies echo the query text. Conversations live in a local list so tests
/// can observe what the session opened and closed. Any operation can be made
/// to fail with [`FakeProvider::fail_on`]. Web search is supported unless
/// [`FakeProvider::without_web_search`] is used.
pub struct FakeProvider {
    catalog: Vec<ModelDescriptor>,
    active_index: Option<usize>,
    remote: Vec<String>,
    current: Option<String>,
    sources: Vec<Citation>,
    failing: HashSet<&'static str>,
    failing_ids: HashSet<String>,
    web_search: bool,
    calls: Mutex<HashMap<&'static str, usize>>,
    next_id: usize,
}

impl FakeProvider {
    /// Provider offering the given catalog
    pub fn new(catalog: Vec<ModelDescriptor>) -> Self {
        Self {
            catalog,
            active_index: None,
            remote: Vec::new(),
            current: None,
            sources: Vec::new(),
            failing: HashSet::new(),
            failing_ids: HashSet::new(),
            web_search: true,
            calls: Mutex::new(HashMap::new()),
            next_id: 0,
        }
    }

    /// Make the named trait method fail from now on
    pub fn fail_on(&mut self, operation: &'static str) {
        self.failing.insert(operation);
    }

    /// Make deleting this one conversation fail
    pub fn fail_on_id(&mut self, id: &str) {
        self.failing_ids.insert(id.to_string());
    }

    /// Report no web-search support
    pub fn without_web_search(mut self) -> Self {
        self.web_search = false;
        self
    }

    /// Sources attached to every following reply
    pub fn set_sources(&mut self, sources: Vec<Citation>) {
        self.sources = sources;
    }

    /// Add a conversation that exists before the session starts
    pub fn seed_conversation(&mut self, id: &str) {
        self.remote.push(id.to_string());
    }

    /// Conversations currently held by the fake service
    pub fn remote_conversations(&self) -> Vec<String> {
        self.remote.clone()
    }

    /// Index passed to the last successful `switch_model`
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Number of times the named method was called
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(operation).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn record(&self, operation: &'static str) -> anyhow::Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(operation).or_insert(0) += 1;
        }
        if self.failing.contains(operation) {
            bail!("{} failed", operation);
        }
        Ok(())
    }
}

#[async_trait]
impl ChatProvider for FakeProvider {
    async fn authenticate(&mut self) -> anyhow::Result<Credential> {
        self.record("authenticate")?;
        Ok(Credential {
            identity: "tester".to_string(),
        })
    }

    async fn list_models(&self, _credential: &Credential) -> anyhow::Result<Vec<ModelDescriptor>> {
        self.record("list_models")?;
        Ok(self.catalog.clone())
    }

    async fn switch_model(&mut self, provider_index: usize) -> anyhow::Result<()> {
        self.record("switch_model")?;
        self.active_index = Some(provider_index);
        self.current = None;
        Ok(())
    }

    fn supports_web_search(&self) -> bool {
        self.web_search
    }

    async fn send_query(
        &mut self,
        text: &str,
        _use_web_search: bool,
    ) -> anyhow::Result<ProviderReply> {
        self.record("send_query")?;
        let id = match &self.current {
            Some(id) => id.clone(),
            None => {
                self.next_id += 1;
                let id = format!("conv-{}", self.next_id);
                self.remote.push(id.clone());
                self.current = Some(id.clone());
                id
            }
        };
        Ok(ProviderReply {
            text: format!("echo: {}", text),
            conversation_id: id,
            sources: self.sources.clone(),
        })
    }

    async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationInfo>> {
        self.record("list_conversations")?;
        Ok(self
            .remote
            .iter()
            .map(|id| ConversationInfo {
                id: id.clone(),
                title: String::new(),
                model: String::new(),
            })
            .collect())
    }

    async fn delete_conversation(&mut self, id: &str) -> anyhow::Result<()> {
        self.record("delete_conversation")?;
        if self.failing_ids.contains(id) {
            bail!("delete_conversation failed for {}", id);
        }
        let before = self.remote.len();
        self.remote.retain(|c| c != id);
        if self.remote.len() == before {
            bail!("Conversation not found: {}", id);
        }
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        Ok(())
    }

    async fn delete_all_conversations(&mut self) -> anyhow::Result<()> {
        self.record("delete_all_conversations")?;
        self.remote.clear();
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_store_creates_database() {
        let (dir, store) = temp_store();
        assert!(store.path().starts_with(dir.path()));
        assert!(store.path().exists());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<(), PromptdeckError> =
            Err(PromptdeckError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<(), PromptdeckError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[tokio::test]
    async fn test_fake_provider_failure_is_counted() {
        let mut provider = FakeProvider::new(Vec::new());
        provider.fail_on("authenticate");
        assert!(provider.authenticate().await.is_err());
        assert_eq!(provider.calls("authenticate"), 1);
    }
}
