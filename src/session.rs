//! Chat session manager
//!
//! [`ChatSessionManager`] owns the live state of one logical chat session:
//! the cached model catalog, the active model, and the remote conversations
//! this session opened. It is constructed explicitly and passed by reference
//! to whatever needs it; independent sessions use independent instances.
//!
//! Every mutating operation takes `&mut self`, so a single manager can only
//! have one operation in flight. A failed provider call leaves the session
//! exactly as it was.
//!
//! ```text
//! Uninitialized --initialize--> Ready --query--> Active
//!                                 ^                |
//!                                 +-----reset------+
//! any state --delete_all--> Ready
//! ```

use crate::error::{PromptdeckError, Result};
use crate::providers::{ChatProvider, Citation, ConversationInfo, Credential, ModelDescriptor};

/// Lifecycle state of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not authenticated, no model catalog
    Uninitialized,
    /// Catalog known, no conversation opened by this session
    Ready,
    /// At least one remote conversation is open
    Active,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Ready => write!(f, "ready"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Outcome of a successful query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Response text
    pub text: String,
    /// Remote conversation the exchange belongs to
    pub conversation_id: String,
    /// Web-search sources in provider order; always empty without web search
    pub citations: Vec<Citation>,
}

/// Mediates all interaction with a [`ChatProvider`]
pub struct ChatSessionManager<P: ChatProvider> {
    provider: P,
    credential: Option<Credential>,
    catalog: Vec<ModelDescriptor>,
    active: Option<usize>,
    conversations: Vec<String>,
}

impl<P: ChatProvider> ChatSessionManager<P> {
    /// Create an uninitialized session around a provider
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            credential: None,
            catalog: Vec::new(),
            active: None,
            conversations: Vec::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.credential.is_none() {
            SessionState::Uninitialized
        } else if self.conversations.is_empty() {
            SessionState::Ready
        } else {
            SessionState::Active
        }
    }

    /// Cached model catalog; empty before initialization
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.catalog
    }

    /// Explicitly selected model, if any
    ///
    /// `None` means queries go to the provider's default model.
    pub fn active_model(&self) -> Option<&ModelDescriptor> {
        self.active.and_then(|idx| self.catalog.get(idx))
    }

    /// Name of the explicitly selected model, if any
    pub fn active_model_name(&self) -> Option<&str> {
        self.active_model().map(|m| m.name.as_str())
    }

    /// Ids of remote conversations opened by this session
    pub fn open_conversations(&self) -> &[String] {
        &self.conversations
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether queries with web search can return sources
    pub fn supports_web_search(&self) -> bool {
        self.provider.supports_web_search()
    }

    /// Authenticate and fetch the model catalog
    ///
    /// Does nothing when the session is already initialized.
    ///
    /// # Errors
    ///
    /// Returns `Provider` if authentication or catalog retrieval fails; the
    /// session then stays uninitialized.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.credential.is_some() {
            return Ok(());
        }

        let credential = self
            .provider
            .authenticate()
            .await
            .map_err(|e| PromptdeckError::provider("authenticate", e))?;
        let catalog = self
            .provider
            .list_models(&credential)
            .await
            .map_err(|e| PromptdeckError::provider("list models", e))?;

        tracing::info!(
            "Chat session ready as {} with {} models",
            credential.identity,
            catalog.len()
        );
        self.credential = Some(credential);
        self.catalog = catalog;
        self.active = None;
        Ok(())
    }

    /// Make the model with exactly this name active
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before the catalog has been fetched,
    /// `UnknownModel` when no catalog entry has this name, and `Provider`
    /// when the switch call fails. The active model is unchanged on error.
    pub async fn select_model(&mut self, name: &str) -> Result<&ModelDescriptor> {
        self.require_initialized("select model")?;

        let idx = self
            .catalog
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| PromptdeckError::UnknownModel(name.to_string()))?;

        let provider_index = self.catalog[idx].provider_index;
        self.provider
            .switch_model(provider_index)
            .await
            .map_err(|e| PromptdeckError::provider("select model", e))?;

        tracing::info!("Active model set to {}", name);
        self.active = Some(idx);
        Ok(&self.catalog[idx])
    }

    /// Send compiled text to the active model
    ///
    /// Moves the session to `Active`. Not idempotent: repeating a query
    /// creates another remote turn.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before initialization and `Provider` when the
    /// provider call fails.
    pub async fn query(&mut self, text: &str, use_web_search: bool) -> Result<QueryResult> {
        self.require_initialized("query")?;

        tracing::debug!(
            "Sending query ({} chars, web_search={}) to {}",
            text.len(),
            use_web_search,
            self.active_model_name().unwrap_or("provider default")
        );

        let reply = self
            .provider
            .send_query(text, use_web_search)
            .await
            .map_err(|e| PromptdeckError::provider("query", e))?;

        if !self.conversations.contains(&reply.conversation_id) {
            self.conversations.push(reply.conversation_id.clone());
        }

        let citations = if use_web_search {
            reply.sources
        } else {
            if !reply.sources.is_empty() {
                tracing::debug!(
                    "Dropping {} sources returned without web search",
                    reply.sources.len()
                );
            }
            Vec::new()
        };

        Ok(QueryResult {
            text: reply.text,
            conversation_id: reply.conversation_id,
            citations,
        })
    }

    /// Close every conversation this session opened and return to `Ready`
    ///
    /// Conversations created outside this session are left alone.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before initialization and `Provider` when a
    /// delete call fails. Conversations deleted before the failure are no
    /// longer tracked; the rest stay open and the session stays `Active`.
    pub async fn reset(&mut self) -> Result<()> {
        self.require_initialized("reset")?;

        let mut closed = 0;
        let mut failure = None;
        for id in &self.conversations {
            if let Err(e) = self.provider.delete_conversation(id).await {
                failure = Some(PromptdeckError::provider("reset", e));
                break;
            }
            tracing::debug!("Closed conversation {}", id);
            closed += 1;
        }
        self.conversations.drain(..closed);

        if let Some(err) = failure {
            return Err(err);
        }
        tracing::info!("Chat session reset");
        Ok(())
    }

    /// Every conversation the provider holds for this identity
    ///
    /// Includes conversations opened outside this session.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before initialization and `Provider` when the
    /// listing fails.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationInfo>> {
        self.require_initialized("list conversations")?;

        self.provider
            .list_conversations()
            .await
            .map_err(|e| PromptdeckError::provider("list conversations", e))
    }

    /// Delete every conversation the provider holds for this identity
    ///
    /// Account-scoped and irreversible; callers must obtain explicit
    /// confirmation first. Initializes the session when needed and leaves it
    /// `Ready`.
    ///
    /// # Errors
    ///
    /// Returns `Provider` when initialization or the delete call fails. A
    /// session initialized by this call returns to `Uninitialized` when the
    /// delete fails.
    pub async fn delete_all(&mut self) -> Result<()> {
        let was_uninitialized = self.credential.is_none();
        self.initialize().await?;

        if let Err(e) = self.provider.delete_all_conversations().await {
            if was_uninitialized {
                self.credential = None;
                self.catalog.clear();
                self.active = None;
            }
            return Err(PromptdeckError::provider("delete all conversations", e));
        }

        tracing::warn!("Deleted all conversations on the provider");
        self.conversations.clear();
        Ok(())
    }

    fn require_initialized(&self, operation: &str) -> Result<()> {
        if self.credential.is_none() {
            return Err(PromptdeckError::NotInitialized(format!(
                "cannot {} before the model catalog is fetched",
                operation
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeProvider;

    fn two_models() -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor::new("Model A", 0),
            ModelDescriptor::new("Model B", 1),
        ]
    }

    async fn ready_session() -> ChatSessionManager<FakeProvider> {
        let mut session = ChatSessionManager::new(FakeProvider::new(two_models()));
        session.initialize().await.expect("initialize");
        session
    }

    #[tokio::test]
    async fn test_new_session_is_uninitialized() {
        let session = ChatSessionManager::new(FakeProvider::new(two_models()));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.models().is_empty());
        assert!(session.active_model_name().is_none());
    }

    #[tokio::test]
    async fn test_initialize_fetches_catalog_once() {
        let mut session = ChatSessionManager::new(FakeProvider::new(two_models()));
        session.initialize().await.unwrap();
        session.initialize().await.unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.models(), two_models().as_slice());
        assert_eq!(session.provider().calls("authenticate"), 1);
        assert_eq!(session.provider().calls("list_models"), 1);
    }

    #[tokio::test]
    async fn test_initialize_failure_stays_uninitialized() {
        let mut provider = FakeProvider::new(two_models());
        provider.fail_on("list_models");
        let mut session = ChatSessionManager::new(provider);

        let err = session.initialize().await.unwrap_err();
        assert!(matches!(err, PromptdeckError::Provider { ref operation, .. } if operation == "list models"));
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_select_model_before_init_is_not_initialized() {
        let mut session = ChatSessionManager::new(FakeProvider::new(two_models()));
        let err = session.select_model("Model A").await.unwrap_err();
        assert!(matches!(err, PromptdeckError::NotInitialized(_)));
        assert_eq!(session.provider().calls("switch_model"), 0);
    }

    #[tokio::test]
    async fn test_select_model_switches_by_exact_name() {
        let mut session = ready_session().await;
        let selected = session.select_model("Model B").await.unwrap();
        assert_eq!(selected.provider_index, 1);
        assert_eq!(session.active_model_name(), Some("Model B"));
        assert_eq!(session.provider().active_index(), Some(1));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_select_unknown_model_keeps_active_model() {
        let mut session = ready_session().await;
        session.select_model("Model B").await.unwrap();

        let err = session.select_model("Model C").await.unwrap_err();
        assert!(matches!(err, PromptdeckError::UnknownModel(ref n) if n == "Model C"));
        assert_eq!(session.active_model().map(|m| m.provider_index), Some(1));

        // Matching is case-sensitive
        assert!(session.select_model("model b").await.is_err());
        assert_eq!(session.provider().calls("switch_model"), 1);
    }

    #[tokio::test]
    async fn test_select_model_provider_failure_keeps_active_model() {
        let mut session = ready_session().await;
        session.select_model("Model A").await.unwrap();
        session.provider.fail_on("switch_model");

        let err = session.select_model("Model B").await.unwrap_err();
        assert!(matches!(err, PromptdeckError::Provider { .. }));
        assert_eq!(session.active_model_name(), Some("Model A"));
    }

    #[tokio::test]
    async fn test_query_before_init_is_not_initialized() {
        let mut session = ChatSessionManager::new(FakeProvider::new(two_models()));
        let err = session.query("hello", false).await.unwrap_err();
        assert!(matches!(err, PromptdeckError::NotInitialized(_)));
        assert_eq!(session.provider().calls("send_query"), 0);
    }

    #[tokio::test]
    async fn test_query_then_reset_round_trip() {
        let mut session = ready_session().await;

        let result = session.query("hello", false).await.unwrap();
        assert_eq!(result.text, "echo: hello");
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.open_conversations().len(), 1);

        session.reset().await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.open_conversations().is_empty());
        assert!(session.provider().remote_conversations().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_queries_continue_same_conversation() {
        let mut session = ready_session().await;
        let first = session.query("one", false).await.unwrap();
        let second = session.query("two", false).await.unwrap();
        assert_eq!(first.conversation_id, second.conversation_id);
        assert_eq!(session.open_conversations().len(), 1);
    }

    #[tokio::test]
    async fn test_query_with_web_search_preserves_citation_order() {
        let mut session = ready_session().await;
        let sources = vec![
            Citation::new("First", "https://a.example"),
            Citation::new("Second", "https://b.example"),
            Citation::new("Third", "https://c.example"),
        ];
        session.provider.set_sources(sources.clone());

        let result = session.query("search this", true).await.unwrap();
        assert_eq!(result.citations, sources);
    }

    #[tokio::test]
    async fn test_query_without_web_search_drops_sources() {
        let mut session = ready_session().await;
        session
            .provider
            .set_sources(vec![Citation::new("Leak", "https://leak.example")]);

        let result = session.query("no search", false).await.unwrap();
        assert!(result.citations.is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_leaves_state_unchanged() {
        let mut session = ready_session().await;
        session.provider.fail_on("send_query");

        let err = session.query("hello", false).await.unwrap_err();
        assert!(matches!(err, PromptdeckError::Provider { ref operation, .. } if operation == "query"));
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.open_conversations().is_empty());
    }

    #[tokio::test]
    async fn test_reset_only_touches_own_conversations() {
        let mut provider = FakeProvider::new(two_models());
        provider.seed_conversation("someone-else");
        let mut session = ChatSessionManager::new(provider);
        session.initialize().await.unwrap();

        session.query("mine", false).await.unwrap();
        session.reset().await.unwrap();

        assert_eq!(
            session.provider().remote_conversations(),
            vec!["someone-else".to_string()]
        );
    }

    #[tokio::test]
    async fn test_reset_failure_keeps_session_active() {
        let mut session = ready_session().await;
        session.query("hello", false).await.unwrap();
        session.provider.fail_on("delete_conversation");

        assert!(session.reset().await.is_err());
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.open_conversations().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_all_clears_everything_from_any_state() {
        let mut provider = FakeProvider::new(two_models());
        provider.seed_conversation("someone-else");
        let mut session = ChatSessionManager::new(provider);

        session.delete_all().await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.provider().remote_conversations().is_empty());

        session.query("again", false).await.unwrap();
        session.delete_all().await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.open_conversations().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_failure_keeps_tracked_conversations() {
        let mut session = ready_session().await;
        session.query("hello", false).await.unwrap();
        session.provider.fail_on("delete_all_conversations");

        assert!(session.delete_all().await.is_err());
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_delete_all_failure_from_uninitialized_stays_uninitialized() {
        let mut provider = FakeProvider::new(two_models());
        provider.fail_on("delete_all_conversations");
        let mut session = ChatSessionManager::new(provider);

        let err = session.delete_all().await.unwrap_err();
        assert!(matches!(err, PromptdeckError::Provider { ref operation, .. } if operation == "delete all conversations"));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.models().is_empty());
        assert!(session.active_model().is_none());
    }

    #[tokio::test]
    async fn test_reset_closes_conversations_in_order_and_keeps_the_rest_on_failure() {
        let mut session = ready_session().await;
        session.query("first", false).await.unwrap();
        session.select_model("Model B").await.unwrap();
        session.query("second", false).await.unwrap();
        assert_eq!(session.open_conversations(), ["conv-1", "conv-2"]);

        session.provider.fail_on_id("conv-2");
        assert!(session.reset().await.is_err());
        assert_eq!(session.open_conversations(), ["conv-2"]);
        assert_eq!(session.provider().remote_conversations(), vec!["conv-2"]);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_list_conversations_includes_foreign_ones() {
        let mut provider = FakeProvider::new(two_models());
        provider.seed_conversation("someone-else");
        let mut session = ChatSessionManager::new(provider);
        assert!(matches!(
            session.list_conversations().await,
            Err(PromptdeckError::NotInitialized(_))
        ));

        session.initialize().await.unwrap();
        session.query("mine", false).await.unwrap();
        let ids: Vec<String> = session
            .list_conversations()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["someone-else", "conv-1"]);
    }

    #[tokio::test]
    async fn test_list_conversations_failure_is_provider_error() {
        let mut session = ready_session().await;
        session.provider.fail_on("list_conversations");
        let err = session.list_conversations().await.unwrap_err();
        assert!(matches!(err, PromptdeckError::Provider { ref operation, .. } if operation == "list conversations"));
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Active.to_string(), "active");
        assert_eq!(SessionState::Uninitialized.to_string(), "uninitialized");
    }
}
