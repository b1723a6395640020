//! Remote chat provider trait and boundary records
//!
//! Everything a provider hands back is converted into one of the explicit
//! records below at the provider boundary. The session manager never sees
//! provider-specific payloads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque proof of authentication returned by [`ChatProvider::authenticate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Who the provider authenticated (may be `"anonymous"`)
    pub identity: String,
}

impl Credential {
    /// Credential for providers that do not authenticate
    pub fn anonymous() -> Self {
        Self {
            identity: "anonymous".to_string(),
        }
    }
}

/// A model offered by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Display name, matched exactly by `select_model`
    pub name: String,
    /// Index the provider uses to address this model
    pub provider_index: usize,
}

impl ModelDescriptor {
    /// Create a descriptor
    ///
    /// # Examples
    ///
    /// ```
    /// use promptdeck::providers::ModelDescriptor;
    ///
    /// let m = ModelDescriptor::new("Model A", 0);
    /// assert_eq!(m.name, "Model A");
    /// ```
    pub fn new(name: impl Into<String>, provider_index: usize) -> Self {
        Self {
            name: name.into(),
            provider_index,
        }
    }
}

/// A web-search source cited by a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Page title
    pub title: String,
    /// Page URL
    pub link: String,
}

impl Citation {
    /// Create a citation
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// A conversation held by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationInfo {
    /// Provider conversation id
    pub id: String,
    /// Conversation title
    pub title: String,
    /// Model the conversation runs on
    pub model: String,
}

/// Raw answer to [`ChatProvider::send_query`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    /// Response text
    pub text: String,
    /// Conversation the exchange happened in
    pub conversation_id: String,
    /// Sources in provider order; empty when no web search ran
    pub sources: Vec<Citation>,
}

/// Client for a remote conversational service
///
/// Calls are not assumed idempotent: sending the same query twice may create
/// two remote turns. Implementations own authentication details such as
/// cookies or tokens.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Authenticate with the service
    async fn authenticate(&mut self) -> anyhow::Result<Credential>;

    /// Ordered model catalog
    async fn list_models(&self, credential: &Credential) -> anyhow::Result<Vec<ModelDescriptor>>;

    /// Make the model at `provider_index` active for subsequent queries
    async fn switch_model(&mut self, provider_index: usize) -> anyhow::Result<()>;

    /// Whether `send_query` can augment answers with web-search sources
    fn supports_web_search(&self) -> bool;

    /// Send a message under the active model
    async fn send_query(&mut self, text: &str, use_web_search: bool)
        -> anyhow::Result<ProviderReply>;

    /// Every conversation the service holds for the authenticated identity
    async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationInfo>>;

    /// Delete one conversation
    async fn delete_conversation(&mut self, id: &str) -> anyhow::Result<()>;

    /// Delete every conversation of the authenticated identity
    async fn delete_all_conversations(&mut self) -> anyhow::Result<()>;
}

#[async_trait]
impl<P: ChatProvider + ?Sized> ChatProvider for Box<P> {
    async fn authenticate(&mut self) -> anyhow::Result<Credential> {
        (**self).authenticate().await
    }

    async fn list_models(&self, credential: &Credential) -> anyhow::Result<Vec<ModelDescriptor>> {
        (**self).list_models(credential).await
    }

    async fn switch_model(&mut self, provider_index: usize) -> anyhow::Result<()> {
        (**self).switch_model(provider_index).await
    }

    async fn send_query(
        &mut self,
        text: &str,
        use_web_search: bool,
    ) -> anyhow::Result<ProviderReply> {
        (**self).send_query(text, use_web_search).await
    }

    fn supports_web_search(&self) -> bool {
        (**self).supports_web_search()
    }

    async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationInfo>> {
        (**self).list_conversations().await
    }

    async fn delete_conversation(&mut self, id: &str) -> anyhow::Result<()> {
        (**self).delete_conversation(id).await
    }

    async fn delete_all_conversations(&mut self) -> anyhow::Result<()> {
        (**self).delete_all_conversations().await
    }
}
