//! Ollama provider implementation for Promptdeck
//!
//! Connects to a local or remote Ollama server. Ollama's chat endpoint is
//! stateless, so this adapter keeps the conversation registry itself: every
//! conversation id maps to the message history that is replayed on each
//! request. With a [`SqliteConversationStore`] attached the registry outlives
//! the process; otherwise it is held in memory. Ollama has no web-search
//! augmentation, so replies never carry sources.

use crate::config::OllamaConfig;
use crate::providers::{
    ChatProvider, Citation, ConversationInfo, Credential, ModelDescriptor, ProviderReply,
};
use crate::storage::{SqliteConversationStore, StoredConversation, StoredMessage};

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

/// Characters of the first message used as a conversation title
const TITLE_CHARS: usize = 40;

/// Ollama API provider
///
/// # Examples
///
/// ```
/// use promptdeck::config::OllamaConfig;
/// use promptdeck::providers::OllamaProvider;
///
/// let provider = OllamaProvider::new(OllamaConfig::default());
/// assert!(provider.is_ok());
/// ```
pub struct OllamaProvider {
    client: Client,
    host: String,
    model: String,
    catalog: RwLock<Vec<String>>,
    registry: ConversationRegistry,
    current: Option<String>,
}

/// Where the adapter keeps its conversations
enum ConversationRegistry {
    Memory(Vec<StoredConversation>),
    Sqlite(SqliteConversationStore),
}

impl ConversationRegistry {
    fn find(&self, id: &str) -> anyhow::Result<Option<StoredConversation>> {
        match self {
            Self::Memory(list) => Ok(list.iter().find(|c| c.id == id).cloned()),
            Self::Sqlite(store) => Ok(store.load(id)?),
        }
    }

    fn save(&mut self, conversation: StoredConversation) -> anyhow::Result<()> {
        match self {
            Self::Memory(list) => {
                match list.iter_mut().find(|c| c.id == conversation.id) {
                    Some(slot) => *slot = conversation,
                    None => list.push(conversation),
                }
                Ok(())
            }
            Self::Sqlite(store) => Ok(store.save(&conversation)?),
        }
    }

    fn list(&self) -> anyhow::Result<Vec<StoredConversation>> {
        match self {
            Self::Memory(list) => Ok(list.clone()),
            Self::Sqlite(store) => Ok(store.list()?),
        }
    }

    fn remove(&mut self, id: &str) -> anyhow::Result<bool> {
        match self {
            Self::Memory(list) => {
                let before = list.len();
                list.retain(|c| c.id != id);
                Ok(list.len() != before)
            }
            Self::Sqlite(store) => Ok(store.delete(id)?),
        }
    }

    fn clear(&mut self) -> anyhow::Result<usize> {
        match self {
            Self::Memory(list) => Ok(list.drain(..).count()),
            Self::Sqlite(store) => Ok(store.delete_all()?),
        }
    }
}

/// Response from Ollama's /api/version endpoint
#[derive(Debug, Deserialize)]
struct OllamaVersionResponse {
    version: String,
}

/// Response from Ollama's /api/tags endpoint
#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModelTag>,
}

/// Model metadata from /api/tags
#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

/// Request structure for /api/chat
///
/// Ollama's message objects are `{role, content}`, the stored shape.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [StoredMessage],
    stream: bool,
}

/// Response structure from /api/chat
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: StoredMessage,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OllamaConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("promptdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model,
            catalog: RwLock::new(Vec::new()),
            registry: ConversationRegistry::Memory(Vec::new()),
            current: None,
        })
    }

    /// Keep conversations in `store` instead of process memory
    ///
    /// Conversations then survive the process, so a later provider on the
    /// same database can list or delete them.
    pub fn with_conversation_store(mut self, store: SqliteConversationStore) -> Self {
        tracing::debug!("Ollama conversations stored in {}", store.path().display());
        self.registry = ConversationRegistry::Sqlite(store);
        self
    }

    /// The configured Ollama host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The model queries are currently sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}{}", self.host, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama server at {}", self.host))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Ollama returned error {} for {}: {}", status, path, error_text);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Ollama response from {}", path))
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    async fn authenticate(&mut self) -> anyhow::Result<Credential> {
        let version: OllamaVersionResponse = self.get_json("/api/version").await?;
        tracing::debug!("Connected to Ollama {}", version.version);
        Ok(Credential::anonymous())
    }

    async fn list_models(&self, _credential: &Credential) -> anyhow::Result<Vec<ModelDescriptor>> {
        let tags: OllamaTagsResponse = self.get_json("/api/tags").await?;
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();

        if let Ok(mut catalog) = self.catalog.write() {
            *catalog = names.clone();
        }

        tracing::debug!("Fetched {} models from Ollama", names.len());
        Ok(names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| ModelDescriptor::new(name, idx))
            .collect())
    }

    async fn switch_model(&mut self, provider_index: usize) -> anyhow::Result<()> {
        let name = self
            .catalog
            .read()
            .map_err(|_| anyhow!("Failed to acquire read lock on model catalog"))?
            .get(provider_index)
            .cloned()
            .ok_or_else(|| anyhow!("Invalid model index: {}", provider_index))?;

        tracing::info!("Switching Ollama model to {}", name);
        self.model = name;
        // Next query starts a fresh conversation on the new model
        self.current = None;
        Ok(())
    }

    async fn send_query(
        &mut self,
        text: &str,
        use_web_search: bool,
    ) -> anyhow::Result<ProviderReply> {
        if use_web_search {
            tracing::debug!("Ollama does not offer web search; no sources will be returned");
        }

        let existing = match self.current.as_deref() {
            Some(id) => self.registry.find(id)?,
            None => None,
        };

        let mut conversation = existing.unwrap_or_else(|| StoredConversation {
            id: uuid::Uuid::new_v4().to_string(),
            title: text.chars().take(TITLE_CHARS).collect(),
            model: self.model.clone(),
            messages: Vec::new(),
        });

        conversation.messages.push(StoredMessage::new("user", text));

        let url = format!("{}/api/chat", self.host);
        let request = OllamaRequest {
            model: &conversation.model,
            messages: &conversation.messages,
            stream: false,
        };

        tracing::debug!(
            "Sending Ollama request: model={}, {} messages",
            conversation.model,
            conversation.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama server at {}", self.host))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Ollama returned error {}: {}", status, error_text);
        }

        let reply: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama chat response")?;

        let answer = reply.message.content.clone();
        conversation.messages.push(reply.message);

        // Commit only after a successful round trip
        let conversation_id = conversation.id.clone();
        self.registry.save(conversation)?;
        self.current = Some(conversation_id.clone());

        Ok(ProviderReply {
            text: answer,
            conversation_id,
            sources: Vec::<Citation>::new(),
        })
    }

    fn supports_web_search(&self) -> bool {
        false
    }

    async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationInfo>> {
        Ok(self
            .registry
            .list()?
            .into_iter()
            .map(|c| ConversationInfo {
                id: c.id,
                title: c.title,
                model: c.model,
            })
            .collect())
    }

    async fn delete_conversation(&mut self, id: &str) -> anyhow::Result<()> {
        if !self.registry.remove(id)? {
            bail!("Conversation not found: {}", id);
        }
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        Ok(())
    }

    async fn delete_all_conversations(&mut self) -> anyhow::Result<()> {
        let removed = self.registry.clear()?;
        tracing::debug!("Deleted {} Ollama conversations", removed);
        self.current = None;
        Ok(())
    }
}
