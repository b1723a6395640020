use serde::{Deserialize, Serialize};

/// A named, reusable prompt template as persisted by a [`super::TemplateStore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Unique identifier, generated at creation and never changed
    pub id: String,
    /// Classification used for grouping and filtering
    pub topic: String,
    /// Display name, unique across all templates
    pub name: String,
    /// Free-text description of what the template is for
    pub purpose: String,
    /// Raw template text with placeholders
    pub template: String,
    /// Default web-search preference for queries built from this template
    pub use_web_search: bool,
}

impl PromptTemplate {
    /// Create a new record with a freshly generated id
    ///
    /// # Examples
    ///
    /// ```
    /// use promptdeck::storage::PromptTemplate;
    ///
    /// let t = PromptTemplate::new("Writing", "Summarizer", "", "Summarize {text}", false);
    /// assert_eq!(t.id.len(), 36);
    /// ```
    pub fn new(
        topic: impl Into<String>,
        name: impl Into<String>,
        purpose: impl Into<String>,
        template: impl Into<String>,
        use_web_search: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            topic: topic.into(),
            name: name.into(),
            purpose: purpose.into(),
            template: template.into(),
            use_web_search,
        }
    }
}

/// One message of a stored conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// `user` or `assistant`
    pub role: String,
    /// Message text
    #[serde(default)]
    pub content: String,
}

impl StoredMessage {
    /// Create a message
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A chat conversation kept by a provider that holds no server-side history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConversation {
    /// Conversation id handed out to sessions
    pub id: String,
    /// Short title taken from the first message
    pub title: String,
    /// Model the conversation runs on
    pub model: String,
    /// Full message history in order
    pub messages: Vec<StoredMessage>,
}
