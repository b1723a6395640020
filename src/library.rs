//! Application-layer template management
//!
//! [`TemplateLibrary`] wraps a [`TemplateStore`] and enforces the rules the
//! store itself does not: topics and names must be non-empty and names must
//! be unique across all templates. Every check runs before anything is
//! written.

use crate::error::{PromptdeckError, Result};
use crate::storage::{PromptTemplate, TemplateStore};

/// Input for creating a template
#[derive(Debug, Clone, Default)]
pub struct NewTemplate {
    /// Classification used for grouping
    pub topic: String,
    /// Unique display name
    pub name: String,
    /// Free-text description
    pub purpose: String,
    /// Template text
    pub template: String,
    /// Default web-search preference
    pub use_web_search: bool,
}

/// Partial update of an existing template; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    /// New topic
    pub topic: Option<String>,
    /// New name
    pub name: Option<String>,
    /// New purpose
    pub purpose: Option<String>,
    /// New template text
    pub template: Option<String>,
    /// New web-search preference
    pub use_web_search: Option<bool>,
}

/// Validating facade over a template store
pub struct TemplateLibrary<S: TemplateStore> {
    store: S,
    case_sensitive_names: bool,
}

impl<S: TemplateStore> TemplateLibrary<S> {
    /// Create a library with case-sensitive name uniqueness
    pub fn new(store: S) -> Self {
        Self {
            store,
            case_sensitive_names: true,
        }
    }

    /// Choose whether "Summarizer" and "summarizer" count as the same name
    pub fn with_case_sensitive_names(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_names = case_sensitive;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up a template by name
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` when no template has this name.
    pub fn get(&self, name: &str) -> Result<PromptTemplate> {
        self.store
            .get_by_name(name)?
            .ok_or_else(|| PromptdeckError::TemplateNotFound(name.to_string()))
    }

    /// Distinct topics in ascending order
    pub fn topics(&self) -> Result<Vec<String>> {
        self.store.list_topics()
    }

    /// Templates ordered by name, optionally restricted to one topic
    pub fn list(&self, topic: Option<&str>) -> Result<Vec<PromptTemplate>> {
        match topic {
            Some(topic) => self.store.list_by_topic(topic),
            None => self.store.list_all(),
        }
    }

    /// Validate and persist a new template
    ///
    /// # Errors
    ///
    /// Returns `InvalidTemplate` for an empty topic or name and
    /// `DuplicateName` when the name is already taken.
    pub fn create(&self, new: NewTemplate) -> Result<PromptTemplate> {
        validate_fields(&new.topic, &new.name)?;
        self.ensure_name_available(&new.name, None)?;

        let template = PromptTemplate::new(
            new.topic,
            new.name,
            new.purpose,
            new.template,
            new.use_web_search,
        );
        self.store.create(&template)?;
        tracing::info!("Created template '{}' ({})", template.name, template.id);
        Ok(template)
    }

    /// Apply changes to the template currently named `name`
    ///
    /// Name uniqueness is checked against every *other* template, so keeping
    /// the current name is always allowed.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound`, `InvalidTemplate` or `DuplicateName`.
    pub fn update(&self, name: &str, changes: TemplateChanges) -> Result<PromptTemplate> {
        let mut template = self.get(name)?;

        if let Some(topic) = changes.topic {
            template.topic = topic;
        }
        if let Some(new_name) = changes.name {
            template.name = new_name;
        }
        if let Some(purpose) = changes.purpose {
            template.purpose = purpose;
        }
        if let Some(text) = changes.template {
            template.template = text;
        }
        if let Some(web) = changes.use_web_search {
            template.use_web_search = web;
        }

        validate_fields(&template.topic, &template.name)?;
        self.ensure_name_available(&template.name, Some(&template.id))?;

        self.store.update(&template)?;
        tracing::info!("Updated template '{}' ({})", template.name, template.id);
        Ok(template)
    }

    /// Delete the template named `name`
    pub fn delete(&self, name: &str) -> Result<PromptTemplate> {
        let template = self.get(name)?;
        self.store.delete(&template)?;
        tracing::info!("Deleted template '{}' ({})", template.name, template.id);
        Ok(template)
    }

    fn ensure_name_available(&self, name: &str, own_id: Option<&str>) -> Result<()> {
        let clash = if self.case_sensitive_names {
            self.store
                .get_by_name(name)?
                .filter(|existing| Some(existing.id.as_str()) != own_id)
                .is_some()
        } else {
            let wanted = name.to_lowercase();
            self.store.list_all()?.iter().any(|existing| {
                existing.name.to_lowercase() == wanted && Some(existing.id.as_str()) != own_id
            })
        };

        if clash {
            return Err(PromptdeckError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

fn validate_fields(topic: &str, name: &str) -> Result<()> {
    if topic.trim().is_empty() {
        return Err(PromptdeckError::InvalidTemplate(
            "Please enter a topic for the template".to_string(),
        ));
    }
    if name.trim().is_empty() {
        return Err(PromptdeckError::InvalidTemplate(
            "Please enter a name for the template".to_string(),
        ));
    }
    Ok(())
}
