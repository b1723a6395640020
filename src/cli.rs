//! Command-line interface definition for Promptdeck
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for template management, running templates against
//! a chat provider, and conversation cleanup.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Promptdeck - prompt template library and chat runner
///
/// Store reusable prompt templates with named placeholders, fill them in,
/// and send the result to a chat model.
#[derive(Parser, Debug, Clone)]
#[command(name = "promptdeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Template database file (overrides config and PROMPTDECK_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Promptdeck
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage prompt templates
    Templates {
        /// Template management subcommand
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Inspect the provider's models
    Models {
        /// Model management subcommand
        #[command(subcommand)]
        command: ModelCommand,
    },

    /// Fill in a template and send it to the model
    Run {
        /// Template name
        name: String,

        /// Placeholder value as key=value (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,

        /// Model to select before sending
        #[arg(short, long)]
        model: Option<String>,

        /// Override the template's web-search preference
        #[arg(long, value_name = "BOOL")]
        web_search: Option<bool>,

        /// Keep the conversation on the server afterwards
        #[arg(long)]
        keep: bool,

        /// Prompt for placeholder values not given with --var
        #[arg(short, long)]
        interactive: bool,
    },

    /// Manage conversations held by the provider
    Chats {
        /// Conversation management subcommand
        #[command(subcommand)]
        command: ChatsCommand,
    },

    /// Print prompt-writing guidelines
    Principles,
}

/// Template management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TemplateCommand {
    /// List templates, optionally for one topic
    List {
        /// Only show templates with this topic
        #[arg(short, long)]
        topic: Option<String>,
    },

    /// List distinct topics
    Topics,

    /// Show one template in full
    Show {
        /// Template name
        name: String,
    },

    /// List the placeholder variables of a template
    Vars {
        /// Template name
        name: String,
    },

    /// Create a new template
    Create {
        /// Unique template name
        #[arg(short, long)]
        name: String,

        /// Topic used for grouping
        #[arg(short, long)]
        topic: String,

        /// What the template is for
        #[arg(short, long, default_value = "")]
        purpose: String,

        /// Template text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        template: Option<String>,

        /// Read the template text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Use web search when running this template
        #[arg(long)]
        web_search: bool,
    },

    /// Change fields of an existing template
    Update {
        /// Current template name
        name: String,

        /// New name
        #[arg(long = "name", value_name = "NEW_NAME")]
        new_name: Option<String>,

        /// New topic
        #[arg(short, long)]
        topic: Option<String>,

        /// New purpose
        #[arg(short, long)]
        purpose: Option<String>,

        /// New template text
        #[arg(long, conflicts_with = "file")]
        template: Option<String>,

        /// Read the new template text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// New web-search preference
        #[arg(long, value_name = "BOOL")]
        web_search: Option<bool>,
    },

    /// Delete a template
    Delete {
        /// Template name
        name: String,
    },

    /// Import role prompts from a CSV file with act and prompt columns
    Import {
        /// CSV file
        path: PathBuf,
    },
}

/// Model subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommand {
    /// List available models
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Conversation subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ChatsCommand {
    /// List the conversations the provider holds
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every conversation on the provider
    DeleteAll {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
