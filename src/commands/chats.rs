//! Account-wide conversation management

use crate::commands::start_session;
use crate::config::Config;
use crate::error::{PromptdeckError, Result};
use crate::providers::ConversationInfo;

use colored::Colorize;
use prettytable::{format, row, Table};
use rustyline::DefaultEditor;

/// List every conversation the provider holds
///
/// # Errors
///
/// Returns `Provider` if the provider cannot be reached or the listing fails
pub async fn list_conversations(config: &Config, json: bool) -> Result<()> {
    let session = start_session(config, None).await?;
    let conversations = session.list_conversations().await?;

    if json {
        println!("{}", conversations_json(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["ID".bold(), "Model".bold(), "Title".bold()]);
    for conversation in &conversations {
        table.add_row(row![
            conversation.id.cyan(),
            conversation.model,
            conversation.title
        ]);
    }

    println!("\nConversations ({}):\n", conversations.len());
    table.printstd();
    println!();
    Ok(())
}

/// Delete every conversation the provider holds
///
/// Asks for confirmation on the terminal unless `yes` is set.
///
/// # Errors
///
/// Returns `Provider` if the provider cannot be reached or refuses the delete
pub async fn delete_all(config: &Config, yes: bool) -> Result<()> {
    if !yes && !confirm("Delete ALL conversations on the provider? This cannot be undone.")? {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    let mut session = start_session(config, None).await?;
    session.delete_all().await?;
    println!("{}", "All conversations deleted.".green());
    Ok(())
}

fn conversations_json(conversations: &[ConversationInfo]) -> Result<String> {
    serde_json::to_string_pretty(conversations).map_err(PromptdeckError::Serialization)
}

fn confirm(question: &str) -> Result<bool> {
    let mut rl = DefaultEditor::new()?;
    let answer = rl.readline(&format!("{} [y/N] ", question.red()))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
