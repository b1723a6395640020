//! Run a stored template against the chat provider
//!
//! The template is compiled before any provider call, so a missing value or
//! malformed placeholder never reaches the network. After the response the
//! session is reset unless the conversation should stay on the server.

use crate::commands::{compiler, open_library, start_session};
use crate::config::Config;
use crate::error::Result;
use crate::providers::ChatProvider;
use crate::session::{ChatSessionManager, QueryResult};
use crate::template::TemplateCompiler;

use colored::Colorize;
use rustyline::DefaultEditor;
use std::collections::HashMap;

/// Options collected from `promptdeck run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Template name
    pub name: String,
    /// Placeholder values given on the command line
    pub vars: Vec<(String, String)>,
    /// Model to select first
    pub model: Option<String>,
    /// Override of the template's web-search preference
    pub web_search: Option<bool>,
    /// Keep the conversation on the server
    pub keep: bool,
    /// Ask for missing values on the terminal
    pub interactive: bool,
}

/// Compile the named template and send it
///
/// # Errors
///
/// Returns `TemplateNotFound`, `TemplateSyntax` or `MissingVariable` before
/// contacting the provider, and `Provider`/`UnknownModel` afterwards
pub async fn run_template(config: &Config, options: RunOptions) -> Result<()> {
    let library = open_library(config)?;
    let compiler = compiler(config)?;
    let template = library.get(&options.name)?;

    let mut values: HashMap<String, String> = options.vars.into_iter().collect();
    if options.interactive {
        prompt_for_missing(&compiler, &template.template, &mut values)?;
    }
    let prompt = compiler.render(&template.template, &values)?;

    let use_web_search = options.web_search.unwrap_or(template.use_web_search);
    let keep = options.keep || config.session.keep_conversations;
    tracing::info!(
        "Running template '{}' (web_search={}, keep={})",
        template.name,
        use_web_search,
        keep
    );

    let mut session = start_session(config, options.model.as_deref()).await?;
    let result = send_compiled(&mut session, &prompt, use_web_search, keep).await?;

    print_result(
        &prompt,
        session.active_model_name().unwrap_or(config.provider.ollama.model.as_str()),
        &result,
    );
    Ok(())
}

/// Send an already compiled prompt and reset afterwards unless `keep`
///
/// Warns on stderr when web search is requested from a provider that
/// cannot search. A failed reset is logged but does not discard the
/// response.
///
/// # Errors
///
/// Returns `Provider` or `NotInitialized` from the query
pub async fn send_compiled<P: ChatProvider>(
    session: &mut ChatSessionManager<P>,
    prompt: &str,
    use_web_search: bool,
    keep: bool,
) -> Result<QueryResult> {
    if let Some(warning) = web_search_warning(use_web_search, session.supports_web_search()) {
        tracing::warn!("{}", warning);
        eprintln!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    let result = session.query(prompt, use_web_search).await?;

    if keep {
        tracing::debug!("Keeping conversation {}", result.conversation_id);
    } else if let Err(e) = session.reset().await {
        tracing::warn!("Failed to reset chat session: {}", e);
    }

    Ok(result)
}

fn web_search_warning(requested: bool, supported: bool) -> Option<&'static str> {
    (requested && !supported)
        .then_some("web search is not available with this provider; no sources will be returned")
}

fn prompt_for_missing(
    compiler: &TemplateCompiler,
    text: &str,
    values: &mut HashMap<String, String>,
) -> Result<()> {
    let missing: Vec<String> = compiler
        .extract_variables(text)?
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut rl = DefaultEditor::new()?;
    for name in missing {
        let value = rl.readline(&format!("{}: ", name.cyan()))?;
        values.insert(name, value);
    }
    Ok(())
}

fn print_result(prompt: &str, model: &str, result: &QueryResult) {
    println!("{}", "Prompt:".bold());
    println!("{}\n", prompt);
    println!("{} {}", "Response from".bold(), model.cyan());
    println!("{}", result.text);

    if !result.citations.is_empty() {
        println!("\n{}", "Sources:".bold());
        for citation in &result.citations {
            println!("{}: {}", citation.title, citation.link);
        }
    }
}
