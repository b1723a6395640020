//! Model catalog commands

use crate::commands::start_session;
use crate::config::Config;
use crate::error::{PromptdeckError, Result};
use crate::providers::ModelDescriptor;

use colored::Colorize;
use prettytable::{format, row, Table};

/// List the models offered by the configured provider
///
/// # Errors
///
/// Returns `Provider` if the provider cannot be reached
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    tracing::info!(
        "Listing models from provider: {}",
        config.provider.provider_type
    );

    let session = start_session(config, None).await?;
    let models = session.models();

    if json {
        println!("{}", models_json(models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!(
            "No models available from provider: {}",
            config.provider.provider_type
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["#".bold(), "Model Name".bold(), "Active".bold()]);
    for model in models {
        let active = if session.active_model_name() == Some(model.name.as_str()) {
            "*".green().to_string()
        } else {
            String::new()
        };
        table.add_row(row![model.provider_index, model.name.cyan(), active]);
    }

    println!(
        "\nAvailable models from {}:\n",
        config.provider.provider_type
    );
    table.printstd();
    println!();
    Ok(())
}

fn models_json(models: &[ModelDescriptor]) -> Result<String> {
    serde_json::to_string_pretty(models).map_err(PromptdeckError::Serialization)
}
