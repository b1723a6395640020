//! Promptdeck - prompt template library and chat runner
//!
#![doc = "Main entry point for the promptdeck command."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use promptdeck::cli::{ChatsCommand, Cli, Commands, ModelCommand};
use promptdeck::commands;
use promptdeck::commands::run::RunOptions;
use promptdeck::config::Config;
use promptdeck::principles::PROMPTING_PRINCIPLES;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Templates { command } => {
            tracing::info!("Starting template command");
            commands::templates::handle_templates(&config, command)?;
            Ok(())
        }
        Commands::Models { command } => match command {
            ModelCommand::List { json } => {
                tracing::info!("Starting model listing");
                commands::models::list_models(&config, json).await?;
                Ok(())
            }
        },
        Commands::Run {
            name,
            vars,
            model,
            web_search,
            keep,
            interactive,
        } => {
            tracing::info!("Running template {}", name);
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            commands::run::run_template(
                &config,
                RunOptions {
                    name,
                    vars,
                    model,
                    web_search,
                    keep,
                    interactive,
                },
            )
            .await?;
            Ok(())
        }
        Commands::Chats { command } => match command {
            ChatsCommand::List { json } => {
                commands::chats::list_conversations(&config, json).await?;
                Ok(())
            }
            ChatsCommand::DeleteAll { yes } => {
                tracing::info!("Starting delete-all conversations");
                commands::chats::delete_all(&config, yes).await?;
                Ok(())
            }
        },
        Commands::Principles => {
            println!("{}", PROMPTING_PRINCIPLES);
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "promptdeck=debug"
    } else {
        "promptdeck=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
