//! DocuBot - chat with your PDF documents
//!
#![doc = "DocuBot - chat with your PDF documents"]
#![doc = "Main entry point for the DocuBot terminal client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docubot::cli::{Cli, Commands};
use docubot::commands;
use docubot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = Config::resolve_path(cli.config.as_deref());
    tracing::debug!("Loading configuration from {}", config_path.display());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            // Moves `config` into the handler (match arms are exclusive)
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { query } => {
            tracing::info!("Asking a single question");
            commands::documents::run_ask(config, &query).await?;
            Ok(())
        }
        Commands::Ingest { path } => {
            tracing::info!("Ingesting {}", path.display());
            commands::documents::run_ingest(config, &path).await?;
            Ok(())
        }
        Commands::Files { json } => {
            commands::documents::run_files(config, json).await?;
            Ok(())
        }
        Commands::Delete { id, yes } => {
            tracing::info!("Deleting document {}", id);
            commands::documents::run_delete(config, &id, yes).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so `files --json` output stays machine readable.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "docubot=debug" } else { "docubot=info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
