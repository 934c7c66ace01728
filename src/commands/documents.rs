//! One-shot command handlers: ask, ingest, files, delete

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::client::create_client;
use crate::commands::render;
use crate::config::Config;
use crate::error::{DocubotError, Result};
use crate::manifest::DeleteOutcome;
use crate::session::SendOutcome;
use crate::workspace::Workspace;

/// Ask a single question and print the answer
///
/// A failed request prints the fallback message and exits with an error so
/// scripts can detect it.
pub async fn run_ask(config: Config, query: &str) -> Result<()> {
    let api = create_client(&config.server)?;
    let mut workspace = Workspace::new(api, &config);

    let outcome = workspace.ask(query).await?;
    if let Some(reply) = workspace.session().last_reply() {
        println!("{}", render::format_message(reply));
    }

    match outcome {
        SendOutcome::Answered { .. } => Ok(()),
        SendOutcome::Degraded { reason } => {
            Err(anyhow::anyhow!("chat request failed: {}", reason))
        }
    }
}

/// Upload a PDF and report the receipt
pub async fn run_ingest(config: Config, path: &Path) -> Result<()> {
    let api = create_client(&config.server)?;
    let mut workspace = Workspace::new(api, &config);

    workspace.select_file(path).await?;
    let receipt = workspace.upload_selected().await?;

    println!("{}", render::format_receipt(&receipt).green());
    if !receipt.message.is_empty() {
        println!("{}", receipt.message.dimmed());
    }
    match workspace.manifest().last_error() {
        None => println!("{} documents in the knowledge base", workspace.manifest().len()),
        Some(e) => eprintln!("{}", format!("Could not refresh document list: {}", e).yellow()),
    }
    Ok(())
}

/// List ingested documents
pub async fn run_files(config: Config, json: bool) -> Result<()> {
    let api = create_client(&config.server)?;
    let mut workspace = Workspace::new(api, &config);
    workspace.refresh_manifest().await?;

    if json {
        render::print_documents_json(workspace.manifest().documents())
    } else {
        render::print_documents_table(workspace.manifest().documents());
        Ok(())
    }
}

/// Delete a document, asking for confirmation unless `yes` is set
pub async fn run_delete(config: Config, id: &str, yes: bool) -> Result<()> {
    let api = create_client(&config.server)?;
    let mut workspace = Workspace::new(api, &config);
    // The listing only supplies the filename for the prompt
    if let Err(e) = workspace.refresh_manifest().await {
        tracing::debug!("Continuing delete without manifest: {}", e);
    }

    let outcome = if yes {
        let mut accept = |_: &str| true;
        workspace.delete(id, &mut accept).await?
    } else {
        let mut ask = stdin_confirm;
        workspace.delete(id, &mut ask).await?
    };

    match outcome {
        DeleteOutcome::Deleted => {
            println!("{}", format!("Deleted {}", id).green());
            Ok(())
        }
        DeleteOutcome::Declined => {
            println!("Cancelled");
            Ok(())
        }
    }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` declines
pub fn stdin_confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(e) => {
            tracing::warn!("Failed to read confirmation: {}", e);
            false
        }
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Surface a validation error the way the chat loop does
pub(crate) fn describe_error(error: &DocubotError) -> String {
    match error {
        DocubotError::Validation(msg) => format!("Invalid input: {}", msg),
        DocubotError::Busy(msg) => format!("Please wait: {}", msg),
        other => other.to_string(),
    }
}
