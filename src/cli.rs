//! Command-line interface definition for DocuBot
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chatting with the assistant and managing the
//! documents it answers from.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocuBot - chat with your PDF documents
///
/// Uploads documents to a retrieval-augmented generation service and asks
/// questions answered from them, with source citations.
#[derive(Parser, Debug, Clone)]
#[command(name = "docubot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the service base URL (e.g. http://localhost:8000)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for DocuBot
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        query: String,
    },

    /// Upload a PDF document for ingestion
    Ingest {
        /// Path to the PDF file
        path: PathBuf,
    },

    /// List ingested documents
    Files {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an ingested document
    Delete {
        /// Document identifier (see `docubot files`)
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            base_url: None,
            verbose: false,
            command: Commands::Chat,
        }
    }
}
