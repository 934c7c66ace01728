//! Terminal rendering for messages, receipts, and the document manifest

use crate::client::{Document, IngestReceipt};
use crate::error::{DocubotError, Result};
use crate::session::{Message, Role};
use colored::Colorize;
use prettytable::{row, Table};

/// Format an assistant or user message for the terminal
///
/// Sources are listed on a separate line after the text.
pub fn format_message(message: &Message) -> String {
    let mut out = match message.role() {
        Role::User => format!("{} {}", "you>".cyan().bold(), message.text()),
        Role::Assistant => message.text().to_string(),
    };

    if !message.sources().is_empty() {
        out.push_str(&format!(
            "\n\n{} {}",
            "Sources:".dimmed(),
            message.sources().join(", ")
        ));
    }
    out
}

/// One-line summary of a successful ingest
pub fn format_receipt(receipt: &IngestReceipt) -> String {
    let mut out = format!("Ingested {}", receipt.filename);
    if let Some(chunks) = receipt.chunks_count {
        out.push_str(&format!(" ({} chunks)", chunks));
    }
    if let Some(id) = &receipt.id {
        out.push_str(&format!(" [id: {}]", id));
    }
    out
}

/// Print the manifest as a table
pub fn print_documents_table(documents: &[Document]) {
    if documents.is_empty() {
        println!("\nNo documents ingested yet. Use '/upload <file.pdf>' or 'docubot ingest'.\n");
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["ID", "Filename"]);
    for doc in documents {
        table.add_row(row![doc.id, doc.filename]);
    }

    println!("\nIngested documents ({}):\n", documents.len());
    table.printstd();
    println!();
}

/// Print the manifest as pretty JSON
///
/// # Errors
///
/// Returns `DocubotError::Serialization` if serialization fails
pub fn print_documents_json(documents: &[Document]) -> Result<()> {
    let json = serde_json::to_string_pretty(documents).map_err(DocubotError::Serialization)?;
    println!("{}", json);
    Ok(())
}
