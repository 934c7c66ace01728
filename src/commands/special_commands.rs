//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` manage documents and the session instead of being
//! sent to the assistant. The command word is case-insensitive; arguments
//! (paths, document ids) keep their case.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command does not take an argument
    #[error("Command {command} does not take an argument: {arg}")]
    UnexpectedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Select a PDF and upload it
    Upload(PathBuf),

    /// Upload the file kept from a failed attempt again
    RetryUpload,

    /// Drop the selected (or failed) file
    ClearFile,

    /// Show the document manifest
    ListFiles,

    /// Delete a document by id, after confirmation
    Delete(String),

    /// Clear the transcript and start over
    NewConversation,

    /// Show session and upload status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input to the assistant
    None,
}

/// Parse a line of user input
///
/// # Errors
///
/// Returns `CommandError` for unknown commands and for commands missing a
/// required argument or given an unexpected one
///
/// # Examples
///
/// ```
/// use docubot::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/DELETE Doc-7").unwrap(),
///     SpecialCommand::Delete("Doc-7".to_string())
/// );
/// assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(
///     parse_special_command("what is RAG?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/frobnicate").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    let no_arg = |command: SpecialCommand| {
        if arg.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnexpectedArgument {
                command: word.clone(),
                arg: arg.to_string(),
            })
        }
    };

    match word.as_str() {
        "/upload" => {
            if arg.is_empty() {
                Ok(SpecialCommand::RetryUpload)
            } else {
                Ok(SpecialCommand::Upload(PathBuf::from(arg)))
            }
        }
        "/retry" => no_arg(SpecialCommand::RetryUpload),
        "/delete" | "/rm" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/delete".to_string(),
                    usage: "/delete <document-id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Delete(arg.to_string()))
            }
        }
        "/clear" => no_arg(SpecialCommand::ClearFile),
        "/files" | "/ls" => no_arg(SpecialCommand::ListFiles),
        "/new" | "/reset" => no_arg(SpecialCommand::NewConversation),
        "/status" => no_arg(SpecialCommand::ShowStatus),
        "/help" | "/?" => no_arg(SpecialCommand::Help),
        "/exit" | "/quit" => no_arg(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(word.clone())),
    }
}

/// Print help for the interactive session
pub fn print_help() {
    println!(
        r#"
Chat commands:

  /upload <path>   Select a PDF and upload it for ingestion
  /upload, /retry  Retry the last failed upload with the same file
  /clear           Drop the selected or failed file
  /files, /ls      List ingested documents
  /delete <id>     Delete a document (asks for confirmation)
  /new             Start a new conversation
  /status          Show conversation and upload status
  /help            Show this help
  exit, quit       Leave the session

Anything else is sent to the assistant as a question.
"#
    );
}
