/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`: Interactive chat session with document management commands
- `documents`: One-shot `ask`, `ingest`, `files`, and `delete`

The handlers only render and collect input; all state lives in the
library's `Workspace`.
*/

use crate::client::create_client;
use crate::commands::documents::describe_error;
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::session::SendOutcome;
use crate::upload::UploadState;
use crate::workspace::Workspace;

// One-shot document and question commands
pub mod documents;

// Terminal rendering helpers
pub mod render;

// Slash-command parser for the chat loop
pub mod special_commands;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Opens a `Workspace` against the configured service and runs a
    //! readline loop: slash commands manage documents and the session,
    //! everything else is sent to the assistant.

    use super::*;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let api = create_client(&config.server)?;
        let mut workspace = Workspace::new(api, &config);

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(config.server.api_root().as_str());
        let count = workspace.open().await;
        match workspace.manifest().last_error() {
            None => println!("{} documents in the knowledge base\n", count),
            Some(e) => println!(
                "{}\n",
                format!("Could not load the document list: {}", e).yellow()
            ),
        }

        loop {
            let prompt = format_prompt(workspace.uploads().state());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Upload(path) => {
                            handle_upload(&mut workspace, &path).await;
                        }
                        SpecialCommand::RetryUpload => {
                            if let Some(name) = workspace.uploads().selected_filename() {
                                println!("{}", format!("Retrying {}...", name).cyan());
                            }
                            let result = workspace.retry_upload().await;
                            report_upload(&workspace, result);
                        }
                        SpecialCommand::ClearFile => match workspace.clear_file() {
                            Ok(()) => println!("Cleared selected file\n"),
                            Err(e) => eprintln!("{}\n", describe_error(&e).red()),
                        },
                        SpecialCommand::ListFiles => {
                            if let Err(e) = workspace.refresh_manifest().await {
                                eprintln!(
                                    "{}",
                                    format!("Showing cached list; refresh failed: {}", e)
                                        .yellow()
                                );
                            }
                            super::render::print_documents_table(
                                workspace.manifest().documents(),
                            );
                        }
                        SpecialCommand::Delete(id) => {
                            handle_delete(&mut workspace, &mut rl, &id).await;
                        }
                        SpecialCommand::NewConversation => match workspace.new_conversation() {
                            Ok(()) => println!("Started a new conversation\n"),
                            Err(e) => eprintln!("{}\n", describe_error(&e).red()),
                        },
                        SpecialCommand::ShowStatus => print_status_display(&workspace),
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            handle_question(&mut workspace, trimmed).await;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_question(workspace: &mut Workspace, question: &str) {
        println!("{}", "AI is thinking...".dimmed().italic());
        match workspace.ask(question).await {
            Ok(outcome) => {
                if let Some(reply) = workspace.session().last_reply() {
                    let text = super::render::format_message(reply);
                    match outcome {
                        SendOutcome::Answered { topic_changed } => {
                            if topic_changed {
                                if let Some(topic) = workspace.session().topic() {
                                    println!("{}", format!("New topic: {}", topic).magenta());
                                }
                            }
                            println!("\n{}\n", text);
                        }
                        SendOutcome::Degraded { .. } => println!("\n{}\n", text.yellow()),
                    }
                }
            }
            Err(e) => eprintln!("{}\n", describe_error(&e).red()),
        }
    }

    async fn handle_upload(workspace: &mut Workspace, path: &std::path::Path) {
        if let Err(e) = workspace.select_file(path).await {
            eprintln!("{}\n", describe_error(&e).red());
            return;
        }

        println!("{}", format!("Uploading {}...", path.display()).cyan());
        let result = workspace.upload_selected().await;
        report_upload(workspace, result);
    }

    fn report_upload(
        workspace: &Workspace,
        result: crate::error::ClientResult<crate::client::IngestReceipt>,
    ) {
        match result {
            Ok(receipt) => {
                println!("{}", super::render::format_receipt(&receipt).green());
                println!(
                    "{} documents in the knowledge base\n",
                    workspace.manifest().len()
                );
            }
            Err(e) => {
                eprintln!("{}", describe_error(&e).red());
                if workspace.uploads().state() == UploadState::Error {
                    eprintln!(
                        "Run '/upload' to retry with the same file, or '/clear' to give up\n"
                    );
                }
            }
        }
    }

    async fn handle_delete(workspace: &mut Workspace, rl: &mut DefaultEditor, id: &str) {
        let mut confirm = |prompt: &str| match rl.readline(&format!("{} [y/N] ", prompt)) {
            Ok(answer) => super::documents::is_yes(&answer),
            Err(_) => false,
        };

        match workspace.delete(id, &mut confirm).await {
            Ok(crate::manifest::DeleteOutcome::Deleted) => {
                println!("{}\n", format!("Deleted {}", id).green());
            }
            Ok(crate::manifest::DeleteOutcome::Declined) => println!("Cancelled\n"),
            Err(e) => eprintln!("{}\n", describe_error(&e).red()),
        }
    }

    /// Prompt reflecting the upload flow state
    pub(crate) fn format_prompt(state: UploadState) -> String {
        match state {
            UploadState::Idle => "docubot> ".to_string(),
            other => format!("[upload: {}] docubot> ", other),
        }
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(api_root: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              DocuBot Interactive Chat - Welcome!             ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Service: {}", api_root.cyan());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display detailed status information about the current session
    fn print_status_display(workspace: &Workspace) {
        let session = workspace.session();
        let uploads = workspace.uploads();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    DocuBot Session Status                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Conversation Size: {} messages", session.len());
        println!("Topic:             {}", session.topic().unwrap_or("none"));
        println!("Documents:         {}", workspace.manifest().len());
        println!("Upload State:      {}", uploads.state());
        if let Some(name) = uploads.selected_filename() {
            println!("Selected File:     {}", name);
        }
        if let Some(error) = uploads.last_error() {
            println!("Last Upload Error: {}", error.red());
        }
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_prompt_idle() {
            assert_eq!(format_prompt(UploadState::Idle), "docubot> ");
        }

        #[test]
        fn test_prompt_shows_upload_state() {
            assert_eq!(
                format_prompt(UploadState::Success),
                "[upload: success] docubot> "
            );
            assert_eq!(
                format_prompt(UploadState::Error),
                "[upload: error] docubot> "
            );
        }

        /// Unreachable service should still let the workspace open
        #[tokio::test]
        async fn test_workspace_opens_against_unreachable_service() {
            let mut config = Config::default();
            config.server.base_url = "http://127.0.0.1:9".to_string();
            let api = create_client(&config.server).unwrap();
            let mut workspace = Workspace::new(api, &config);
            assert_eq!(workspace.open().await, 0);
            assert!(workspace.manifest().last_error().is_some());
        }

        #[test]
        fn test_print_welcome_banner() {
            // Smoke test - verifies function executes without panic
            print_welcome_banner("http://localhost:8000/api/v1/rag");
        }
    }
}
