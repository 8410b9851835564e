//! Interactive chat with a remote responder.
//!
//! Every message is sent together with the whole conversation so far; the
//! reply is appended and printed.
//!
//! # Usage
//!
//! ```bash
//! # Chat with the built-in endpoint
//! relaychat
//!
//! # Point at a different responder
//! relaychat --endpoint http://localhost:8787/
//!
//! # Log requests, responses, and failures to stderr
//! relaychat --verbose --no-color
//! ```
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/clear` - Start a new conversation
//! - `/stats` - Show session statistics
//! - `/config` - Show current configuration
//! - `/quit` - Exit the application

use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use relaychat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, Entry, PlainTextSurface, Surface, help_text,
    parse_command,
};
use relaychat::{ClientLogger, Relay, Responder, StderrLogger};

/// Main entry point for the relaychat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("relaychat [OPTIONS]");
    let config = ChatConfig::from(args);

    let mut relay = Relay::with_options(&config.endpoint, config.timeout)?;
    let surface = PlainTextSurface::with_color(config.use_color).with_echo_user(false);
    let logger: Option<Arc<dyn ClientLogger>> = if config.verbose {
        Some(Arc::new(StderrLogger))
    } else {
        None
    };
    if let Some(logger) = &logger {
        relay = relay.with_logger(Arc::clone(logger));
    }
    let mut session = ChatSession::new(relay, surface, config);
    if let Some(logger) = logger {
        session = session.with_logger(logger);
    }

    let mut rl = DefaultEditor::new()?;

    println!("relaychat ({})", session.endpoint());
    println!("Type /help for commands, /quit to exit\n");
    session.greet();

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => match session.reset() {
                            Ok(()) => session
                                .surface()
                                .append(Entry::notice("Started a new conversation.")),
                            Err(err) => session.surface().append(Entry::error(err.to_string())),
                        },
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            session.surface().append(Entry::error(message));
                        }
                    }
                    continue;
                }

                // failures are already rendered by the session
                let _ = session.submit(line).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                session
                    .surface()
                    .append(Entry::error(format!("Input error: {}", err)));
                break;
            }
        }
    }

    Ok(())
}

fn print_stats<R: Responder, S: Surface>(session: &ChatSession<R, S>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Submissions: {} ({} replied, {} failed, {} rejected)",
        stats.submissions, stats.successes, stats.failures, stats.rejected
    );
    println!(
        "      Failures: {} transport / {} responder / {} format",
        stats.transport_errors, stats.responder_errors, stats.format_errors
    );
    println!(
        "      Total tokens: {} in / {} out",
        stats.total_usage.prompt_tokens, stats.total_usage.completion_tokens
    );
    if let Some(usage) = stats.last_turn_usage {
        println!(
            "      Last turn tokens: {} in / {} out",
            usage.prompt_tokens, usage.completion_tokens
        );
    }
}

fn print_config<R: Responder, S: Surface>(session: &ChatSession<R, S>) {
    let config = session.config();
    println!("    Current Configuration:");
    println!("      Endpoint: {}", config.endpoint);
    match config.timeout {
        Some(timeout) => println!("      Timeout: {}s", timeout.as_secs()),
        None => println!("      Timeout: (none)"),
    }
    println!(
        "      Color: {}",
        if config.use_color { "on" } else { "off" }
    );
    println!(
        "      Diagnostics: {}",
        if config.verbose { "stderr" } else { "off" }
    );
    println!("      System prompt: {}", preview(session.system_prompt(), 72));
}

fn preview(text: &str, limit: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > limit || text.lines().nth(1).is_some() {
        let truncated: String = first_line.chars().take(limit).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}
