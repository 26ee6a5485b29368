//! # D-Lite Nexus Demo Driver
//!
//! ## Purpose
//! Line-oriented driver for the workspace engine. Parses arguments, loads
//! configuration, initializes logging, then runs a small REPL over one
//! session: chat messages, web searches, and the upload → analysis flow,
//! all against the simulated pipelines.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Create the workspace session
//! 4. Dispatch REPL commands until quit

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dlite_nexus::{
    analysis,
    config::Config,
    errors::{NexusError, Result},
    session::NexusSession,
    AnalysisRecord,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("dlite-nexus")
        .version("0.1.0")
        .author("D-Lite Team")
        .about("Simulated AI workspace: chat, file analysis, and web search on mock pipelines")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level override (trace, debug, info, warn, error)"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = Config::from_file(config_path.unwrap_or("config.toml"))?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    init_logging(&config)?;
    info!("Starting D-Lite Nexus v0.1.0");

    let session = NexusSession::new(Arc::new(config));
    run_repl(&session).await?;

    info!("Session ended");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.logging.level).map_err(|_| {
        NexusError::Config {
            message: format!("Invalid log level: {}", config.logging.level),
        }
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json_format {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

/// Dispatch REPL commands until EOF or quit
async fn run_repl(session: &NexusSession) -> Result<()> {
    println!("D-Lite Nexus: chat | search <query> | upload <name>... | analyze | help");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut last_records: Vec<AnalysisRecord> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let outcome = match command {
            "" => Ok(()),
            "quit" | "exit" => break,
            "help" => {
                print_help();
                Ok(())
            }
            "chat" => do_chat(session, rest).await,
            "search" => do_search(session, rest).await,
            "upload" => do_upload(session, rest).await,
            "files" => do_files(session).await,
            "remove" => do_remove(session, rest).await,
            "analyze" => match do_analyze(session).await {
                Ok(records) => {
                    last_records = records;
                    Ok(())
                }
                Err(err) => Err(err),
            },
            "export" => do_export(&last_records),
            "models" => do_models(session).await,
            "model" => session.chat.set_model(rest).await,
            "copy" => session.copy_search_summary().await,
            "clear" => {
                session.chat.clear().await;
                Ok(())
            }
            other => {
                println!("Unknown command: {other} (try 'help')");
                Ok(())
            }
        };

        if let Err(err) = outcome {
            if err.is_user_rejection() {
                println!("! {err}");
            } else {
                return Err(err);
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  chat <message>     send a chat message");
    println!("  search <query>     run a simulated web search");
    println!("  upload <name>...   stage files for analysis");
    println!("  files              list staged files");
    println!("  remove <index>     remove a staged file");
    println!("  analyze            upload and analyze the staged files");
    println!("  export             print the last analysis as JSON");
    println!("  models             list selectable models");
    println!("  model <id>         select the active model");
    println!("  copy               copy the AI search response");
    println!("  clear              reset the chat transcript");
    println!("  quit               exit");
}

async fn do_chat(session: &NexusSession, message: &str) -> Result<()> {
    let handle = session.chat.send(message).await?;
    let model = session.chat.active_model().await;
    println!("[{model}] ...");
    handle.await.map_err(|e| NexusError::Internal {
        message: format!("reply task failed: {e}"),
    })?;

    if let Some(reply) = session.chat.transcript().await.last() {
        println!("D-Lite: {}", reply.content);
    }
    Ok(())
}

async fn do_search(session: &NexusSession, query: &str) -> Result<()> {
    println!("Searching the web...");
    let handle = session.search.search(query).await?;
    handle.await.map_err(|e| NexusError::Internal {
        message: format!("search task failed: {e}"),
    })?;

    let state = session.search.snapshot().await;
    for result in state.results.unwrap_or_default() {
        println!("- {} ({})", result.title, result.url);
        println!("  {}", result.snippet);
    }
    if let Some(summary) = state.summary {
        println!("\nAI-Enhanced Response:\n{summary}");
    }
    Ok(())
}

async fn do_upload(session: &NexusSession, names: &str) -> Result<()> {
    if names.is_empty() {
        return Err(NexusError::EmptyInput {
            field: "upload".to_string(),
        });
    }
    let candidates: Vec<_> = names
        .split_whitespace()
        .map(|name| dlite_nexus::FileDescriptor::new(name, 1024))
        .collect();

    let outcome = session.stage_files(&candidates).await;
    println!(
        "Staged {} file(s), rejected {}",
        outcome.accepted.len(),
        outcome.rejected
    );
    Ok(())
}

async fn do_files(session: &NexusSession) -> Result<()> {
    let files = session.stager.files().await;
    if files.is_empty() {
        println!("No files selected");
    }
    for (index, file) in files.iter().enumerate() {
        println!("  [{index}] {} ({} KB)", file.name, file.size_bytes / 1024);
    }
    Ok(())
}

async fn do_remove(session: &NexusSession, index: &str) -> Result<()> {
    let index: usize = index.parse().map_err(|_| NexusError::EmptyInput {
        field: "remove index".to_string(),
    })?;
    match session.stager.remove(index).await {
        Some(file) => println!("Removed {}", file.name),
        None => println!("No staged file at index {index}"),
    }
    Ok(())
}

async fn do_analyze(session: &NexusSession) -> Result<Vec<AnalysisRecord>> {
    if session.stager.is_empty().await {
        println!("No files selected");
        return Ok(Vec::new());
    }

    let mut updates = session.progress.subscribe();
    let progress_printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let percent = *updates.borrow();
            print!("\rUploading... {percent}%");
            let _ = std::io::Write::flush(&mut std::io::stdout());
            if percent >= 100 {
                break;
            }
        }
    });

    let records = session.upload_and_analyze().await?;
    progress_printer.abort();
    println!("\nAnalyzing your files...");

    for record in &records {
        println!("\n# {}", record.file.name);
        println!("{}", record.summary);
        for group in &record.entities {
            println!("  {}: {}", group.entity_type, group.names.join(", "));
        }
    }
    Ok(records)
}

fn do_export(records: &[AnalysisRecord]) -> Result<()> {
    if records.is_empty() {
        println!("No analysis results yet. Upload files to get started.");
        return Ok(());
    }
    println!("{}", analysis::export_json(records)?);
    Ok(())
}

async fn do_models(session: &NexusSession) -> Result<()> {
    let active = session.chat.active_model().await;
    for model in session.chat.models() {
        let marker = if model.id == active { "*" } else { " " };
        println!("{marker} {:<16} {} - {}", model.id, model.name, model.description);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_formatter_layers_construct() {
        // Plain and JSON output variants must both be buildable; installing
        // is deferred to init_logging so tests stay subscriber-free
        let _plain = tracing_subscriber::fmt::layer::<tracing_subscriber::Registry>()
            .with_target(true);
        let _json = tracing_subscriber::fmt::layer::<tracing_subscriber::Registry>()
            .with_target(true)
            .json();
    }

    #[test]
    fn test_init_logging_rejects_bad_filter() {
        let mut config = Config::default();
        config.logging.level = "info=notalevel".to_string();
        assert!(matches!(
            init_logging(&config).unwrap_err(),
            NexusError::Config { .. }
        ));
    }
}
