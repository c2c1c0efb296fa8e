use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::config::AppConfig;
use crate::dispatch::{Engine, Mode};
use crate::history::{FileHistoryStore, HistoryLog};
use crate::logging::{self, LogTarget, LoggingConfig};
use crate::models::{ProviderId, ProviderMap, ResponseSlot};
use crate::tui;
use crate::utils::{format_full, preview};

#[derive(Parser)]
#[command(name = "ai-compare")]
#[command(version)]
#[command(about = "Ask Claude, ChatGPT, Grok and Perplexity the same question side by side", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive comparison screen
    Tui {
        #[arg(long, value_enum, default_value_t = Mode::Grid)]
        mode: Mode,
    },
    /// Ask all four providers once and print the answers as they arrive
    Ask {
        #[arg(long, value_enum, default_value_t = Mode::Grid)]
        mode: Mode,
        /// The question; multiple words are joined with spaces
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Inspect or clear the stored history log
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Show statistics about the history log
    Stats,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List entries, newest first
    List {
        #[arg(long, short, default_value_t = 20)]
        limit: usize,
    },
    /// Show the four stored responses of one entry
    Show { id: u64 },
    /// Remove the whole history log
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let target = match &cli.command {
        Some(Commands::Tui { .. }) => LogTarget::File(config.log_path()),
        _ => LogTarget::Stderr,
    };
    logging::init(&LoggingConfig::from_env(target))?;

    match cli.command {
        Some(Commands::Tui { mode }) => run_tui(&config, mode),
        Some(Commands::Ask { mode, question }) => run_ask(&config, mode, &question.join(" ")),
        Some(Commands::History { action }) => match action {
            HistoryCommand::List { limit } => list_history(&config, limit),
            HistoryCommand::Show { id } => show_entry(&config, id),
            HistoryCommand::Clear { yes } => clear_history(&config, yes),
        },
        Some(Commands::Stats) => show_stats(&config),
        None => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to start async runtime")
}

fn open_log(config: &AppConfig) -> HistoryLog {
    HistoryLog::open(Box::new(FileHistoryStore::new(config.history_path())))
}

fn run_tui(config: &AppConfig, mode: Mode) -> Result<()> {
    let rt = runtime()?;
    let engine = Engine::from_config(config, mode, rt.handle().clone())?;
    tui::run_interactive(engine)
}

fn run_ask(config: &AppConfig, mode: Mode, question: &str) -> Result<()> {
    let rt = runtime()?;
    let mut engine = Engine::from_config(config, mode, rt.handle().clone())?;

    let Some(id) = engine.submit(question) else {
        eprintln!("Nothing to ask: the question is empty");
        return Ok(());
    };

    let mut answered = 0;
    rt.block_on(async {
        while let Some(completion) = engine.next_completion().await {
            if completion.result.is_ok() {
                answered += 1;
            }
            println!("── {} ──", completion.provider);
            println!("{}", completion.display_text());
            println!();
        }
    });

    println!("{}/{} providers answered", answered, ProviderId::ALL.len());
    if mode.config().history.persist_log {
        println!("Saved as history entry {}", id);
    }
    Ok(())
}

fn list_history(config: &AppConfig, limit: usize) -> Result<()> {
    let log = open_log(config);
    if log.is_empty() {
        println!("No history yet");
        return Ok(());
    }

    for entry in log.entries().iter().take(limit) {
        println!(
            "{}  {}  [{}/4]  {}",
            entry.id,
            format_full(&entry.created_at),
            entry.answered_count(),
            preview(&entry.query, 60)
        );
    }
    if log.len() > limit {
        println!("... {} more (use --limit to show more)", log.len() - limit);
    }
    Ok(())
}

fn show_entry(config: &AppConfig, id: u64) -> Result<()> {
    let log = open_log(config);
    let entry = log.get(id).with_context(|| format!("No history entry with id {}", id))?;

    println!("Query:   {}", entry.query);
    println!("Created: {}", format_full(&entry.created_at));
    for provider in ProviderId::ALL {
        println!();
        println!("── {} ──", provider);
        match entry.response(provider) {
            "" => println!("(no response)"),
            text => println!("{}", text),
        }
    }
    Ok(())
}

fn clear_history(config: &AppConfig, yes: bool) -> Result<()> {
    if !yes {
        print!("Are you sure you want to clear all history? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).context("Failed to read confirmation")?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Cancelled");
            return Ok(());
        }
    }

    open_log(config).clear().context("Failed to clear history")?;
    println!("History cleared");
    Ok(())
}

/// Answered / errored / unanswered counts for one provider
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ResponseCounts {
    answered: usize,
    errors: usize,
    unanswered: usize,
}

fn count_responses(log: &HistoryLog) -> ProviderMap<ResponseCounts> {
    let mut counts = ProviderMap::<ResponseCounts>::default();
    for entry in log.entries() {
        for (provider, count) in counts.iter_mut() {
            match ResponseSlot::from_stored(entry.response(provider)) {
                ResponseSlot::Empty => count.unanswered += 1,
                ResponseSlot::Error(_) => count.errors += 1,
                _ => count.answered += 1,
            }
        }
    }
    counts
}

fn show_stats(config: &AppConfig) -> Result<()> {
    let log = open_log(config);
    let counts = count_responses(&log);

    println!("AI Compare History Statistics");
    println!("=============================");
    println!("Total entries: {}", log.len());
    for (provider, count) in counts.iter() {
        println!(
            "  {}: {} answered, {} errors, {} unanswered",
            provider, count.answered, count.errors, count.unanswered
        );
    }
    println!();

    let configured: Vec<&str> = ProviderId::ALL
        .into_iter()
        .filter(|p| config.keys.is_set(*p))
        .map(ProviderId::display_name)
        .collect();
    if configured.is_empty() {
        println!("API keys: none configured");
    } else {
        println!("API keys: {}", configured.join(", "));
    }
    println!("History file: {}", config.history_path().display());

    if let Some(oldest) = log.entries().last() {
        println!("Oldest entry: {}", format_full(&oldest.created_at));
    }
    if let Some(newest) = log.entries().first() {
        println!("Newest entry: {}", format_full(&newest.created_at));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use clap::CommandFactory;

    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::models::HistoryEntry;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["ai-compare", "ask", "--mode", "privacy", "What", "is", "2+2?"])
            .unwrap();
        match cli.command {
            Some(Commands::Ask { mode, question }) => {
                assert_eq!(mode, Mode::Privacy);
                assert_eq!(question.join(" "), "What is 2+2?");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_tui_default_mode() {
        let cli = Cli::try_parse_from(["ai-compare", "tui"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Tui { mode: Mode::Grid })));
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["ai-compare", "tui", "--mode", "sideways"]).is_err());
    }

    #[test]
    fn test_count_responses() {
        let mut log = HistoryLog::open(Box::new(MemoryHistoryStore::new()));
        let mut entry = HistoryEntry::new(1, "q", Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        entry.set_response(ProviderId::Claude, "4");
        entry.set_response(ProviderId::Grok, "Error: invalid_api_key");
        log.prepend(entry);

        let counts = count_responses(&log);
        assert_eq!(counts[ProviderId::Claude], ResponseCounts { answered: 1, errors: 0, unanswered: 0 });
        assert_eq!(counts[ProviderId::Grok], ResponseCounts { answered: 0, errors: 1, unanswered: 0 });
        assert_eq!(counts[ProviderId::ChatGpt].unanswered, 1);
    }
}
