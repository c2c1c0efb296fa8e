//! Logging setup on top of `tracing-subscriber`.
//!
//! `RUST_LOG` selects the filter (default `warn`), `LOG_FORMAT` picks `pretty`,
//! `compact` or `json`. The interactive screen owns the terminal, so in that mode
//! logs are appended to a file in the data directory instead of stderr.

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("json") => LogFormat::Json,
            Some("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Where log lines end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
    pub target: LogTarget,
}

impl LoggingConfig {
    pub fn from_env(target: LogTarget) -> Self {
        let filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
        let format = LogFormat::parse(env::var("LOG_FORMAT").ok().as_deref());
        Self { filter, format, target }
    }
}

/// Install the global subscriber. Calling it twice is harmless; the second call is ignored.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to build log filter")?;

    match &config.target {
        LogTarget::Stderr => install(config.format, filter, io::stderr, true),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            install(config.format, filter, Mutex::new(file), false)
        }
    }
    Ok(())
}

fn install<W>(format: LogFormat, filter: EnvFilter, writer: W, ansi: bool)
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = fmt().with_env_filter(filter).with_writer(writer).with_ansi(ansi);
    // try_init fails only if a subscriber is already installed
    let _ = match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
