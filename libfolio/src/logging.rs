//! Logging setup for the Folio binaries
//!
//! Log lines always go to stderr so that command output on stdout stays
//! machine-readable. The format and level come from the `[logging]` table of
//! the config file, can be overridden per invocation with `FOLIO_LOG_FORMAT`
//! and `FOLIO_LOG_LEVEL`, and `RUST_LOG` wins over both when set.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::fmt as subscriber_fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::LoggingSection;

const FORMAT_ENV: &str = "FOLIO_LOG_FORMAT";
const LEVEL_ENV: &str = "FOLIO_LOG_LEVEL";

/// Level used when no `[logging]` table exists, so a plain CLI run only
/// prints warnings and errors
const QUIET_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Text, LogFormat::Json, LogFormat::Pretty]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown log format '{}' (expected text, json or pretty)", s))
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved logging settings for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    /// `--verbose` forces debug output regardless of the configured level
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Settings for a CLI run: the config file's `[logging]` table with
    /// `FOLIO_LOG_FORMAT` / `FOLIO_LOG_LEVEL` applied on top.
    ///
    /// Unparseable formats fall back to text.
    pub fn from_section(section: Option<&LoggingSection>, verbose: bool) -> Self {
        let format = std::env::var(FORMAT_ENV)
            .ok()
            .or_else(|| section.map(|s| s.format.clone()))
            .and_then(|name| name.parse().ok())
            .unwrap_or_default();

        let level = std::env::var(LEVEL_ENV)
            .ok()
            .filter(|level| !level.trim().is_empty())
            .or_else(|| section.map(|s| s.level.clone()))
            .unwrap_or_else(|| QUIET_LEVEL.to_string());

        Self::new(format, level, verbose)
    }

    fn filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        let directive = if self.verbose { "debug" } else { self.level.as_str() };
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(QUIET_LEVEL))
    }

    /// Install the global subscriber. Later calls in the same process keep
    /// the first one.
    pub fn init(&self) {
        let output: Box<dyn Layer<Registry> + Send + Sync> = match self.format {
            LogFormat::Json => subscriber_fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr)
                .boxed(),
            LogFormat::Pretty => subscriber_fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .boxed(),
            LogFormat::Text => subscriber_fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(std::io::stderr)
                .boxed(),
        };

        let installed = tracing_subscriber::registry()
            .with(output)
            .with(self.filter())
            .try_init();

        if installed.is_err() {
            tracing::debug!("Subscriber already installed, keeping it");
        }
    }
}
