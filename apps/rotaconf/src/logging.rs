//! Structured logging on stderr.
//!
//! stdout is reserved for command payloads (reports, rendered configs), so
//! every log line goes to stderr, either human-readable or as JSON lines.
//! `ROTACONF_LOG` (or `RUST_LOG`) overrides the level filter.

use std::io::IsTerminal;
use std::str::FromStr;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

fn build_filter(level: &str) -> EnvFilter {
    if let Ok(v) = std::env::var("ROTACONF_LOG") {
        if let Ok(f) = EnvFilter::try_new(v) {
            return f;
        }
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rotaconf={}", level)))
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = build_filter(level);
    match format {
        LogFormat::Human => {
            let _ = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .without_time()
                .try_init();
        }
        LogFormat::Jsonl => {
            let _ = fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .try_init();
        }
    }
}
