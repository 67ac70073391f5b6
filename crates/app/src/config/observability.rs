//! Logging Config
//!
//! Logs always go to stderr; stdout belongs to the shell.

use clap::Args;

/// How log lines are rendered on stderr.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// One short line per event, for an operator watching the terminal.
    Compact,

    /// One JSON object per event, for redirecting stderr to a collector.
    Json,
}

/// Storefront logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log filter for stderr, a level or `EnvFilter` directives
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Stderr log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
