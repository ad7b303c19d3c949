//! Logging arguments and tracing subscriber setup.
//!
//! Logs go to stderr so stdout carries only the command's JSON output.

use std::io;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::time::SystemTime};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Full format with all metadata (timestamp, level, target, spans).
    #[default]
    Full,
    /// Compact format with minimal metadata.
    Compact,
    /// JSON format for structured logging and log aggregation systems.
    Json,
}

/// Logging configuration arguments.
#[derive(Debug, Clone, Parser)]
#[command(next_help_heading = "Logging")]
pub(crate) struct LogArgs {
    /// Increase logging verbosity (1=ERROR, 2=WARN, 3=INFO, 4=DEBUG, 5=TRACE).
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        default_value = "2",
        env = "PROVER_HELPER_LOG_LEVEL",
        global = true
    )]
    pub level: u8,

    /// Suppress logging.
    #[arg(long = "quiet", short = 'q', global = true)]
    pub quiet: bool,

    /// Log format.
    #[arg(
        long = "log-format",
        default_value = "full",
        env = "PROVER_HELPER_LOG_FORMAT",
        global = true
    )]
    pub format: LogFormat,
}

impl LogArgs {
    /// The level selected by the verbosity count.
    pub(crate) const fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::OFF;
        }
        match self.level {
            0 => LevelFilter::OFF,
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Installs the global tracing subscriber. `RUST_LOG` overrides the level.
    pub(crate) fn init_tracing(&self) -> eyre::Result<()> {
        let filter = EnvFilter::builder()
            .with_default_directive(self.level_filter().into())
            .from_env_lossy();
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_timer(SystemTime);

        let result = match self.format {
            LogFormat::Full => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        result.map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))
    }
}
