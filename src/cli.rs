//! Command-line interface definitions using clap derive macros.
//!
//! Every flag has an environment variable equivalent for container
//! deployments. Running the binary without arguments listens on
//! `0.0.0.0:8080`.

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "cors-relay",
    version,
    about = "Single-hop HTTP forwarding proxy that unblocks CORS",
    after_help = "\x1b[1mUsage:\x1b[0m\n  \
        cors-relay                           Listen on 0.0.0.0:8080\n  \
        cors-relay -p 9000 --log-format pretty\n\n  \
        Then: curl 'http://localhost:8080/proxy?url=https://example.com/'"
)]
pub struct Cli {
    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "auto")]
    pub log_format: LogFormatArg,
}

#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// `auto` picks pretty output on a TTY and JSON otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Auto,
    Json,
    Pretty,
}
