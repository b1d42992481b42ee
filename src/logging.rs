//! Structured logging setup using the `tracing` ecosystem.
//!
//! JSON output is meant for production log collectors, pretty output for
//! local runs. `--log-format auto` decides from whether stdout is a
//! terminal.

use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{LogFormatArg, LogLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(arg: LogFormatArg, stdout_is_terminal: bool) -> LogFormat {
    match arg {
        LogFormatArg::Json => LogFormat::Json,
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Auto if stdout_is_terminal => LogFormat::Pretty,
        LogFormatArg::Auto => LogFormat::Json,
    }
}

/// Build the level filter. Connection-pool chatter from `hyper_util` is
/// capped at `info` unless the requested level is stricter.
#[must_use]
pub fn filter(level: &LogLevel) -> Targets {
    let level = level.to_tracing_level();
    Targets::new()
        .with_default(level)
        .with_target("hyper_util", level.min(tracing::Level::INFO))
}

pub fn init(level: &LogLevel, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(level));

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}
