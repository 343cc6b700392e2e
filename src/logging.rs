// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup.
//!
//! Logs always go to stderr: stdout belongs to the `check` command's output
//! and, after launch, to the application itself.

use std::io;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Install the global subscriber.
///
/// Returns the format actually used; an unrecognised `LOG_FORMAT` falls back
/// to pretty output and is reported once the subscriber is live.
pub fn init(raw_format: Option<&str>) -> LogFormat {
    let parsed = raw_format.map(LogFormat::from_str).unwrap_or(Ok(LogFormat::Pretty));
    let format = parsed.clone().unwrap_or_default();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    if installed.is_ok() {
        if let Err(reason) = parsed {
            tracing::warn!(%reason, "Falling back to pretty logs");
        }
    }

    format
}
