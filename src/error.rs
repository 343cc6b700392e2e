// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use crate::config::ConfigError;
use crate::health::HealthError;
use crate::launch::LaunchError;
use crate::secrets::SecretsError;

/// Exit code for any failure of the entrypoint's own steps.
pub const EXIT_FAILURE: u8 = 1;

/// Top-level error returned by the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum EntrypointError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Secrets(#[from] SecretsError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Health(#[from] HealthError),

    #[error("application is unhealthy: HTTP {0}")]
    Unhealthy(u16),

    #[error("failed to set up signal handling: {0}")]
    Signals(#[source] std::io::Error),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl EntrypointError {
    /// Short machine-readable code, used as a log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            EntrypointError::Config(_) => "config",
            EntrypointError::Secrets(e) => e.error_code(),
            EntrypointError::Launch(LaunchError::Secrets(e)) => e.error_code(),
            EntrypointError::Launch(_) => "launch",
            EntrypointError::Health(_) => "health_probe",
            EntrypointError::Unhealthy(_) => "unhealthy",
            EntrypointError::Signals(_) => "signals",
            EntrypointError::Output(_) => "output",
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(EXIT_FAILURE)
    }
}

/// Convert an application exit code into the entrypoint's own.
///
/// Codes outside `0..=255` cannot be reported faithfully and become
/// [`EXIT_FAILURE`].
pub fn exit_code_from(code: i32) -> ExitCode {
    ExitCode::from(exit_byte(code))
}

fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(EXIT_FAILURE)
}
