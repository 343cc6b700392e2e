// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines the environment variable names and default values
//! that control the entrypoint itself. The secrets that get materialized are
//! described separately in [`crate::secrets::env`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SECRETS_PATH` | Where `secrets.toml` is written | `/app/.streamlit/secrets.toml` |
//! | `HOST` | Application bind address | `0.0.0.0` |
//! | `PORT` | Application port (also probed by `healthcheck`) | `8501` |
//! | `APP_ENTRYPOINT` | Streamlit script to run | `app_ui.py` |
//! | `HEALTH_PATH` | Liveness endpoint path | `/_stcore/health` |
//! | `HEALTH_TIMEOUT_SECS` | Probe timeout in seconds | `5` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable name for the secrets file destination.
pub const SECRETS_PATH_ENV: &str = "SECRETS_PATH";

/// Environment variable name for the application bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the application port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the Streamlit script.
pub const APP_ENTRYPOINT_ENV: &str = "APP_ENTRYPOINT";

/// Environment variable name for the liveness endpoint path.
pub const HEALTH_PATH_ENV: &str = "HEALTH_PATH";

/// Environment variable name for the probe timeout.
pub const HEALTH_TIMEOUT_ENV: &str = "HEALTH_TIMEOUT_SECS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Streamlit reads secrets from `.streamlit/secrets.toml` under its working
/// directory; the container runs from `/app`.
pub const DEFAULT_SECRETS_PATH: &str = "/app/.streamlit/secrets.toml";

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8501;

pub const DEFAULT_APP_ENTRYPOINT: &str = "app_ui.py";

/// Streamlit's built-in liveness endpoint.
pub const DEFAULT_HEALTH_PATH: &str = "/_stcore/health";

pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while reading runtime settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("HEALTH_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
}

/// Settings for the entrypoint process, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub secrets_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub app_entrypoint: String,
    pub health_path: String,
    pub health_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            secrets_path: PathBuf::from(DEFAULT_SECRETS_PATH),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            app_entrypoint: DEFAULT_APP_ENTRYPOINT.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

impl RuntimeConfig {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let health_timeout = match get(HEALTH_TIMEOUT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            None => defaults.health_timeout,
        };

        // Exactly one leading slash; `//host/x` would join as another host.
        let health_path = get(HEALTH_PATH_ENV)
            .map(|p| format!("/{}", p.trim().trim_start_matches('/')))
            .unwrap_or(defaults.health_path);

        Ok(Self {
            secrets_path: get(SECRETS_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.secrets_path),
            host: get(HOST_ENV).unwrap_or(defaults.host),
            port,
            app_entrypoint: get(APP_ENTRYPOINT_ENV).unwrap_or(defaults.app_entrypoint),
            health_path,
            health_timeout,
        })
    }
}
