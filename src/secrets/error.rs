// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secrets materialization errors.

use std::io;
use std::path::PathBuf;

/// Error type for building, writing, and loading the secrets file.
///
/// Messages never include secret values, only variable names, paths and
/// counts, since they end up in container logs.
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    /// Filesystem failure (permissions, missing mount, disk full)
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The record could not be encoded as TOML
    #[error("failed to encode secrets: {0}")]
    Encode(#[from] toml::ser::Error),

    /// An existing secrets file is not valid for the application
    #[error("failed to parse {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    /// A credential list variable is not a flat list of strings
    #[error("{variable} is not a valid list of strings: {reason}")]
    InvalidList {
        variable: &'static str,
        reason: String,
    },

    /// A loaded file lacks the fixed Google OAuth endpoints
    #[error("{} does not carry the Google OAuth endpoints", .path.display())]
    OAuthEndpoints { path: PathBuf },

    /// Usernames and passwords cannot be paired positionally
    #[error("credential lists differ in length: {usernames} usernames, {passwords} passwords")]
    CredentialCountMismatch { usernames: usize, passwords: usize },
}

impl SecretsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SecretsError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable code, used as a log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            SecretsError::Io { .. } => "io",
            SecretsError::Encode(_) => "encode",
            SecretsError::Decode { .. } => "decode",
            SecretsError::InvalidList { .. } => "invalid_list",
            SecretsError::OAuthEndpoints { .. } => "oauth_endpoints",
            SecretsError::CredentialCountMismatch { .. } => "credential_count_mismatch",
        }
    }
}

/// Result type for secrets operations.
pub type SecretsResult<T> = Result<T, SecretsError>;
