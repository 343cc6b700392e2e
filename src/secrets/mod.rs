// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Secrets Materializer
//!
//! The application loads its credentials from Streamlit's `secrets.toml`.
//! In the container those credentials arrive as environment variables, so
//! before the app starts this module turns the environment into that file.
//!
//! ## Flow
//!
//! 1. Read the variables listed in [`env`] into a [`ConfigurationRecord`]
//! 2. Parse `USERNAMES` / `PASSWORDS` as list literals and check they pair up
//! 3. Encode the record with the TOML serializer
//! 4. Atomically replace the file at the configured path
//!
//! Unset variables never fail the step; they are written as empty values.
//! Malformed lists and filesystem failures do, and the launcher then refuses
//! to start the application.

pub mod env;
pub mod error;
pub mod list;
pub mod record;
pub mod writer;

use std::path::{Path, PathBuf};

use tracing::info;

pub use error::{SecretsError, SecretsResult};
pub use record::{ConfigurationRecord, GoogleOAuth, SecretsSummary};
pub use writer::SecretsFile;

/// Progress of a single materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeState {
    Pending,
    Written,
}

/// What a successful materialization produced.
#[derive(Debug, Clone)]
pub struct MaterializeReport {
    pub path: PathBuf,
    pub bytes_written: u64,
    pub summary: SecretsSummary,
}

/// Writes the Configuration Record to its file, once.
#[derive(Debug)]
pub struct Materializer {
    file: SecretsFile,
    state: MaterializeState,
}

impl Materializer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: SecretsFile::new(path),
            state: MaterializeState::Pending,
        }
    }

    pub fn state(&self) -> MaterializeState {
        self.state
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Materialize from the process environment.
    pub fn materialize(&mut self) -> SecretsResult<MaterializeReport> {
        let record = ConfigurationRecord::from_env()?;
        self.write(&record)
    }

    /// Materialize from an arbitrary variable lookup.
    pub fn materialize_from<F>(&mut self, lookup: F) -> SecretsResult<MaterializeReport>
    where
        F: Fn(&str) -> Option<String>,
    {
        let record = ConfigurationRecord::from_lookup(lookup)?;
        self.write(&record)
    }

    /// Write an already built record.
    ///
    /// The state only advances once the file is in place; on error it stays
    /// `Pending`.
    pub fn write(&mut self, record: &ConfigurationRecord) -> SecretsResult<MaterializeReport> {
        let bytes_written = self.file.write(record)?;
        self.state = MaterializeState::Written;

        let summary = record.summary();
        info!(
            path = %self.file.path().display(),
            bytes = bytes_written,
            environment = %summary.environment,
            configured = summary.configured.len(),
            credential_pairs = summary.credential_pairs,
            "Secrets file written"
        );

        Ok(MaterializeReport {
            path: self.file.path().to_path_buf(),
            bytes_written,
            summary,
        })
    }
}
