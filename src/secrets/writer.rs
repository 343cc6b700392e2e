// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reading and writing the secrets file on disk.
//!
//! Writes go to a sibling temp file which is then renamed over the target,
//! so the application never observes a half-written file and nothing from a
//! previous run survives.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::error::{SecretsError, SecretsResult};
use super::record::{ConfigurationRecord, SecretsSummary};

/// A secrets file at a fixed location.
#[derive(Debug, Clone)]
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("toml.tmp")
    }

    /// Encode `record` and replace the file with it.
    ///
    /// Creates the parent directory if needed. On Unix the file is created
    /// readable by the owner only. Returns the number of bytes written.
    pub fn write(&self, record: &ConfigurationRecord) -> SecretsResult<u64> {
        let contents = record.to_toml()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SecretsError::io(parent, e))?;
        }

        // A leftover temp file would keep its old permissions.
        let temp_path = self.temp_path();
        match fs::remove_file(&temp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(SecretsError::io(&temp_path, e)),
        }

        let result = write_new(&temp_path, contents.as_bytes()).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|e| SecretsError::io(&self.path, e))
        });

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result?;

        Ok(contents.len() as u64)
    }

    /// Read the file back, the way the application will.
    pub fn load(&self) -> SecretsResult<ConfigurationRecord> {
        let text = fs::read_to_string(&self.path).map_err(|e| SecretsError::io(&self.path, e))?;
        toml::from_str(&text).map_err(|e| SecretsError::Decode {
            path: self.path.clone(),
            message: e.message().to_string(),
        })
    }

    /// Load the file and confirm the application can start from it.
    ///
    /// Fails when the `[google_oauth]` endpoints are missing or differ from
    /// the fixed Google values, since the login flow reads them directly.
    pub fn check(&self) -> SecretsResult<SecretsSummary> {
        let summary = self.load()?.summary();
        if !summary.fixed_oauth_endpoints {
            return Err(SecretsError::OAuthEndpoints {
                path: self.path.clone(),
            });
        }
        Ok(summary)
    }

    pub fn exists(&self) -> bool {
        File::open(&self.path).is_ok()
    }
}

fn write_new(path: &Path, data: &[u8]) -> SecretsResult<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path).map_err(|e| SecretsError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| SecretsError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| SecretsError::io(path, e))?;
    Ok(())
}
