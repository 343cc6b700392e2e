// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Parsing for the `USERNAMES` / `PASSWORDS` list literals.
//!
//! Values are parsed as a TOML array, which covers both the JSON style
//! (`["a","b"]`) and the Python style (`['a', 'b']`) that operators tend to
//! paste. The literal is decoded into a wrapper with a single known key, so
//! input that tries to smuggle extra keys or tables into the secrets file
//! is rejected instead of spliced.

use serde::Deserialize;

use super::error::{SecretsError, SecretsResult};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListLiteral {
    value: Vec<String>,
}

/// Parse a credential list variable.
///
/// An unset or blank variable is an empty list.
pub fn parse_list(variable: &'static str, raw: Option<&str>) -> SecretsResult<Vec<String>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };

    if !raw.starts_with('[') {
        return Err(SecretsError::InvalidList {
            variable,
            reason: "expected a list literal such as [\"a\", \"b\"]".to_string(),
        });
    }

    let document = format!("value = {raw}\n");
    toml::from_str::<ListLiteral>(&document)
        .map(|literal| literal.value)
        .map_err(|e| SecretsError::InvalidList {
            variable,
            // The full error renders the offending input, which may hold
            // passwords; keep only the parser's message.
            reason: e.message().to_string(),
        })
}
