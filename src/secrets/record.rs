// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The Configuration Record written to `secrets.toml`.
//!
//! Field order here is the key order in the generated file. Top-level keys
//! use the names the application reads through `st.secrets`, which is why
//! most of them are upper case.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::env as vars;
use super::error::{SecretsError, SecretsResult};
use super::list::parse_list;

/// Google authorization endpoint.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google token exchange endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google certificate endpoint for the auth provider.
pub const GOOGLE_AUTH_PROVIDER_CERT_URL: &str = "https://www.googleapis.com/oauth2/v1/certs";

/// Redirect target of the OAuth flow; the app is served on port 8501.
pub const GOOGLE_REDIRECT_URI: &str = "http://localhost:8501/";

/// Secrets and settings consumed by the application at startup.
///
/// Decoding fills missing keys with empty values, including the OAuth
/// endpoints, so a loaded file reports exactly what it contains.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationRecord {
    /// Deployment stage label, e.g. `development` or `production`.
    #[serde(rename = "ENVIRONMENT")]
    pub environment: String,
    #[serde(rename = "R2R_API_KEY")]
    pub r2r_api_key: String,
    #[serde(rename = "OPENROUTER_API_KEY")]
    pub openrouter_api_key: String,
    #[serde(rename = "REQUESTY_API_KEY")]
    pub requesty_api_key: String,
    /// Signing key for the app's session tokens.
    #[serde(rename = "TOKEN_KEY")]
    pub token_key: String,
    #[serde(rename = "SUPABASE_URL")]
    pub supabase_url: String,
    #[serde(rename = "SUPABASE_KEY")]
    pub supabase_key: String,
    /// Development login names, paired by index with `passwords`.
    pub usernames: Vec<String>,
    pub passwords: Vec<String>,
    #[serde(default = "GoogleOAuth::empty")]
    pub google_oauth: GoogleOAuth,
}

/// An empty record with the fixed OAuth endpoints in place.
impl Default for ConfigurationRecord {
    fn default() -> Self {
        Self {
            environment: String::new(),
            r2r_api_key: String::new(),
            openrouter_api_key: String::new(),
            requesty_api_key: String::new(),
            token_key: String::new(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            usernames: Vec::new(),
            passwords: Vec::new(),
            google_oauth: GoogleOAuth::new(String::new(), String::new(), String::new()),
        }
    }
}

/// The `[google_oauth]` table.
///
/// Only the client identity comes from the environment. The endpoints and
/// redirect list are fixed when materializing; a decoded table keeps
/// whatever the file had.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default = "GoogleOAuth::empty")]
pub struct GoogleOAuth {
    pub client_id: String,
    pub client_secret: String,
    pub project_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub auth_provider_x509_cert_url: String,
    pub redirect_uris: Vec<String>,
}

impl GoogleOAuth {
    /// Build the table from the client identity, filling in the fixed
    /// Google endpoints.
    pub fn new(client_id: String, client_secret: String, project_id: String) -> Self {
        Self {
            client_id,
            client_secret,
            project_id,
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            auth_provider_x509_cert_url: GOOGLE_AUTH_PROVIDER_CERT_URL.to_string(),
            redirect_uris: vec![GOOGLE_REDIRECT_URI.to_string()],
        }
    }

    /// A table with every value empty, endpoints included.
    pub fn empty() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            project_id: String::new(),
            auth_uri: String::new(),
            token_uri: String::new(),
            auth_provider_x509_cert_url: String::new(),
            redirect_uris: Vec::new(),
        }
    }

    /// Whether the endpoint values match the fixed Google ones.
    pub fn has_fixed_endpoints(&self) -> bool {
        self.auth_uri == GOOGLE_AUTH_URI
            && self.token_uri == GOOGLE_TOKEN_URI
            && self.auth_provider_x509_cert_url == GOOGLE_AUTH_PROVIDER_CERT_URL
            && self.redirect_uris == [GOOGLE_REDIRECT_URI]
    }
}

impl ConfigurationRecord {
    /// Build the record from the process environment.
    pub fn from_env() -> SecretsResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the record through an arbitrary variable lookup.
    ///
    /// Unset scalars become empty strings and unset lists become empty
    /// lists. Only the list variables can fail: they must parse as lists of
    /// strings and, when both are given, have the same length.
    pub fn from_lookup<F>(lookup: F) -> SecretsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&str> = vars::ALL
            .iter()
            .copied()
            .filter(|name| lookup(*name).is_none())
            .collect();
        if !missing.is_empty() {
            warn!(variables = ?missing, "Secrets variables not set, writing empty values");
        }

        let scalar = |name: &str| lookup(name).unwrap_or_default();

        let raw_usernames = lookup(vars::USERNAMES);
        let raw_passwords = lookup(vars::PASSWORDS);
        let usernames = parse_list(vars::USERNAMES, raw_usernames.as_deref())?;
        let passwords = parse_list(vars::PASSWORDS, raw_passwords.as_deref())?;

        // Only two given lists can disagree; a missing one is just empty.
        if usernames.len() != passwords.len() {
            if is_given(raw_usernames.as_deref()) && is_given(raw_passwords.as_deref()) {
                return Err(SecretsError::CredentialCountMismatch {
                    usernames: usernames.len(),
                    passwords: passwords.len(),
                });
            }
            warn!(
                usernames = usernames.len(),
                passwords = passwords.len(),
                "Only one credential list set; no credentials will pair up"
            );
        }

        let record = Self {
            environment: scalar(vars::ENVIRONMENT),
            r2r_api_key: scalar(vars::R2R_API_KEY),
            openrouter_api_key: scalar(vars::OPENROUTER_API_KEY),
            requesty_api_key: scalar(vars::REQUESTY_API_KEY),
            token_key: scalar(vars::TOKEN_KEY),
            supabase_url: scalar(vars::SUPABASE_URL),
            supabase_key: scalar(vars::SUPABASE_KEY),
            usernames,
            passwords,
            google_oauth: GoogleOAuth::new(
                scalar(vars::GOOGLE_OAUTH_CLIENT_ID),
                scalar(vars::GOOGLE_OAUTH_CLIENT_SECRET),
                scalar(vars::GOOGLE_OAUTH_PROJECT_ID),
            ),
        };

        if record.is_production() && !record.usernames.is_empty() {
            warn!(
                count = record.usernames.len(),
                "Password credentials supplied in production; these are meant for development"
            );
        }

        debug!(environment = %record.environment, "Built configuration record");
        Ok(record)
    }

    /// Whether `ENVIRONMENT` names the production stage.
    pub fn is_production(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case(vars::PRODUCTION)
    }

    /// Number of username/password pairs.
    pub fn credential_pairs(&self) -> usize {
        self.usernames.len().min(self.passwords.len())
    }

    /// Encode the record in the `secrets.toml` format.
    pub fn to_toml(&self) -> SecretsResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Report which variables ended up with a value, without exposing any.
    pub fn summary(&self) -> SecretsSummary {
        let fields: [(&'static str, bool); 12] = [
            (vars::ENVIRONMENT, !self.environment.is_empty()),
            (vars::R2R_API_KEY, !self.r2r_api_key.is_empty()),
            (vars::OPENROUTER_API_KEY, !self.openrouter_api_key.is_empty()),
            (vars::REQUESTY_API_KEY, !self.requesty_api_key.is_empty()),
            (vars::TOKEN_KEY, !self.token_key.is_empty()),
            (vars::SUPABASE_URL, !self.supabase_url.is_empty()),
            (vars::SUPABASE_KEY, !self.supabase_key.is_empty()),
            (vars::USERNAMES, !self.usernames.is_empty()),
            (vars::PASSWORDS, !self.passwords.is_empty()),
            (vars::GOOGLE_OAUTH_CLIENT_ID, !self.google_oauth.client_id.is_empty()),
            (
                vars::GOOGLE_OAUTH_CLIENT_SECRET,
                !self.google_oauth.client_secret.is_empty(),
            ),
            (
                vars::GOOGLE_OAUTH_PROJECT_ID,
                !self.google_oauth.project_id.is_empty(),
            ),
        ];

        let (configured, empty): (Vec<_>, Vec<_>) = fields.into_iter().partition(|(_, set)| *set);

        SecretsSummary {
            environment: self.environment.clone(),
            configured: configured.into_iter().map(|(name, _)| name).collect(),
            empty: empty.into_iter().map(|(name, _)| name).collect(),
            credential_pairs: self.credential_pairs(),
            fixed_oauth_endpoints: self.google_oauth.has_fixed_endpoints(),
        }
    }
}

fn is_given(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| !v.trim().is_empty())
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for ConfigurationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationRecord")
            .field("environment", &self.environment)
            .field("r2r_api_key", &redact(&self.r2r_api_key))
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("requesty_api_key", &redact(&self.requesty_api_key))
            .field("token_key", &redact(&self.token_key))
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("usernames", &self.usernames.len())
            .field("passwords", &self.passwords.len())
            .field("google_oauth", &self.google_oauth)
            .finish()
    }
}

impl fmt::Debug for GoogleOAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleOAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("project_id", &self.project_id)
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("auth_provider_x509_cert_url", &self.auth_provider_x509_cert_url)
            .field("redirect_uris", &self.redirect_uris)
            .finish()
    }
}

/// Redacted view of a record, safe to log or print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretsSummary {
    pub environment: String,
    /// Variables that carried a value.
    pub configured: Vec<&'static str>,
    /// Variables written as empty strings or empty lists.
    pub empty: Vec<&'static str>,
    pub credential_pairs: usize,
    pub fixed_oauth_endpoints: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ENVIRONMENT", "development"),
            ("R2R_API_KEY", "r2r-key"),
            ("OPENROUTER_API_KEY", "or-key"),
            ("REQUESTY_API_KEY", "rq-key"),
            ("TOKEN_KEY", "token-key"),
            ("SUPABASE_URL", "https://db.example.supabase.co"),
            ("SUPABASE_KEY", "sb-key"),
            ("USERNAMES", r#"["a","b"]"#),
            ("PASSWORDS", r#"["x","y"]"#),
            ("GOOGLE_OAUTH_CLIENT_ID", "client.apps.googleusercontent.com"),
            ("GOOGLE_OAUTH_CLIENT_SECRET", "g-secret"),
            ("GOOGLE_OAUTH_PROJECT_ID", "lca-project"),
        ]
    }

    #[test]
    fn every_variable_lands_in_its_field() {
        let record = ConfigurationRecord::from_lookup(lookup(&full_env())).unwrap();

        assert_eq!(record.environment, "development");
        assert_eq!(record.r2r_api_key, "r2r-key");
        assert_eq!(record.openrouter_api_key, "or-key");
        assert_eq!(record.requesty_api_key, "rq-key");
        assert_eq!(record.token_key, "token-key");
        assert_eq!(record.supabase_url, "https://db.example.supabase.co");
        assert_eq!(record.supabase_key, "sb-key");
        assert_eq!(record.usernames, vec!["a", "b"]);
        assert_eq!(record.passwords, vec!["x", "y"]);
        assert_eq!(record.google_oauth.client_id, "client.apps.googleusercontent.com");
        assert_eq!(record.google_oauth.client_secret, "g-secret");
        assert_eq!(record.google_oauth.project_id, "lca-project");
        assert!(record.google_oauth.has_fixed_endpoints());
    }

    #[test]
    fn empty_environment_yields_default_record() {
        let record = ConfigurationRecord::from_lookup(lookup(&[])).unwrap();
        assert_eq!(record, ConfigurationRecord::default());
        assert!(record.environment.is_empty());
        assert!(record.usernames.is_empty());
        assert!(record.google_oauth.has_fixed_endpoints());
    }

    #[test]
    fn mismatched_credentials_fail() {
        let err = ConfigurationRecord::from_lookup(lookup(&[
            ("USERNAMES", r#"["a","b"]"#),
            ("PASSWORDS", r#"["x"]"#),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            SecretsError::CredentialCountMismatch {
                usernames: 2,
                passwords: 1
            }
        ));
    }

    #[test]
    fn usernames_without_passwords_are_written_unpaired() {
        let record =
            ConfigurationRecord::from_lookup(lookup(&[("USERNAMES", r#"["a","b"]"#)])).unwrap();
        assert_eq!(record.usernames, vec!["a", "b"]);
        assert!(record.passwords.is_empty());
        assert_eq!(record.credential_pairs(), 0);

        let record = ConfigurationRecord::from_lookup(lookup(&[
            ("USERNAMES", "  "),
            ("PASSWORDS", r#"["x"]"#),
        ]))
        .unwrap();
        assert!(record.usernames.is_empty());
        assert_eq!(record.passwords, vec!["x"]);
    }

    #[test]
    fn malformed_list_fails() {
        let err = ConfigurationRecord::from_lookup(lookup(&[
            ("USERNAMES", "[a, b]"),
            ("PASSWORDS", r#"["x","y"]"#),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            SecretsError::InvalidList {
                variable: "USERNAMES",
                ..
            }
        ));
    }

    #[test]
    fn production_is_detected_case_insensitively() {
        let record =
            ConfigurationRecord::from_lookup(lookup(&[("ENVIRONMENT", "Production")])).unwrap();
        assert!(record.is_production());

        let record =
            ConfigurationRecord::from_lookup(lookup(&[("ENVIRONMENT", "development")])).unwrap();
        assert!(!record.is_production());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let record = ConfigurationRecord::from_lookup(lookup(&full_env())).unwrap();
        let rendered = format!("{record:?}");

        for secret in ["r2r-key", "or-key", "rq-key", "token-key", "sb-key", "g-secret"] {
            assert!(!rendered.contains(secret), "{secret} leaked into Debug");
        }
        assert!(!rendered.contains("\"x\""));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("development"));
    }

    #[test]
    fn summary_lists_configured_and_empty_fields() {
        let record = ConfigurationRecord::from_lookup(lookup(&[
            ("ENVIRONMENT", "production"),
            ("TOKEN_KEY", "t"),
        ]))
        .unwrap();
        let summary = record.summary();

        assert_eq!(summary.environment, "production");
        assert_eq!(summary.configured, vec!["ENVIRONMENT", "TOKEN_KEY"]);
        assert_eq!(summary.empty.len(), 10);
        assert!(summary.empty.contains(&"USERNAMES"));
        assert_eq!(summary.credential_pairs, 0);
        assert!(summary.fixed_oauth_endpoints);
    }

    #[test]
    fn toml_output_has_expected_layout() {
        let record = ConfigurationRecord::from_lookup(lookup(&full_env())).unwrap();
        let text = record.to_toml().unwrap();

        assert!(text.contains("ENVIRONMENT = \"development\"\n"));
        assert!(text.contains("R2R_API_KEY = \"r2r-key\"\n"));
        assert!(text.contains("SUPABASE_URL = \"https://db.example.supabase.co\"\n"));
        assert!(text.contains("[google_oauth]\n"));
        assert!(text.contains("auth_uri = \"https://accounts.google.com/o/oauth2/auth\"\n"));
        assert!(text.contains("token_uri = \"https://oauth2.googleapis.com/token\"\n"));
        assert!(text.contains(
            "auth_provider_x509_cert_url = \"https://www.googleapis.com/oauth2/v1/certs\"\n"
        ));
        assert!(text.contains("redirect_uris = [\"http://localhost:8501/\"]\n"));

        let top_level = text.split("[google_oauth]").next().unwrap();
        assert!(top_level.contains("usernames = ["));
        assert!(top_level.contains("passwords = ["));
        assert!(top_level.find("ENVIRONMENT").unwrap() < top_level.find("TOKEN_KEY").unwrap());
    }

    #[test]
    fn empty_record_encodes_empty_values() {
        let text = ConfigurationRecord::default().to_toml().unwrap();

        assert!(text.contains("ENVIRONMENT = \"\"\n"));
        assert!(text.contains("TOKEN_KEY = \"\"\n"));
        assert!(text.contains("usernames = []\n"));
        assert!(text.contains("passwords = []\n"));
        assert!(text.contains("client_id = \"\"\n"));
        assert!(text.contains("auth_uri = \"https://accounts.google.com/o/oauth2/auth\"\n"));
    }

    #[test]
    fn awkward_values_survive_encoding() {
        let record = ConfigurationRecord::from_lookup(lookup(&[
            ("TOKEN_KEY", "quote\" back\\slash\nnewline"),
            ("USERNAMES", r#"["o'brien"]"#),
            ("PASSWORDS", r#"["p\"w"]"#),
        ]))
        .unwrap();

        let text = record.to_toml().unwrap();
        let decoded: ConfigurationRecord = toml::from_str(&text).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.token_key, "quote\" back\\slash\nnewline");
        assert_eq!(decoded.usernames, vec!["o'brien"]);
    }
}
