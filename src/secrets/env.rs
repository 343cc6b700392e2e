// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Environment variable names read by the materializer.
//!
//! | Variable | Secrets key |
//! |----------|-------------|
//! | `ENVIRONMENT` | `ENVIRONMENT` |
//! | `R2R_API_KEY` | `R2R_API_KEY` |
//! | `OPENROUTER_API_KEY` | `OPENROUTER_API_KEY` |
//! | `REQUESTY_API_KEY` | `REQUESTY_API_KEY` |
//! | `TOKEN_KEY` | `TOKEN_KEY` |
//! | `SUPABASE_URL` | `SUPABASE_URL` |
//! | `SUPABASE_KEY` | `SUPABASE_KEY` |
//! | `USERNAMES` | `usernames` |
//! | `PASSWORDS` | `passwords` |
//! | `GOOGLE_OAUTH_CLIENT_ID` | `google_oauth.client_id` |
//! | `GOOGLE_OAUTH_CLIENT_SECRET` | `google_oauth.client_secret` |
//! | `GOOGLE_OAUTH_PROJECT_ID` | `google_oauth.project_id` |

pub const ENVIRONMENT: &str = "ENVIRONMENT";
pub const R2R_API_KEY: &str = "R2R_API_KEY";
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const REQUESTY_API_KEY: &str = "REQUESTY_API_KEY";
pub const TOKEN_KEY: &str = "TOKEN_KEY";
pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_KEY: &str = "SUPABASE_KEY";
pub const USERNAMES: &str = "USERNAMES";
pub const PASSWORDS: &str = "PASSWORDS";
pub const GOOGLE_OAUTH_CLIENT_ID: &str = "GOOGLE_OAUTH_CLIENT_ID";
pub const GOOGLE_OAUTH_CLIENT_SECRET: &str = "GOOGLE_OAUTH_CLIENT_SECRET";
pub const GOOGLE_OAUTH_PROJECT_ID: &str = "GOOGLE_OAUTH_PROJECT_ID";

/// Every variable the materializer consults, in output order.
pub const ALL: [&str; 12] = [
    ENVIRONMENT,
    R2R_API_KEY,
    OPENROUTER_API_KEY,
    REQUESTY_API_KEY,
    TOKEN_KEY,
    SUPABASE_URL,
    SUPABASE_KEY,
    USERNAMES,
    PASSWORDS,
    GOOGLE_OAUTH_CLIENT_ID,
    GOOGLE_OAUTH_CLIENT_SECRET,
    GOOGLE_OAUTH_PROJECT_ID,
];

/// `ENVIRONMENT` value under which the credential lists should be empty.
pub const PRODUCTION: &str = "production";
