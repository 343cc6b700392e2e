// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LCA Bench Entrypoint - container startup for the LCA benchmarking app
//!
//! The Streamlit application expects its credentials in
//! `.streamlit/secrets.toml`, while the container receives them as
//! environment variables. This crate bridges the two and supervises the
//! application process.
//!
//! ## Modules
//!
//! - `config` - Runtime settings for the entrypoint itself
//! - `secrets` - Configuration Record, list parsing, and the file writer
//! - `launch` - Materialize-then-run sequence and signal forwarding
//! - `health` - Liveness probe against the running app
//! - `logging` - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod health;
pub mod launch;
pub mod logging;
pub mod secrets;
