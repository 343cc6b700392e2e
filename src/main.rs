// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use url::Url;

use lca_bench_entrypoint::config::{RuntimeConfig, LOG_FORMAT_ENV};
use lca_bench_entrypoint::error::{exit_code_from, EntrypointError};
use lca_bench_entrypoint::health::{HealthProbe, HealthStatus};
use lca_bench_entrypoint::launch::{listen_for_shutdown, AppCommand, Launcher, Shutdown};
use lca_bench_entrypoint::logging;
use lca_bench_entrypoint::secrets::{Materializer, SecretsFile};

#[derive(Parser, Debug)]
#[command(
    name = "lca-entrypoint",
    version,
    about = "Materialize Streamlit secrets from the environment and run the LCA app"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write secrets.toml from the environment and exit.
    Materialize {
        /// Output path (defaults to SECRETS_PATH or /app/.streamlit/secrets.toml).
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
    },
    /// Write secrets.toml, then run the application until it exits.
    Launch {
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
        /// Application command; defaults to `streamlit run $APP_ENTRYPOINT`.
        #[arg(last = true, value_name = "COMMAND")]
        command: Vec<String>,
    },
    /// Parse an existing secrets file and print a redacted summary.
    Check {
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
    },
    /// Probe the application's health endpoint; exits non-zero if unhealthy.
    Healthcheck {
        /// Full URL to probe instead of the local health endpoint.
        #[arg(long, value_name = "URL")]
        url: Option<Url>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(env::var(LOG_FORMAT_ENV).ok().as_deref());

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, error_code = err.error_code(), "Entrypoint failed");
            err.exit_code()
        }
    }
}

async fn run(command: Command) -> Result<ExitCode, EntrypointError> {
    let config = RuntimeConfig::from_env()?;

    match command {
        Command::Materialize { path } => {
            let path = path.unwrap_or(config.secrets_path);
            Materializer::new(path).materialize()?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Launch { path, command } => {
            let path = path.unwrap_or_else(|| config.secrets_path.clone());
            let command = if command.is_empty() {
                AppCommand::streamlit(&config)
            } else {
                AppCommand::from_argv(command)?
            };

            let shutdown = Shutdown::new();
            let listener = listen_for_shutdown(shutdown.clone()).map_err(EntrypointError::Signals)?;

            let result = Launcher::new(Materializer::new(path), command)
                .run(shutdown)
                .await;

            listener.abort();
            let _ = listener.await;

            Ok(exit_code_from(result?))
        }
        Command::Check { path } => {
            let file = SecretsFile::new(path.unwrap_or(config.secrets_path));
            let summary = file.check()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Healthcheck { url } => {
            let probe = match url {
                Some(url) => HealthProbe::new(url, config.health_timeout)?,
                None => HealthProbe::for_config(&config)?,
            };

            match probe.check().await? {
                HealthStatus::Healthy => {
                    info!(url = %probe.url(), "Application is healthy");
                    Ok(ExitCode::SUCCESS)
                }
                HealthStatus::Unhealthy(status) => Err(EntrypointError::Unhealthy(status)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn launch_accepts_trailing_command() {
        let cli = Cli::try_parse_from([
            "lca-entrypoint",
            "launch",
            "--path",
            "/tmp/secrets.toml",
            "--",
            "streamlit",
            "run",
            "app.py",
        ])
        .unwrap();

        match cli.command {
            Command::Launch { path, command } => {
                assert_eq!(path, Some(PathBuf::from("/tmp/secrets.toml")));
                assert_eq!(command, vec!["streamlit", "run", "app.py"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn healthcheck_parses_url() {
        let cli = Cli::try_parse_from([
            "lca-entrypoint",
            "healthcheck",
            "--url",
            "http://127.0.0.1:8501/_stcore/health",
        ])
        .unwrap();

        match cli.command {
            Command::Healthcheck { url: Some(url) } => {
                assert_eq!(url.path(), "/_stcore/health");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn materialize_without_path_uses_default() {
        let cli = Cli::try_parse_from(["lca-entrypoint", "materialize"]).unwrap();
        assert!(matches!(cli.command, Command::Materialize { path: None }));
    }
}
