// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Application Launcher
//!
//! Runs the startup sequence of the container:
//!
//! 1. Materialize `secrets.toml`
//! 2. Spawn the application (`streamlit run ...`) bound to all interfaces
//! 3. Wait for it, forwarding SIGTERM/SIGINT so the app can stop cleanly
//!
//! A failed step stops the sequence: the application is never spawned if the
//! secrets could not be written. The child's exit status becomes ours.
//!
//! ## Shutdown
//!
//! [`Shutdown`] holds two `tokio_util::sync::CancellationToken`s. The first
//! SIGTERM/SIGINT cancels the graceful one and the supervisor sends SIGTERM
//! to the child, then keeps waiting. A second signal cancels the forced one
//! and the child is killed.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::secrets::{Materializer, SecretsError};

/// Errors that can occur while launching the application.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("secrets materialization failed: {0}")]
    Secrets(#[from] SecretsError),

    #[error("no application command given")]
    EmptyCommand,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for the application: {0}")]
    Wait(#[source] io::Error),

    #[error("failed to signal the application: {0}")]
    Signal(#[source] io::Error),
}

pub type LaunchResult<T> = Result<T, LaunchError>;

/// Program and arguments of the application process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl AppCommand {
    /// The default Streamlit invocation for `config`.
    pub fn streamlit(config: &RuntimeConfig) -> Self {
        Self {
            program: "streamlit".to_string(),
            args: vec![
                "run".to_string(),
                config.app_entrypoint.clone(),
                format!("--server.port={}", config.port),
                format!("--server.address={}", config.host),
            ],
        }
    }

    /// Build a command from an argv-style list.
    pub fn from_argv(argv: Vec<String>) -> LaunchResult<Self> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or(LaunchError::EmptyCommand)?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    fn spawn(&self) -> LaunchResult<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

/// Termination requests for the application, escalating on repeat.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    graceful: CancellationToken,
    forced: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the application to stop. The first request is graceful, any
    /// later one kills it.
    pub fn request(&self) {
        if self.graceful.is_cancelled() {
            self.forced.cancel();
        } else {
            self.graceful.cancel();
        }
    }

    pub fn is_requested(&self) -> bool {
        self.graceful.is_cancelled()
    }

    pub fn is_forced(&self) -> bool {
        self.forced.is_cancelled()
    }
}

/// Materializes the secrets and then runs the application.
#[derive(Debug)]
pub struct Launcher {
    materializer: Materializer,
    command: AppCommand,
}

impl Launcher {
    pub fn new(materializer: Materializer, command: AppCommand) -> Self {
        Self {
            materializer,
            command,
        }
    }

    pub fn command(&self) -> &AppCommand {
        &self.command
    }

    /// Run the full sequence using the process environment.
    ///
    /// Returns the exit code the entrypoint should exit with.
    pub async fn run(mut self, shutdown: Shutdown) -> LaunchResult<i32> {
        self.materializer.materialize()?;
        self.start(shutdown).await
    }

    /// Run the full sequence with secrets taken from `lookup`.
    pub async fn run_with<F>(mut self, lookup: F, shutdown: Shutdown) -> LaunchResult<i32>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.materializer.materialize_from(lookup)?;
        self.start(shutdown).await
    }

    async fn start(&self, shutdown: Shutdown) -> LaunchResult<i32> {
        info!(
            program = %self.command.program,
            args = ?self.command.args,
            "Starting application"
        );
        let child = self.command.spawn()?;
        let status = supervise(child, shutdown).await?;
        let code = exit_code(status);

        if status.success() {
            info!("Application exited");
        } else {
            warn!(code, "Application exited with failure");
        }
        Ok(code)
    }
}

/// Wait for `child`, forwarding a termination request once shutdown is
/// requested and killing it if shutdown is forced.
pub async fn supervise(mut child: Child, shutdown: Shutdown) -> LaunchResult<ExitStatus> {
    tokio::select! {
        status = child.wait() => return status.map_err(LaunchError::Wait),
        _ = shutdown.graceful.cancelled() => {
            info!("Forwarding termination to application");
            terminate(&mut child)?;
        }
    }

    tokio::select! {
        status = child.wait() => return status.map_err(LaunchError::Wait),
        _ = shutdown.forced.cancelled() => {
            warn!("Killing application");
            child.start_kill().map_err(LaunchError::Signal)?;
        }
    }

    child.wait().await.map_err(LaunchError::Wait)
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> LaunchResult<()> {
    // Already reaped.
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = libc::pid_t::try_from(pid).map_err(|_| {
        LaunchError::Signal(io::Error::new(
            io::ErrorKind::InvalidInput,
            "child pid out of range",
        ))
    })?;

    // SAFETY: kill(2) takes plain integers and has no memory-safety
    // requirements. The pid belongs to a child we have not reaped yet.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        // The child exited between the check and the signal.
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        return Err(LaunchError::Signal(err));
    }
    Ok(())
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> LaunchResult<()> {
    child.start_kill().map_err(LaunchError::Signal)
}

/// Map a child's status to a shell-style exit code.
///
/// Death by signal N becomes `128 + N`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Request `shutdown` on every SIGTERM or SIGINT until it is forced.
///
/// The returned task runs until the second signal; abort it once the
/// application has exited.
#[cfg(unix)]
pub fn listen_for_shutdown(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    Ok(tokio::spawn(async move {
        while !shutdown.is_forced() {
            let name = tokio::select! {
                Some(()) = terminate.recv() => "SIGTERM",
                Some(()) = interrupt.recv() => "SIGINT",
                else => return,
            };
            if shutdown.is_requested() {
                warn!(signal = name, "Repeated shutdown signal, forcing exit");
            } else {
                info!(signal = name, "Shutdown requested");
            }
            shutdown.request();
        }
    }))
}

#[cfg(not(unix))]
pub fn listen_for_shutdown(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while !shutdown.is_forced() {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            if shutdown.is_requested() {
                warn!("Repeated Ctrl-C, forcing exit");
            } else {
                info!("Shutdown requested");
            }
            shutdown.request();
        }
    }))
}
