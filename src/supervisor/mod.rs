//! Proxy process supervision.
//!
//! # States
//! ```text
//! NotStarted ──start──▶ Running(pids)
//! Running(old) ──reload──▶ Reloading(old) ──pid file rotates──▶ Running(new)
//! Reloading(old) ──timeout / exec failure──▶ Fatal
//! ```
//!
//! # Design Decisions
//! - The proxy daemonizes; its pid is only ever learned from the pid file
//! - Reload hands listeners over with `-sf`, so in-flight connections finish
//!   on the old process
//! - Old processes are reaped on detached threads that never delay exit
//! - A pid file that never rotates is fatal: nothing newer can be served

pub mod command;
pub mod pidfile;
pub mod reaper;

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time;

use crate::config::ProxyConfig;
use crate::observability::metrics;

pub use command::ProxyCommand;
pub use pidfile::{PidFile, ProxyProcessState};
pub use reaper::{reap, spawn_reaper, ReapOutcome};

/// Errors raised while starting or reloading the proxy. All are fatal.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to execute {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("{binary} exited with {status}: {output}")]
    ExitStatus {
        binary: String,
        status: std::process::ExitStatus,
        output: String,
    },

    #[error("pid file {path} did not change from [{old}] within {timeout:?}")]
    RotationTimeout {
        path: String,
        old: ProxyProcessState,
        timeout: Duration,
    },

    #[error("reading pid file {path} failed: {source}")]
    PidFileRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("pid file {path} holds invalid content {content:?}")]
    InvalidPidFile { path: String, content: String },
}

/// Lifecycle state of the supervised proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyState {
    NotStarted,
    Running(ProxyProcessState),
    Reloading(ProxyProcessState),
    Fatal,
}

/// Starts, reloads and reaps the external proxy.
pub struct ProcessSupervisor {
    command: ProxyCommand,
    pid_file: PidFile,
    poll_interval: Duration,
    rotation_timeout: Duration,
    state: ProxyState,
}

impl ProcessSupervisor {
    pub fn new(command: ProxyCommand, pid_file: PidFile) -> Self {
        Self {
            command,
            pid_file,
            poll_interval: Duration::from_secs(1),
            rotation_timeout: Duration::from_secs(30),
            state: ProxyState::NotStarted,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(ProxyCommand::from_config(config), PidFile::new(&config.pid_file))
            .with_poll_interval(config.poll_interval())
            .with_rotation_timeout(config.rotation_timeout())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_rotation_timeout(mut self, timeout: Duration) -> Self {
        self.rotation_timeout = timeout;
        self
    }

    pub fn state(&self) -> &ProxyState {
        &self.state
    }

    /// Start a proxy with no predecessor.
    pub async fn start(&mut self, config_path: &Path) -> Result<ProxyProcessState, SupervisorError> {
        tracing::info!(config = %config_path.display(), "Starting proxy");
        self.launch(config_path, ProxyProcessState::empty()).await
    }

    /// Gracefully replace the running proxy, or start one if none is recorded.
    pub async fn reload(&mut self, config_path: &Path) -> Result<ProxyProcessState, SupervisorError> {
        let old = match self.pid_file.read().await {
            Ok(old) => old,
            Err(e) => {
                self.state = ProxyState::Fatal;
                return Err(e);
            }
        };

        if old.is_empty() {
            return self.start(config_path).await;
        }

        tracing::info!(config = %config_path.display(), old_pids = %old, "Reloading proxy");
        self.launch(config_path, old).await
    }

    async fn launch(&mut self, config_path: &Path, old: ProxyProcessState) -> Result<ProxyProcessState, SupervisorError> {
        self.state = ProxyState::Reloading(old.clone());
        let started = Instant::now();

        let result = self.hand_off(config_path, &old).await;
        match result {
            Ok(new) => {
                metrics::record_rotation(started.elapsed());
                tracing::info!(pids = %new, elapsed_ms = started.elapsed().as_millis() as u64, "Proxy running");
                self.state = ProxyState::Running(new.clone());
                Ok(new)
            }
            Err(e) => {
                self.state = ProxyState::Fatal;
                Err(e)
            }
        }
    }

    async fn hand_off(&self, config_path: &Path, old: &ProxyProcessState) -> Result<ProxyProcessState, SupervisorError> {
        self.command.run(config_path, old).await?;

        for &pid in old.pids() {
            if let Err(e) = spawn_reaper(pid) {
                tracing::warn!(pid, error = %e, "Failed to start reaper thread");
            }
        }

        self.wait_for_rotation(old).await
    }

    /// Poll the pid file until it holds pids other than `old`.
    ///
    /// Empty or unreadable content counts as "not rotated yet", since the
    /// proxy may be midway through writing it.
    pub async fn wait_for_rotation(&self, old: &ProxyProcessState) -> Result<ProxyProcessState, SupervisorError> {
        let poll = async {
            let mut ticker = time::interval(self.poll_interval);
            loop {
                ticker.tick().await;
                match self.pid_file.read().await {
                    Ok(current) if !current.is_empty() && current != *old => return current,
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "Pid file not readable yet"),
                }
            }
        };

        time::timeout(self.rotation_timeout, poll)
            .await
            .map_err(|_| SupervisorError::RotationTimeout {
                path: self.pid_file.path().display().to_string(),
                old: old.clone(),
                timeout: self.rotation_timeout,
            })
    }
}
