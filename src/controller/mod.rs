//! The polling controller loop.
//!
//! # Data Flow
//! ```text
//! rate_limit.rs admits a cycle
//!     → RuleSource::list()            (failure: log, keep snapshot, retry)
//!     → change.rs against snapshot    (unchanged: stop here)
//!     → ConfigSynthesizer             (failure: fatal)
//!     → write config, supervisor.reload()  (failure: fatal)
//!     → commit snapshot
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: at most one reload in flight, since two reloads
//!   would race on the same pid file
//! - Shutdown is only observed between cycles; a started reload finishes
//! - The snapshot is committed only after the proxy is confirmed running the
//!   new config

pub mod change;
pub mod rate_limit;

use std::path::{Path, PathBuf};

use tokio::sync::broadcast;

use crate::config::ControllerConfig;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::rules::{RuleSet, RuleSource};
use crate::supervisor::ProcessSupervisor;
use crate::synth::{ConfigSynthesizer, Synthesis};

pub use rate_limit::RateLimiter;

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Rules matched the snapshot; nothing was written or reloaded.
    Unchanged,
    /// A new config was written and the proxy reloaded onto it.
    Reloaded { rules: usize, backends: usize },
}

impl CycleOutcome {
    fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Unchanged => "unchanged",
            CycleOutcome::Reloaded { .. } => "reloaded",
        }
    }
}

/// Ties a rule source, the synthesizer and the supervisor together.
pub struct Controller<S> {
    source: S,
    synthesizer: ConfigSynthesizer,
    supervisor: ProcessSupervisor,
    limiter: RateLimiter,
    config_path: PathBuf,
    previous: RuleSet,
    applied_text: Option<String>,
}

impl<S: RuleSource> Controller<S> {
    pub fn new(
        source: S,
        synthesizer: ConfigSynthesizer,
        supervisor: ProcessSupervisor,
        limiter: RateLimiter,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            synthesizer,
            supervisor,
            limiter,
            config_path: config_path.into(),
            previous: RuleSet::empty(),
            applied_text: None,
        }
    }

    pub fn from_config(source: S, config: &ControllerConfig) -> Result<Self> {
        Ok(Self::new(
            source,
            ConfigSynthesizer::from_config(config)?,
            ProcessSupervisor::from_config(&config.proxy),
            RateLimiter::new(config.poll.qps, config.poll.burst),
            &config.output.config_path,
        ))
    }

    /// The last rule set the proxy was confirmed running.
    pub fn previous(&self) -> &RuleSet {
        &self.previous
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Bring the proxy up on the empty rule set before the first poll.
    ///
    /// The snapshot stays empty, so the first non-empty list reloads.
    pub async fn bootstrap(&mut self) -> Result<()> {
        tracing::info!(config = %self.config_path.display(), "Bootstrapping proxy with empty rule set");
        let synthesis = self.synthesizer.synthesize(&RuleSet::empty())?;
        self.apply(&synthesis).await
    }

    /// Run cycles until a fatal error or a shutdown signal.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Controller received shutdown signal, exiting loop");
                    return Ok(());
                }
                _ = self.limiter.acquire() => {}
            }

            match self.cycle().await {
                Ok(outcome) => metrics::record_cycle(outcome.label()),
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "Cycle failed, keeping current configuration");
                    metrics::record_cycle("list_error");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Fatal controller error");
                    metrics::record_cycle("fatal");
                    return Err(e);
                }
            }
        }
    }

    /// One poll: list, compare, and reload on change. Not rate limited.
    pub async fn cycle(&mut self) -> Result<CycleOutcome> {
        tracing::debug!("Retrieving rules");
        let rules = self.source.list().await?;

        if !change::changed(&self.previous, &rules) {
            tracing::debug!(rules = rules.len(), "No rule changes");
            return Ok(CycleOutcome::Unchanged);
        }

        let summary = change::summarize(&self.previous, &rules);
        tracing::info!(
            rules = summary.total_rules,
            added = ?summary.added_hosts,
            removed = ?summary.removed_hosts,
            "Rules changed"
        );

        let synthesis = self.synthesizer.synthesize(&rules)?;
        let backends = synthesis.backends().len();
        self.apply(&synthesis).await?;

        metrics::set_rule_count(rules.len());
        let outcome = CycleOutcome::Reloaded {
            rules: rules.len(),
            backends,
        };
        self.previous = rules;
        Ok(outcome)
    }

    /// Write the config and reload onto it.
    ///
    /// If the reload fails the previously applied text is written back, so the
    /// file on disk keeps matching what the running proxy loaded.
    async fn apply(&mut self, synthesis: &Synthesis) -> Result<()> {
        write_config(&self.config_path, &synthesis.text).await?;

        if let Err(e) = self.supervisor.reload(&self.config_path).await {
            if let Some(previous) = self.applied_text.as_deref() {
                if let Err(restore) = write_config(&self.config_path, previous).await {
                    tracing::error!(error = %restore, "Failed to restore previous configuration");
                }
            }
            return Err(e.into());
        }

        metrics::record_reload();
        self.applied_text = Some(synthesis.text.clone());
        Ok(())
    }
}

/// Replace `path` atomically with `text` (temp file in the same directory, then rename).
pub async fn write_config(path: &Path, text: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let to_error = |source: std::io::Error| Error::WriteConfig {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::write(&tmp, text).await.map_err(to_error)?;
    tokio::fs::rename(&tmp, path).await.map_err(to_error)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "Wrote proxy configuration");
    Ok(())
}
