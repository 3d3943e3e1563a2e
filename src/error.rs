//! Crate-level error type and the recoverable/fatal split.

use thiserror::Error;

use crate::config::ConfigError;
use crate::rules::ListError;
use crate::supervisor::SupervisorError;
use crate::synth::SynthError;

#[derive(Debug, Error)]
pub enum Error {
    /// The control plane could not be listed. Retried next cycle.
    #[error("listing rules failed: {0}")]
    List(#[from] ListError),

    #[error("configuration synthesis failed: {0}")]
    Synth(#[from] SynthError),

    #[error("writing {path} failed: {source}")]
    WriteConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("proxy supervision failed: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Only control-plane fetch failures are retried; everything else means
    /// the running proxy can no longer be trusted to match any coherent config.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::List(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
