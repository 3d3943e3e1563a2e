//! The control-plane collaborator seam.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::rules::model::RuleSet;

/// The collaborator failed to produce the current rule list.
///
/// Kept as its own type so the controller can tell a failed fetch apart from
/// every other error without inspecting messages.
#[derive(Debug, Error)]
pub enum ListError {
    /// The Kubernetes API request failed.
    #[error("listing ingresses failed: {0}")]
    Kube(#[from] kube::Error),

    /// A rules file could not be read.
    #[error("reading rules file {path} failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A rules file could not be parsed.
    #[error("parsing rules file {path} failed: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Any other collaborator failure.
    #[error("{0}")]
    Other(String),
}

/// Source of the full current rule set.
///
/// Every returned list is the complete desired state; there are no
/// incremental diffs.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Fetch the current rules.
    async fn list(&self) -> Result<RuleSet, ListError>;
}

#[async_trait]
impl<S: RuleSource + ?Sized> RuleSource for Box<S> {
    async fn list(&self) -> Result<RuleSet, ListError> {
        (**self).list().await
    }
}
