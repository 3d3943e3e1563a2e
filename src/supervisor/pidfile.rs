//! Pid file observation.
//!
//! The proxy writes its own pid file; this side only ever reads it.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::supervisor::SupervisorError;

/// Pids recorded by the running proxy, in file order.
///
/// Empty means no proxy has been started (or the file is absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyProcessState {
    pids: Vec<i32>,
}

impl ProxyProcessState {
    pub fn new(pids: Vec<i32>) -> Self {
        Self { pids }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse whitespace-separated positive pids.
    pub fn parse(content: &str) -> Option<Self> {
        content
            .split_whitespace()
            .map(|tok| tok.parse::<i32>().ok().filter(|pid| *pid > 0))
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    pub fn pids(&self) -> &[i32] {
        &self.pids
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

impl fmt::Display for ProxyProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pid) in self.pids.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", pid)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current pids. A missing file reads as empty.
    pub async fn read(&self) -> Result<ProxyProcessState, SupervisorError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProxyProcessState::empty()),
            Err(source) => {
                return Err(SupervisorError::PidFileRead {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        ProxyProcessState::parse(&content).ok_or_else(|| SupervisorError::InvalidPidFile {
            path: self.path.display().to_string(),
            content: content.trim().to_string(),
        })
    }
}
