//! Proxy binary invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::ProxyConfig;
use crate::supervisor::pidfile::ProxyProcessState;
use crate::supervisor::SupervisorError;

/// Builds and runs `<binary> [extra args] -f <config> -p <pidfile> [-sf <pids>]`.
#[derive(Debug, Clone)]
pub struct ProxyCommand {
    binary: PathBuf,
    extra_args: Vec<String>,
    pid_file: PathBuf,
}

impl ProxyCommand {
    pub fn new(binary: impl Into<PathBuf>, pid_file: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
            pid_file: pid_file.into(),
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(&config.binary, &config.pid_file).with_extra_args(config.extra_args.clone())
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Argument list; `-sf` and the old pids are appended only when handing off.
    pub fn args(&self, config_path: &Path, handoff: &ProxyProcessState) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push("-f".into());
        args.push(config_path.into());
        args.push("-p".into());
        args.push(self.pid_file.as_os_str().into());

        if !handoff.is_empty() {
            args.push("-sf".into());
            args.extend(handoff.pids().iter().map(|pid| OsString::from(pid.to_string())));
        }

        args
    }

    /// Run the launcher to completion.
    ///
    /// The proxy daemonizes, so success here only means the launcher exited 0;
    /// the new pid is observed through the pid file.
    pub async fn run(&self, config_path: &Path, handoff: &ProxyProcessState) -> Result<(), SupervisorError> {
        let args = self.args(config_path, handoff);
        tracing::debug!(binary = %self.binary.display(), args = ?args, "Invoking proxy");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SupervisorError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(SupervisorError::ExitStatus {
                binary: self.binary.display().to_string(),
                status: output.status,
                output: combined.trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.into_string().unwrap()).collect()
    }

    #[test]
    fn test_start_args() {
        let cmd = ProxyCommand::new("haproxy", "/var/run/haproxy.pid");
        let args = strings(cmd.args(Path::new("/etc/haproxy/haproxy.cfg"), &ProxyProcessState::empty()));
        assert_eq!(args, vec!["-f", "/etc/haproxy/haproxy.cfg", "-p", "/var/run/haproxy.pid"]);
    }

    #[test]
    fn test_reload_args_hand_off_every_pid() {
        let cmd = ProxyCommand::new("haproxy", "/run/h.pid").with_extra_args(vec!["-q".into()]);
        let args = strings(cmd.args(Path::new("/h.cfg"), &ProxyProcessState::new(vec![1234, 1235])));
        assert_eq!(args, vec!["-q", "-f", "/h.cfg", "-p", "/run/h.pid", "-sf", "1234", "1235"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cmd = ProxyCommand::new("/nonexistent/haproxy-binary", "/tmp/unused.pid");
        let err = cmd.run(Path::new("/tmp/unused.cfg"), &ProxyProcessState::empty()).await.unwrap_err();
        assert!(matches!(err, SupervisorError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let cmd = ProxyCommand::new("/bin/sh", "/tmp/unused.pid")
            .with_extra_args(vec!["-c".into(), "echo bad config >&2; exit 3".into()]);
        let err = cmd.run(Path::new("/tmp/unused.cfg"), &ProxyProcessState::empty()).await.unwrap_err();
        match err {
            SupervisorError::ExitStatus { status, output, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(output, "bad config");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
