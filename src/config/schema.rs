//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the controller.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the ingress controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ControllerConfig {
    /// Where the rendered configuration is written.
    pub output: OutputConfig,

    /// Proxy binary invocation and pid tracking.
    pub proxy: ProxyConfig,

    /// Values for the fixed template sections.
    pub template: TemplateConfig,

    /// Poll rate limiting.
    pub poll: PollConfig,

    /// Where routing rules come from.
    pub source: SourceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Rendered configuration output.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the rendered HAProxy configuration.
    pub config_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("/etc/haproxy/haproxy.cfg"),
        }
    }
}

/// Proxy process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy binary (looked up on `PATH` when relative).
    pub binary: PathBuf,

    /// Arguments placed before the standard `-f`/`-p`/`-sf` flags.
    pub extra_args: Vec<String>,

    /// Pid file the proxy writes on start.
    pub pid_file: PathBuf,

    /// Pid file poll interval while waiting for a reload, in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum time to wait for the pid file to change after a reload, in seconds.
    pub rotation_timeout_secs: u64,
}

impl ProxyConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn rotation_timeout(&self) -> Duration {
        Duration::from_secs(self.rotation_timeout_secs)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("haproxy"),
            extra_args: Vec::new(),
            pid_file: PathBuf::from("/var/run/haproxy.pid"),
            poll_interval_ms: 1000,
            rotation_timeout_secs: 30,
        }
    }
}

/// Template parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Domain appended to every rule hostname in host ACLs.
    pub base_domain: String,

    /// Syslog target for the `global` log directive.
    pub syslog_target: String,

    /// Stats listener bind address.
    pub stats_bind: String,

    /// Ingress frontend bind address.
    pub http_bind: String,

    /// Error file served by the fallback backend.
    pub error_file: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            base_domain: String::new(),
            syslog_target: "127.0.0.1".to_string(),
            stats_bind: "127.0.0.1:3000".to_string(),
            http_bind: ":80".to_string(),
            error_file: "/etc/haproxy/errors/not_found.http".to_string(),
        }
    }
}

/// Poll rate limiting (token bucket).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    /// Sustained polls per second.
    pub qps: f64,

    /// Burst capacity.
    pub burst: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { qps: 0.1, burst: 1 }
    }
}

/// Rule source kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Kubernetes ingresses.
    #[default]
    Kube,
    /// A TOML rules file.
    File,
}

/// Rule source configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Rules file, required when `kind = "file"`.
    pub rules_path: Option<PathBuf>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
