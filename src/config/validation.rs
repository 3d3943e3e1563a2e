//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rates > 0, timeouts > 0)
//! - Check cross-field requirements (file source needs a path)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{ControllerConfig, SourceKind};

/// Slowest accepted poll rate: one poll per ~11.6 days.
pub const MIN_QPS: f64 = 1e-6;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let domain = &config.template.base_domain;
    if domain.is_empty() {
        errors.push(ValidationError::new("template.base_domain", "must be set"));
    } else if domain.starts_with('.') || domain.ends_with('.') {
        errors.push(ValidationError::new(
            "template.base_domain",
            format!("'{}' must not start or end with '.'", domain),
        ));
    }

    if !(config.poll.qps.is_finite() && config.poll.qps >= MIN_QPS) {
        errors.push(ValidationError::new(
            "poll.qps",
            format!("must be a finite number of at least {}", MIN_QPS),
        ));
    }
    if config.poll.burst == 0 {
        errors.push(ValidationError::new("poll.burst", "must be at least 1"));
    }

    if config.proxy.rotation_timeout_secs == 0 {
        errors.push(ValidationError::new("proxy.rotation_timeout_secs", "must be greater than 0"));
    }
    if config.proxy.poll_interval_ms == 0 {
        errors.push(ValidationError::new("proxy.poll_interval_ms", "must be greater than 0"));
    } else if config.proxy.poll_interval() > config.proxy.rotation_timeout() {
        errors.push(ValidationError::new(
            "proxy.poll_interval_ms",
            "must not exceed proxy.rotation_timeout_secs",
        ));
    }
    if config.proxy.binary.as_os_str().is_empty() {
        errors.push(ValidationError::new("proxy.binary", "must be set"));
    }

    if config.source.kind == SourceKind::File && config.source.rules_path.is_none() {
        errors.push(ValidationError::new("source.rules_path", "required when source.kind = \"file\""));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ControllerConfig {
        let mut config = ControllerConfig::default();
        config.template.base_domain = "example.com".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_default_config_needs_base_domain() {
        let errors = validate_config(&ControllerConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "template.base_domain");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.poll.qps = 0.0;
        config.poll.burst = 0;
        config.proxy.rotation_timeout_secs = 0;
        config.source.kind = SourceKind::File;

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();

        assert!(fields.contains(&"poll.qps"));
        assert!(fields.contains(&"poll.burst"));
        assert!(fields.contains(&"proxy.rotation_timeout_secs"));
        assert!(fields.contains(&"proxy.poll_interval_ms"));
        assert!(fields.contains(&"source.rules_path"));
    }

    #[test]
    fn test_qps_bounds() {
        for qps in [1e-300, -1.0, f64::NAN, f64::INFINITY] {
            let mut config = valid();
            config.poll.qps = qps;
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors[0].field, "poll.qps", "qps = {}", qps);
        }

        let mut config = valid();
        config.poll.qps = MIN_QPS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "not-an-address".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
