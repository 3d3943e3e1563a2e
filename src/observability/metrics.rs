//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ingress_cycles_total` (counter): controller cycles by outcome
//! - `ingress_reloads_total` (counter): successful proxy starts/reloads
//! - `ingress_invalid_rules_total` (counter): rules dropped for a bad hostname
//! - `ingress_rules` (gauge): rules in the applied snapshot
//! - `ingress_rotation_seconds` (histogram): launch to pid file rotation

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_cycle(outcome: &'static str) {
    ::metrics::counter!("ingress_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_reload() {
    ::metrics::counter!("ingress_reloads_total").increment(1);
}

pub fn record_invalid_rule() {
    ::metrics::counter!("ingress_invalid_rules_total").increment(1);
}

pub fn set_rule_count(count: usize) {
    ::metrics::gauge!("ingress_rules").set(count as f64);
}

pub fn record_rotation(elapsed: Duration) {
    ::metrics::histogram!("ingress_rotation_seconds").record(elapsed.as_secs_f64());
}
