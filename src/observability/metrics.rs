//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_verdicts_total` (counter): verdicts by outcome (allow, remote_block, threat)
//! - `gate_threats_total` (counter): local findings by category
//! - `gate_authority_failures_total` (counter): failed authority calls by operation, kind
//! - `gate_decision_duration_seconds` (histogram): decision call latency
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_verdict(outcome: &'static str) {
    counter!("gate_verdicts_total", "outcome" => outcome).increment(1);
}

pub fn record_threat(category: &'static str) {
    counter!("gate_threats_total", "category" => category).increment(1);
}

pub fn record_authority_failure(operation: &'static str, kind: &'static str) {
    counter!(
        "gate_authority_failures_total",
        "operation" => operation,
        "kind" => kind
    )
    .increment(1);
}

pub fn record_decision_latency(start: Instant) {
    histogram!("gate_decision_duration_seconds").record(start.elapsed().as_secs_f64());
}
