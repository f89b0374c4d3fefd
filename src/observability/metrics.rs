//! Metrics collection and exposition.
//!
//! # Metrics
//! - `kic_commands_total` (counter): commands by `command` and `outcome`
//! - `kic_sessions_active` (gauge): attached control sessions
//! - `kic_interrupt_count` (gauge): count last observed by the control path
//!
//! # Design Decisions
//! - Only the control path records; the signal handler stays atomics-only
//! - `kic_interrupt_count` is refreshed on reads and resets rather than on
//!   every event

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_command(command: &'static str, outcome: &'static str) {
    metrics::counter!("kic_commands_total", "command" => command, "outcome" => outcome).increment(1);
}

pub fn record_sessions(active: u64) {
    metrics::gauge!("kic_sessions_active").set(active as f64);
}

pub fn record_interrupt_count(count: u64) {
    metrics::gauge!("kic_interrupt_count").set(count as f64);
}
