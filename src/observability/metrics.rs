//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pilot_selections_total` (counter): selections by service, outcome
//! - `pilot_reloads_total` (counter): reloads by outcome
//! - `pilot_reload_duration_seconds` (histogram): time to refresh all services
//! - `pilot_catalog_lookup_failures_total` (counter): failed lookups by service
//! - `pilot_backend_endpoints` (gauge): endpoints currently known per service
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(metrics_addr = %addr, "Prometheus metrics exporter started");
    Ok(())
}

pub fn record_selection(service: &str, outcome: &'static str) {
    ::metrics::counter!(
        "pilot_selections_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_reload(outcome: &'static str, duration: Duration) {
    ::metrics::counter!("pilot_reloads_total", "outcome" => outcome).increment(1);
    if outcome != "skipped" {
        ::metrics::histogram!("pilot_reload_duration_seconds").record(duration.as_secs_f64());
    }
}

pub fn record_lookup_failure(service: &str) {
    ::metrics::counter!("pilot_catalog_lookup_failures_total", "service" => service.to_string())
        .increment(1);
}

pub fn record_endpoint_count(service: &str, count: usize) {
    ::metrics::gauge!("pilot_backend_endpoints", "service" => service.to_string()).set(count as f64);
}
