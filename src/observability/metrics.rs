//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_dispatch_total` (counter): dispatches by path and outcome
//! - `route_dispatch_duration_seconds` (histogram): time from receipt to response
//! - `route_unmatched_total` (counter): requests that matched no route
//!
//! # Design Decisions
//! - Labels use the declared route path, never the raw request path
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch.
pub fn record_dispatch(route: &str, outcome: &'static str, started: Instant) {
    metrics::counter!(
        "route_dispatch_total",
        "path" => route.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("route_dispatch_duration_seconds", "path" => route.to_string())
        .record(started.elapsed().as_secs_f64());
}

/// Record a request that matched no route.
pub fn record_unmatched() {
    metrics::counter!("route_unmatched_total").increment(1);
}
