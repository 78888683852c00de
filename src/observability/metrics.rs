//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by outcome
//!   (`forwarded`, `rejected`, `upstream_error`)
//! - `proxy_resolution_failures_total` (counter): failures by kind
//! - `proxy_resolution_duration_seconds` (histogram): pipeline latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter serves its own HTTP listener

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::resolve::ResolveError;

/// Install the Prometheus recorder and start its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forwarded,
    Rejected,
    UpstreamError,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Forwarded => "forwarded",
            Outcome::Rejected => "rejected",
            Outcome::UpstreamError => "upstream_error",
        }
    }
}

pub fn record_request(outcome: Outcome) {
    ::metrics::counter!("proxy_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_resolution(start: Instant, failure: Option<&ResolveError>) {
    ::metrics::histogram!("proxy_resolution_duration_seconds").record(start.elapsed().as_secs_f64());
    if let Some(error) = failure {
        ::metrics::counter!("proxy_resolution_failures_total", "kind" => error.kind()).increment(1);
    }
}
