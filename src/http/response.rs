//! Fixed responses produced by the proxy itself.
//!
//! # Design Decisions
//! - Resolution failures never leak their cause to the client; details stay
//!   in the logs
//! - Unresolvable requests share one not-found response, also served on the
//!   sentinel `/error` path

use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::observability::metrics::{self, Outcome};

/// Sentinel path whose handler answers every request that cannot be proxied.
pub const ERROR_PATH: &str = "/error";

/// Answer a request that will not be proxied. Counted as rejected.
pub async fn error_handler() -> impl IntoResponse {
    metrics::record_request(Outcome::Rejected);
    not_found()
}

pub fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Service not found")
}

pub fn proxy_error() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Proxy error occurred")
}
