//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, text or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (identifier, namespace, stage) on every resolution log
//! - Request ID flows through the HTTP layer and upstream
//! - Metrics are optional and off by default

pub mod logging;
pub mod metrics;
