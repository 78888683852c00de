//! Request-time resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → path.rs (extract /instance/<id>)
//!     → workload.rs (Deployment by name, or Pod by replica name)
//!     → endpoint.rs + selector.rs (Service selecting that workload)
//!     → destination.rs (port choice, cluster DNS name)
//!     → director.rs (Resolution or Rejection)
//! ```
//!
//! # Design Decisions
//! - Every request re-resolves from live cluster state; nothing is cached
//! - Each cluster query is bounded by its own deadline
//! - First match wins wherever several objects qualify

use std::future::Future;
use std::time::Duration;

use crate::cluster::ClusterError;

pub mod destination;
pub mod director;
pub mod endpoint;
pub mod error;
pub mod path;
pub mod selector;
pub mod workload;

#[cfg(test)]
pub(crate) mod fixtures;

pub use destination::Destination;
pub use director::{Director, Rejection, Resolution, Stage};
pub use error::ResolveError;
pub use workload::{Strategy, Workload};

/// Run one cluster query under `timeout`.
pub(crate) async fn deadline<T, F>(timeout: Duration, query: F) -> Result<T, ResolveError>
where
    F: Future<Output = Result<T, ClusterError>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(result) => result.map_err(ResolveError::from),
        Err(_) => Err(ResolveError::DiscoveryTimeout(timeout)),
    }
}
