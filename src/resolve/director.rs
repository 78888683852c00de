//! Per-request resolution pipeline.
//!
//! # States
//! ```text
//! Extract → ResolveWorkload → ResolveEndpoint → BuildDestination → Resolution
//!    └───────────┴─────────────────┴──────────────────┴──→ Rejection
//! ```
//!
//! # Design Decisions
//! - One attempt per request, no retries and no cached results
//! - The inbound request is never touched; the output is a [`Resolution`]
//!   applied once when the outbound request is built
//! - Failures are logged here with their stage and identifier; callers only
//!   see that the request was rejected

use axum::http::uri::{PathAndQuery, Uri};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::cluster::{Cluster, Scope};
use crate::config::DiscoveryConfig;
use crate::observability::metrics;
use crate::resolve::destination::{build_destination, Destination};
use crate::resolve::endpoint::resolve_endpoint;
use crate::resolve::path::{decode_identifier, extract_identifier, strip_instance_prefix};
use crate::resolve::workload::{resolve_workload, Strategy};
use crate::resolve::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    ResolveWorkload,
    ResolveEndpoint,
    BuildDestination,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Extract => "extract",
            Stage::ResolveWorkload => "resolve_workload",
            Stage::ResolveEndpoint => "resolve_endpoint",
            Stage::BuildDestination => "build_destination",
        })
    }
}

/// A request that could not be resolved.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct Rejection {
    pub stage: Stage,
    pub identifier: Option<String>,
    #[source]
    pub source: ResolveError,
}

/// Where and how to forward one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identifier: String,
    pub namespace: String,
    pub service: String,
    pub destination: Destination,
    /// Upstream path with the instance prefix removed, query preserved.
    pub path_and_query: PathAndQuery,
}

impl Resolution {
    pub fn uri(&self) -> Result<Uri, axum::http::Error> {
        Uri::builder()
            .scheme(self.destination.scheme)
            .authority(self.destination.authority())
            .path_and_query(self.path_and_query.clone())
            .build()
    }
}

pub struct Director {
    cluster: Arc<dyn Cluster>,
    strategy: Strategy,
    scope: Scope,
    timeout: Duration,
    cluster_domain: String,
}

impl Director {
    pub fn new(cluster: Arc<dyn Cluster>, config: &DiscoveryConfig) -> Self {
        Self {
            cluster,
            strategy: config.strategy,
            scope: Scope::from_namespace(config.namespace.as_deref()),
            timeout: config.timeout(),
            cluster_domain: config.cluster_domain.clone(),
        }
    }

    /// Resolve the destination for a request URI.
    pub async fn resolve(&self, uri: &Uri) -> Result<Resolution, Rejection> {
        let start = Instant::now();
        let result = self.run(uri).await;
        metrics::record_resolution(start, result.as_ref().err().map(|r| &r.source));

        match &result {
            Ok(resolution) => tracing::debug!(
                identifier = %resolution.identifier,
                namespace = %resolution.namespace,
                service = %resolution.service,
                destination = %resolution.destination,
                path = %resolution.path_and_query,
                "Resolved instance"
            ),
            Err(rejection) => tracing::warn!(
                stage = %rejection.stage,
                identifier = rejection.identifier.as_deref().unwrap_or("-"),
                kind = rejection.source.kind(),
                error = %rejection.source,
                "Resolution failed"
            ),
        }
        result
    }

    async fn run(&self, uri: &Uri) -> Result<Resolution, Rejection> {
        let path = uri.path();
        let segment = extract_identifier(path).map_err(|source| Rejection {
            stage: Stage::Extract,
            identifier: None,
            source,
        })?;
        let identifier = decode_identifier(segment, path).map_err(|source| Rejection {
            stage: Stage::Extract,
            identifier: Some(segment.to_string()),
            source,
        })?;
        let identifier: &str = &identifier;
        let reject = |stage: Stage| {
            move |source: ResolveError| Rejection {
                stage,
                identifier: Some(identifier.to_string()),
                source,
            }
        };

        let workload = resolve_workload(
            self.cluster.as_ref(),
            self.strategy,
            &self.scope,
            identifier,
            self.timeout,
        )
        .await
        .map_err(reject(Stage::ResolveWorkload))?;

        let service = resolve_endpoint(self.cluster.as_ref(), &workload, self.timeout)
            .await
            .map_err(reject(Stage::ResolveEndpoint))?;

        let destination =
            build_destination(&service, &self.cluster_domain).map_err(reject(Stage::BuildDestination))?;

        let rest = strip_instance_prefix(path, segment);
        let path_and_query = match uri.query() {
            Some(query) => format!("{}?{}", rest, query),
            None => rest.to_string(),
        };
        let path_and_query = PathAndQuery::try_from(path_and_query)
            .map_err(|_| reject(Stage::Extract)(ResolveError::InvalidPathFormat(path.to_string())))?;

        Ok(Resolution {
            identifier: identifier.to_string(),
            namespace: workload.namespace(),
            service: kube::ResourceExt::name_any(&service),
            destination,
            path_and_query,
        })
    }
}
