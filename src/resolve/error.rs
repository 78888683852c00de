//! Resolution failures.

use std::time::Duration;
use thiserror::Error;

use crate::cluster::ClusterError;

/// Why a request could not be resolved to a destination.
///
/// Every variant is terminal for the request that raised it.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid path format: {0}")]
    InvalidPathFormat(String),

    #[error("no workload named {identifier} in {scope}")]
    WorkloadNotFound { identifier: String, scope: String },

    #[error("discovery query exceeded its {0:?} deadline")]
    DiscoveryTimeout(Duration),

    #[error("deployment {namespace}/{workload} has no selector defined")]
    NoSelectorDefined { namespace: String, workload: String },

    #[error("deployment {namespace}/{workload} has an invalid selector: {reason}")]
    InvalidSelector {
        namespace: String,
        workload: String,
        reason: String,
    },

    #[error("pod {namespace}/{workload} has no labels")]
    NoLabelsOnWorkload { namespace: String, workload: String },

    #[error("namespace {namespace} has no services")]
    NoEndpointsInNamespace { namespace: String },

    #[error("no service in namespace {namespace} selects {workload}")]
    EndpointNotFound { namespace: String, workload: String },

    #[error("service {namespace}/{service} has no ports defined")]
    NoPortsDefined { namespace: String, service: String },

    #[error("service {namespace}/{service} declares invalid port {port}")]
    InvalidPort {
        namespace: String,
        service: String,
        port: i32,
    },

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

impl ResolveError {
    /// Stable name of the failure, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::InvalidPathFormat(_) => "invalid_path_format",
            ResolveError::WorkloadNotFound { .. } => "workload_not_found",
            ResolveError::DiscoveryTimeout(_) => "discovery_timeout",
            ResolveError::NoSelectorDefined { .. } => "no_selector_defined",
            ResolveError::InvalidSelector { .. } => "invalid_selector",
            ResolveError::NoLabelsOnWorkload { .. } => "no_labels_on_workload",
            ResolveError::NoEndpointsInNamespace { .. } => "no_endpoints_in_namespace",
            ResolveError::EndpointNotFound { .. } => "endpoint_not_found",
            ResolveError::NoPortsDefined { .. } => "no_ports_defined",
            ResolveError::InvalidPort { .. } => "invalid_port",
            ResolveError::Cluster(_) => "cluster_error",
        }
    }
}
