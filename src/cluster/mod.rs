//! Cluster API collaborator.
//!
//! # Data Flow
//! ```text
//! resolve::workload / resolve::endpoint
//!     → Cluster trait (get by name, list by scope)
//!     → client.rs (kube::Api against the live API server)
//!     → memory.rs (fixed object set, tests and local runs)
//! ```
//!
//! # Design Decisions
//! - One long-lived client injected as `Arc<dyn Cluster>`; no globals
//! - Implementations own their concurrency safety, callers never lock
//! - Deadlines are applied by the caller, not the client

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use thiserror::Error;

pub mod client;
pub mod memory;

pub use client::KubeCluster;
pub use memory::InMemoryCluster;

/// Where a lookup is allowed to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Namespace(String),
}

impl Scope {
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(ns) => Scope::Namespace(ns.to_string()),
            None => Scope::All,
        }
    }

    pub fn contains(&self, namespace: Option<&str>) -> bool {
        match self {
            Scope::All => true,
            Scope::Namespace(ns) => namespace == Some(ns.as_str()),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::All => f.write_str("all namespaces"),
            Scope::Namespace(ns) => write!(f, "namespace {}", ns),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster API request failed: {0}")]
    Api(#[from] kube::Error),

    #[error("failed to load cluster client configuration: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("namespace {0} not found")]
    NamespaceNotFound(String),
}

/// Read-only view of the cluster object graph.
#[async_trait]
pub trait Cluster: Send + Sync {
    /// Deployments whose `metadata.name` is exactly `name`.
    async fn deployments_named(&self, scope: &Scope, name: &str) -> Result<Vec<Deployment>, ClusterError>;

    /// Every pod in scope.
    async fn list_pods(&self, scope: &Scope) -> Result<Vec<Pod>, ClusterError>;

    /// Every service in a namespace.
    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClusterError>;

    /// Succeeds when the namespace exists and is readable.
    async fn check_namespace(&self, namespace: &str) -> Result<(), ClusterError>;

    /// Succeeds when the API server answers with the configured credentials.
    async fn check_access(&self) -> Result<(), ClusterError>;
}
