//! Workload lookup by instance identifier.
//!
//! # Strategies
//! - `by-name`: the Deployment whose name equals the identifier
//! - `by-replica-name`: the Pod whose name equals the identifier, found by a
//!   linear scan of every pod in scope
//!
//! Names are not unique across namespaces. When several objects match, the
//! first one in listing order wins; that order is whatever the API server
//! returns and is not stable.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cluster::{Cluster, Scope};
use crate::resolve::{deadline, ResolveError};

/// Workload lookup strategy, chosen once at startup.
///
/// The endpoint lookup is paired with it: Deployments are matched to services
/// by selector equivalence, Pods by label-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    ByName,
    ByReplicaName,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::ByName => f.write_str("by-name"),
            Strategy::ByReplicaName => f.write_str("by-replica-name"),
        }
    }
}

/// The object an identifier resolved to.
#[derive(Debug, Clone)]
pub enum Workload {
    Deployment(Deployment),
    Replica(Pod),
}

impl Workload {
    pub fn name(&self) -> String {
        match self {
            Workload::Deployment(d) => d.name_any(),
            Workload::Replica(p) => p.name_any(),
        }
    }

    pub fn namespace(&self) -> String {
        let namespace = match self {
            Workload::Deployment(d) => d.namespace(),
            Workload::Replica(p) => p.namespace(),
        };
        namespace.unwrap_or_else(|| "default".to_string())
    }
}

pub async fn resolve_workload(
    cluster: &dyn Cluster,
    strategy: Strategy,
    scope: &Scope,
    identifier: &str,
    timeout: Duration,
) -> Result<Workload, ResolveError> {
    let not_found = || ResolveError::WorkloadNotFound {
        identifier: identifier.to_string(),
        scope: scope.to_string(),
    };

    match strategy {
        Strategy::ByName => {
            let deployments = deadline(timeout, cluster.deployments_named(scope, identifier)).await?;
            deployments
                .into_iter()
                .next()
                .map(Workload::Deployment)
                .ok_or_else(not_found)
        }
        Strategy::ByReplicaName => {
            let pods = deadline(timeout, cluster.list_pods(scope)).await?;
            pods.into_iter()
                .find(|p| p.metadata.name.as_deref() == Some(identifier))
                .map(Workload::Replica)
                .ok_or_else(not_found)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::InMemoryCluster;
    use crate::resolve::fixtures::{deployment, pod};
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn cluster() -> InMemoryCluster {
        InMemoryCluster::new()
            .with_deployment(deployment("default", "web-1", json!({"app": "web"})))
            .with_deployment(deployment("apps", "api", json!({"app": "api"})))
            .with_pod(pod("default", "web-1-7d9f-abcde", json!({"app": "web"})))
            .with_pod(pod("apps", "api-5c4b-xyz", json!({"app": "api"})))
    }

    #[tokio::test]
    async fn test_by_name() {
        let workload = resolve_workload(&cluster(), Strategy::ByName, &Scope::All, "web-1", TIMEOUT)
            .await
            .unwrap();

        assert!(matches!(workload, Workload::Deployment(_)));
        assert_eq!(workload.name(), "web-1");
        assert_eq!(workload.namespace(), "default");
    }

    #[tokio::test]
    async fn test_by_name_respects_scope() {
        let scope = Scope::Namespace("default".into());
        let err = resolve_workload(&cluster(), Strategy::ByName, &scope, "api", TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::WorkloadNotFound { identifier, .. } if identifier == "api"));
    }

    #[tokio::test]
    async fn test_by_name_does_not_match_pods() {
        let err = resolve_workload(&cluster(), Strategy::ByName, &Scope::All, "web-1-7d9f-abcde", TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::WorkloadNotFound { .. }));
    }

    #[tokio::test]
    async fn test_by_replica_name() {
        let workload = resolve_workload(
            &cluster(),
            Strategy::ByReplicaName,
            &Scope::All,
            "api-5c4b-xyz",
            TIMEOUT,
        )
        .await
        .unwrap();

        assert!(matches!(workload, Workload::Replica(_)));
        assert_eq!(workload.namespace(), "apps");
    }

    #[tokio::test]
    async fn test_by_replica_name_requires_exact_match() {
        for identifier in ["web-1", "api-5c4b", "API-5C4B-XYZ"] {
            let err = resolve_workload(&cluster(), Strategy::ByReplicaName, &Scope::All, identifier, TIMEOUT)
                .await
                .unwrap_err();
            assert!(matches!(err, ResolveError::WorkloadNotFound { .. }), "{}", identifier);
        }
    }

    #[tokio::test]
    async fn test_slow_cluster_times_out() {
        let cluster = cluster().with_latency(Duration::from_millis(200));
        for strategy in [Strategy::ByName, Strategy::ByReplicaName] {
            let err = resolve_workload(&cluster, strategy, &Scope::All, "web-1", Duration::from_millis(20))
                .await
                .unwrap_err();
            assert!(matches!(err, ResolveError::DiscoveryTimeout(_)), "{}", strategy);
        }
    }
}
