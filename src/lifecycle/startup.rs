//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the cluster client from configuration
//! - Verify the cluster is reachable before serving: the configured
//!   namespace when there is one, the API server otherwise
//!
//! # Design Decisions
//! - Fail fast: a client that cannot be built or a cluster that cannot be
//!   read is fatal
//! - The probe uses the same deadline as request-time discovery

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cluster::{Cluster, ClusterError, KubeCluster, Scope};
use crate::config::ProxyConfig;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create cluster client: {0}")]
    Client(#[source] ClusterError),

    #[error("failed to access {scope}: {source}")]
    Unreachable {
        scope: Scope,
        #[source]
        source: ClusterError,
    },

    #[error("timed out after {timeout:?} accessing {scope}")]
    Timeout { scope: Scope, timeout: Duration },
}

/// Connect to the cluster described by `config` and probe it.
pub async fn connect_cluster(config: &ProxyConfig) -> Result<Arc<dyn Cluster>, StartupError> {
    let cluster = KubeCluster::connect(&config.cluster)
        .await
        .map_err(StartupError::Client)?;
    let cluster: Arc<dyn Cluster> = Arc::new(cluster);

    probe_cluster(cluster.as_ref(), config).await?;
    Ok(cluster)
}

/// Check that the discovery scope can be read within the discovery timeout.
pub async fn probe_cluster(cluster: &dyn Cluster, config: &ProxyConfig) -> Result<(), StartupError> {
    let scope = Scope::from_namespace(config.discovery.namespace.as_deref());
    let timeout = config.discovery.timeout();

    let check = async {
        match &scope {
            Scope::Namespace(namespace) => cluster.check_namespace(namespace).await,
            Scope::All => cluster.check_access().await,
        }
    };

    match tokio::time::timeout(timeout, check).await {
        Ok(Ok(())) => {
            tracing::info!(%scope, "Cluster reachable");
            Ok(())
        }
        Ok(Err(source)) => Err(StartupError::Unreachable { scope, source }),
        Err(_) => Err(StartupError::Timeout { scope, timeout }),
    }
}
