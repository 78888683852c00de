//! Instance proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────────┐
//!                          │                  INSTANCE PROXY                   │
//!                          │                                                   │
//!   /instance/<id>/<rest>  │  ┌────────┐    ┌──────────┐    ┌──────────────┐   │
//!   ───────────────────────┼─▶│  http  │───▶│ resolve  │───▶│   cluster    │◀──┼── API server
//!                          │  │ server │    │ director │    │ (kube / mem) │   │
//!                          │  └───┬────┘    └────┬─────┘    └──────────────┘   │
//!                          │      │ rejected     │ resolution                  │
//!                          │      ▼              ▼                             │
//!   404 Service not found  │  ┌────────┐    ┌──────────┐                       │
//!   ◀──────────────────────┼──│ /error │    │ forward  │───────────────────────┼──▶ svc.ns.svc
//!                          │  └────────┘    └──────────┘                       │
//!                          └───────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use instance_proxy::config::loader::{load_config, normalize_bind_address, validate};
use instance_proxy::lifecycle::{signals, startup, Shutdown};
use instance_proxy::observability::{logging, metrics};
use instance_proxy::resolve::Strategy;
use instance_proxy::{HttpServer, ProxyConfig};

#[derive(Debug, Parser)]
#[command(name = "instance-proxy", version, about = "Reverse proxy to per-instance cluster services")]
struct Args {
    /// TOML configuration file. Flags override its values.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. `:8080` or `127.0.0.1:8080`.
    #[arg(long, env = "PROXY_LISTEN")]
    listen: Option<String>,

    /// Restrict discovery to one namespace. All namespaces when unset.
    #[arg(short, long, env = "PROXY_NAMESPACE")]
    namespace: Option<String>,

    /// Kubeconfig path. When unset, the client is inferred from the in-cluster
    /// service account or `KUBECONFIG` (which may list several files).
    #[arg(long, env = "PROXY_KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// How the instance identifier is matched to a workload.
    #[arg(long, value_enum, env = "PROXY_STRATEGY")]
    strategy: Option<Strategy>,

    /// Deadline for each cluster query, in seconds.
    #[arg(long, env = "PROXY_DISCOVERY_TIMEOUT")]
    discovery_timeout_secs: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut ProxyConfig) {
        if let Some(listen) = self.listen {
            config.listener.bind_address = normalize_bind_address(&listen);
        }
        if let Some(namespace) = self.namespace {
            config.discovery.namespace = Some(namespace);
        }
        if let Some(kubeconfig) = self.kubeconfig {
            config.cluster.kubeconfig = Some(kubeconfig);
        }
        if let Some(strategy) = self.strategy {
            config.discovery.strategy = strategy;
        }
        if let Some(secs) = self.discovery_timeout_secs {
            config.discovery.timeout_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = Args::parse();

    let mut config = match args.config.take() {
        Some(path) => load_config(&path)?,
        None => ProxyConfig::default(),
    };
    args.apply(&mut config);
    validate(&config)?;

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "instance-proxy starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = %config.discovery.strategy,
        namespace = config.discovery.namespace.as_deref().unwrap_or("*"),
        discovery_timeout_secs = config.discovery.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let cluster = startup::connect_cluster(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Cluster setup failed");
        e
    })?;

    let listener = TcpListener::bind(&config.listener.bind_address).await.map_err(|e| {
        tracing::error!(address = %config.listener.bind_address, error = %e, "Failed to bind");
        e
    })?;

    let shutdown = Arc::new(Shutdown::new());
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown.clone());

    HttpServer::new(config, cluster).run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
