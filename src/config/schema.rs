//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::resolve::Strategy;

/// Root configuration for the instance proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cluster API client settings.
    pub cluster: ClusterConfig,

    /// Workload and service discovery settings.
    pub discovery: DiscoveryConfig,

    /// Outbound forwarding settings.
    pub forwarding: ForwardingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Cluster API client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClusterConfig {
    /// Path to a kubeconfig file. When unset the client is inferred from
    /// the in-cluster service account or the default kubeconfig.
    pub kubeconfig: Option<PathBuf>,
}

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Which workload/endpoint strategy pairing to use.
    pub strategy: Strategy,

    /// Restrict workload lookups to one namespace (all namespaces if unset).
    pub namespace: Option<String>,

    /// Deadline for each cluster query, in seconds.
    pub timeout_secs: u64,

    /// DNS suffix of the cluster.
    pub cluster_domain: String,
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::ByName,
            namespace: None,
            timeout_secs: 5,
            cluster_domain: "cluster.local".to_string(),
        }
    }
}

/// Forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// User-Agent sent upstream when the client did not send one.
    pub default_user_agent: String,

    /// Static host → IP overrides consulted before system DNS.
    pub resolve_overrides: BTreeMap<String, IpAddr>,

    /// Upstream connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Overall request timeout in seconds (unbounded when unset).
    pub request_timeout_secs: Option<u64>,
}

impl ForwardingConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            default_user_agent: String::new(),
            resolve_overrides: BTreeMap::new(),
            connect_timeout_secs: 5,
            request_timeout_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
