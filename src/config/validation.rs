//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("discovery.timeout_secs must be greater than zero")]
    ZeroDiscoveryTimeout,

    #[error("discovery.namespace must not be empty when set")]
    EmptyNamespace,

    #[error("discovery.cluster_domain must not be empty")]
    EmptyClusterDomain,

    #[error("forwarding.request_timeout_secs must be greater than zero when set")]
    ZeroRequestTimeout,

    #[error("forwarding.connect_timeout_secs must be greater than zero")]
    ZeroConnectTimeout,

    #[error("forwarding.default_user_agent is not a valid header value")]
    UserAgent,
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.discovery.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDiscoveryTimeout);
    }

    if matches!(config.discovery.namespace.as_deref(), Some(ns) if ns.trim().is_empty()) {
        errors.push(ValidationError::EmptyNamespace);
    }

    if config.discovery.cluster_domain.trim().is_empty() {
        errors.push(ValidationError::EmptyClusterDomain);
    }

    if config.forwarding.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.forwarding.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if HeaderValue::from_str(&config.forwarding.default_user_agent).is_err() {
        errors.push(ValidationError::UserAgent);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
