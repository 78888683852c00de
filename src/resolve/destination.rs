//! Destination composition from a resolved service.

use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use std::fmt;

use crate::resolve::ResolveError;

/// Port name preferred over positional order.
pub const PREFERRED_PORT_NAME: &str = "http";

/// Upstream location for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub scheme: &'static str,
    pub host: String,
    pub port: u16,
}

impl Destination {
    /// `host:port`, suitable for a URI authority.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Pick the port named `http` (else the first declared one) and address the
/// service through cluster DNS.
pub fn build_destination(service: &Service, cluster_domain: &str) -> Result<Destination, ResolveError> {
    let name = service.name_any();
    let namespace = service.namespace().unwrap_or_else(|| "default".to_string());

    let ports = service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_deref())
        .unwrap_or_default();

    let port = ports
        .iter()
        .find(|p| p.name.as_deref() == Some(PREFERRED_PORT_NAME))
        .or_else(|| ports.first())
        .ok_or_else(|| ResolveError::NoPortsDefined {
            namespace: namespace.clone(),
            service: name.clone(),
        })?;

    let port = u16::try_from(port.port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| ResolveError::InvalidPort {
            namespace: namespace.clone(),
            service: name.clone(),
            port: port.port,
        })?;

    Ok(Destination {
        scheme: "http",
        host: format!("{}.{}.svc.{}", name, namespace, cluster_domain),
        port,
    })
}
