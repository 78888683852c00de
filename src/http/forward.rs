//! Forwarding transport.
//!
//! # Responsibilities
//! - Apply a [`Resolution`] to the inbound request exactly once
//! - Stream the request to the destination and the response back
//! - Map transport failures to a fixed proxy error response
//!
//! # Design Decisions
//! - Pooled hyper-util client shared by all requests
//! - Host names go through [`DestinationResolver`]: static overrides first,
//!   then system DNS
//! - Bodies are never buffered

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Version},
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{
        connect::{
            dns::{GaiResolver, Name},
            HttpConnector,
        },
        Client,
    },
    rt::TokioExecutor,
};
use std::collections::BTreeMap;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

use crate::config::ForwardingConfig;
use crate::http::headers::{append_forwarded_for, set_default_user_agent, strip_hop_by_hop};
use crate::http::request::request_id;
use crate::http::response::proxy_error;
use crate::observability::metrics::{self, Outcome};
use crate::resolve::Resolution;

/// DNS resolution for upstream hosts with static overrides.
#[derive(Clone)]
pub struct DestinationResolver {
    overrides: Arc<BTreeMap<String, IpAddr>>,
    system: GaiResolver,
}

impl DestinationResolver {
    pub fn new(overrides: BTreeMap<String, IpAddr>) -> Self {
        Self {
            overrides: Arc::new(overrides),
            system: GaiResolver::new(),
        }
    }
}

impl Service<Name> for DestinationResolver {
    type Response = std::vec::IntoIter<SocketAddr>;
    type Error = std::io::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.system.poll_ready(cx)
    }

    fn call(&mut self, name: Name) -> Self::Future {
        // The connector fills in the port from the destination URI.
        if let Some(ip) = self.overrides.get(name.as_str()) {
            let addrs = vec![SocketAddr::new(*ip, 0)];
            return Box::pin(async move { Ok(addrs.into_iter()) });
        }

        let lookup = self.system.call(name);
        Box::pin(async move { Ok(lookup.await?.collect::<Vec<_>>().into_iter()) })
    }
}

#[derive(Clone)]
pub struct Transport {
    client: Client<HttpConnector<DestinationResolver>, Body>,
    default_user_agent: axum::http::HeaderValue,
}

impl Transport {
    pub fn new(config: &ForwardingConfig) -> Self {
        let mut connector = HttpConnector::new_with_resolver(DestinationResolver::new(
            config.resolve_overrides.clone(),
        ));
        connector.set_connect_timeout(Some(config.connect_timeout()));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        let default_user_agent = axum::http::HeaderValue::from_str(&config.default_user_agent)
            .unwrap_or_else(|_| axum::http::HeaderValue::from_static(""));

        Self {
            client,
            default_user_agent,
        }
    }

    /// Forward `request` to the resolved destination.
    pub async fn forward(&self, request: Request<Body>, resolution: &Resolution) -> Response {
        let request_id = request_id(&request).to_string();
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let uri = match resolution.uri() {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Invalid upstream URI");
                metrics::record_request(Outcome::UpstreamError);
                return proxy_error().into_response();
            }
        };

        let (mut parts, body) = request.into_parts();
        parts.uri = uri;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        if let Some(ip) = client_ip {
            append_forwarded_for(&mut parts.headers, ip);
        }
        set_default_user_agent(&mut parts.headers, &self.default_user_agent);

        tracing::info!(
            request_id = %request_id,
            identifier = %resolution.identifier,
            upstream = %parts.uri,
            "Proxying request"
        );

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => {
                metrics::record_request(Outcome::Forwarded);
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    destination = %resolution.destination,
                    error = %e,
                    "Proxy error"
                );
                metrics::record_request(Outcome::UpstreamError);
                proxy_error().into_response()
            }
        }
    }
}
