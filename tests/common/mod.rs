//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{body::Body, http::Request, Json, Router};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use instance_proxy::cluster::InMemoryCluster;
use instance_proxy::lifecycle::Shutdown;
use instance_proxy::{HttpServer, ProxyConfig};

/// Start a backend that answers every request with a JSON description of it.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(request: Request<Body>) -> Json<Value> {
        let headers: serde_json::Map<String, Value> = request
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    Value::String(value.to_str().unwrap_or_default().to_string()),
                )
            })
            .collect();

        Json(json!({
            "method": request.method().as_str(),
            "uri": request.uri().to_string(),
            "headers": headers,
        }))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, Router::new().fallback(echo)).await;
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Running proxy plus the handle that stops it.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Arc<Shutdown>,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy on an ephemeral port. Every `*.svc.cluster.local` host in
/// `hosts` resolves to loopback.
pub async fn start_proxy(mut config: ProxyConfig, cluster: InMemoryCluster, hosts: &[&str]) -> TestProxy {
    for host in hosts {
        config
            .forwarding
            .resolve_overrides
            .insert(host.to_string(), "127.0.0.1".parse().unwrap());
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(config, Arc::new(cluster));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestProxy { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn object<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

pub fn deployment(namespace: &str, name: &str, match_labels: Value) -> Deployment {
    object(json!({
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "selector": { "matchLabels": match_labels }, "template": {} }
    }))
}

pub fn pod(namespace: &str, name: &str, labels: Value) -> Pod {
    object(json!({
        "metadata": { "name": name, "namespace": namespace, "labels": labels }
    }))
}

pub fn service(namespace: &str, name: &str, selector: Value, port: u16) -> Service {
    object(json!({
        "metadata": { "name": name, "namespace": namespace },
        "spec": {
            "selector": selector,
            "ports": [{ "name": "http", "port": port }]
        }
    }))
}

pub fn service_without_ports(namespace: &str, name: &str, selector: Value) -> Service {
    object(json!({
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "selector": selector, "ports": [] }
    }))
}
