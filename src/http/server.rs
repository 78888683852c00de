//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and error handlers
//! - Wire up middleware (tracing, request ID, optional timeout)
//! - Bind server to listener
//! - Dispatch `/instance/<id>` requests to the director
//! - Forward resolved requests to upstream services

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cluster::Cluster;
use crate::config::ProxyConfig;
use crate::http::forward::Transport;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::response::{error_handler, ERROR_PATH};
use crate::resolve::Director;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub director: Arc<Director>,
    pub transport: Transport,
}

/// HTTP server for the instance proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server resolving against `cluster`.
    pub fn new(config: ProxyConfig, cluster: Arc<dyn Cluster>) -> Self {
        let state = AppState {
            director: Arc::new(Director::new(cluster, &config.discovery)),
            transport: Transport::new(&config.forwarding),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/instance/{*rest}", any(proxy_handler))
            .route(ERROR_PATH, any(error_handler))
            .fallback(error_handler)
            .with_state(state);

        let router = match config.forwarding.request_timeout_secs {
            Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => router,
        };

        router
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The fully layered router, for serving without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = %self.config.discovery.strategy,
            namespace = self.config.discovery.namespace.as_deref().unwrap_or("*"),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the instance and forward, or answer with the error handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.director.resolve(request.uri()).await {
        Ok(resolution) => state.transport.forward(request, &resolution).await,
        Err(_) => error_handler().await.into_response(),
    }
}
