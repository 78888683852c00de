//! Dynamic reverse proxy for per-instance cluster workloads.
//!
//! Requests to `/instance/<id>/<rest>` are matched to a workload, the workload
//! to its Service, and the Service to an in-cluster URL. The request is then
//! forwarded there with `<rest>` as its path.

pub mod cluster;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolve;

pub use cluster::Cluster;
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolve::Director;
