//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → resolve::Director (instance → destination)
//!     → forward.rs + headers.rs (rewrite once, stream upstream)
//!     → response.rs (fixed responses for rejected requests)
//!     → Send to client
//! ```

pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Transport;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ERROR_PATH;
pub use server::HttpServer;
