//! Relation tuple server - HTTP front end of the read API
//!
//! Exposes `GET /relation-tuples` and `GET /health` over axum. The protocol
//! message path lives in [`grpc`].

pub mod config;
pub mod error;
pub mod grpc;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod writer;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::*;
pub use server::RelationTupleServer;
pub use writer::{JsonResponseWriter, ResponseWriter};

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: RelationTupleServer) -> Router {
    routes::create_routes()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(server)
}
