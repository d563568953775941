pub mod paths;

use axum::{http::Uri, routing::get, Router};

use crate::{
    error::ApiError,
    handlers::{health, relation_tuples},
    server::RelationTupleServer,
};

/// Create health check routes
pub fn health_routes() -> Router<RelationTupleServer> {
    Router::new().route(paths::HEALTH, get(health::health_check))
}

/// Create relation tuple read routes
pub fn relation_tuple_routes() -> Router<RelationTupleServer> {
    Router::new().route(
        paths::relation_tuples::RELATION_TUPLES,
        get(relation_tuples::get_relations),
    )
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("route {}", uri.path()))
}

pub fn create_routes() -> Router<RelationTupleServer> {
    Router::new()
        .merge(health_routes())
        .merge(relation_tuple_routes())
        .fallback(not_found)
}
