use axum::{extract::State, response::Json};
use serde::Serialize;
use std::collections::HashMap;

use crate::server::RelationTupleServer;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: u64,
    pub checks: HashMap<String, String>,
}

/// Health check handler
pub async fn health_check(State(server): State<RelationTupleServer>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    checks.insert("read_service".to_string(), "healthy".to_string());
    checks.insert(
        "expansion_rounds".to_string(),
        server.read().options().expansion_rounds.to_string(),
    );

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
        checks,
    })
}
