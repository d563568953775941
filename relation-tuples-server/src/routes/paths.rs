//! Route path constants shared by the router and its tests

/// Liveness endpoint
pub const HEALTH: &str = "/health";

/// Read API endpoints
pub mod relation_tuples {
    pub const RELATION_TUPLES: &str = "/relation-tuples";
}
