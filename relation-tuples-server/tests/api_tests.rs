//! HTTP tests for the read API
//!
//! The router is driven in-process with `oneshot`; no socket is opened.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use relation_tuples::{
    InMemoryRelationTupleManager, PaginationOption, RelationQuery, RelationTupleError, RelationTupleManager,
    RequestContext, TuplePage,
};
use relation_tuples_server::{create_app, JsonResponseWriter, RelationTupleServer, ServerConfig};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

const SEED: &str = "
files:readme#viewer@alice
files:readme#viewer@groups:dev#member
files:notes#viewer@groups:ops#member
groups:dev#member@bob
groups:ops#member@carol
";

fn create_test_app() -> Router {
    let manager = InMemoryRelationTupleManager::from_seed(SEED).unwrap();
    let server = RelationTupleServer::new(ServerConfig::default(), Arc::new(manager), Arc::new(JsonResponseWriter));
    create_app(server)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn subjects(body: &Value) -> Vec<String> {
    body["relation_tuples"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tuple| match tuple.get("subject_id") {
            Some(id) => id.as_str().unwrap().to_string(),
            None => format!(
                "{}:{}#{}",
                tuple["subject_set"]["namespace"].as_str().unwrap(),
                tuple["subject_set"]["object"].as_str().unwrap(),
                tuple["subject_set"]["relation"].as_str().unwrap()
            ),
        })
        .collect()
}

/// Always fails, standing in for an unavailable store
struct FailingManager;

#[async_trait::async_trait]
impl RelationTupleManager for FailingManager {
    async fn get_relation_tuples(
        &self,
        _ctx: &RequestContext,
        _query: &RelationQuery,
        _options: &[PaginationOption],
    ) -> relation_tuples::Result<TuplePage> {
        Err(RelationTupleError::Storage("store unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(create_test_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["expansion_rounds"], "2");
}

#[tokio::test]
async fn test_get_relations_direct() {
    let (status, body) = get(create_test_app(), "/relation-tuples?namespace=files&object=readme").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(subjects(&body), ["alice", "groups:dev#member"]);
    assert_eq!(body["next_page_token"], "");
}

#[tokio::test]
async fn test_get_relations_paginates() {
    let (status, body) = get(create_test_app(), "/relation-tuples?namespace=files&page_size=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["relation_tuples"].as_array().unwrap().len(), 1);
    let token = body["next_page_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let (_, next) = get(
        create_test_app(),
        &format!("/relation-tuples?namespace=files&page_size=1&page_token={token}"),
    )
    .await;
    assert_ne!(subjects(&next), subjects(&body));
}

#[tokio::test]
async fn test_get_relations_fan_out() {
    let (status, body) = get(
        create_test_app(),
        "/relation-tuples?namespace=files&subject_set.namespace=groups&subject_set.object=dev%2Cops&subject_set.relation=member",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(subjects(&body), ["groups:dev#member", "groups:ops#member"]);
    assert_eq!(body["next_page_token"], "");
}

#[tokio::test]
async fn test_get_relations_expands() {
    let (status, body) = get(create_test_app(), "/relation-tuples?namespace=files&object=readme&up=all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(subjects(&body), ["alice", "bob"]);
}

#[tokio::test]
async fn test_invalid_page_size_is_bad_request() {
    let (status, body) = get(create_test_app(), "/relation-tuples?namespace=files&page_size=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "bad_request");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_store_failure_is_bad_request() {
    let server = RelationTupleServer::new(
        ServerConfig::default(),
        Arc::new(FailingManager),
        Arc::new(JsonResponseWriter),
    );
    let (status, body) = get(create_app(server), "/relation-tuples?namespace=files").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("store unavailable"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, body) = get(create_test_app(), "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "not_found");
}

#[tokio::test]
async fn test_from_config_loads_seed_file() {
    let mut seed = tempfile::NamedTempFile::new().unwrap();
    writeln!(seed, "// seed\nfiles:readme#owner@dana").unwrap();

    let mut config = ServerConfig::default();
    config.seed.file = Some(seed.path().to_path_buf());
    let server = RelationTupleServer::from_config(config).unwrap();

    let (status, body) = get(create_app(server), "/relation-tuples?namespace=files&relation=owner").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subjects(&body), ["dana"]);
}

#[tokio::test]
async fn test_from_config_rejects_bad_seed() {
    let mut seed = tempfile::NamedTempFile::new().unwrap();
    writeln!(seed, "not a tuple").unwrap();

    let mut config = ServerConfig::default();
    config.seed.file = Some(seed.path().to_path_buf());

    assert!(RelationTupleServer::from_config(config).is_err());
}

#[tokio::test]
async fn test_from_config_rejects_missing_seed_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServerConfig::default();
    config.seed.file = Some(dir.path().join("missing.seed"));

    let err = RelationTupleServer::from_config(config).err().unwrap();
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.to_string().contains("Cannot read seed file"));
}

#[tokio::test]
async fn test_single_segment_subject_set_has_no_token() {
    let manager = InMemoryRelationTupleManager::from_seed(
        "
        files:readme#viewer@groups:dev#member
        files:roadmap#viewer@groups:dev#member
        ",
    )
    .unwrap();
    let server = RelationTupleServer::new(ServerConfig::default(), Arc::new(manager), Arc::new(JsonResponseWriter));

    let (status, body) = get(
        create_app(server),
        "/relation-tuples?subject_set.namespace=groups&subject_set.object=dev&subject_set.relation=member&page_size=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(subjects(&body), ["groups:dev#member"]);
    assert_eq!(body["next_page_token"], "");
}
