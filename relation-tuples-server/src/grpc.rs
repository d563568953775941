use relation_tuples::{proto, ReadService, RelationTupleError, RequestContext};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::debug;

/// Protocol-message read service.
///
/// Holds the call semantics of `ListRelationTuples`; transport wiring is left
/// to whoever mounts it.
#[derive(Clone)]
pub struct ReadServiceImpl {
    read: Arc<ReadService>,
}

impl ReadServiceImpl {
    pub fn new(read: Arc<ReadService>) -> Self {
        Self { read }
    }

    /// # Errors
    ///
    /// Validation failures map to `INVALID_ARGUMENT`, cancellation to
    /// `CANCELLED` and everything else to `INTERNAL`.
    pub async fn list_relation_tuples(
        &self,
        request: Request<proto::ListRelationTuplesRequest>,
    ) -> Result<Response<proto::ListRelationTuplesResponse>, Status> {
        let ctx = RequestContext::new();
        let _cancel_on_drop = ctx.cancellation_token().drop_guard();
        debug!(request_id = %ctx.request_id, "gRPC ListRelationTuples request received");

        let response = self
            .read
            .list_relation_tuples(&ctx, request.get_ref())
            .await
            .map_err(|err| to_status(&err))?;

        Ok(Response::new(response))
    }
}

pub fn to_status(err: &RelationTupleError) -> Status {
    if err.is_validation() {
        return Status::invalid_argument(err.to_string());
    }
    match err {
        RelationTupleError::Cancelled => Status::cancelled(err.to_string()),
        _ => Status::internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ServerConfig, server::RelationTupleServer, writer::JsonResponseWriter};
    use relation_tuples::InMemoryRelationTupleManager;
    use tonic::Code;

    fn service() -> ReadServiceImpl {
        let manager = InMemoryRelationTupleManager::from_seed(
            "
            files:readme#viewer@alice
            files:readme#viewer@bob
            ",
        )
        .unwrap();
        let server = RelationTupleServer::new(ServerConfig::default(), Arc::new(manager), Arc::new(JsonResponseWriter));
        ReadServiceImpl::new(server.read_service())
    }

    #[tokio::test]
    async fn test_list_relation_tuples() {
        let request = proto::ListRelationTuplesRequest {
            query: Some(proto::RelationQuery {
                namespace: Some("files".to_string()),
                ..Default::default()
            }),
            page_size: 1,
            page_token: String::new(),
        };

        let response = service().list_relation_tuples(Request::new(request)).await.unwrap().into_inner();
        assert_eq!(response.relation_tuples.len(), 1);
        assert!(!response.next_page_token.is_empty());
    }

    #[tokio::test]
    async fn test_missing_query_is_invalid_argument() {
        let request = proto::ListRelationTuplesRequest::default();
        let status = service().list_relation_tuples(Request::new(request)).await.unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "invalid request");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(to_status(&RelationTupleError::Cancelled).code(), Code::Cancelled);
        assert_eq!(to_status(&RelationTupleError::Storage("down".to_string())).code(), Code::Internal);
        assert_eq!(
            to_status(&RelationTupleError::Validation("bad".to_string())).code(),
            Code::InvalidArgument
        );
    }
}
