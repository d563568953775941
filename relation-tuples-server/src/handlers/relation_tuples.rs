use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use relation_tuples::{RequestContext, UrlQuery};

use crate::{error::ApiError, server::RelationTupleServer};

/// `GET /relation-tuples`
///
/// Query-string pairs are handed over in request order so repeated keys keep
/// their first value. Every failure is answered with 400.
pub async fn get_relations(
    State(server): State<RelationTupleServer>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let ctx = RequestContext::new();
    // Dropping the handler (client went away) cancels in-flight fetches
    let _cancel_on_drop = ctx.cancellation_token().drop_guard();

    let Query(pairs) = match pairs {
        Ok(pairs) => pairs,
        Err(rejection) => {
            return server
                .writer()
                .write_error(ctx.request_id, ApiError::bad_request(rejection.body_text()))
        }
    };

    match server.read().get_relations(&ctx, &UrlQuery::new(pairs)).await {
        Ok(response) => server.writer().write(ctx.request_id, &response),
        Err(err) => server
            .writer()
            .write_error(ctx.request_id, ApiError::from_read_error(&err)),
    }
}
