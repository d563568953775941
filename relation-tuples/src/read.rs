use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    context::RequestContext,
    error::{RelationTupleError, Result},
    expand::{TransitiveResolver, EXPANSION_ROUNDS},
    fanout::{self, FetchPlan},
    manager::RelationTupleManager,
    models::RelationQuery,
    pagination::{self, PaginationOption, DEFAULT_PAGE_SIZE},
    proto,
    query::{GetRelationsParams, UrlQuery},
    response::{self, GetResponse},
};

/// Policy knobs of the read handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Page size applied on the form path and to every expansion fetch
    pub default_page_size: i64,
    /// Passes run when `up=all` is requested
    pub expansion_rounds: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            expansion_rounds: EXPANSION_ROUNDS,
        }
    }
}

/// Read side of the relation tuple API.
///
/// Requests are served sequentially against the injected manager; every fetch
/// receives the caller's [`RequestContext`] and the first failure aborts the
/// request.
pub struct ReadService {
    manager: Arc<dyn RelationTupleManager>,
    options: ReadOptions,
}

impl ReadService {
    pub fn new(manager: Arc<dyn RelationTupleManager>) -> Self {
        Self {
            manager,
            options: ReadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    // =============================================================================
    // Protocol path
    // =============================================================================

    /// Single direct fetch; page size and token are forwarded untouched.
    ///
    /// # Errors
    ///
    /// [`RelationTupleError::InvalidRequest`] without a query, validation
    /// errors from the query, or the collaborator's error.
    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_relation_tuples(
        &self,
        ctx: &RequestContext,
        request: &proto::ListRelationTuplesRequest,
    ) -> Result<proto::ListRelationTuplesResponse> {
        let query = request.query.as_ref().ok_or(RelationTupleError::InvalidRequest)?;
        let query = RelationQuery::from_proto(query)?;
        let options = pagination::from_proto(request.page_size, &request.page_token);

        let page = self.manager.get_relation_tuples(ctx, &query, &options).await?;
        info!(tuples = page.tuples.len(), "Listed relation tuples");

        Ok(GetResponse::single(page).to_proto())
    }

    // =============================================================================
    // Form / query-string path
    // =============================================================================

    /// # Errors
    ///
    /// Validation errors from the form fields, or the first collaborator error.
    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn get_relations(&self, ctx: &RequestContext, values: &UrlQuery) -> Result<GetResponse> {
        let params = GetRelationsParams::from_url_query(values, self.options.default_page_size)?;
        self.query_relations(ctx, params).await
    }

    /// Fan out, fetch, merge, then expand when `up=all` was requested and
    /// the first result is non-empty.
    ///
    /// # Errors
    ///
    /// The first collaborator error.
    pub async fn query_relations(&self, ctx: &RequestContext, params: GetRelationsParams) -> Result<GetResponse> {
        let response = fetch(self.manager.as_ref(), ctx, params.query, &params.pagination).await?;

        if response.is_empty() || !params.expand_permissions {
            info!(tuples = response.relation_tuples.len(), "Fetched relation tuples");
            return Ok(response);
        }

        let resolver = TransitiveResolver::new(Arc::clone(&self.manager), self.options.default_page_size);
        let response = resolver
            .resolve(ctx, response, self.options.expansion_rounds)
            .await?;

        info!(
            tuples = response.relation_tuples.len(),
            rounds = self.options.expansion_rounds,
            "Fetched and expanded relation tuples"
        );
        Ok(response)
    }
}

/// Fetch `query`, or each of its fan-out leaves in order.
///
/// Only a direct fetch carries the manager's page token; a fan-out response is
/// merged and never resumable, even with a single leaf.
pub(crate) async fn fetch(
    manager: &dyn RelationTupleManager,
    ctx: &RequestContext,
    query: RelationQuery,
    options: &[PaginationOption],
) -> Result<GetResponse> {
    match fanout::plan(query) {
        FetchPlan::Direct(query) => {
            debug!(request_id = %ctx.request_id, ?query, ?options, "Fetching relation tuples");
            let page = manager.get_relation_tuples(ctx, &query, options).await?;
            Ok(GetResponse::single(page))
        }
        FetchPlan::FanOut(leaves) => {
            let mut pages = Vec::with_capacity(leaves.len());
            for leaf in &leaves {
                debug!(request_id = %ctx.request_id, query = ?leaf, ?options, "Fetching fan-out leaf");
                pages.push(manager.get_relation_tuples(ctx, leaf, options).await?);
            }
            Ok(response::merge(pages))
        }
    }
}
