use std::sync::Arc;
use tracing::debug;

use crate::{
    context::RequestContext,
    error::Result,
    manager::RelationTupleManager,
    models::{InternalRelationTuple, RelationQuery},
    pagination::with_size,
    read::fetch,
    response::GetResponse,
};

/// Number of expansion passes run for `up=all`
pub const EXPANSION_ROUNDS: usize = 2;

/// Replaces subject-set tuples by the tuples their subject set resolves to,
/// one level per pass.
///
/// This is a fixed-depth convenience, not a userset rewrite: passes are not
/// repeated until a fixed point, cycles are not detected and fan-out per pass
/// is not bounded. Indirection deeper than the configured number of rounds is
/// left unexpanded.
pub struct TransitiveResolver {
    manager: Arc<dyn RelationTupleManager>,
    page_size: i64,
}

impl TransitiveResolver {
    pub fn new(manager: Arc<dyn RelationTupleManager>, page_size: i64) -> Self {
        Self { manager, page_size }
    }

    /// Run `rounds` passes over `response`. The expanded response cannot be
    /// paginated further.
    ///
    /// # Errors
    ///
    /// The first failing fetch aborts the whole expansion.
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        response: GetResponse,
        rounds: usize,
    ) -> Result<GetResponse> {
        let mut tuples = response.relation_tuples;
        for round in 1..=rounds {
            tuples = self.expand_once(ctx, tuples).await?;
            debug!(request_id = %ctx.request_id, round, tuples = tuples.len(), "Expansion pass complete");
        }
        Ok(GetResponse::merged(tuples))
    }

    /// One pass: concrete subjects are kept, each subject set is swapped for
    /// the tuples granting its relation, and kept when none exist.
    ///
    /// # Errors
    ///
    /// Propagates the first fetch failure.
    pub async fn expand_once(
        &self,
        ctx: &RequestContext,
        tuples: Vec<InternalRelationTuple>,
    ) -> Result<Vec<InternalRelationTuple>> {
        let mut expanded = Vec::with_capacity(tuples.len());

        for tuple in tuples {
            let query = match tuple.subject_set() {
                Some(set) => RelationQuery::members_of(set),
                None => {
                    expanded.push(tuple);
                    continue;
                }
            };

            let members = fetch(self.manager.as_ref(), ctx, query, &[with_size(self.page_size)]).await?;
            if members.is_empty() {
                expanded.push(tuple);
            } else {
                expanded.extend(members.relation_tuples);
            }
        }

        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::InMemoryRelationTupleManager;
    use crate::pagination::DEFAULT_PAGE_SIZE;

    fn resolver(seed: &str) -> TransitiveResolver {
        let manager = InMemoryRelationTupleManager::from_seed(seed).unwrap();
        TransitiveResolver::new(Arc::new(manager), DEFAULT_PAGE_SIZE)
    }

    fn tuples(lines: &[&str]) -> Vec<InternalRelationTuple> {
        lines.iter().map(|line| line.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_terminals_are_untouched() {
        let resolver = resolver("files:readme#viewer@alice");
        let ctx = RequestContext::new();
        let input = tuples(&["files:readme#viewer@alice", "files:notes#viewer@bob"]);

        let mut current = input.clone();
        for _ in 0..4 {
            current = resolver.expand_once(&ctx, current).await.unwrap();
        }
        assert_eq!(current, input);
    }

    #[tokio::test]
    async fn test_unresolvable_subject_set_is_kept() {
        let resolver = resolver("files:readme#viewer@alice");
        let ctx = RequestContext::new();
        let input = tuples(&["files:readme#viewer@groups:empty#member"]);

        let output = resolver.expand_once(&ctx, input.clone()).await.unwrap();
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn test_subject_set_is_replaced_in_place() {
        let resolver = resolver(
            "
            groups:dev#member@dave
            groups:dev#member@erin
            ",
        );
        let ctx = RequestContext::new();
        let input = tuples(&[
            "files:readme#viewer@alice",
            "files:readme#viewer@groups:dev#member",
            "files:readme#viewer@zoe",
        ]);

        let output = resolver.expand_once(&ctx, input).await.unwrap();
        assert_eq!(
            output,
            tuples(&[
                "files:readme#viewer@alice",
                "groups:dev#member@dave",
                "groups:dev#member@erin",
                "files:readme#viewer@zoe",
            ])
        );
    }

    #[tokio::test]
    async fn test_resolve_stops_after_configured_rounds() {
        let resolver = resolver(
            "
            b:b#r@c:c#r
            c:c#r@d:d#r
            d:d#r@zed
            ",
        );
        let ctx = RequestContext::new();
        let start = GetResponse::merged(tuples(&["a:a#r@b:b#r"]));

        let after_two = resolver.resolve(&ctx, start.clone(), EXPANSION_ROUNDS).await.unwrap();
        assert_eq!(after_two.relation_tuples, tuples(&["c:c#r@d:d#r"]));

        let after_three = resolver.resolve(&ctx, start, 3).await.unwrap();
        assert_eq!(after_three.relation_tuples, tuples(&["d:d#r@zed"]));
    }
}
