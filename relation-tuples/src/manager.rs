use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::{
    context::RequestContext,
    error::{RelationTupleError, Result},
    models::{InternalRelationTuple, RelationQuery, Subject, SubjectSet, SubjectSpec},
    pagination::{PaginationOption, PaginationOptions},
};

/// Page size the in-memory store uses when the caller expresses no preference
pub const DEFAULT_STORE_PAGE_SIZE: usize = 100;

/// One page of tuples returned by the storage collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TuplePage {
    pub tuples: Vec<InternalRelationTuple>,
    /// Empty when there are no further pages
    pub next_page_token: String,
}

/// Storage collaborator: the only source of truth for matching semantics,
/// ordering and consistency. Callers never re-filter or re-sort its output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationTupleManager: Send + Sync {
    /// Fetch one page of tuples matching `query`.
    async fn get_relation_tuples(
        &self,
        ctx: &RequestContext,
        query: &RelationQuery,
        options: &[PaginationOption],
    ) -> Result<TuplePage>;
}

/// In-memory tuple store for development and tests.
///
/// Tuples are kept ordered; empty query fields act as wildcards.
#[derive(Debug)]
pub struct InMemoryRelationTupleManager {
    tuples: RwLock<BTreeSet<InternalRelationTuple>>,
}

impl InMemoryRelationTupleManager {
    pub fn new() -> Self {
        Self {
            tuples: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn with_tuples(tuples: impl IntoIterator<Item = InternalRelationTuple>) -> Self {
        let manager = Self::new();
        manager.write_relation_tuples(tuples);
        manager
    }

    /// Parse tuples in their string form, one per line. Blank lines and
    /// `//` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RelationTupleError::InvalidTuple`] for the first malformed line.
    pub fn from_seed(seed: &str) -> Result<Self> {
        let tuples = seed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .map(|line| line.parse::<InternalRelationTuple>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::with_tuples(tuples))
    }

    /// # Errors
    ///
    /// Fails when the file cannot be read or contains a malformed tuple.
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let seed = std::fs::read_to_string(path).map_err(|e| RelationTupleError::SeedFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_seed(&seed)
    }

    pub fn write_relation_tuples(&self, tuples: impl IntoIterator<Item = InternalRelationTuple>) {
        let mut store = self.tuples.write();
        store.extend(tuples);
    }

    pub fn len(&self) -> usize {
        self.tuples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.read().is_empty()
    }
}

impl Default for InMemoryRelationTupleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelationTupleManager for InMemoryRelationTupleManager {
    async fn get_relation_tuples(
        &self,
        ctx: &RequestContext,
        query: &RelationQuery,
        options: &[PaginationOption],
    ) -> Result<TuplePage> {
        if ctx.is_cancelled() {
            return Err(RelationTupleError::Cancelled);
        }

        let options = PaginationOptions::from_options(options);
        let size = options
            .size
            .and_then(|size| usize::try_from(size).ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_STORE_PAGE_SIZE);
        let offset = options.token().map(decode_page_token).transpose()?.unwrap_or(0);

        let mut tuples: Vec<InternalRelationTuple> = self
            .tuples
            .read()
            .iter()
            .filter(|tuple| query_matches(query, tuple))
            .skip(offset)
            .take(size.saturating_add(1))
            .cloned()
            .collect();

        let next_page_token = if tuples.len() > size {
            tuples.truncate(size);
            encode_page_token(offset.saturating_add(size))
        } else {
            String::new()
        };

        debug!(
            request_id = %ctx.request_id,
            ?query,
            offset,
            size,
            returned = tuples.len(),
            "Read relation tuples from memory"
        );

        Ok(TuplePage {
            tuples,
            next_page_token,
        })
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern.is_empty() || pattern == value
}

fn subject_matches(pattern: &SubjectSpec, subject: &Subject) -> bool {
    match (pattern, subject) {
        (SubjectSpec::Unspecified, _) => true,
        (SubjectSpec::Id(expected), Subject::Id(actual)) => expected == actual,
        (SubjectSpec::Set(expected), Subject::Set(actual)) => subject_set_matches(expected, actual),
        _ => false,
    }
}

fn subject_set_matches(pattern: &SubjectSet, set: &SubjectSet) -> bool {
    field_matches(&pattern.namespace, &set.namespace)
        && field_matches(&pattern.object, &set.object)
        && field_matches(&pattern.relation, &set.relation)
}

fn query_matches(query: &RelationQuery, tuple: &InternalRelationTuple) -> bool {
    field_matches(&query.namespace, &tuple.namespace)
        && field_matches(&query.object, &tuple.object)
        && field_matches(&query.relation, &tuple.relation)
        && subject_matches(&query.subject, &tuple.subject)
}

fn encode_page_token(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(format!("offset:{offset}"))
}

fn decode_page_token(token: &str) -> Result<usize> {
    let malformed = || RelationTupleError::MalformedPageToken(token.to_string());

    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| malformed())?;
    let decoded = String::from_utf8(bytes).map_err(|_| malformed())?;
    decoded
        .strip_prefix("offset:")
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{with_size, with_token};

    fn seeded() -> InMemoryRelationTupleManager {
        InMemoryRelationTupleManager::from_seed(
            "
            // documents
            files:readme#viewer@alice
            files:readme#viewer@bob
            files:readme#viewer@groups:dev#member
            files:notes#owner@carol

            groups:dev#member@dave
            ",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_matching() {
        let manager = seeded();
        let ctx = RequestContext::new();
        assert_eq!(manager.len(), 5);

        let page = manager
            .get_relation_tuples(&ctx, &RelationQuery::new("files", "readme", ""), &[])
            .await
            .unwrap();
        assert_eq!(page.tuples.len(), 3);
        assert!(page.next_page_token.is_empty());

        let query = RelationQuery::new("files", "", "").with_subject(SubjectSpec::Id("carol".to_string()));
        let page = manager.get_relation_tuples(&ctx, &query, &[]).await.unwrap();
        assert_eq!(page.tuples, vec!["files:notes#owner@carol".parse().unwrap()]);

        let query = RelationQuery::new("files", "", "").with_subject(SubjectSpec::Set(SubjectSet::new("groups", "dev", "")));
        let page = manager.get_relation_tuples(&ctx, &query, &[]).await.unwrap();
        assert_eq!(page.tuples.len(), 1);
        assert!(page.tuples[0].subject_set().is_some());
    }

    #[tokio::test]
    async fn test_in_memory_pagination() {
        let manager = seeded();
        let ctx = RequestContext::new();
        let query = RelationQuery::new("files", "", "");

        let first = manager.get_relation_tuples(&ctx, &query, &[with_size(3)]).await.unwrap();
        assert_eq!(first.tuples.len(), 3);
        assert!(!first.next_page_token.is_empty());

        let second = manager
            .get_relation_tuples(&ctx, &query, &[with_size(3), with_token(first.next_page_token.clone())])
            .await
            .unwrap();
        assert_eq!(second.tuples.len(), 1);
        assert!(second.next_page_token.is_empty());
        assert!(!first.tuples.contains(&second.tuples[0]));
    }

    #[tokio::test]
    async fn test_in_memory_non_positive_size_uses_default() {
        let manager = seeded();
        let ctx = RequestContext::new();

        let page = manager
            .get_relation_tuples(&ctx, &RelationQuery::default(), &[with_size(0), with_token("")])
            .await
            .unwrap();
        assert_eq!(page.tuples.len(), 5);

        let page = manager
            .get_relation_tuples(&ctx, &RelationQuery::default(), &[with_size(-4)])
            .await
            .unwrap();
        assert_eq!(page.tuples.len(), 5);
    }

    #[tokio::test]
    async fn test_in_memory_rejects_bad_token() {
        let manager = seeded();
        let err = manager
            .get_relation_tuples(&RequestContext::new(), &RelationQuery::default(), &[with_token("not a token")])
            .await
            .unwrap_err();

        assert!(matches!(err, RelationTupleError::MalformedPageToken(_)));
        assert!(err.is_collaborator());
    }

    #[tokio::test]
    async fn test_in_memory_honours_cancellation() {
        let manager = seeded();
        let ctx = RequestContext::new();
        ctx.cancellation_token().cancel();

        let err = manager
            .get_relation_tuples(&ctx, &RelationQuery::default(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RelationTupleError::Cancelled));
    }

    #[test]
    fn test_seed_reports_bad_line() {
        let err = InMemoryRelationTupleManager::from_seed("files:readme#viewer@alice\nnot-a-tuple").unwrap_err();
        assert!(matches!(err, RelationTupleError::InvalidTuple { ref input, .. } if input == "not-a-tuple"));
    }

    #[test]
    fn test_write_deduplicates() {
        let manager = InMemoryRelationTupleManager::new();
        assert!(manager.is_empty());
        let tuple: InternalRelationTuple = "files:readme#viewer@alice".parse().unwrap();

        manager.write_relation_tuples([tuple.clone(), tuple]);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_missing_seed_file() {
        let path = Path::new("/nonexistent/relation-tuples.seed");
        let err = InMemoryRelationTupleManager::from_seed_file(path).unwrap_err();

        assert!(matches!(err, RelationTupleError::SeedFile { .. }));
        assert!(!err.is_collaborator());
    }
}
