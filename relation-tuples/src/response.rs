//! Merging leaf fetch results into one response

use serde::{Serialize, Serializer};
use tracing::warn;

use crate::{
    manager::TuplePage,
    models::InternalRelationTuple,
    proto,
};

/// Whether a response can be resumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// A direct fetch produced the tuples; its token is handed back as-is.
    /// An empty token means there are no further pages.
    SinglePage { next_page_token: String },
    /// Tuples came from a subject-set fan-out or from expansion. Such a
    /// response is a best-effort snapshot and cannot be continued.
    MergedNoPage,
}

impl PageState {
    pub fn next_page_token(&self) -> &str {
        match self {
            Self::SinglePage { next_page_token } => next_page_token,
            Self::MergedNoPage => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResponse {
    pub relation_tuples: Vec<InternalRelationTuple>,
    pub page: PageState,
}

impl GetResponse {
    pub fn single(page: TuplePage) -> Self {
        Self {
            relation_tuples: page.tuples,
            page: PageState::SinglePage {
                next_page_token: page.next_page_token,
            },
        }
    }

    pub fn merged(relation_tuples: Vec<InternalRelationTuple>) -> Self {
        Self {
            relation_tuples,
            page: PageState::MergedNoPage,
        }
    }

    pub fn next_page_token(&self) -> &str {
        self.page.next_page_token()
    }

    pub fn is_empty(&self) -> bool {
        self.relation_tuples.is_empty()
    }

    pub fn to_proto(&self) -> proto::ListRelationTuplesResponse {
        proto::ListRelationTuplesResponse {
            relation_tuples: self
                .relation_tuples
                .iter()
                .map(InternalRelationTuple::to_proto)
                .collect(),
            next_page_token: self.next_page_token().to_string(),
        }
    }
}

impl Serialize for GetResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            relation_tuples: &'a [InternalRelationTuple],
            next_page_token: &'a str,
        }

        Body {
            relation_tuples: &self.relation_tuples,
            next_page_token: self.next_page_token(),
        }
        .serialize(serializer)
    }
}

/// Concatenates the pages of fan-out leaves, in leaf order.
///
/// A fan-out response cannot be continued, whatever the number of leaves.
pub fn merge(pages: Vec<TuplePage>) -> GetResponse {
    let dropped = pages
        .iter()
        .filter(|page| !page.next_page_token.is_empty())
        .count();
    if dropped > 0 {
        warn!(
            leaves = pages.len(),
            dropped,
            "Fan-out leaves had further pages; merged response is not resumable"
        );
    }

    GetResponse::merged(pages.into_iter().flat_map(|page| page.tuples).collect())
}
