//! Building [`RelationQuery`] values from inbound requests

use crate::{
    error::{RelationTupleError, Result},
    models::{RelationQuery, SubjectSet, SubjectSpec},
    pagination::{self, PaginationOption},
    proto,
};

pub const NAMESPACE_KEY: &str = "namespace";
pub const OBJECT_KEY: &str = "object";
pub const RELATION_KEY: &str = "relation";
pub const SUBJECT_ID_KEY: &str = "subject_id";
pub const SUBJECT_SET_NAMESPACE_KEY: &str = "subject_set.namespace";
pub const SUBJECT_SET_OBJECT_KEY: &str = "subject_set.object";
pub const SUBJECT_SET_RELATION_KEY: &str = "subject_set.relation";
pub const PAGE_TOKEN_KEY: &str = "page_token";
pub const PAGE_SIZE_KEY: &str = "page_size";
/// `up=all` turns on permission expansion
pub const EXPAND_KEY: &str = "up";
pub const EXPAND_ALL: &str = "all";

/// Decoded query-string pairs. Repeated keys resolve to their first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlQuery {
    pairs: Vec<(String, String)>,
}

impl UrlQuery {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    fn value(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UrlQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl RelationQuery {
    /// Builds a query from the protocol message. Absent fields become empty,
    /// which the collaborator treats as "any".
    ///
    /// # Errors
    ///
    /// Returns [`RelationTupleError::Validation`] when a subject is present but
    /// names neither an id nor a subject set.
    pub fn from_proto(query: &proto::RelationQuery) -> Result<Self> {
        let subject = match &query.subject {
            None => SubjectSpec::Unspecified,
            Some(proto::Subject { r#ref: None }) => {
                return Err(RelationTupleError::Validation(
                    "subject must be either a subject id or a subject set".to_string(),
                ))
            }
            Some(proto::Subject { r#ref: Some(proto::subject::Ref::Id(id)) }) => SubjectSpec::Id(id.clone()),
            Some(proto::Subject { r#ref: Some(proto::subject::Ref::Set(set)) }) => {
                SubjectSpec::Set(SubjectSet::from(set.clone()))
            }
        };

        Ok(Self {
            namespace: query.namespace.clone().unwrap_or_default(),
            object: query.object.clone().unwrap_or_default(),
            relation: query.relation.clone().unwrap_or_default(),
            subject,
        })
    }

    /// Builds a query from form fields.
    ///
    /// Any `subject_set.*` key selects the subject-set branch, even when
    /// `subject_id` is also present.
    pub fn from_url_query(values: &UrlQuery) -> Self {
        let has_subject_set = [
            SUBJECT_SET_NAMESPACE_KEY,
            SUBJECT_SET_OBJECT_KEY,
            SUBJECT_SET_RELATION_KEY,
        ]
        .iter()
        .any(|key| values.has(key));

        let subject = if has_subject_set {
            SubjectSpec::Set(SubjectSet {
                namespace: values.value(SUBJECT_SET_NAMESPACE_KEY),
                object: values.value(SUBJECT_SET_OBJECT_KEY),
                relation: values.value(SUBJECT_SET_RELATION_KEY),
            })
        } else if values.has(SUBJECT_ID_KEY) {
            SubjectSpec::Id(values.value(SUBJECT_ID_KEY))
        } else {
            SubjectSpec::Unspecified
        };

        Self {
            namespace: values.value(NAMESPACE_KEY),
            object: values.value(OBJECT_KEY),
            relation: values.value(RELATION_KEY),
            subject,
        }
    }
}

/// Everything the form/query-string read endpoint accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRelationsParams {
    pub query: RelationQuery,
    pub pagination: Vec<PaginationOption>,
    /// Set by `up=all`
    pub expand_permissions: bool,
}

impl GetRelationsParams {
    /// # Errors
    ///
    /// Returns [`RelationTupleError::InvalidPageSize`] when `page_size` is
    /// present but not an integer.
    pub fn from_url_query(values: &UrlQuery, default_page_size: i64) -> Result<Self> {
        let pagination = pagination::from_url_params(
            values.get(PAGE_TOKEN_KEY),
            values.get(PAGE_SIZE_KEY),
            default_page_size,
        )?;

        Ok(Self {
            query: RelationQuery::from_url_query(values),
            pagination,
            expand_permissions: values.get(EXPAND_KEY) == Some(EXPAND_ALL),
        })
    }
}
