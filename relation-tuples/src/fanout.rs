//! Splitting a subject set with a list-valued object into disjunctive leaf
//! queries

use crate::models::{RelationQuery, SubjectSpec};

pub const OBJECT_DELIMITER: char = ',';

/// Leaf queries to fetch for one inbound query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// No subject set: fetched as-is
    Direct(RelationQuery),
    /// One query per subject-set object segment, in input order
    FanOut(Vec<RelationQuery>),
}

/// Expands `query` into its leaf queries.
///
/// Segments are trimmed and empty ones dropped. When no segment survives the
/// subject set is kept with its trimmed (empty) object so that at least one
/// leaf is always produced.
pub fn plan(query: RelationQuery) -> FetchPlan {
    let Some(subject_set) = query.subject_set() else {
        return FetchPlan::Direct(query);
    };

    let segments: Vec<String> = subject_set
        .object
        .split(OBJECT_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    if segments.is_empty() {
        let object = subject_set.object.trim().to_string();
        return FetchPlan::FanOut(vec![with_subject_set_object(&query, object)]);
    }

    FetchPlan::FanOut(
        segments
            .into_iter()
            .map(|segment| with_subject_set_object(&query, segment))
            .collect(),
    )
}

fn with_subject_set_object(query: &RelationQuery, object: String) -> RelationQuery {
    let mut leaf = query.clone();
    if let SubjectSpec::Set(set) = &mut leaf.subject {
        set.object = object;
    }
    leaf
}
