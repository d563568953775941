use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RelationTupleError;

/// All subjects related to `object` via `relation` in `namespace`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectSet {
    pub namespace: String,
    pub object: String,
    pub relation: String,
}

impl SubjectSet {
    pub fn new(namespace: &str, object: &str, relation: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            object: object.to_string(),
            relation: relation.to_string(),
        }
    }
}

impl fmt::Display for SubjectSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.namespace, self.object, self.relation)
    }
}

impl FromStr for SubjectSet {
    type Err = RelationTupleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RelationTupleError::InvalidTuple {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (head, relation) = s
            .split_once('#')
            .ok_or_else(|| invalid("subject set is missing '#'"))?;
        let (namespace, object) = head
            .split_once(':')
            .ok_or_else(|| invalid("subject set is missing ':'"))?;

        Ok(Self::new(namespace, object, relation))
    }
}

/// Subject of a stored relation tuple.
///
/// Serialized flattened into the tuple as either `subject_id` or `subject_set`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "subject_id")]
    Id(String),
    #[serde(rename = "subject_set")]
    Set(SubjectSet),
}

impl Subject {
    pub fn id(id: &str) -> Self {
        Self::Id(id.to_string())
    }

    pub fn set(namespace: &str, object: &str, relation: &str) -> Self {
        Self::Set(SubjectSet::new(namespace, object, relation))
    }

    pub fn as_subject_id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Set(_) => None,
        }
    }

    pub fn as_subject_set(&self) -> Option<&SubjectSet> {
        match self {
            Self::Id(_) => None,
            Self::Set(set) => Some(set),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Set(set) => write!(f, "{set}"),
        }
    }
}

impl FromStr for Subject {
    type Err = RelationTupleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('#') {
            Ok(Self::Set(s.parse()?))
        } else {
            Ok(Self::Id(s.to_string()))
        }
    }
}

/// A stored relation tuple as returned by the [`RelationTupleManager`](crate::manager::RelationTupleManager)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InternalRelationTuple {
    pub namespace: String,
    pub object: String,
    pub relation: String,
    #[serde(flatten)]
    pub subject: Subject,
}

impl InternalRelationTuple {
    pub fn new(namespace: &str, object: &str, relation: &str, subject: Subject) -> Self {
        Self {
            namespace: namespace.to_string(),
            object: object.to_string(),
            relation: relation.to_string(),
            subject,
        }
    }

    pub fn subject_set(&self) -> Option<&SubjectSet> {
        self.subject.as_subject_set()
    }
}

impl fmt::Display for InternalRelationTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}#{}@{}",
            self.namespace, self.object, self.relation, self.subject
        )
    }
}

impl FromStr for InternalRelationTuple {
    type Err = RelationTupleError;

    /// Parses `namespace:object#relation@subject`, where the subject is either
    /// a plain id or `namespace:object#relation`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RelationTupleError::InvalidTuple {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (head, subject) = s
            .split_once('@')
            .ok_or_else(|| invalid("missing '@' before the subject"))?;
        let (head, relation) = head
            .split_once('#')
            .ok_or_else(|| invalid("missing '#' before the relation"))?;
        let (namespace, object) = head
            .split_once(':')
            .ok_or_else(|| invalid("missing ':' between namespace and object"))?;

        Ok(Self::new(namespace, object, relation, subject.parse()?))
    }
}

/// How a query constrains the subject of matching tuples.
///
/// When both a subject id and subject set fields are supplied, the subject set
/// wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubjectSpec {
    Id(String),
    Set(SubjectSet),
    /// Any subject matches
    #[default]
    Unspecified,
}

/// Tuple-match pattern handed to the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelationQuery {
    pub namespace: String,
    pub object: String,
    pub relation: String,
    pub subject: SubjectSpec,
}

impl RelationQuery {
    pub fn new(namespace: &str, object: &str, relation: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            object: object.to_string(),
            relation: relation.to_string(),
            subject: SubjectSpec::Unspecified,
        }
    }

    pub fn with_subject(mut self, subject: SubjectSpec) -> Self {
        self.subject = subject;
        self
    }

    pub fn subject_id(&self) -> Option<&str> {
        match &self.subject {
            SubjectSpec::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn subject_set(&self) -> Option<&SubjectSet> {
        match &self.subject {
            SubjectSpec::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Query for every tuple that grants the relation of `set` on its object.
    pub fn members_of(set: &SubjectSet) -> Self {
        Self::new(&set.namespace, &set.object, &set.relation)
    }
}
