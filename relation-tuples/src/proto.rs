//! Protocol-buffer messages of the relation tuple read service
//!
//! Field numbers follow `ory.keto.relation_tuples.v1alpha2` so that payloads
//! stay wire-compatible with existing clients.

use crate::models::{InternalRelationTuple, Subject as ModelSubject, SubjectSet as ModelSubjectSet};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubjectSet {
    #[prost(string, tag = "1")]
    pub namespace: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub object: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub relation: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Subject {
    #[prost(oneof = "subject::Ref", tags = "1, 2")]
    pub r#ref: ::core::option::Option<subject::Ref>,
}

pub mod subject {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Ref {
        #[prost(string, tag = "1")]
        Id(::prost::alloc::string::String),
        #[prost(message, tag = "2")]
        Set(super::SubjectSet),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RelationTuple {
    #[prost(string, tag = "1")]
    pub namespace: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub object: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub relation: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub subject: ::core::option::Option<Subject>,
}

/// Query part of a list request; absent fields do not constrain the match
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RelationQuery {
    #[prost(string, optional, tag = "1")]
    pub namespace: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "2")]
    pub object: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "3")]
    pub relation: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "4")]
    pub subject: ::core::option::Option<Subject>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRelationTuplesRequest {
    #[prost(message, optional, tag = "1")]
    pub query: ::core::option::Option<RelationQuery>,
    #[prost(int32, tag = "4")]
    pub page_size: i32,
    #[prost(string, tag = "5")]
    pub page_token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRelationTuplesResponse {
    #[prost(message, repeated, tag = "1")]
    pub relation_tuples: ::prost::alloc::vec::Vec<RelationTuple>,
    #[prost(string, tag = "2")]
    pub next_page_token: ::prost::alloc::string::String,
}

impl From<&ModelSubjectSet> for SubjectSet {
    fn from(set: &ModelSubjectSet) -> Self {
        Self {
            namespace: set.namespace.clone(),
            object: set.object.clone(),
            relation: set.relation.clone(),
        }
    }
}

impl From<SubjectSet> for ModelSubjectSet {
    fn from(set: SubjectSet) -> Self {
        Self {
            namespace: set.namespace,
            object: set.object,
            relation: set.relation,
        }
    }
}

impl From<&ModelSubject> for Subject {
    fn from(subject: &ModelSubject) -> Self {
        let r#ref = match subject {
            ModelSubject::Id(id) => subject::Ref::Id(id.clone()),
            ModelSubject::Set(set) => subject::Ref::Set(set.into()),
        };
        Self { r#ref: Some(r#ref) }
    }
}

impl InternalRelationTuple {
    pub fn to_proto(&self) -> RelationTuple {
        RelationTuple {
            namespace: self.namespace.clone(),
            object: self.object.clone(),
            relation: self.relation.clone(),
            subject: Some((&self.subject).into()),
        }
    }
}
