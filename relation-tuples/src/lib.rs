//! Read side of a Zanzibar-style relation tuple API
//!
//! A request is translated into a [`RelationQuery`], optionally fanned out over
//! a comma separated subject set object, fetched page by page from an injected
//! [`RelationTupleManager`] and merged into one [`GetResponse`]. With
//! `up=all` the result is additionally expanded a fixed number of rounds.
//!
//! # Core Concepts
//!
//! - **Tuple**: `namespace:object#relation@subject`
//! - **Subject**: a concrete id or a subject set `namespace:object#relation`
//! - **Leaf**: one fetch against the manager after fan-out
//!
//! # Example
//!
//! ```rust
//! use relation_tuples::{InMemoryRelationTupleManager, ReadService, RequestContext, UrlQuery};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = InMemoryRelationTupleManager::from_seed(
//!         "
//!         files:readme#viewer@groups:dev#member
//!         groups:dev#member@alice
//!         ",
//!     )?;
//!     let service = ReadService::new(Arc::new(manager));
//!
//!     let query: UrlQuery = [("namespace", "files"), ("up", "all")].into_iter().collect();
//!     let response = service.get_relations(&RequestContext::new(), &query).await?;
//!
//!     assert_eq!(response.relation_tuples[0].to_string(), "groups:dev#member@alice");
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod expand;
pub mod fanout;
pub mod manager;
pub mod models;
pub mod pagination;
pub mod proto;
pub mod query;
pub mod read;
pub mod response;

pub use context::RequestContext;
pub use error::{RelationTupleError, Result};
pub use manager::{InMemoryRelationTupleManager, RelationTupleManager, TuplePage};
pub use models::*;
pub use pagination::{PaginationOption, DEFAULT_PAGE_SIZE};
pub use query::{GetRelationsParams, UrlQuery};
pub use read::{ReadOptions, ReadService};
pub use response::{GetResponse, PageState};
