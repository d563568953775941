use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelationTupleError {
    /// The protocol request carried no query at all
    #[error("invalid request")]
    InvalidRequest,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid page size {value:?}: {reason}")]
    InvalidPageSize { value: String, reason: String },

    #[error("Malformed page token: {0}")]
    MalformedPageToken(String),

    #[error("Invalid relation tuple {input:?}: {reason}")]
    InvalidTuple { input: String, reason: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(String),

    /// Raised while loading seed tuples at startup, never on the read path
    #[error("Cannot read seed file {path}: {reason}")]
    SeedFile { path: String, reason: String },
}

impl RelationTupleError {
    /// Errors raised while building a query, before the storage collaborator
    /// is contacted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest
                | Self::Validation(_)
                | Self::InvalidPageSize { .. }
                | Self::InvalidTuple { .. }
        )
    }

    /// Errors surfaced by the storage collaborator during a fetch.
    pub fn is_collaborator(&self) -> bool {
        matches!(self, Self::MalformedPageToken(_) | Self::Cancelled | Self::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, RelationTupleError>;
