use thiserror::Error;

/// Constraint violations on a `Lead` or `Campaign` record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Record has an empty id")]
    EmptyId,

    #[error("Campaign {id}: successful leads ({successful}) exceed total leads ({total})")]
    SuccessfulExceedsTotal {
        id: String,
        successful: u32,
        total: u32,
    },

    #[error("Campaign {id}: response rate {rate} is outside 0-100")]
    ResponseRateOutOfRange { id: String, rate: u8 },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
}

/// Failures a query can report to its callers.
///
/// Cloneable because a single in-flight fetch is shared by every caller
/// coalesced onto its key. Not-found is not an error: `get` queries
/// resolve to `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Cannot sort by '{0}': field has no total ordering")]
    InvalidSortField(String),

    #[error("Invalid {kind} status: '{value}'")]
    InvalidStatus { kind: &'static str, value: String },

    #[error("Invalid sort direction: '{0}' (expected asc or desc)")]
    InvalidSortDirection(String),

    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),
}

impl QueryError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueryError::SourceUnavailable(_))
    }
}

#[derive(Error, Debug)]
pub enum LeadboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("State error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, LeadboardError>;
