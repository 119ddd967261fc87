use thiserror::Error;

/// Write-path failures of the lattice.
///
/// Read paths never fail on missing entities — lookups return `Option`
/// and scans return empty results. Every variant here is local,
/// synchronous and non-retryable by the core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LatticeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("capacity exceeded: store holds its configured maximum of {capacity} anchors")]
    CapacityExceeded { capacity: usize },

    #[error("recall already stored for anchor {0}")]
    AlreadyStored(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
