//! Store error types.

use thiserror::Error;

/// Errors surfaced by the document-store contract.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record not found.
    #[error("record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Conditional update failed: the document's current state no longer
    /// matches the expected state (a concurrent writer won the race).
    #[error("conditional update conflict: {0}")]
    Conflict(String),

    /// Constraint violation, e.g. duplicate identifier.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backing store is unreachable or failed the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
