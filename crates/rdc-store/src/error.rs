//! Store error taxonomy
//!
//! Maps one-to-one onto the API's status codes: validation -> 400,
//! not-found -> 404, storage -> 500 (logged, surfaced generically).

use rdc_core::ValidationError;

/// Errors from store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Payload failed a validation rule or a persistence invariant
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No record with the given identifier
    #[error("not found")]
    NotFound,

    /// Underlying persistence failure (snapshot I/O)
    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    /// Check whether this is the not-found case
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
