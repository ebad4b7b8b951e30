//! Validation error type shared by both rule sets

use serde::{Deserialize, Serialize};

/// A failed validation, carrying one message per violation
///
/// The consent rule set fails fast (one message); the survey rule set
/// accumulates every violation it finds. `Display` joins the list the way
/// the API reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", .errors.join("; "))]
pub struct ValidationError {
    /// Human-readable violation messages, in discovery order
    pub errors: Vec<String>,
}

impl ValidationError {
    /// Single-violation error
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    /// Error from an accumulated message list
    ///
    /// Callers must not pass an empty list; an error with nothing wrong in
    /// it is a bug upstream.
    #[inline]
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }
}
