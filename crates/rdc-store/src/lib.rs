//! RDC Submission Store
//!
//! Persistence layer for the two document kinds:
//!
//! - [`SubmissionStore`]: create/read/update/delete over consent and survey
//!   records, with filter + sort + paginate queries for surveys
//! - Optional JSON snapshot persistence (load at open, rewrite per mutation)
//!
//! The store owns two invariants the validators do not: questionId
//! uniqueness within one survey's answers (enforced at persistence, on
//! create and on answer replacement) and the newest-submission-first
//! ordering of listings. Each operation is atomic with respect to its own
//! record; there are no multi-record transactions.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod error;
mod persist;
mod store;

// Re-exports
pub use error::StoreError;
pub use store::{SubmissionStore, SurveyFilter, SurveyPage};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
