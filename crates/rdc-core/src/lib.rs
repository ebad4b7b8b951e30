//! RDC Core
//!
//! Record types and submission-pipeline logic shared by the store, the HTTP
//! API and the client controllers:
//!
//! - [`ConsentRecord`] / [`SurveyRecord`]: the two persisted document kinds
//! - [`AnswerSet`]: tagged union for the two accepted answer shapes
//!   (ordered pairs vs. key-value map), normalized to ordered pairs
//! - [`validate_consent`] / [`validate_survey`]: authoritative structural
//!   validators returning sanitized records or a message list
//!
//! # Example
//!
//! ```rust,ignore
//! use rdc_core::{validate_survey, SurveyPayload};
//!
//! let payload: SurveyPayload = serde_json::from_slice(&body)?;
//! let new_survey = validate_survey(&payload, chrono::Utc::now())?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod error;
pub mod normalize;
pub mod types;
pub mod validate;

// Re-exports
pub use error::ValidationError;
pub use normalize::{coerce_integer, AnswerPair, AnswerSet, RawAnswer};
pub use types::{
    find_duplicate_question_id, Answer, ConsentRecord, NewConsent, NewSurvey, SectionRef,
    SubmissionId, SurveyMetadata, SurveyRecord, DEFAULT_SURVEY_TITLE,
};
pub use validate::{
    validate_consent, validate_survey, validate_survey_update, ConsentPayload, SurveyPatch,
    SurveyPayload, SurveyUpdate,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
