//! RDC Client Controllers
//!
//! The two form flows as explicit, event-driven finite-state machines:
//!
//! - [`SurveyController`]: multi-section navigation, sparse answers and
//!   comments, per-section completion gating, submission lifecycle
//! - [`ConsentController`]: checkbox-gated consent with derived submit
//!   enablement and retry-friendly error handling
//! - [`SubmitApi`] / [`HttpApi`]: the transport the controllers' submit
//!   effects are carried over
//!
//! Controllers perform no I/O themselves: every transition returns the
//! effects the host must run, which keeps the machines fully deterministic
//! under test.
//!
//! # Example
//!
//! ```rust,ignore
//! use rdc_client::{SurveyController, SurveyEvent};
//!
//! let mut form = SurveyController::with_default_survey();
//! form.apply(SurveyEvent::AnswerSelected { question_id: "u1".into(), value: 4 });
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod catalog;
pub mod consent;
pub mod survey;
pub mod transport;

// Re-exports
pub use catalog::{default_sections, Question, SurveySection};
pub use consent::{
    ConsentController, ConsentEffect, ConsentEvent, ConsentField, ConsentPhase,
    ACKNOWLEDGMENT_COUNT,
};
pub use survey::{
    Notice, Severity, SurveyController, SurveyEffect, SurveyEvent, SurveyPhase, FINAL_COMMENT_KEY,
};
pub use transport::{
    ConsentSubmission, HttpApi, SubmissionMetadata, SubmissionReceipt, SubmitApi, SubmitFailure,
    SurveySubmission,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
