//! Record types for the two persisted document kinds
//!
//! Defines the wire/storage representation of:
//! - Consent submissions (six acknowledgments + signature block)
//! - Survey submissions (answers, comments, section snapshot, review state)
//!
//! All wire-facing types serialize as camelCase JSON; that shape is the
//! public API contract and the snapshot format at the same time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use ulid::Ulid;

/// Default survey title applied when a submission carries none
pub const DEFAULT_SURVEY_TITLE: &str = "Cloud-Native Disaster Response Platform Survey";

/// Unique submission identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Ulid);

impl SubmissionId {
    /// Generate new submission ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubmissionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// A stored consent submission
///
/// All six acknowledgments are `true` by construction: the validator refuses
/// anything less before a record reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    /// Record identifier
    pub id: SubmissionId,
    pub consent1: bool,
    pub consent2: bool,
    pub consent3: bool,
    pub consent4: bool,
    pub consent5: bool,
    pub consent6: bool,
    /// Participant name (trimmed, at least 2 characters)
    pub participant_name: String,
    /// Electronic signature (trimmed, at least 2 characters)
    pub signature: String,
    /// Consent date
    pub date: NaiveDate,
    /// Peer address at submission time, for auditing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// User-Agent header at submission time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated consent submission, ready for the store
///
/// Produced by [`crate::validate_consent`]; the audit fields are filled in by
/// the API layer from the request, never by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConsent {
    pub consent1: bool,
    pub consent2: bool,
    pub consent3: bool,
    pub consent4: bool,
    pub consent5: bool,
    pub consent6: bool,
    pub participant_name: String,
    pub signature: String,
    pub date: NaiveDate,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Submission metadata attached to a survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyMetadata {
    /// Survey title ([`DEFAULT_SURVEY_TITLE`] when the client sends none)
    pub title: String,
    /// Optional link to a respondent in an external system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent_id: Option<String>,
    /// Peer address at submission time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Submission timestamp (server clock when the client sends none)
    pub submitted_at: DateTime<Utc>,
}

/// One answered question: (questionId, value in 1..=5)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub value: u8,
}

impl Answer {
    /// Create a new answer pair
    #[inline]
    #[must_use]
    pub fn new(question_id: impl Into<String>, value: u8) -> Self {
        Self {
            question_id: question_id.into(),
            value,
        }
    }
}

/// Structural snapshot of one survey section at submission time
///
/// Kept so stored answers stay interpretable if the survey is later
/// redefined; `questionIds` is the authoritative question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub question_ids: Vec<String>,
}

/// A stored survey submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    /// Record identifier
    pub id: SubmissionId,
    pub metadata: SurveyMetadata,
    /// Canonical ordered answer pairs; questionId unique within the record
    pub answers: Vec<Answer>,
    /// Free-text comments keyed by section id (and `"final"`)
    pub comments: BTreeMap<String, String>,
    /// Section snapshot (may be empty)
    pub sections: Vec<SectionRef>,
    pub tags: Vec<String>,
    /// Reviewer state
    pub reviewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated, normalized survey submission, ready for the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSurvey {
    pub metadata: SurveyMetadata,
    pub answers: Vec<Answer>,
    pub comments: BTreeMap<String, String>,
    pub sections: Vec<SectionRef>,
    pub tags: Vec<String>,
    pub reviewed: bool,
}

/// Find the first questionId that occurs more than once
///
/// This is the storage invariant: it runs at persistence (create and answer
/// replacement), independent of the schema-level per-entry checks.
#[must_use]
pub fn find_duplicate_question_id(answers: &[Answer]) -> Option<&str> {
    let mut seen = std::collections::HashSet::with_capacity(answers.len());
    for answer in answers {
        if !seen.insert(answer.question_id.as_str()) {
            return Some(answer.question_id.as_str());
        }
    }
    None
}
