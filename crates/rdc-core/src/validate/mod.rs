//! Payload validation
//!
//! Two independent rule sets, one per document kind:
//! - [`validate_consent`]: fail-fast, first violation wins, mirrors the
//!   submit-button gating the client applies
//! - [`validate_survey`] / [`validate_survey_update`]: accumulate every
//!   violation into one message list
//!
//! Both are structural validators over loosely-typed JSON fields: a payload
//! deserializes into raw [`serde_json::Value`] slots (unknown fields dropped
//! by serde), and the validator walks those slots producing either a
//! sanitized record or a [`ValidationError`]. Client-side checks are a UX
//! optimization only; these validators are the authoritative gate and run on
//! every write path.

mod consent;
mod survey;

pub use consent::{validate_consent, ConsentPayload};
pub use survey::{validate_survey, validate_survey_update, SurveyPatch, SurveyPayload, SurveyUpdate};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Parse a calendar date from the shapes clients actually send:
/// `YYYY-MM-DD` (HTML date inputs) or a full RFC 3339 datetime.
pub(crate) fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

/// Parse a timestamp from a JSON value: RFC 3339 string, bare `YYYY-MM-DD`
/// (midnight UTC), or epoch milliseconds.
pub(crate) fn parse_datetime_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|naive| Utc.from_utc_datetime(&naive))
                })
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}
