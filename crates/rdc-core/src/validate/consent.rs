//! Consent rule set
//!
//! A consent submission is all-or-nothing: every acknowledgment box must be
//! exactly `true`, the signature block must be filled in, and the date must
//! parse. The first violation found is the one reported, naming the field.

use serde::Deserialize;
use serde_json::Value;

use super::parse_date_str;
use crate::error::ValidationError;
use crate::types::NewConsent;

/// Raw consent payload as received from the client
///
/// Every slot is a raw JSON value so that type mismatches become named
/// validation messages instead of deserialization faults. Unknown fields are
/// dropped by serde.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsentPayload {
    pub consent1: Value,
    pub consent2: Value,
    pub consent3: Value,
    pub consent4: Value,
    pub consent5: Value,
    pub consent6: Value,
    pub participant_name: Value,
    pub signature: Value,
    pub date: Value,
}

/// Validate a consent submission
///
/// Fails with the first violation:
/// - any acknowledgment not exactly `true` -> `"consentN must be checked"`
/// - `participantName` / `signature` missing, non-string, or shorter than
///   2 characters after trimming -> `"<field> is required"`
/// - `date` missing -> `"date is required"`; unparseable -> `"date is invalid"`
///
/// On success returns the sanitized record: strings trimmed, booleans
/// affirmed, audit fields left for the API layer to fill in.
pub fn validate_consent(payload: &ConsentPayload) -> Result<NewConsent, ValidationError> {
    let acknowledgments = [
        ("consent1", &payload.consent1),
        ("consent2", &payload.consent2),
        ("consent3", &payload.consent3),
        ("consent4", &payload.consent4),
        ("consent5", &payload.consent5),
        ("consent6", &payload.consent6),
    ];
    for (name, value) in acknowledgments {
        if *value != Value::Bool(true) {
            return Err(ValidationError::new(format!("{name} must be checked")));
        }
    }

    let participant_name = required_name(&payload.participant_name, "participantName")?;
    let signature = required_name(&payload.signature, "signature")?;
    let date = required_date(&payload.date)?;

    Ok(NewConsent {
        consent1: true,
        consent2: true,
        consent3: true,
        consent4: true,
        consent5: true,
        consent6: true,
        participant_name,
        signature,
        date,
        ip_address: None,
        user_agent: None,
    })
}

/// A required free-text field: string, at least 2 characters after trimming
fn required_name(value: &Value, field: &str) -> Result<String, ValidationError> {
    match value.as_str() {
        Some(s) if s.trim().chars().count() >= 2 => Ok(s.trim().to_string()),
        _ => Err(ValidationError::new(format!("{field} is required"))),
    }
}

fn required_date(value: &Value) -> Result<chrono::NaiveDate, ValidationError> {
    let missing = matches!(value, Value::Null) || value.as_str().is_some_and(str::is_empty);
    if missing {
        return Err(ValidationError::new("date is required"));
    }
    value
        .as_str()
        .and_then(parse_date_str)
        .ok_or_else(|| ValidationError::new("date is invalid"))
}
