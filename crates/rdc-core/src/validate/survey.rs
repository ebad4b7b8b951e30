//! Survey rule set
//!
//! Unlike consent, a survey payload is validated exhaustively: every
//! violation across every field is collected into one message list so a
//! misbehaving client sees the whole picture at once. On success the answers
//! have been run through the normalizer and the record is ready for storage.
//!
//! The duplicate-questionId invariant is NOT checked here: that is a storage
//! invariant, enforced by the store at persistence time, independent of this
//! schema-level pass.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::parse_datetime_value;
use crate::error::ValidationError;
use crate::normalize::{coerce_integer, AnswerPair, AnswerSet};
use crate::types::{Answer, NewSurvey, SectionRef, SurveyMetadata, DEFAULT_SURVEY_TITLE};

/// Raw survey payload as received from the client
///
/// Unknown fields are dropped by serde; each known field is validated
/// structurally by [`validate_survey`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SurveyPayload {
    pub metadata: Value,
    pub answers: Value,
    pub comments: Value,
    pub sections: Value,
    pub tags: Value,
    pub reviewed: Value,
}

/// Raw partial-update payload for a stored survey
///
/// Only the whitelisted fields are looked at; anything else in the body is
/// ignored, not an error.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyUpdate {
    pub reviewed: Value,
    pub reviewed_by: Value,
    pub reviewed_at: Value,
    pub comments: Value,
    pub answers: Value,
}

/// Validated partial update, ready for the store's update operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyPatch {
    pub reviewed: Option<bool>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Shallow-merged into the stored comments; new keys overwrite
    pub comments: Option<BTreeMap<String, String>>,
    /// Wholesale replacement of the stored answers
    pub answers: Option<Vec<Answer>>,
}

/// Validate a survey submission
///
/// Accumulates every violation. On success the answers are normalized to
/// canonical ordered pairs and defaults are applied (`now` becomes
/// `submittedAt` when the client sent none).
pub fn validate_survey(
    payload: &SurveyPayload,
    now: DateTime<Utc>,
) -> Result<NewSurvey, ValidationError> {
    let mut errors = Vec::new();

    let metadata = check_metadata(&payload.metadata, now, &mut errors);
    let answers = check_answers(&payload.answers, &mut errors);
    let comments = check_comments(&payload.comments, &mut errors);
    let sections = check_sections(&payload.sections, &mut errors);
    let tags = check_tags(&payload.tags, &mut errors);
    let reviewed = check_reviewed(&payload.reviewed, &mut errors);

    if !errors.is_empty() {
        return Err(ValidationError::from_errors(errors));
    }

    Ok(NewSurvey {
        metadata,
        answers,
        comments,
        sections,
        tags,
        reviewed,
    })
}

/// Validate a partial update
///
/// Lenient on the review fields (the original service coerced them the same
/// way); strict on `answers`, which must pass the same per-entry schema as
/// creation or the whole update is rejected.
pub fn validate_survey_update(payload: &SurveyUpdate) -> Result<SurveyPatch, ValidationError> {
    let mut patch = SurveyPatch::default();

    if !payload.reviewed.is_null() {
        patch.reviewed = Some(truthy(&payload.reviewed));
    }
    if let Some(s) = payload.reviewed_by.as_str() {
        patch.reviewed_by = Some(s.to_string());
    }
    if let Some(ts) = parse_datetime_value(&payload.reviewed_at) {
        patch.reviewed_at = Some(ts);
    }
    if let Value::Object(map) = &payload.comments {
        patch.comments = Some(
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
        );
    }
    if !payload.answers.is_null() {
        patch.answers = Some(check_replacement_answers(&payload.answers)?);
    }

    Ok(patch)
}

/// JavaScript-style truthiness, matching how the original service coerced
/// the `reviewed` flag in partial updates
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn check_metadata(value: &Value, now: DateTime<Utc>, errors: &mut Vec<String>) -> SurveyMetadata {
    let mut metadata = SurveyMetadata {
        title: DEFAULT_SURVEY_TITLE.to_string(),
        respondent_id: None,
        ip: None,
        submitted_at: now,
    };

    let map = match value {
        Value::Null => return metadata,
        Value::Object(map) => map,
        _ => {
            errors.push("metadata must be an object".to_string());
            return metadata;
        }
    };

    if let Some(title) = map.get("title") {
        match title.as_str() {
            Some(t) => metadata.title = t.to_string(),
            None => errors.push("metadata.title must be a string".to_string()),
        }
    }
    if let Some(respondent) = map.get("respondentId") {
        match respondent.as_str() {
            // An empty respondent id means "not identified"
            Some("") => {}
            Some(id) => metadata.respondent_id = Some(id.to_string()),
            None => errors.push("metadata.respondentId must be a string".to_string()),
        }
    }
    if let Some(ip) = map.get("ip") {
        match ip.as_str() {
            Some("") => {}
            Some(addr) => metadata.ip = Some(addr.to_string()),
            None => errors.push("metadata.ip must be a string".to_string()),
        }
    }
    if let Some(submitted) = map.get("submittedAt") {
        match parse_datetime_value(submitted) {
            Some(ts) => metadata.submitted_at = ts,
            None => errors.push("metadata.submittedAt must be a valid date".to_string()),
        }
    }

    metadata
}

fn check_answers(value: &Value, errors: &mut Vec<String>) -> Vec<Answer> {
    // Parse the tagged union first, collecting entry-shape violations; the
    // value labels are built alongside so range errors point at the entry
    // the client actually sent.
    let (set, labels) = match value {
        Value::Null => {
            errors.push("answers is required".to_string());
            return Vec::new();
        }
        Value::Array(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());
            let mut labels = Vec::with_capacity(entries.len());
            for (i, entry) in entries.iter().enumerate() {
                let Some(obj) = entry.as_object() else {
                    errors.push(format!("answers[{i}] must be an object"));
                    continue;
                };
                let question_id = match obj.get("questionId").and_then(Value::as_str) {
                    Some(id) if !id.is_empty() => id.to_string(),
                    _ => {
                        errors.push(format!("answers[{i}].questionId must be a non-empty string"));
                        continue;
                    }
                };
                pairs.push(AnswerPair::new(
                    question_id,
                    obj.get("value").cloned().unwrap_or(Value::Null),
                ));
                labels.push(format!("answers[{i}].value"));
            }
            (AnswerSet::Pairs(pairs), labels)
        }
        Value::Object(map) => {
            let labels = map.keys().map(|k| format!("answers.{k}")).collect();
            (
                AnswerSet::Map(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
                labels,
            )
        }
        _ => {
            errors.push("answers must be an array or an object map".to_string());
            return Vec::new();
        }
    };

    let mut answers = Vec::with_capacity(set.len());
    for (label, raw) in labels.iter().zip(set.normalize()) {
        let in_range = raw
            .value
            .and_then(|v| u8::try_from(v).ok())
            .filter(|v| (1..=5).contains(v));
        match in_range {
            Some(v) => answers.push(Answer {
                question_id: raw.question_id,
                value: v,
            }),
            None => errors.push(format!("{label} must be an integer between 1 and 5")),
        }
    }
    answers
}

fn check_comments(value: &Value, errors: &mut Vec<String>) -> BTreeMap<String, String> {
    let mut comments = BTreeMap::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, entry) in map {
                match entry.as_str() {
                    Some(text) => {
                        comments.insert(key.clone(), text.to_string());
                    }
                    None => errors.push(format!("comments.{key} must be a string")),
                }
            }
        }
        _ => errors.push("comments must be an object map of strings".to_string()),
    }
    comments
}

fn check_sections(value: &Value, errors: &mut Vec<String>) -> Vec<SectionRef> {
    let entries = match value {
        Value::Null => return Vec::new(),
        Value::Array(entries) => entries,
        _ => {
            errors.push("sections must be an array".to_string());
            return Vec::new();
        }
    };

    let mut sections = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            errors.push(format!("sections[{i}] must be an object"));
            continue;
        };
        let id = match obj.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                errors.push(format!("sections[{i}].id must be a non-empty string"));
                continue;
            }
        };
        let title = match obj.get("title") {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_str() {
                Some(t) => Some(t.to_string()),
                None => {
                    errors.push(format!("sections[{i}].title must be a string"));
                    None
                }
            },
        };
        let question_ids = match obj.get("questionIds") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(ids)) if ids.iter().all(Value::is_string) => ids
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(_) => {
                errors.push(format!("sections[{i}].questionIds must be an array of strings"));
                Vec::new()
            }
        };
        sections.push(SectionRef {
            id,
            title,
            question_ids,
        });
    }
    sections
}

fn check_tags(value: &Value, errors: &mut Vec<String>) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(entries) if entries.iter().all(Value::is_string) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => {
            errors.push("tags must be an array of strings".to_string());
            Vec::new()
        }
    }
}

fn check_reviewed(value: &Value, errors: &mut Vec<String>) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        _ => {
            errors.push("reviewed must be a boolean".to_string());
            false
        }
    }
}

/// The replacement-answers schema for partial updates: strictly an array of
/// valid entries, rejected with one opaque message on any violation
fn check_replacement_answers(value: &Value) -> Result<Vec<Answer>, ValidationError> {
    let invalid = || ValidationError::new("Invalid answers payload");

    let Value::Array(entries) = value else {
        return Err(invalid());
    };
    let mut answers = Vec::with_capacity(entries.len());
    for entry in entries {
        let obj = entry.as_object().ok_or_else(invalid)?;
        let question_id = obj
            .get("questionId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(invalid)?;
        let value = obj
            .get("value")
            .and_then(coerce_integer)
            .and_then(|v| u8::try_from(v).ok())
            .filter(|v| (1..=5).contains(v))
            .ok_or_else(invalid)?;
        answers.push(Answer::new(question_id, value));
    }
    Ok(answers)
}
