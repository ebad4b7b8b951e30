//! Testing utilities for the RDC workspace
//!
//! Shared fixtures: wire-shaped JSON payloads and ready-made validated
//! records, so store and API tests build submissions the same way.

#![allow(missing_docs)]

use chrono::{NaiveDate, Utc};
use rdc_core::{Answer, NewConsent, NewSurvey, SurveyMetadata, DEFAULT_SURVEY_TITLE};
use serde_json::{json, Value};

/// A complete, valid consent payload as a client would send it
pub fn complete_consent_json() -> Value {
    json!({
        "consent1": true, "consent2": true, "consent3": true,
        "consent4": true, "consent5": true, "consent6": true,
        "participantName": "Ada Lovelace",
        "signature": "Ada Lovelace",
        "date": "2025-03-09",
    })
}

/// A survey payload carrying the given `answers` value (map or array form)
pub fn survey_json_with_answers(answers: Value) -> Value {
    json!({
        "metadata": {"respondentId": "r-1"},
        "answers": answers,
        "comments": {"usability": "smooth"},
        "sections": [
            {"id": "usability", "title": "Usability", "questionIds": ["u1", "u2"]},
        ],
    })
}

/// Answer pairs from literal (questionId, value) tuples
pub fn answers(pairs: &[(&str, u8)]) -> Vec<Answer> {
    pairs.iter().map(|(id, v)| Answer::new(*id, *v)).collect()
}

/// A validated consent record ready for the store
pub fn new_consent(participant: &str) -> NewConsent {
    NewConsent {
        consent1: true,
        consent2: true,
        consent3: true,
        consent4: true,
        consent5: true,
        consent6: true,
        participant_name: participant.to_string(),
        signature: participant.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 3, 9).expect("valid fixture date"),
        ip_address: None,
        user_agent: None,
    }
}

/// A validated survey record ready for the store
pub fn new_survey(respondent: &str, survey_answers: Vec<Answer>) -> NewSurvey {
    NewSurvey {
        metadata: SurveyMetadata {
            title: DEFAULT_SURVEY_TITLE.to_string(),
            respondent_id: Some(respondent.to_string()),
            ip: None,
            submitted_at: Utc::now(),
        },
        answers: survey_answers,
        comments: std::collections::BTreeMap::new(),
        sections: Vec::new(),
        tags: Vec::new(),
        reviewed: false,
    }
}
