//! Submission transport
//!
//! The controllers emit submission payloads as effects; this module carries
//! them to the API. [`SubmitApi`] is the seam the tests fake out;
//! [`HttpApi`] is the real thing. No retries anywhere — a failed submission
//! waits for the participant to press submit again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rdc_core::SectionRef;
use serde::{Deserialize, Serialize};

/// Metadata the client attaches to a survey submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    pub title: String,
    pub submitted_at: DateTime<Utc>,
}

/// The survey payload as sent over the wire
///
/// Answers go in MAP form; the server normalizes them to ordered pairs. The
/// section snapshot carries the authoritative question order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub metadata: SubmissionMetadata,
    pub answers: IndexMap<String, u8>,
    pub comments: IndexMap<String, String>,
    pub sections: Vec<SectionRef>,
}

/// The consent payload as sent over the wire
///
/// The date travels exactly as typed; parsing it is the server's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSubmission {
    pub consent1: bool,
    pub consent2: bool,
    pub consent3: bool,
    pub consent4: bool,
    pub consent5: bool,
    pub consent6: bool,
    pub participant_name: String,
    pub signature: String,
    pub date: String,
}

/// Successful submission acknowledgment from the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: String,
    pub message: String,
}

/// A failed submission attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitFailure {
    /// The server answered with an error; the message is shown verbatim
    #[error("{0}")]
    Rejected(String),

    /// No server response at all; detail is for logs, not participants
    #[error("network failure: {0}")]
    Network(String),
}

impl SubmitFailure {
    /// What the participant sees
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
        }
    }
}

/// Submission endpoint seam
#[async_trait]
pub trait SubmitApi {
    /// POST a survey submission
    async fn submit_survey(
        &self,
        submission: &SurveySubmission,
    ) -> Result<SubmissionReceipt, SubmitFailure>;

    /// POST a consent submission
    async fn submit_consent(
        &self,
        submission: &ConsentSubmission,
    ) -> Result<SubmissionReceipt, SubmitFailure>;
}

/// HTTP transport against the RDC API
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    /// Create a transport against `base_url` (no trailing slash)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn post<T: Serialize + Sync>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<SubmissionReceipt, SubmitFailure> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(|err| SubmitFailure::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<SubmissionReceipt>()
                .await
                .map_err(|err| SubmitFailure::Network(err.to_string()))
        } else {
            // Prefer the server's own wording, fall back to the bare status
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .or_else(|| body.get("message"))
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("Server returned {}", status.as_u16()));
            Err(SubmitFailure::Rejected(message))
        }
    }
}

#[async_trait]
impl SubmitApi for HttpApi {
    async fn submit_survey(
        &self,
        submission: &SurveySubmission,
    ) -> Result<SubmissionReceipt, SubmitFailure> {
        self.post("/api/surveys", submission).await
    }

    async fn submit_consent(
        &self,
        submission: &ConsentSubmission,
    ) -> Result<SubmissionReceipt, SubmitFailure> {
        self.post("/api/consent", submission).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_is_shown_verbatim() {
        let failure = SubmitFailure::Rejected("consent3 must be checked".to_string());
        assert_eq!(failure.user_message(), "consent3 must be checked");
    }

    #[test]
    fn network_detail_stays_out_of_the_user_message() {
        let failure = SubmitFailure::Network("connection refused (os error 111)".to_string());
        assert!(!failure.user_message().contains("os error"));
        assert!(failure.user_message().contains("try again"));
    }

    #[test]
    fn survey_submission_serializes_camel_case_map_form() {
        let mut answers = IndexMap::new();
        answers.insert("u1".to_string(), 4u8);
        let submission = SurveySubmission {
            metadata: SubmissionMetadata {
                title: "T".to_string(),
                submitted_at: Utc::now(),
            },
            answers,
            comments: IndexMap::new(),
            sections: vec![],
        };

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["answers"]["u1"], 4);
        assert!(json["metadata"]["submittedAt"].is_string());
    }
}
