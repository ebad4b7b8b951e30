//! Survey form controller
//!
//! An explicit finite-state machine over the multi-section survey flow:
//! an enumerated [`SurveyPhase`], an event-driven [`SurveyController::apply`]
//! transition function, and side effects ([`SurveyEffect`]) handed back to
//! the host instead of performed. Everything derived — section completion,
//! missing answers, answered counts — is a pure function of current state,
//! never a cached flag.
//!
//! Answers are a sparse map: an unanswered question is simply absent, never
//! stored as zero. Comments are sparse too; an explicitly entered empty
//! string is kept, distinct from no comment at all.

use chrono::Utc;
use indexmap::IndexMap;

use crate::catalog::{default_sections, SurveySection};
use crate::transport::{
    SubmissionMetadata, SubmissionReceipt, SubmitApi, SubmitFailure, SurveySubmission,
};
use rdc_core::DEFAULT_SURVEY_TITLE;

/// Comment key for the end-of-survey free-text field
pub const FINAL_COMMENT_KEY: &str = "final";

/// Where the participant is in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyPhase {
    /// Viewing/answering one section (0-based index)
    InSection(usize),
    /// One submission request in flight; further submits are ignored
    Submitting {
        /// Section to return to if the server rejects the submission
        from_section: usize,
    },
}

/// Everything that can happen to the form
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyEvent {
    /// A rating was selected for a question
    AnswerSelected { question_id: String, value: u8 },
    /// A comment field changed (section id or [`FINAL_COMMENT_KEY`])
    CommentEdited { key: String, text: String },
    /// "Next" pressed on the active section
    NextPressed,
    /// "Previous" pressed; never gated
    BackPressed,
    /// Direct jump via the section chips; never gated
    SectionJumped(usize),
    /// "Submit" pressed on the final section
    SubmitPressed,
    /// The in-flight submission resolved
    SubmitResolved(Result<SubmissionReceipt, SubmitFailure>),
}

/// Side effects the host must perform
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyEffect {
    /// Send this payload to the API
    Submit(SurveySubmission),
    /// Leave the survey for the debrief page (after the success notice)
    NavigateToDebrief,
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient notice shown after a submission resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// The survey form state machine
#[derive(Debug, Clone)]
pub struct SurveyController {
    sections: Vec<SurveySection>,
    require_all: bool,
    phase: SurveyPhase,
    answers: IndexMap<String, u8>,
    comments: IndexMap<String, String>,
    error: Option<String>,
    notice: Option<Notice>,
}

impl SurveyController {
    /// Controller over the given sections
    ///
    /// `require_all` (the default elsewhere) gates forward navigation and
    /// submission on every question of the relevant scope being answered.
    #[must_use]
    pub fn new(sections: Vec<SurveySection>, require_all: bool) -> Self {
        Self {
            sections,
            require_all,
            phase: SurveyPhase::InSection(0),
            answers: IndexMap::new(),
            comments: IndexMap::new(),
            error: None,
            notice: None,
        }
    }

    /// Controller over the default study catalog, requiring all answers
    #[must_use]
    pub fn with_default_survey() -> Self {
        Self::new(default_sections(), true)
    }

    // ---- derived state (pure reads) ----

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    /// Index of the visible section, also while a submit is in flight
    #[inline]
    #[must_use]
    pub fn active_index(&self) -> usize {
        match self.phase {
            SurveyPhase::InSection(i) | SurveyPhase::Submitting { from_section: i } => i,
        }
    }

    /// The visible section
    #[must_use]
    pub fn active_section(&self) -> &SurveySection {
        &self.sections[self.active_index()]
    }

    /// Whether a submit request is in flight
    #[inline]
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SurveyPhase::Submitting { .. })
    }

    /// Selected value for a question, if any
    #[must_use]
    pub fn answer(&self, question_id: &str) -> Option<u8> {
        self.answers.get(question_id).copied()
    }

    /// Comment text for a key, if one was entered
    #[must_use]
    pub fn comment(&self, key: &str) -> Option<&str> {
        self.comments.get(key).map(String::as_str)
    }

    /// Inline validation message, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Transient submit notice, if any
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// How many questions in a section have answers
    #[must_use]
    pub fn answered_count(&self, section_index: usize) -> usize {
        self.sections[section_index]
            .questions
            .iter()
            .filter(|q| self.answers.contains_key(&q.id))
            .count()
    }

    /// Whether a section is complete under the current policy
    #[must_use]
    pub fn section_complete(&self, section_index: usize) -> bool {
        !self.require_all
            || self.answered_count(section_index) == self.sections[section_index].questions.len()
    }

    /// All unanswered question ids, in catalog order
    #[must_use]
    pub fn missing_question_ids(&self) -> Vec<String> {
        if !self.require_all {
            return Vec::new();
        }
        self.sections
            .iter()
            .flat_map(|s| s.questions.iter())
            .filter(|q| !self.answers.contains_key(&q.id))
            .map(|q| q.id.clone())
            .collect()
    }

    /// Whether every question in every section is answered (or the policy
    /// does not care)
    #[must_use]
    pub fn all_complete(&self) -> bool {
        self.missing_question_ids().is_empty()
    }

    /// Assemble the wire payload from current state
    #[must_use]
    pub fn build_submission(&self) -> SurveySubmission {
        SurveySubmission {
            metadata: SubmissionMetadata {
                title: DEFAULT_SURVEY_TITLE.to_string(),
                submitted_at: Utc::now(),
            },
            answers: self.answers.clone(),
            comments: self.comments.clone(),
            sections: self.sections.iter().map(SurveySection::snapshot).collect(),
        }
    }

    // ---- transitions ----

    /// Apply one event, returning the effects the host must perform
    pub fn apply(&mut self, event: SurveyEvent) -> Vec<SurveyEffect> {
        match event {
            SurveyEvent::AnswerSelected { question_id, value } => {
                self.on_answer(question_id, value);
                Vec::new()
            }
            SurveyEvent::CommentEdited { key, text } => {
                if !self.is_submitting() {
                    self.comments.insert(key, text);
                }
                Vec::new()
            }
            SurveyEvent::NextPressed => {
                self.on_next();
                Vec::new()
            }
            SurveyEvent::BackPressed => {
                if let SurveyPhase::InSection(i) = self.phase {
                    self.error = None;
                    self.phase = SurveyPhase::InSection(i.saturating_sub(1));
                }
                Vec::new()
            }
            SurveyEvent::SectionJumped(index) => {
                if !self.is_submitting() && index < self.sections.len() {
                    self.error = None;
                    self.phase = SurveyPhase::InSection(index);
                }
                Vec::new()
            }
            SurveyEvent::SubmitPressed => self.on_submit(),
            SurveyEvent::SubmitResolved(result) => self.on_resolved(result),
        }
    }

    fn on_answer(&mut self, question_id: String, value: u8) {
        if self.is_submitting() || !(1..=5).contains(&value) {
            return;
        }
        self.answers.insert(question_id, value);
        if self.error.is_some() {
            self.error = None;
        }
    }

    fn on_next(&mut self) {
        let SurveyPhase::InSection(i) = self.phase else {
            return;
        };
        if i + 1 >= self.sections.len() {
            return;
        }
        if !self.section_complete(i) {
            let missing = self.sections[i].questions.len() - self.answered_count(i);
            self.error = Some(format!(
                "Please answer all questions in this section before continuing. Missing: {missing}"
            ));
            return;
        }
        self.error = None;
        self.phase = SurveyPhase::InSection(i + 1);
    }

    fn on_submit(&mut self) -> Vec<SurveyEffect> {
        let SurveyPhase::InSection(i) = self.phase else {
            // One outstanding request at a time
            return Vec::new();
        };
        if i + 1 != self.sections.len() {
            return Vec::new();
        }

        let missing = self.missing_question_ids();
        if !missing.is_empty() {
            self.error = Some(format!(
                "Please answer all questions before submitting. Missing: {}",
                missing.len()
            ));
            // Jump to the first section still holding a gap
            if let Some(section) = self.section_of(&missing[0]) {
                self.phase = SurveyPhase::InSection(section);
            }
            return Vec::new();
        }

        self.error = None;
        self.phase = SurveyPhase::Submitting { from_section: i };
        vec![SurveyEffect::Submit(self.build_submission())]
    }

    fn on_resolved(&mut self, result: Result<SubmissionReceipt, SubmitFailure>) -> Vec<SurveyEffect> {
        let SurveyPhase::Submitting { from_section } = self.phase else {
            return Vec::new();
        };

        match result {
            Ok(_receipt) => {
                self.notice = Some(Notice {
                    severity: Severity::Success,
                    message: "Survey submitted. Thank you!".to_string(),
                });
                // Full local reset before leaving the page
                self.answers.clear();
                self.comments.clear();
                self.error = None;
                self.phase = SurveyPhase::InSection(0);
                vec![SurveyEffect::NavigateToDebrief]
            }
            Err(failure) => {
                self.notice = Some(Notice {
                    severity: Severity::Error,
                    message: format!("Submission failed: {}", failure.user_message()),
                });
                self.phase = SurveyPhase::InSection(from_section);
                Vec::new()
            }
        }
    }

    /// Drive a full submit round against a transport
    ///
    /// Applies [`SurveyEvent::SubmitPressed`]; if that produced a payload,
    /// awaits the transport and feeds the resolution back in. Returns the
    /// final effects (navigation on success, nothing otherwise).
    pub async fn submit_via<A: SubmitApi + ?Sized>(&mut self, api: &A) -> Vec<SurveyEffect> {
        let effects = self.apply(SurveyEvent::SubmitPressed);
        let Some(SurveyEffect::Submit(submission)) = effects.into_iter().next() else {
            return Vec::new();
        };
        let result = api.submit_survey(&submission).await;
        self.apply(SurveyEvent::SubmitResolved(result))
    }

    /// Section index containing a question id
    fn section_of(&self, question_id: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.questions.iter().any(|q| q.id == question_id))
    }

    /// Dismiss the transient notice
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

impl Default for SurveyController {
    fn default() -> Self {
        Self::with_default_survey()
    }
}
