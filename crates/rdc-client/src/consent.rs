//! Consent form controller
//!
//! A linear single-page machine: six acknowledgment booleans, three text
//! fields, one submit. Submission is derived-gated — [`ConsentController::can_submit`]
//! is a pure function of current state — and a rejected submission keeps
//! every entered value intact so the participant corrects and retries.

use crate::transport::{ConsentSubmission, SubmissionReceipt, SubmitApi, SubmitFailure};

/// Number of acknowledgment checkboxes
pub const ACKNOWLEDGMENT_COUNT: usize = 6;

/// Where the participant is in the consent flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentPhase {
    /// Filling in the form
    Editing,
    /// One submission request in flight
    Submitting,
    /// Accepted by the server; showing the transient acknowledgment
    Acknowledged,
}

/// The three text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentField {
    ParticipantName,
    Signature,
    Date,
}

/// Everything that can happen to the form
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentEvent {
    /// Checkbox `index` (0-based, < [`ACKNOWLEDGMENT_COUNT`]) flipped
    BoxToggled(usize),
    /// A text field changed
    FieldEdited(ConsentField, String),
    /// Submit pressed
    SubmitPressed,
    /// The in-flight submission resolved
    SubmitResolved(Result<SubmissionReceipt, SubmitFailure>),
    /// The success acknowledgment was dismissed (or timed out)
    AcknowledgmentDismissed,
}

/// Side effects the host must perform
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentEffect {
    /// Send this payload to the API
    Submit(ConsentSubmission),
    /// Leave for the debrief page
    NavigateToDebrief,
}

/// The consent form state machine
#[derive(Debug, Clone)]
pub struct ConsentController {
    boxes: [bool; ACKNOWLEDGMENT_COUNT],
    participant_name: String,
    signature: String,
    date: String,
    phase: ConsentPhase,
    error: Option<String>,
}

impl ConsentController {
    /// Fresh, empty form
    #[must_use]
    pub fn new() -> Self {
        Self {
            boxes: [false; ACKNOWLEDGMENT_COUNT],
            participant_name: String::new(),
            signature: String::new(),
            date: String::new(),
            phase: ConsentPhase::Editing,
            error: None,
        }
    }

    // ---- derived state (pure reads) ----

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> ConsentPhase {
        self.phase
    }

    /// State of one acknowledgment checkbox
    #[must_use]
    pub fn is_checked(&self, index: usize) -> bool {
        self.boxes.get(index).copied().unwrap_or(false)
    }

    /// Whether all six acknowledgments are checked
    #[must_use]
    pub fn all_checked(&self) -> bool {
        self.boxes.iter().all(|b| *b)
    }

    /// Whether the submit control is enabled
    ///
    /// All six booleans true, all three text fields non-empty, and no
    /// request already in flight.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == ConsentPhase::Editing
            && self.all_checked()
            && !self.participant_name.is_empty()
            && !self.signature.is_empty()
            && !self.date.is_empty()
    }

    /// Error message to display, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current text of a field
    #[must_use]
    pub fn field(&self, field: ConsentField) -> &str {
        match field {
            ConsentField::ParticipantName => &self.participant_name,
            ConsentField::Signature => &self.signature,
            ConsentField::Date => &self.date,
        }
    }

    /// Assemble the wire payload from current state
    #[must_use]
    pub fn build_submission(&self) -> ConsentSubmission {
        ConsentSubmission {
            consent1: self.boxes[0],
            consent2: self.boxes[1],
            consent3: self.boxes[2],
            consent4: self.boxes[3],
            consent5: self.boxes[4],
            consent6: self.boxes[5],
            participant_name: self.participant_name.clone(),
            signature: self.signature.clone(),
            date: self.date.clone(),
        }
    }

    // ---- transitions ----

    /// Apply one event, returning the effects the host must perform
    pub fn apply(&mut self, event: ConsentEvent) -> Vec<ConsentEffect> {
        match event {
            ConsentEvent::BoxToggled(index) => {
                if self.phase == ConsentPhase::Editing && index < ACKNOWLEDGMENT_COUNT {
                    self.boxes[index] = !self.boxes[index];
                    self.error = None;
                }
                Vec::new()
            }
            ConsentEvent::FieldEdited(field, text) => {
                if self.phase == ConsentPhase::Editing {
                    match field {
                        ConsentField::ParticipantName => self.participant_name = text,
                        ConsentField::Signature => self.signature = text,
                        ConsentField::Date => self.date = text,
                    }
                    self.error = None;
                }
                Vec::new()
            }
            ConsentEvent::SubmitPressed => {
                if !self.can_submit() {
                    if self.phase == ConsentPhase::Editing {
                        self.error = Some("Please complete the form.".to_string());
                    }
                    return Vec::new();
                }
                self.error = None;
                self.phase = ConsentPhase::Submitting;
                vec![ConsentEffect::Submit(self.build_submission())]
            }
            ConsentEvent::SubmitResolved(result) => {
                if self.phase != ConsentPhase::Submitting {
                    return Vec::new();
                }
                match result {
                    Ok(_receipt) => {
                        self.phase = ConsentPhase::Acknowledged;
                    }
                    Err(failure) => {
                        // Keep everything the participant entered
                        self.phase = ConsentPhase::Editing;
                        self.error =
                            Some(format!("Submission failed: {}", failure.user_message()));
                    }
                }
                Vec::new()
            }
            ConsentEvent::AcknowledgmentDismissed => {
                if self.phase == ConsentPhase::Acknowledged {
                    vec![ConsentEffect::NavigateToDebrief]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Drive a full submit round against a transport
    pub async fn submit_via<A: SubmitApi + ?Sized>(&mut self, api: &A) -> Vec<ConsentEffect> {
        let effects = self.apply(ConsentEvent::SubmitPressed);
        let Some(ConsentEffect::Submit(submission)) = effects.into_iter().next() else {
            return Vec::new();
        };
        let result = api.submit_consent(&submission).await;
        self.apply(ConsentEvent::SubmitResolved(result))
    }
}

impl Default for ConsentController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_controller() -> ConsentController {
        let mut controller = ConsentController::new();
        for i in 0..ACKNOWLEDGMENT_COUNT {
            controller.apply(ConsentEvent::BoxToggled(i));
        }
        controller.apply(ConsentEvent::FieldEdited(
            ConsentField::ParticipantName,
            "Ada Lovelace".to_string(),
        ));
        controller.apply(ConsentEvent::FieldEdited(
            ConsentField::Signature,
            "Ada Lovelace".to_string(),
        ));
        controller.apply(ConsentEvent::FieldEdited(
            ConsentField::Date,
            "2025-03-09".to_string(),
        ));
        controller
    }

    fn receipt() -> SubmissionReceipt {
        SubmissionReceipt {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            message: "Consent stored".to_string(),
        }
    }

    #[test]
    fn submit_disabled_until_everything_is_filled() {
        let mut controller = ConsentController::new();
        assert!(!controller.can_submit());

        for i in 0..ACKNOWLEDGMENT_COUNT {
            controller.apply(ConsentEvent::BoxToggled(i));
        }
        assert!(controller.all_checked());
        assert!(!controller.can_submit(), "text fields still empty");

        controller.apply(ConsentEvent::FieldEdited(
            ConsentField::ParticipantName,
            "Ada".to_string(),
        ));
        controller.apply(ConsentEvent::FieldEdited(
            ConsentField::Signature,
            "Ada".to_string(),
        ));
        assert!(!controller.can_submit(), "date still empty");

        controller.apply(ConsentEvent::FieldEdited(
            ConsentField::Date,
            "2025-03-09".to_string(),
        ));
        assert!(controller.can_submit());
    }

    #[test]
    fn unchecking_one_box_disables_submit_again() {
        let mut controller = filled_controller();
        assert!(controller.can_submit());

        controller.apply(ConsentEvent::BoxToggled(2));
        assert!(!controller.can_submit());
    }

    #[test]
    fn premature_submit_is_blocked_with_a_message() {
        let mut controller = ConsentController::new();
        let effects = controller.apply(ConsentEvent::SubmitPressed);
        assert!(effects.is_empty());
        assert_eq!(controller.error(), Some("Please complete the form."));
    }

    #[test]
    fn submit_emits_the_full_payload() {
        let mut controller = filled_controller();
        let effects = controller.apply(ConsentEvent::SubmitPressed);

        let [ConsentEffect::Submit(payload)] = effects.as_slice() else {
            panic!("expected a submit effect, got {effects:?}");
        };
        assert!(payload.consent1 && payload.consent6);
        assert_eq!(payload.participant_name, "Ada Lovelace");
        assert_eq!(payload.date, "2025-03-09");
        assert_eq!(controller.phase(), ConsentPhase::Submitting);
        assert!(!controller.can_submit(), "no second submit while in flight");
    }

    #[test]
    fn edits_are_frozen_while_submitting() {
        let mut controller = filled_controller();
        controller.apply(ConsentEvent::SubmitPressed);

        controller.apply(ConsentEvent::BoxToggled(0));
        controller.apply(ConsentEvent::FieldEdited(
            ConsentField::Signature,
            "someone else".to_string(),
        ));
        assert!(controller.is_checked(0));
        assert_eq!(controller.field(ConsentField::Signature), "Ada Lovelace");
    }

    #[test]
    fn rejection_keeps_entered_state_for_the_retry() {
        let mut controller = filled_controller();
        controller.apply(ConsentEvent::SubmitPressed);

        let effects = controller.apply(ConsentEvent::SubmitResolved(Err(
            SubmitFailure::Rejected("consent3 must be checked".to_string()),
        )));
        assert!(effects.is_empty());
        assert_eq!(controller.phase(), ConsentPhase::Editing);
        assert_eq!(
            controller.error(),
            Some("Submission failed: consent3 must be checked")
        );
        assert!(controller.all_checked());
        assert_eq!(controller.field(ConsentField::ParticipantName), "Ada Lovelace");
        assert!(controller.can_submit(), "retry is user-initiated");
    }

    #[test]
    fn success_acknowledges_then_navigates_on_dismiss() {
        let mut controller = filled_controller();
        controller.apply(ConsentEvent::SubmitPressed);

        let effects = controller.apply(ConsentEvent::SubmitResolved(Ok(receipt())));
        assert!(effects.is_empty());
        assert_eq!(controller.phase(), ConsentPhase::Acknowledged);

        let effects = controller.apply(ConsentEvent::AcknowledgmentDismissed);
        assert_eq!(effects, vec![ConsentEffect::NavigateToDebrief]);
    }

    #[test]
    fn dismiss_outside_acknowledged_does_nothing() {
        let mut controller = ConsentController::new();
        assert!(controller
            .apply(ConsentEvent::AcknowledgmentDismissed)
            .is_empty());
    }

    #[test]
    fn network_failure_is_generic() {
        let mut controller = filled_controller();
        controller.apply(ConsentEvent::SubmitPressed);
        controller.apply(ConsentEvent::SubmitResolved(Err(SubmitFailure::Network(
            "dns failure".to_string(),
        ))));

        let message = controller.error().unwrap();
        assert!(message.contains("Network error"));
        assert!(!message.contains("dns"));
    }
}
