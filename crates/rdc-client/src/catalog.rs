//! The study catalog: sections and questions as presented to participants
//!
//! The survey controller is generic over any section list; this module holds
//! the default study content (three sections, five questions each). Stored
//! submissions carry a snapshot of this structure so answers stay
//! interpretable if the catalog changes later.

use once_cell::sync::Lazy;
use rdc_core::SectionRef;

/// One survey question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub text: String,
}

impl Question {
    /// Create a question
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A named, ordered group of questions presented together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveySection {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

impl SurveySection {
    /// Question ids in presentation order
    #[must_use]
    pub fn question_ids(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.id.clone()).collect()
    }

    /// Structural snapshot for a submission
    #[must_use]
    pub fn snapshot(&self) -> SectionRef {
        SectionRef {
            id: self.id.clone(),
            title: Some(self.title.clone()),
            question_ids: self.question_ids(),
        }
    }
}

static DEFAULT_SECTIONS: Lazy<Vec<SurveySection>> = Lazy::new(|| {
    vec![
        SurveySection {
            id: "usability".to_string(),
            title: "Section 1: Usability and User Experience".to_string(),
            description: "These questions assess how intuitive the platform feels, aligning \
                          with front-end choices like React UI for responsive dashboards."
                .to_string(),
            questions: vec![
                Question::new(
                    "u1",
                    "On a scale of 1 to 5, how strongly do you agree that the platform's \
                     dashboard is easy to navigate during a high-stress situation like a flood \
                     response?",
                ),
                Question::new(
                    "u2",
                    "On a scale of 1 to 5, how strongly do you agree that the maps and alerts \
                     in the platform help you quickly understand aid needs without needing extra \
                     training?",
                ),
                Question::new(
                    "u3",
                    "On a scale of 1 to 5, how strongly do you agree that the platform works \
                     well in low-connectivity areas, such as rural zones with intermittent \
                     internet?",
                ),
                Question::new(
                    "u4",
                    "On a scale of 1 to 5, how strongly do you agree that the multi-language \
                     features make the platform accessible for diverse team members?",
                ),
                Question::new(
                    "u5",
                    "On a scale of 1 to 5, how strongly do you agree that the platform's \
                     interface reduces the time needed to coordinate logistics compared to your \
                     current tools?",
                ),
            ],
        },
        SurveySection {
            id: "scalability".to_string(),
            title: "Section 2: Scalability and Reliability".to_string(),
            description: "These questions evaluate the platform's ability to handle growth and \
                          maintain performance, based on features like automated deployments and \
                          backups."
                .to_string(),
            questions: vec![
                Question::new(
                    "s1",
                    "On a scale of 1 to 5, how strongly do you agree that the platform handles \
                     sudden increases in users (e.g., during a major disaster) without slowing \
                     down?",
                ),
                Question::new(
                    "s2",
                    "On a scale of 1 to 5, how strongly do you agree that the platform's quick \
                     setup features (like automated deployments) make it practical for small \
                     teams with limited IT resources?",
                ),
                Question::new(
                    "s3",
                    "On a scale of 1 to 5, how strongly do you agree that the platform remains \
                     reliable across different regions or time zones?",
                ),
                Question::new(
                    "s4",
                    "On a scale of 1 to 5, how strongly do you agree that the platform \
                     minimizes downtime during updates, allowing continuous aid coordination?",
                ),
                Question::new(
                    "s5",
                    "On a scale of 1 to 5, how strongly do you agree that the platform's \
                     resilience features (e.g., backups) give you confidence in using it for \
                     critical tasks?",
                ),
            ],
        },
        SurveySection {
            id: "ai".to_string(),
            title: "Section 3: AI Integration and Effectiveness".to_string(),
            description: "These questions focus on the perceived value of AI features, such as \
                          alerts and resource prioritization, in humanitarian contexts."
                .to_string(),
            questions: vec![
                Question::new(
                    "a1",
                    "On a scale of 1 to 5, how strongly do you agree that the platform's AI \
                     alerts help prioritize medical resources effectively in emergencies?",
                ),
                Question::new(
                    "a2",
                    "On a scale of 1 to 5, how strongly do you agree that the AI features make \
                     resource allocation faster and more accurate than manual methods?",
                ),
                Question::new(
                    "a3",
                    "On a scale of 1 to 5, how strongly do you agree that the platform's AI \
                     reduces errors in logistics planning, based on your experience?",
                ),
                Question::new(
                    "a4",
                    "On a scale of 1 to 5, how strongly do you agree that the AI updates \
                     (e.g., during crises) improve the platform's usefulness without \
                     complicating your workflow?",
                ),
                Question::new(
                    "a5",
                    "On a scale of 1 to 5, how strongly do you agree that the AI helps in \
                     coordinating with other organizations seamlessly?",
                ),
            ],
        },
    ]
});

/// The default study sections
#[must_use]
pub fn default_sections() -> Vec<SurveySection> {
    DEFAULT_SECTIONS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_shape() {
        let sections = default_sections();
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| s.questions.len() == 5));

        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["usability", "scalability", "ai"]);
    }

    #[test]
    fn question_ids_are_unique_across_sections() {
        let sections = default_sections();
        let all: Vec<String> = sections.iter().flat_map(SurveySection::question_ids).collect();
        let unique: std::collections::HashSet<&String> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
    }

    #[test]
    fn snapshot_carries_ordered_question_ids() {
        let snapshot = default_sections()[0].snapshot();
        assert_eq!(snapshot.id, "usability");
        assert_eq!(snapshot.question_ids, vec!["u1", "u2", "u3", "u4", "u5"]);
    }
}
