//! The submission store
//!
//! Concurrent document maps keyed by [`SubmissionId`], one per record kind.
//! Every operation touches exactly one record; listing clones matching
//! records out under shard read locks, so writers never block behind a slow
//! reader. When a snapshot path is configured, each successful mutation
//! rewrites the snapshot; a failed rewrite rolls the in-memory change back
//! so memory and disk never disagree about what was persisted.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use rdc_core::{
    find_duplicate_question_id, ConsentRecord, NewConsent, NewSurvey, SubmissionId, SurveyPatch,
    SurveyRecord, ValidationError,
};
use serde::Serialize;

use crate::error::StoreError;
use crate::persist::{self, Snapshot};

/// Message for the persistence-level duplicate invariant
const DUPLICATE_QUESTION_ID: &str = "Duplicate questionId found in answers";

/// Listing filter for surveys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyFilter {
    /// Keep only records with this review state
    pub reviewed: Option<bool>,
    /// Keep only records from this respondent
    pub respondent_id: Option<String>,
}

impl SurveyFilter {
    fn matches(&self, record: &SurveyRecord) -> bool {
        if let Some(reviewed) = self.reviewed {
            if record.reviewed != reviewed {
                return false;
            }
        }
        if let Some(respondent_id) = &self.respondent_id {
            if record.metadata.respondent_id.as_deref() != Some(respondent_id.as_str()) {
                return false;
            }
        }
        true
    }
}

/// One page of survey listings
///
/// `total` and `pages` describe the whole filtered set, independent of the
/// requested window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyPage {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
    pub results: Vec<SurveyRecord>,
}

/// Survey record plus its arrival sequence
///
/// The sequence breaks `createdAt` ties so newest-first ordering (and with
/// it pagination) stays deterministic when submissions land within one clock
/// tick.
#[derive(Debug, Clone)]
struct Stored {
    seq: u64,
    record: SurveyRecord,
}

/// Document store for consent and survey submissions
#[derive(Debug)]
pub struct SubmissionStore {
    consents: DashMap<SubmissionId, ConsentRecord>,
    surveys: DashMap<SubmissionId, Stored>,
    next_seq: AtomicU64,
    snapshot_path: Option<PathBuf>,
}

impl SubmissionStore {
    /// Create an ephemeral store (tests, dev runs)
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            consents: DashMap::new(),
            surveys: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot_path: None,
        }
    }

    /// Open a store backed by a JSON snapshot file
    ///
    /// Loads the snapshot when present; an absent file is an empty store.
    ///
    /// # Errors
    /// Returns [`StoreError::Storage`] when the snapshot exists but cannot
    /// be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let store = Self {
            consents: DashMap::new(),
            surveys: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot_path: Some(path.clone()),
        };

        if let Some(snapshot) = persist::load(&path)? {
            for record in snapshot.consents {
                store.consents.insert(record.id, record);
            }
            // Reassign arrival sequence numbers in stored creation order so
            // listings sort the same way they did before the restart.
            let mut surveys = snapshot.surveys;
            surveys.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            for record in surveys {
                let seq = store.next_seq.fetch_add(1, Ordering::Relaxed);
                store.surveys.insert(record.id, Stored { seq, record });
            }
            tracing::info!(
                consents = store.consents.len(),
                surveys = store.surveys.len(),
                "snapshot loaded"
            );
        }

        Ok(store)
    }

    /// Number of stored consent records
    #[inline]
    #[must_use]
    pub fn consent_count(&self) -> usize {
        self.consents.len()
    }

    /// Number of stored survey records
    #[inline]
    #[must_use]
    pub fn survey_count(&self) -> usize {
        self.surveys.len()
    }

    // ---- consent operations ----

    /// Persist a validated consent submission, returning its new identifier
    ///
    /// # Errors
    /// [`StoreError::Storage`] when the snapshot rewrite fails; the record
    /// is rolled back and not persisted.
    pub fn create_consent(&self, new: NewConsent) -> Result<SubmissionId, StoreError> {
        let now = Utc::now();
        let id = SubmissionId::new();
        let record = ConsentRecord {
            id,
            consent1: new.consent1,
            consent2: new.consent2,
            consent3: new.consent3,
            consent4: new.consent4,
            consent5: new.consent5,
            consent6: new.consent6,
            participant_name: new.participant_name,
            signature: new.signature,
            date: new.date,
            ip_address: new.ip_address,
            user_agent: new.user_agent,
            created_at: now,
            updated_at: now,
        };

        self.consents.insert(id, record);
        if let Err(err) = self.persist() {
            self.consents.remove(&id);
            return Err(err);
        }
        tracing::debug!(%id, "consent stored");
        Ok(id)
    }

    /// Delete a consent record
    ///
    /// Idempotent in effect: a repeated delete of the same id yields
    /// [`StoreError::NotFound`].
    pub fn delete_consent(&self, id: &SubmissionId) -> Result<(), StoreError> {
        let (_, removed) = self.consents.remove(id).ok_or(StoreError::NotFound)?;
        if let Err(err) = self.persist() {
            self.consents.insert(removed.id, removed);
            return Err(err);
        }
        tracing::debug!(%id, "consent deleted");
        Ok(())
    }

    // ---- survey operations ----

    /// Persist a validated, normalized survey submission
    ///
    /// Enforces the storage invariant: questionId unique within the record,
    /// regardless of what the schema-level pass already checked.
    pub fn create_survey(&self, new: NewSurvey) -> Result<SubmissionId, StoreError> {
        if find_duplicate_question_id(&new.answers).is_some() {
            return Err(ValidationError::new(DUPLICATE_QUESTION_ID).into());
        }

        let now = Utc::now();
        let id = SubmissionId::new();
        let record = SurveyRecord {
            id,
            metadata: new.metadata,
            answers: new.answers,
            comments: new.comments,
            sections: new.sections,
            tags: new.tags,
            reviewed: new.reviewed,
            reviewed_at: None,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.surveys.insert(id, Stored { seq, record });
        if let Err(err) = self.persist() {
            self.surveys.remove(&id);
            return Err(err);
        }
        tracing::debug!(%id, "survey stored");
        Ok(id)
    }

    /// Fetch one survey by identifier
    pub fn get_survey(&self, id: &SubmissionId) -> Result<SurveyRecord, StoreError> {
        self.surveys
            .get(id)
            .map(|stored| stored.record.clone())
            .ok_or(StoreError::NotFound)
    }

    /// List surveys matching `filter`, newest submission first
    ///
    /// `page` is 1-based and floored to 1; `limit` is clamped to [5, 200].
    /// `total`/`pages` always describe the full filtered set.
    #[must_use]
    pub fn list_surveys(&self, filter: &SurveyFilter, page: usize, limit: usize) -> SurveyPage {
        let page = page.max(1);
        let limit = limit.clamp(5, 200);

        let mut matched: Vec<(u64, SurveyRecord)> = self
            .surveys
            .iter()
            .filter(|entry| filter.matches(&entry.record))
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        matched.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(&a.0))
        });

        let total = matched.len();
        let results = matched
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .map(|(_, record)| record)
            .collect();

        SurveyPage {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
            results,
        }
    }

    /// Apply a partial update to a survey
    ///
    /// Only the whitelisted fields move: the review flags, shallow-merged
    /// comments, and wholesale answer replacement. Replacement re-enforces
    /// the duplicate-questionId invariant. `updatedAt` is bumped; creation
    /// data is untouched.
    pub fn update_survey(
        &self,
        id: &SubmissionId,
        patch: SurveyPatch,
    ) -> Result<SurveyRecord, StoreError> {
        if let Some(answers) = &patch.answers {
            if find_duplicate_question_id(answers).is_some() {
                return Err(ValidationError::new(DUPLICATE_QUESTION_ID).into());
            }
        }

        let updated = {
            let mut entry = self.surveys.get_mut(id).ok_or(StoreError::NotFound)?;
            let previous = entry.record.clone();
            let record = &mut entry.record;

            if let Some(answers) = patch.answers {
                record.answers = answers;
            }
            if let Some(new_comments) = patch.comments {
                // Shallow merge: incoming keys overwrite same-named existing ones
                record.comments.extend(new_comments);
            }
            if let Some(reviewed_by) = patch.reviewed_by {
                record.reviewed_by = Some(reviewed_by);
            }
            if let Some(reviewed_at) = patch.reviewed_at {
                record.reviewed_at = Some(reviewed_at);
            }
            if let Some(reviewed) = patch.reviewed {
                if reviewed && !record.reviewed && record.reviewed_at.is_none() {
                    record.reviewed_at = Some(Utc::now());
                }
                record.reviewed = reviewed;
            }
            record.updated_at = Utc::now();

            let updated = record.clone();
            drop(entry);

            if let Err(err) = self.persist() {
                if let Some(mut entry) = self.surveys.get_mut(id) {
                    entry.record = previous;
                }
                return Err(err);
            }
            updated
        };

        tracing::debug!(%id, "survey updated");
        Ok(updated)
    }

    /// Delete a survey, returning the removed record
    pub fn delete_survey(&self, id: &SubmissionId) -> Result<SurveyRecord, StoreError> {
        let (_, removed) = self.surveys.remove(id).ok_or(StoreError::NotFound)?;
        if let Err(err) = self.persist() {
            self.surveys.insert(removed.record.id, removed);
            return Err(err);
        }
        tracing::debug!(%id, "survey deleted");
        Ok(removed.record)
    }

    /// Rewrite the snapshot, if one is configured
    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let mut surveys: Vec<(u64, SurveyRecord)> = self
            .surveys
            .iter()
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        surveys.sort_by_key(|(seq, _)| *seq);

        let snapshot = Snapshot {
            consents: self.consents.iter().map(|entry| entry.value().clone()).collect(),
            surveys: surveys.into_iter().map(|(_, record)| record).collect(),
        };
        persist::save(path, &snapshot).map_err(|err| {
            tracing::error!(error = %err, "snapshot rewrite failed, rolling back");
            err
        })
    }
}
