//! Answer normalization
//!
//! Clients submit answers in one of two shapes: an ordered sequence of
//! `{questionId, value}` pairs, or a key-value map `{questionId: value}`.
//! [`AnswerSet`] models that union at the API boundary; [`AnswerSet::normalize`]
//! converts either shape into the one canonical ordered-pairs form before any
//! business logic touches it.
//!
//! Values are coerced to integers here; a value that cannot be coerced is
//! carried through as `None` and rejected downstream by the survey validator,
//! which owns the 1..=5 range rule.

use indexmap::IndexMap;
use serde_json::Value;

/// One answer entry as received in the pairs form, value not yet coerced
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerPair {
    pub question_id: String,
    pub value: Value,
}

impl AnswerPair {
    /// Create a new uncoerced pair
    #[inline]
    #[must_use]
    pub fn new(question_id: impl Into<String>, value: Value) -> Self {
        Self {
            question_id: question_id.into(),
            value,
        }
    }
}

/// The two accepted client answer shapes
///
/// Map input keeps the map's natural iteration order (insertion order as
/// received), which is NOT guaranteed to match question order — callers that
/// need stable question order must supply the pairs form or consult the
/// survey's `sections.questionIds` snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerSet {
    /// Ordered `{questionId, value}` pairs
    Pairs(Vec<AnswerPair>),
    /// `questionId -> value` map
    Map(IndexMap<String, Value>),
}

/// One normalized answer: questionId plus the coerced value
///
/// `value` is `None` when coercion failed; range enforcement happens in the
/// validator, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnswer {
    pub question_id: String,
    pub value: Option<i64>,
}

impl AnswerSet {
    /// Number of entries in either shape
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            AnswerSet::Pairs(pairs) => pairs.len(),
            AnswerSet::Map(map) => map.len(),
        }
    }

    /// Whether the set holds no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert either shape into canonical ordered pairs
    ///
    /// Pure transformation: pairs input keeps its order, map input follows
    /// the map's iteration order. Each value is coerced to an integer.
    #[must_use]
    pub fn normalize(self) -> Vec<RawAnswer> {
        match self {
            AnswerSet::Pairs(pairs) => pairs
                .into_iter()
                .map(|pair| RawAnswer {
                    question_id: pair.question_id,
                    value: coerce_integer(&pair.value),
                })
                .collect(),
            AnswerSet::Map(map) => map
                .into_iter()
                .map(|(question_id, value)| RawAnswer {
                    question_id,
                    value: coerce_integer(&value),
                })
                .collect(),
        }
    }
}

/// Coerce a JSON value to an integer
///
/// Accepts JSON integers, integral floats and numeric strings (the shapes a
/// loosely-typed client can produce for a 1-5 rating). Everything else is
/// `None`.
#[must_use]
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Some(i)
            } else {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }
        }
        _ => None,
    }
}
