use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::question::QuestionId;

/// Recorded answer value; its shape follows the question kind.
///
/// Ratings are held as a wide integer so out-of-scale numbers in an answers
/// file still load and can be reported by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Rating(i64),
    Text(String),
}

impl AnswerValue {
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Rating(rating) => rating.to_string(),
            AnswerValue::Text(text) => text.clone(),
        }
    }
}

impl From<u8> for AnswerValue {
    fn from(value: u8) -> Self {
        AnswerValue::Rating(i64::from(value))
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

/// Raised when raw input cannot be turned into a value for the question kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerParseError {
    #[error("an answer is required")]
    Empty,
    #[error("'{raw}' is not a rating between 1 and {max}")]
    NotARating { raw: String, max: u8 },
    #[error("rating {value} is outside 1..={max}")]
    OutOfRange { value: i64, max: u8 },
}

/// Where a question stands in the current answer map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState<'a> {
    /// Never reached or never answered.
    Unanswered,
    /// Explicitly skipped by the respondent.
    Skipped,
    Answered(&'a AnswerValue),
}

/// Answers keyed by question id. `None` is the skipped marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<QuestionId, Option<AnswerValue>>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: QuestionId, value: AnswerValue) {
        self.0.insert(id, Some(value));
    }

    pub fn mark_skipped(&mut self, id: QuestionId) {
        self.0.insert(id, None);
    }

    pub fn state(&self, id: QuestionId) -> AnswerState<'_> {
        match self.0.get(&id) {
            None => AnswerState::Unanswered,
            Some(None) => AnswerState::Skipped,
            Some(Some(value)) => AnswerState::Answered(value),
        }
    }

    pub fn value(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.0.get(&id).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.0.keys().copied()
    }
}
