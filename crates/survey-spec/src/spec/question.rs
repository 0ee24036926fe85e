use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::{AnswerParseError, AnswerValue};

/// Stable identifier of a question inside a catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for QuestionId {
    fn from(value: u32) -> Self {
        QuestionId(value)
    }
}

/// Input modality of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum QuestionKind {
    /// Rating on a 1..=5 scale.
    #[serde(rename = "rating-5")]
    Rating5,
    /// Rating on a 1..=10 scale.
    #[serde(rename = "rating-10")]
    Rating10,
    /// Free-form text.
    #[serde(rename = "text")]
    FreeText,
}

impl QuestionKind {
    /// Upper bound of the rating scale, `None` for free text.
    pub fn scale(&self) -> Option<u8> {
        match self {
            QuestionKind::Rating5 => Some(5),
            QuestionKind::Rating10 => Some(10),
            QuestionKind::FreeText => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Rating5 => "rating-5",
            QuestionKind::Rating10 => "rating-10",
            QuestionKind::FreeText => "text",
        }
    }

    /// Whether `value` has the shape and range this kind allows.
    pub fn accepts(&self, value: &AnswerValue) -> bool {
        match (self.scale(), value) {
            (Some(max), AnswerValue::Rating(rating)) => (1..=i64::from(max)).contains(rating),
            (None, AnswerValue::Text(_)) => true,
            _ => false,
        }
    }

    /// Turns raw widget input into a value constrained to this kind.
    pub fn parse_input(&self, raw: &str) -> Result<AnswerValue, AnswerParseError> {
        let Some(max) = self.scale() else {
            return Ok(AnswerValue::Text(raw.to_string()));
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AnswerParseError::Empty);
        }
        let rating: i64 = trimmed
            .parse()
            .map_err(|_| AnswerParseError::NotARating {
                raw: trimmed.to_string(),
                max,
            })?;
        if !(1..=i64::from(max)).contains(&rating) {
            return Err(AnswerParseError::OutOfRange { value: rating, max });
        }
        Ok(AnswerValue::Rating(rating))
    }
}

/// Immutable definition of a single survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionDefinition {
    pub id: QuestionId,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
}

impl QuestionDefinition {
    pub fn new(id: u32, text: impl Into<String>, kind: QuestionKind, required: bool) -> Self {
        Self {
            id: QuestionId(id),
            text: text.into(),
            kind,
            required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_input_is_bounded_by_scale() {
        assert_eq!(
            QuestionKind::Rating5.parse_input(" 4 ").unwrap(),
            AnswerValue::Rating(4)
        );
        assert_eq!(
            QuestionKind::Rating5.parse_input("6").unwrap_err(),
            AnswerParseError::OutOfRange { value: 6, max: 5 }
        );
        assert_eq!(
            QuestionKind::Rating10.parse_input("10").unwrap(),
            AnswerValue::Rating(10)
        );
        assert!(QuestionKind::Rating10.parse_input("0").is_err());
    }

    #[test]
    fn rating_input_rejects_words_and_blanks() {
        assert!(matches!(
            QuestionKind::Rating5.parse_input("great"),
            Err(AnswerParseError::NotARating { max: 5, .. })
        ));
        assert_eq!(
            QuestionKind::Rating10.parse_input("   ").unwrap_err(),
            AnswerParseError::Empty
        );
    }

    #[test]
    fn free_text_keeps_input_verbatim() {
        assert_eq!(
            QuestionKind::FreeText.parse_input("Great service").unwrap(),
            AnswerValue::Text("Great service".into())
        );
    }

    #[test]
    fn accepts_checks_shape_and_range() {
        assert!(QuestionKind::Rating10.accepts(&AnswerValue::Rating(9)));
        assert!(!QuestionKind::Rating5.accepts(&AnswerValue::Rating(9)));
        assert!(!QuestionKind::Rating5.accepts(&AnswerValue::Text("4".into())));
        assert!(!QuestionKind::FreeText.accepts(&AnswerValue::Rating(1)));
    }

    #[test]
    fn kind_uses_catalog_labels() {
        let value = serde_json::to_value(QuestionKind::Rating10).unwrap();
        assert_eq!(value, "rating-10");
        let kind: QuestionKind = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(kind, QuestionKind::FreeText);
        assert_eq!(kind.as_str(), "text");
    }
}
