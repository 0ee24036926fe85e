use serde::{Deserialize, Serialize};

use crate::answers::{AnswerMap, AnswerState, AnswerValue};
use crate::spec::catalog::SurveyCatalog;
use crate::spec::question::{QuestionDefinition, QuestionId};

/// A single problem found in an answer map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub question_id: QuestionId,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing_required: Vec<QuestionId>,
    pub unknown_fields: Vec<QuestionId>,
}

/// Reports how `answers` measure up against `catalog`.
///
/// Advisory only: the flow controller never consults this before moving on.
/// A skipped required question counts as missing.
pub fn validate(catalog: &SurveyCatalog, answers: &AnswerMap) -> ValidationResult {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for question in &catalog.questions {
        match answers.state(question.id) {
            AnswerState::Unanswered | AnswerState::Skipped => {
                if question.required {
                    missing_required.push(question.id);
                }
            }
            AnswerState::Answered(value) => {
                if let Some(error) = validate_value(question, value) {
                    errors.push(error);
                }
            }
        }
    }

    let unknown_fields: Vec<QuestionId> = answers
        .ids()
        .filter(|id| !catalog.contains(*id))
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

fn validate_value(question: &QuestionDefinition, value: &AnswerValue) -> Option<ValidationError> {
    if question.kind.accepts(value) {
        return None;
    }

    let (message, code) = match (question.kind.scale(), value) {
        (Some(max), AnswerValue::Rating(_)) => (
            format!("rating must be between 1 and {max}"),
            "out_of_range",
        ),
        _ => (
            format!("expected a {} answer", question.kind.as_str()),
            "type_mismatch",
        ),
    };
    Some(ValidationError {
        question_id: question.id,
        message,
        code: code.into(),
    })
}
