use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::spec::question::{QuestionDefinition, QuestionId, QuestionKind};

/// Errors raised while loading a question catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("catalog '{0}' defines no questions")]
    Empty(String),
    #[error("question id {0} is defined more than once")]
    DuplicateId(QuestionId),
}

/// Copy shown on the screens around the questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Presentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thank_you: Option<String>,
}

/// Ordered, immutable list of questions presented by a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SurveyCatalog {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Presentation>,
    pub questions: Vec<QuestionDefinition>,
}

impl SurveyCatalog {
    /// The customer feedback survey shipped with the binary.
    pub fn feedback() -> Self {
        Self {
            id: "customer-feedback".into(),
            title: "Customer Feedback".into(),
            version: "1.0.0".into(),
            description: Some("This survey will take just a few minutes to complete.".into()),
            presentation: Some(Presentation {
                welcome: Some(
                    "We value your feedback and would love to hear about your experience with us."
                        .into(),
                ),
                thank_you: Some(
                    "We appreciate you taking the time to share your thoughts with us.".into(),
                ),
            }),
            questions: vec![
                QuestionDefinition::new(
                    1,
                    "How satisfied are you with our service?",
                    QuestionKind::Rating5,
                    true,
                ),
                QuestionDefinition::new(
                    2,
                    "How likely are you to recommend us to a friend or colleague?",
                    QuestionKind::Rating10,
                    true,
                ),
                QuestionDefinition::new(
                    3,
                    "How would you rate the value for money of our product?",
                    QuestionKind::Rating5,
                    false,
                ),
                QuestionDefinition::new(
                    4,
                    "How satisfied are you with the quality of our customer support?",
                    QuestionKind::Rating5,
                    false,
                ),
                QuestionDefinition::new(
                    5,
                    "Do you have any suggestions for improvement?",
                    QuestionKind::FreeText,
                    false,
                ),
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: SurveyCatalog = serde_json::from_str(json).map_err(CatalogError::Parse)?;
        catalog.check()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Ensures the catalog is non-empty and its ids are unique.
    pub fn check(&self) -> Result<(), CatalogError> {
        if self.questions.is_empty() {
            return Err(CatalogError::Empty(self.id.clone()));
        }
        let mut seen = BTreeSet::new();
        for question in &self.questions {
            if !seen.insert(question.id) {
                return Err(CatalogError::DuplicateId(question.id));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuestionDefinition> {
        self.questions.get(index)
    }

    pub fn find(&self, id: QuestionId) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.find(id).is_some()
    }

    pub fn welcome_text(&self) -> Option<&str> {
        self.presentation
            .as_ref()
            .and_then(|presentation| presentation.welcome.as_deref())
            .or(self.description.as_deref())
    }

    pub fn thank_you_text(&self) -> Option<&str> {
        self.presentation
            .as_ref()
            .and_then(|presentation| presentation.thank_you.as_deref())
    }
}

/// JSON Schema describing the catalog file format.
pub fn catalog_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(SurveyCatalog)).unwrap_or(Value::Null)
}
