#![allow(missing_docs)]

pub mod answers;
pub mod response;
pub mod session;
pub mod spec;
pub mod validate;

pub use answers::{AnswerMap, AnswerParseError, AnswerState, AnswerValue};
pub use response::{ResponseStatus, SubmittedResponse};
pub use session::SessionId;
pub use spec::{
    CatalogError, Presentation, QuestionDefinition, QuestionId, QuestionKind, SurveyCatalog,
    catalog_schema,
};
pub use validate::{ValidationError, ValidationResult, validate};
