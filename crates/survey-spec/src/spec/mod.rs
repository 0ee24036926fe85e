pub mod catalog;
pub mod question;

pub use catalog::{CatalogError, Presentation, SurveyCatalog, catalog_schema};
pub use question::{QuestionDefinition, QuestionId, QuestionKind};
