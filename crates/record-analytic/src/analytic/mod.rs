//! Model selection and field mapping around an external model evaluator.
//!
//! A record enters through the input mapper, is evaluated by the model picked from a
//! multi-model document, and leaves as a copy of itself with the model outputs merged in.

pub mod document;
pub mod evaluator;
pub mod input;
pub mod loader;
pub mod mapping;
pub mod output;
pub mod record;
pub mod selector;
pub mod service;

#[cfg(test)]
mod tests;

pub use document::{ModelDescriptor, ModelDocument};
pub use evaluator::{evaluate_model, EvaluationError, EvaluatorFactory, ModelEvaluator};
pub use input::{map_input, InputMapper, ValuePreparer};
pub use loader::{
    DocumentLoadError, DocumentLoader, DocumentParser, JsonDocumentParser, ResourceDocumentLoader,
};
pub use mapping::{parse_mapping, ConfigurationError, FieldMappingSpec};
pub use output::{map_output, OutputEnhancer, OutputMapper};
pub use record::{FieldValue, ModelInputMap, ModelOutputMap, Record};
pub use selector::{select, SelectedModel};
pub use service::{Analytic, AnalyticError, ModelError};
