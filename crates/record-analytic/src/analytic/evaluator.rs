use std::error::Error as StdError;

use tracing::debug;

use super::document::ModelDescriptor;
use super::record::{FieldValue, ModelInputMap, ModelOutputMap};
use super::service::ModelError;

/// Executes one resolved model. Implementations are shared across concurrent evaluation calls
/// and must not keep per-call mutable state.
pub trait ModelEvaluator: Send + Sync {
    /// Missing value, outlier, and type treatment for a single model input.
    fn prepare(&self, _field: &str, raw: &FieldValue) -> FieldValue {
        raw.clone()
    }

    fn evaluate(&self, input: &ModelInputMap) -> Result<ModelOutputMap, EvaluationError>;
}

/// Resolves a descriptor into an evaluator handle owned by the analytic.
pub trait EvaluatorFactory<M> {
    type Evaluator: ModelEvaluator;

    fn create(&self, descriptor: &ModelDescriptor<M>) -> Result<Self::Evaluator, ModelError>;
}

/// Failure reported by an evaluator for a single record.
#[derive(Debug, thiserror::Error)]
#[error("model evaluation failed: {message}")]
pub struct EvaluationError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Hands a prepared input map to the evaluator. Failures are returned as-is; retrying is left to
/// whoever delivers the records.
pub fn evaluate_model<E>(
    evaluator: &E,
    input: &ModelInputMap,
) -> Result<ModelOutputMap, EvaluationError>
where
    E: ModelEvaluator + ?Sized,
{
    debug!(fields = input.len(), "before model evaluation");
    let output = evaluator.evaluate(input)?;
    debug!(fields = output.len(), "after model evaluation");
    Ok(output)
}
