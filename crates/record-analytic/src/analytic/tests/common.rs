use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{json, Value};

use crate::analytic::{
    EvaluationError, EvaluatorFactory, FieldValue, ModelDescriptor, ModelDocument, ModelError,
    ModelEvaluator, ModelInputMap, ModelOutputMap, Record,
};

/// Test model: sums its numeric inputs and multiplies by `scale`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct SumModel {
    pub(super) target: String,
    pub(super) scale: f64,
}

pub(super) struct SumEvaluator {
    target: String,
    scale: f64,
}

impl ModelEvaluator for SumEvaluator {
    fn prepare(&self, _field: &str, raw: &FieldValue) -> FieldValue {
        match raw {
            FieldValue::Present(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .map(|number| FieldValue::Present(json!(number)))
                .unwrap_or_else(|_| raw.clone()),
            other => other.clone(),
        }
    }

    fn evaluate(&self, input: &ModelInputMap) -> Result<ModelOutputMap, EvaluationError> {
        let mut total = 0.0;
        for (field, value) in input {
            match value {
                FieldValue::Absent => continue,
                FieldValue::Present(value) => {
                    total += value.as_f64().ok_or_else(|| {
                        EvaluationError::new(format!("input '{field}' is not numeric"))
                    })?;
                }
            }
        }

        let mut output = ModelOutputMap::new();
        output.insert(self.target.clone(), json!(total * self.scale));
        output.insert("inputCount".to_string(), json!(input.len()));
        Ok(output)
    }
}

#[derive(Default)]
pub(super) struct SumFactory {
    pub(super) created: AtomicUsize,
}

impl SumFactory {
    pub(super) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl EvaluatorFactory<SumModel> for SumFactory {
    type Evaluator = SumEvaluator;

    fn create(&self, descriptor: &ModelDescriptor<SumModel>) -> Result<SumEvaluator, ModelError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if descriptor.model.scale.is_nan() {
            return Err(ModelError::EvaluatorUnavailable {
                model: descriptor.name().unwrap_or_default().to_string(),
                reason: "scale must be a number".to_string(),
            });
        }

        Ok(SumEvaluator {
            target: descriptor.model.target.clone(),
            scale: descriptor.model.scale,
        })
    }
}

pub(super) fn sum_model(target: &str, scale: f64) -> SumModel {
    SumModel {
        target: target.to_string(),
        scale,
    }
}

/// Two named clustering-style models followed by an unnamed one.
pub(super) fn multiple_models() -> ModelDocument<SumModel> {
    ModelDocument::new(vec![
        ModelDescriptor::named("KMeans_Model1", sum_model("predictedValue", 1.0)),
        ModelDescriptor::named("KMeans_Model2", sum_model("predictedValue", 10.0)),
        ModelDescriptor::unnamed(sum_model("predictedValue", 100.0)),
    ])
}

pub(super) fn iris_record() -> Record {
    Record::from_pairs([
        ("Sepal.Length", json!(6.4)),
        ("Sepal.Width", json!(3.2)),
        ("Petal.Length", json!(4.5)),
        ("Petal.Width", json!(1.5)),
    ])
}
