use record_analytic::analytic::{
    EvaluationError, EvaluatorFactory, FieldValue, ModelDescriptor, ModelError, ModelEvaluator,
    ModelInputMap, ModelOutputMap,
};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Linear model shipped with the processor so the service runs without an external engine.
///
/// ```json
/// { "name": "Rent", "target": "predictedRent", "intercept": 400.0,
///   "coefficients": { "bedrooms": 250.0, "sqft": 0.8 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RegressionModel {
    pub(crate) target: String,
    #[serde(default)]
    pub(crate) intercept: f64,
    pub(crate) coefficients: BTreeMap<String, f64>,
}

#[derive(Debug, Clone)]
pub(crate) struct RegressionEvaluator {
    model: RegressionModel,
}

impl ModelEvaluator for RegressionEvaluator {
    /// Numeric strings become numbers and blank strings count as missing.
    fn prepare(&self, _field: &str, raw: &FieldValue) -> FieldValue {
        match raw {
            FieldValue::Present(Value::String(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return FieldValue::Absent;
                }
                match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
                    Some(number) => FieldValue::Present(Value::Number(number)),
                    None => raw.clone(),
                }
            }
            FieldValue::Present(Value::Null) => FieldValue::Absent,
            other => other.clone(),
        }
    }

    fn evaluate(&self, input: &ModelInputMap) -> Result<ModelOutputMap, EvaluationError> {
        let mut total = self.model.intercept;

        for (field, weight) in &self.model.coefficients {
            let value = match input.get(field) {
                Some(FieldValue::Present(value)) => value,
                Some(FieldValue::Absent) | None => {
                    return Err(EvaluationError::new(format!("missing input '{field}'")));
                }
            };
            let not_numeric = || format!("input '{field}' is not numeric: {value}");
            let number = match value {
                // reaches here as text when a custom preparer skipped the coercion
                Value::String(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_err(|err| EvaluationError::with_source(not_numeric(), err))?,
                other => other
                    .as_f64()
                    .ok_or_else(|| EvaluationError::new(not_numeric()))?,
            };
            total += weight * number;
        }

        let prediction = Number::from_f64(total)
            .map(Value::Number)
            .ok_or_else(|| EvaluationError::new("prediction is not a finite number"))?;

        let mut output = ModelOutputMap::new();
        output.insert(self.model.target.clone(), prediction);
        Ok(output)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RegressionFactory;

impl EvaluatorFactory<RegressionModel> for RegressionFactory {
    type Evaluator = RegressionEvaluator;

    fn create(
        &self,
        descriptor: &ModelDescriptor<RegressionModel>,
    ) -> Result<Self::Evaluator, ModelError> {
        let model = &descriptor.model;
        let unavailable = |reason: &str| ModelError::EvaluatorUnavailable {
            model: descriptor.name().unwrap_or("<unnamed>").to_string(),
            reason: reason.to_string(),
        };

        if model.target.trim().is_empty() {
            return Err(unavailable("regression target must not be blank"));
        }
        if model.coefficients.is_empty() {
            return Err(unavailable("regression needs at least one coefficient"));
        }
        if !model.intercept.is_finite() || model.coefficients.values().any(|w| !w.is_finite()) {
            return Err(unavailable("regression weights must be finite"));
        }

        Ok(RegressionEvaluator {
            model: model.clone(),
        })
    }
}
