use super::mapping::FieldMappingSpec;
use super::record::{FieldValue, ModelOutputMap, Record};

/// Hook that may rewrite raw model output before it is merged into the result record.
///
/// `result_fields` lists the configured model-side names, or is `None` when every model output is
/// mapped.
pub trait OutputEnhancer: Send + Sync {
    fn enhance(&self, result_fields: Option<&[String]>, output: ModelOutputMap) -> ModelOutputMap;
}

impl<F> OutputEnhancer for F
where
    F: Fn(Option<&[String]>, ModelOutputMap) -> ModelOutputMap + Send + Sync,
{
    fn enhance(&self, result_fields: Option<&[String]>, output: ModelOutputMap) -> ModelOutputMap {
        self(result_fields, output)
    }
}

/// Output side of an analytic with its result field list compiled once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMapper {
    spec: FieldMappingSpec,
    // (model field, result field) in configured order; `None` emits every model output as-is
    result_fields: Option<Vec<(String, String)>>,
    model_fields: Option<Vec<String>>,
}

impl OutputMapper {
    pub fn new(spec: FieldMappingSpec) -> Self {
        let result_fields: Option<Vec<(String, String)>> = spec.pairs().map(|pairs| {
            pairs
                .into_iter()
                .map(|(source, target)| (source.to_string(), target.to_string()))
                .collect()
        });
        let model_fields = result_fields
            .as_ref()
            .map(|pairs| pairs.iter().map(|(source, _)| source.clone()).collect());

        Self {
            spec,
            result_fields,
            model_fields,
        }
    }

    pub fn spec(&self) -> &FieldMappingSpec {
        &self.spec
    }

    /// Model-side names this mapper reads, `None` for identity.
    pub fn model_fields(&self) -> Option<&[String]> {
        self.model_fields.as_deref()
    }

    /// Merges `output` into a copy of `input`.
    ///
    /// A result field that already exists in the input is overwritten where it stands; any other
    /// is appended. Configured fields the model did not produce are written as
    /// [`FieldValue::Absent`].
    pub fn map(&self, input: &Record, output: &ModelOutputMap) -> Record {
        let mut result = input.clone();

        match &self.result_fields {
            None => {
                for (field, value) in output {
                    result.insert(field.as_str(), FieldValue::Present(value.clone()));
                }
            }
            Some(pairs) => {
                for (model_field, result_field) in pairs {
                    let value = FieldValue::from(output.get(model_field).cloned());
                    result.insert(result_field.as_str(), value);
                }
            }
        }

        result
    }
}

/// One-shot form of [`OutputMapper::map`].
pub fn map_output(spec: &FieldMappingSpec, input: &Record, output: &ModelOutputMap) -> Record {
    OutputMapper::new(spec.clone()).map(input, output)
}
