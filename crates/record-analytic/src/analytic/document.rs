use serde::{Deserialize, Serialize};

/// One model definition inside a document. `model` is opaque to the analytic and only handed to
/// the evaluator factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor<M> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub model: M,
}

impl<M> ModelDescriptor<M> {
    pub fn new(name: Option<&str>, model: M) -> Self {
        Self {
            name: name.map(str::to_string),
            model,
        }
    }

    pub fn named(name: &str, model: M) -> Self {
        Self::new(Some(name), model)
    }

    pub fn unnamed(model: M) -> Self {
        Self::new(None, model)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Ordered collection of model descriptors, as produced by a document loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument<M> {
    pub models: Vec<ModelDescriptor<M>>,
}

impl<M> ModelDocument<M> {
    pub fn new(models: Vec<ModelDescriptor<M>>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[ModelDescriptor<M>] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<M> FromIterator<ModelDescriptor<M>> for ModelDocument<M> {
    fn from_iter<T: IntoIterator<Item = ModelDescriptor<M>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
