use super::document::{ModelDescriptor, ModelDocument};
use super::service::ModelError;

/// The one descriptor an analytic evaluates, together with its position in the document.
#[derive(Debug)]
pub struct SelectedModel<'a, M> {
    pub index: usize,
    pub descriptor: &'a ModelDescriptor<M>,
}

impl<M> Clone for SelectedModel<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for SelectedModel<'_, M> {}

impl<'a, M> SelectedModel<'a, M> {
    pub fn name(&self) -> Option<&'a str> {
        self.descriptor.name()
    }
}

/// Picks the model to evaluate.
///
/// Without a name (or with a blank one) the first model of the document is the default. With a
/// name, the first model carrying exactly that name wins; unnamed models never match.
pub fn select<'a, M>(
    document: &'a ModelDocument<M>,
    name: Option<&str>,
) -> Result<SelectedModel<'a, M>, ModelError> {
    if document.is_empty() {
        return Err(ModelError::EmptyDocument);
    }

    let requested = name.filter(|name| !name.trim().is_empty());
    let Some(requested) = requested else {
        return Ok(SelectedModel {
            index: 0,
            descriptor: &document.models()[0],
        });
    };

    document
        .models()
        .iter()
        .enumerate()
        .find(|(_, descriptor)| descriptor.name() == Some(requested))
        .map(|(index, descriptor)| SelectedModel { index, descriptor })
        .ok_or_else(|| ModelError::ModelNotFound(requested.to_string()))
}
