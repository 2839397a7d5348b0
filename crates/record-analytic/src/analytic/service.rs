use std::fmt;

use tracing::debug;

use super::document::{ModelDescriptor, ModelDocument};
use super::evaluator::{evaluate_model, EvaluationError, EvaluatorFactory, ModelEvaluator};
use super::input::{InputMapper, ValuePreparer};
use super::loader::{DocumentLoadError, DocumentLoader};
use super::mapping::{ConfigurationError, FieldMappingSpec};
use super::output::{OutputEnhancer, OutputMapper};
use super::record::{FieldValue, Record};
use super::selector::select;
use crate::config::{AnalyticOptions, ConfigError};

/// A configured model bound to its input and output field mappings.
///
/// Everything is resolved when the analytic is built; afterwards it is read-only and can be
/// shared across threads to evaluate records concurrently.
pub struct Analytic<M, E> {
    model_name: Option<String>,
    location: Option<String>,
    document: ModelDocument<M>,
    selected: usize,
    evaluator: E,
    input: InputMapper,
    output: OutputMapper,
    preparer: Option<Box<dyn ValuePreparer>>,
    enhancer: Option<Box<dyn OutputEnhancer>>,
}

impl<M, E> Analytic<M, E>
where
    E: ModelEvaluator,
{
    /// Selects the model, resolves its evaluator, and compiles both field mappings.
    pub fn new<F>(
        model_name: Option<&str>,
        document: ModelDocument<M>,
        factory: &F,
        input_spec: FieldMappingSpec,
        output_spec: FieldMappingSpec,
    ) -> Result<Self, ModelError>
    where
        F: EvaluatorFactory<M, Evaluator = E> + ?Sized,
    {
        let model_name = normalize_model_name(model_name);
        let selected = select(&document, model_name.as_deref())?;
        let evaluator = factory.create(selected.descriptor)?;
        let selected = selected.index;

        debug!(
            model_name = model_name.as_deref().unwrap_or("<default>"),
            selected,
            input = %input_spec,
            output = %output_spec,
            "analytic created"
        );

        Ok(Self {
            model_name,
            location: None,
            document,
            selected,
            evaluator,
            input: InputMapper::new(input_spec),
            output: OutputMapper::new(output_spec),
            preparer: None,
            enhancer: None,
        })
    }

    /// Builds an analytic from raw options: parses the mapping strings, loads the document from
    /// `options.location`, then defers to [`Analytic::new`].
    pub fn from_options<L, F>(
        options: &AnalyticOptions,
        loader: &L,
        factory: &F,
    ) -> Result<Self, ModelError>
    where
        L: DocumentLoader<M> + ?Sized,
        F: EvaluatorFactory<M, Evaluator = E> + ?Sized,
    {
        let location = options.require_location()?;
        let input_spec = FieldMappingSpec::parse(options.input_field_mapping.as_deref())?;
        let output_spec = FieldMappingSpec::parse(options.output_field_mapping.as_deref())?;
        let document = loader.load(location)?;

        let mut analytic = Self::new(
            options.model_name.as_deref(),
            document,
            factory,
            input_spec,
            output_spec,
        )?;
        analytic.location = Some(location.to_string());

        debug!(location, "model document loaded");
        Ok(analytic)
    }

    /// Replaces the evaluator's own input preparation.
    pub fn with_preparer(mut self, preparer: impl ValuePreparer + 'static) -> Self {
        self.preparer = Some(Box::new(preparer));
        self
    }

    /// Installs a hook that sees the raw model output before it is mapped.
    pub fn with_enhancer(mut self, enhancer: impl OutputEnhancer + 'static) -> Self {
        self.enhancer = Some(Box::new(enhancer));
        self
    }

    /// Evaluates a single record. Failures only concern this record; the analytic stays usable.
    pub fn evaluate(&self, record: &Record) -> Result<Record, AnalyticError> {
        let model_input = match &self.preparer {
            Some(preparer) => self.input.map(preparer.as_ref(), record),
            None => self.input.map(&EvaluatorPreparer(&self.evaluator), record),
        };

        let model_output = evaluate_model(&self.evaluator, &model_input)?;
        let model_output = match &self.enhancer {
            Some(enhancer) => enhancer.enhance(self.output.model_fields(), model_output),
            None => model_output,
        };

        Ok(self.output.map(record, &model_output))
    }

    pub fn selected_model(&self) -> &ModelDescriptor<M> {
        &self.document.models()[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn document(&self) -> &ModelDocument<M> {
        &self.document
    }

    /// The requested model name, `None` when the document default is used.
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn input_spec(&self) -> &FieldMappingSpec {
        self.input.spec()
    }

    pub fn output_spec(&self) -> &FieldMappingSpec {
        self.output.spec()
    }
}

impl<M, E> fmt::Display for Analytic<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Analytic{{model_name='{}'}}",
            self.model_name.as_deref().unwrap_or_default()
        )
    }
}

impl<M, E> fmt::Debug for Analytic<M, E>
where
    M: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analytic")
            .field("model_name", &self.model_name)
            .field("location", &self.location)
            .field("selected_model", &self.document.models()[self.selected])
            .field("input", self.input.spec())
            .field("output", self.output.spec())
            .finish_non_exhaustive()
    }
}

struct EvaluatorPreparer<'a, E>(&'a E);

impl<E> ValuePreparer for EvaluatorPreparer<'_, E>
where
    E: ModelEvaluator,
{
    fn prepare(&self, field: &str, raw: &FieldValue) -> FieldValue {
        self.0.prepare(field, raw)
    }
}

fn normalize_model_name(name: Option<&str>) -> Option<String> {
    name.map(|name| name.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|name| !name.is_empty())
}

/// Construction-time failure. An analytic that fails to build has no degraded mode.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Options(#[from] ConfigError),
    #[error(transparent)]
    DocumentLoad(#[from] DocumentLoadError),
    #[error("model document doesn't contain any model")]
    EmptyDocument,
    #[error("analytical model '{0}' not found")]
    ModelNotFound(String),
    #[error("no evaluator available for model '{model}': {reason}")]
    EvaluatorUnavailable { model: String, reason: String },
}

/// Per-record failure raised by [`Analytic::evaluate`].
#[derive(Debug, thiserror::Error)]
pub enum AnalyticError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
