use crate::regression::{RegressionEvaluator, RegressionFactory, RegressionModel};
use metrics_exporter_prometheus::PrometheusHandle;
use record_analytic::analytic::{
    Analytic, JsonDocumentParser, ModelError, ResourceDocumentLoader,
};
use record_analytic::config::AnalyticOptions;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type RecordAnalytic = Analytic<RegressionModel, RegressionEvaluator>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) analytic: Arc<RecordAnalytic>,
}

/// Loads the configured JSON model document from the filesystem and binds the regression
/// evaluator to the selected model.
pub(crate) fn build_analytic(options: &AnalyticOptions) -> Result<RecordAnalytic, ModelError> {
    let loader = ResourceDocumentLoader::new(JsonDocumentParser::<RegressionModel>::new());
    Analytic::from_options(options, &loader, &RegressionFactory)
}
