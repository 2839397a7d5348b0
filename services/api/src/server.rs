use crate::cli::ServeArgs;
use crate::infra::{build_analytic, AppState};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use record_analytic::config::AppConfig;
use record_analytic::error::AppError;
use record_analytic::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    args.analytic.apply(&mut config.analytic);

    telemetry::init(&config.telemetry)?;

    let analytic = build_analytic(&config.analytic)?;
    info!(%analytic, location = ?analytic.location(), "analytic loaded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        analytic: Arc::new(analytic),
    };

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "record analytic processor ready");

    axum::serve(listener, app).await?;
    Ok(())
}
