use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryTaskRepository};
use crate::routes::with_analysis_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use feedback_report::config::AppConfig;
use feedback_report::error::AppError;
use feedback_report::telemetry;
use feedback_report::workflows::feedback::{AnalysisService, FeedbackPipeline};
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pipeline = Arc::new(FeedbackPipeline::from_app_config(&config));
    let repository = Arc::new(InMemoryTaskRepository::with_retention(
        config.server.task_retention,
    ));
    let analysis_service = Arc::new(AnalysisService::new(repository, pipeline.clone()));

    let app = with_analysis_routes(analysis_service)
        .layer(Extension(pipeline))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        classifier = config.classifier.endpoint.is_some(),
        formula = config.analysis.formula.label(),
        "feedback report service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
