use crate::infra::AppState;
use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use feedback_report::error::AppError;
use feedback_report::workflows::feedback::{
    analysis_router, AnalysisService, FeedbackPipeline, FeedbackReport, TaskRepository,
};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

pub(crate) fn with_analysis_routes<R>(service: Arc<AnalysisService<R>>) -> axum::Router
where
    R: TaskRepository + 'static,
{
    analysis_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/feedback/report",
            axum::routing::post(report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Synchronous variant of the upload flow: the CSV body in, the report out.
pub(crate) async fn report_endpoint(
    Extension(pipeline): Extension<Arc<FeedbackPipeline>>,
    body: Bytes,
) -> Result<Json<FeedbackReport>, AppError> {
    let report =
        tokio::task::spawn_blocking(move || pipeline.analyze_reader(Cursor::new(body))).await??;
    Ok(Json(report))
}
