use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::super::report::FeedbackReport;
use super::repository::{RepositoryError, TaskId, TaskRepository};
use super::service::{AnalysisServiceError, AnalysisService};

/// Upload, polling and document endpoints for feedback analyses.
pub fn analysis_router<R>(service: Arc<AnalysisService<R>>) -> Router
where
    R: TaskRepository + 'static,
{
    Router::new()
        .route("/api/v1/feedback/uploads", post(upload_handler::<R>))
        .route("/api/v1/feedback/tasks/:task_id", get(status_handler::<R>))
        .route("/api/v1/feedback/document", post(document_handler::<R>))
        .with_state(service)
}

pub(crate) async fn upload_handler<R>(
    State(service): State<Arc<AnalysisService<R>>>,
    body: Bytes,
) -> Response
where
    R: TaskRepository + 'static,
{
    match service.submit(body.to_vec()) {
        Ok((task_id, _)) => {
            (StatusCode::ACCEPTED, axum::Json(json!({ "task_id": task_id }))).into_response()
        }
        Err(AnalysisServiceError::EmptyUpload) => {
            let payload = json!({
                "error": "No se envió ningún archivo.",
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<AnalysisService<R>>>,
    Path(task_id): Path<String>,
) -> Response
where
    R: TaskRepository + 'static,
{
    let id = TaskId(task_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(AnalysisServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "task_id": id,
                "state": "not_found",
                "status": "Tarea no encontrada. Por favor, intente de nuevo.",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn document_handler<R>(
    State(service): State<Arc<AnalysisService<R>>>,
    body: Bytes,
) -> Response
where
    R: TaskRepository + 'static,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        let payload = json!({
            "error": "No se recibieron datos para generar el documento.",
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    let report: FeedbackReport = match serde_json::from_slice(&body) {
        Ok(report) => report,
        Err(err) => {
            let payload = json!({
                "error": format!("El informe recibido no es válido: {err}"),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.render_document(&report) {
        Ok(document) => {
            let disposition = format!("attachment; filename=\"{}\"", document.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, document.media_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: AnalysisServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
