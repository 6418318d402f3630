use std::io::Cursor;
use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use super::super::pipeline::FeedbackPipeline;
use super::super::report::FeedbackReport;
use super::repository::{RepositoryError, TaskId, TaskRecord, TaskRepository, TaskState};
use crate::workflows::render::{RenderError, RenderedDocument};

/// Accepts uploads, runs each analysis on the blocking pool and tracks its state.
pub struct AnalysisService<R> {
    repository: Arc<R>,
    pipeline: Arc<FeedbackPipeline>,
}

impl<R> AnalysisService<R>
where
    R: TaskRepository + 'static,
{
    pub fn new(repository: Arc<R>, pipeline: Arc<FeedbackPipeline>) -> Self {
        Self {
            repository,
            pipeline,
        }
    }

    /// Records a pending task and starts it. The upload is moved into the task;
    /// no table is shared between concurrent runs. Must be called inside a tokio runtime.
    ///
    /// The returned handle resolves once the task holds a terminal state, including
    /// when the analysis panicked.
    pub fn submit(
        self: &Arc<Self>,
        upload: Vec<u8>,
    ) -> Result<(TaskId, JoinHandle<()>), AnalysisServiceError> {
        let task_id = self.enqueue(&upload)?;
        let service = Arc::clone(self);
        let id = task_id.clone();
        let worker = tokio::task::spawn_blocking(move || service.run_task(&id, upload));

        let service = Arc::clone(self);
        let id = task_id.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = worker.await {
                service.record_crash(&id, &err);
            }
        });
        Ok((task_id, handle))
    }

    /// Validates the upload and stores a pending record for it.
    pub fn enqueue(&self, upload: &[u8]) -> Result<TaskId, AnalysisServiceError> {
        if upload.iter().all(u8::is_ascii_whitespace) {
            return Err(AnalysisServiceError::EmptyUpload);
        }

        let task_id = TaskId::generate();
        self.repository.insert(TaskRecord {
            task_id: task_id.clone(),
            state: TaskState::Pending,
        })?;
        info!(task_id = %task_id, bytes = upload.len(), "feedback analysis queued");
        Ok(task_id)
    }

    /// Runs the analysis for a queued task and stores the outcome. Blocks.
    pub fn run_task(&self, task_id: &TaskId, upload: Vec<u8>) {
        let state = match self.pipeline.analyze_reader(Cursor::new(upload)) {
            Ok(report) => {
                info!(task_id = %task_id, "feedback analysis finished");
                TaskState::Success {
                    data: Box::new(report),
                }
            }
            Err(err) => {
                error!(task_id = %task_id, error = %err, "feedback analysis failed");
                TaskState::Failure {
                    status: format!("Ocurrió un error durante el procesamiento: {err}"),
                }
            }
        };

        let record = TaskRecord {
            task_id: task_id.clone(),
            state,
        };
        if let Err(err) = self.repository.update(record) {
            error!(task_id = %task_id, error = %err, "could not store task outcome");
        }
    }

    fn record_crash(&self, task_id: &TaskId, err: &JoinError) {
        error!(task_id = %task_id, error = %err, "feedback analysis aborted");
        let record = TaskRecord {
            task_id: task_id.clone(),
            state: TaskState::Failure {
                status: format!("Ocurrió un error durante el procesamiento: {err}"),
            },
        };
        if let Err(err) = self.repository.update(record) {
            error!(task_id = %task_id, error = %err, "could not store task outcome");
        }
    }

    pub fn get(&self, task_id: &TaskId) -> Result<TaskRecord, AnalysisServiceError> {
        let record = self
            .repository
            .fetch(task_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn render_document(
        &self,
        report: &FeedbackReport,
    ) -> Result<RenderedDocument, AnalysisServiceError> {
        Ok(self.pipeline.render_document(report)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisServiceError {
    #[error("no file content was uploaded")]
    EmptyUpload,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
