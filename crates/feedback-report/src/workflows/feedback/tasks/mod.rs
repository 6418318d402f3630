//! Asynchronous analysis tasks: an upload is accepted immediately, analysed on
//! the blocking pool, and polled by id until it reaches a terminal state.

pub mod repository;
pub mod router;
pub mod service;

pub use repository::{RepositoryError, TaskId, TaskRecord, TaskRepository, TaskState};
pub use router::analysis_router;
pub use service::{AnalysisService, AnalysisServiceError};
