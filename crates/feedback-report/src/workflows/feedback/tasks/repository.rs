use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::super::report::FeedbackReport;

/// Opaque handle returned when an upload is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Success { data: Box<FeedbackReport> },
    Failure { status: String },
}

impl TaskState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    #[serde(flatten)]
    pub state: TaskState,
}

/// Storage abstraction for task state, injected into the service.
pub trait TaskRepository: Send + Sync {
    fn insert(&self, record: TaskRecord) -> Result<(), RepositoryError>;
    fn update(&self, record: TaskRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &TaskId) -> Result<Option<TaskRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("task already exists")]
    Conflict,
    #[error("task not found")]
    NotFound,
    #[error("task store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_record_serializes_flat() {
        let record = TaskRecord {
            task_id: TaskId("abc".to_string()),
            state: TaskState::Pending,
        };
        assert_eq!(
            serde_json::to_value(&record).expect("serializes"),
            json!({"task_id": "abc", "state": "pending"})
        );
    }

    #[test]
    fn failure_carries_its_message() {
        let record = TaskRecord {
            task_id: TaskId("abc".to_string()),
            state: TaskState::Failure {
                status: "boom".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&record).expect("serializes"),
            json!({"task_id": "abc", "state": "failure", "status": "boom"})
        );
        assert!(record.state.is_finished());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }
}
