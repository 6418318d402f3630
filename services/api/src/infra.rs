use feedback_report::workflows::feedback::{RepositoryError, TaskId, TaskRecord, TaskRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Finished tasks are kept this long before they are evicted.
const DEFAULT_RETENTION: Duration = Duration::from_secs(30 * 60);

struct StoredTask {
    record: TaskRecord,
    finished_at: Option<Instant>,
}

type TaskMap = HashMap<TaskId, StoredTask>;

/// Process-local task store. Task state does not survive a restart, and
/// finished tasks are dropped once their retention window has passed.
#[derive(Clone)]
pub(crate) struct InMemoryTaskRepository {
    records: Arc<Mutex<TaskMap>>,
    retention: Duration,
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl InMemoryTaskRepository {
    pub(crate) fn with_retention(retention: Duration) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            retention,
        }
    }

    /// Locks the store and evicts expired finished tasks.
    fn lock(&self) -> Result<MutexGuard<'_, TaskMap>, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("task store lock poisoned".to_string()))?;
        let before = guard.len();
        guard.retain(|_, stored| match stored.finished_at {
            Some(finished_at) => finished_at.elapsed() < self.retention,
            None => true,
        });
        let evicted = before - guard.len();
        if evicted > 0 {
            debug!(evicted, "expired finished tasks");
        }
        Ok(guard)
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn insert(&self, record: TaskRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.task_id) {
            return Err(RepositoryError::Conflict);
        }
        let finished_at = record.state.is_finished().then(Instant::now);
        guard.insert(
            record.task_id.clone(),
            StoredTask {
                record,
                finished_at,
            },
        );
        Ok(())
    }

    fn update(&self, record: TaskRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.get_mut(&record.task_id) {
            Some(existing) => {
                if record.state.is_finished() {
                    existing.finished_at.get_or_insert_with(Instant::now);
                }
                existing.record = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &TaskId) -> Result<Option<TaskRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).map(|stored| stored.record.clone()))
    }
}
