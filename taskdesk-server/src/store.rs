//! In-memory task store.
//!
//! The [`TaskStore`] keeps every task in a map keyed by [`TaskId`]. Ids are
//! UUID v7 strings, so iteration order is creation order.

use std::collections::BTreeMap;

use taskdesk_proto::form::FormData;
use taskdesk_proto::task::{Task, TaskId, TaskStatus};
use tokio::sync::RwLock;

/// Errors returned by [`TaskStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No task has this id.
    #[error("Task {0} not found")]
    NotFound(TaskId),

    /// The status string does not name a [`TaskStatus`].
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),
}

/// Thread-safe task map.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<BTreeMap<TaskId, Task>>,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All tasks, oldest first.
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }

    /// The task with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub async fn get(&self, id: &TaskId) -> Result<Task, StoreError> {
        self.tasks
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Stores a new task built from `data` under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidStatus`] if `data.status` is unknown.
    pub async fn create(&self, data: FormData) -> Result<Task, StoreError> {
        let status = parse_status(&data.status)?;
        let task = Task {
            id: TaskId::new(uuid::Uuid::now_v7().to_string()),
            title: data.title,
            description: data.description,
            status,
        };
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        tracing::debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    /// Replaces the editable fields of the task with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::InvalidStatus`] if `data.status` is unknown.
    pub async fn update(&self, id: &TaskId, data: FormData) -> Result<Task, StoreError> {
        let status = parse_status(&data.status)?;
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        task.title = data.title;
        task.description = data.description;
        task.status = status;
        let updated = task.clone();
        drop(tasks);
        tracing::debug!(task_id = %id, "task updated");
        Ok(updated)
    }

    /// Number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Whether the store holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

fn parse_status(status: &str) -> Result<TaskStatus, StoreError> {
    status
        .parse()
        .map_err(|_| StoreError::InvalidStatus(status.to_string()))
}
