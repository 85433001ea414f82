// Task service - owner-scoped task CRUD

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::{StoreError, TaskStore};
use crate::tasks::models::{Task, TaskInput};

/// Errors that can occur during task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Missing, or owned by another user; the two are never told apart
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => ApiError::not_found("Task", id),
            TaskError::Validation(errors) => ApiError::ValidationError(errors),
            TaskError::Storage(err) => err.into(),
        }
    }
}

/// Parse a task id from a path segment; garbage is indistinguishable from a missing task
pub fn parse_task_id(raw: &str) -> Result<Uuid, TaskError> {
    Uuid::parse_str(raw).map_err(|_| TaskError::NotFound(raw.to_string()))
}

pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// The owner's tasks, newest first
    pub async fn list(&self, owner: Uuid) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.list_tasks(owner).await?)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<Task, TaskError> {
        self.tasks
            .find_task(id, owner)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    pub async fn create(&self, owner: Uuid, input: TaskInput) -> Result<Task, TaskError> {
        let draft = input.into_draft()?;
        let task = self.tasks.create_task(owner, draft).await?;

        info!("Task created: task_id={}, user_id={}", task.id, owner);
        Ok(task)
    }

    /// Replace every editable field; an omitted status resets to pending
    pub async fn update(&self, owner: Uuid, id: Uuid, input: TaskInput) -> Result<Task, TaskError> {
        let draft = input.into_draft()?;
        let task = self
            .tasks
            .update_task(id, owner, draft)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        info!("Task updated: task_id={}, user_id={}", task.id, owner);
        Ok(task)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), TaskError> {
        if !self.tasks.delete_task(id, owner).await? {
            return Err(TaskError::NotFound(id.to_string()));
        }

        info!("Task deleted: task_id={}, user_id={}", id, owner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tasks::models::TaskStatus;

    fn service() -> TaskService {
        TaskService::new(Arc::new(MemoryStore::new()))
    }

    fn input(title: &str, status: Option<&str>) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: "details".to_string(),
            status: status.map(str::to_string),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_pending() {
        let service = service();
        let owner = Uuid::new_v4();

        let task = service.create(owner, input("Buy milk", None)).await.unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.user_id, owner);
        assert_eq!(service.list(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bogus_status_leaves_task_unchanged() {
        let service = service();
        let owner = Uuid::new_v4();
        let task = service.create(owner, input("Buy milk", Some("in_progress"))).await.unwrap();

        let result = service.update(owner, task.id, input("Renamed", Some("bogus"))).await;
        assert!(matches!(result, Err(TaskError::Validation(_))));

        let stored = service.get(owner, task.id).await.unwrap();
        assert_eq!(stored.title, "Buy milk");
        assert_eq!(stored.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let service = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = service.create(alice, input("Alice's", None)).await.unwrap();

        assert!(matches!(service.get(bob, task.id).await, Err(TaskError::NotFound(_))));
        assert!(matches!(
            service.update(bob, task.id, input("Bob's now", None)).await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(service.delete(bob, task.id).await, Err(TaskError::NotFound(_))));

        // Same answer as an id that never existed
        assert!(matches!(service.get(bob, Uuid::new_v4()).await, Err(TaskError::NotFound(_))));
        assert!(service.get(alice, task.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let service = service();
        let owner = Uuid::new_v4();
        let task = service.create(owner, input("Draft", Some("completed"))).await.unwrap();

        let updated = service.update(owner, task.id, input("Final", None)).await.unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.status, TaskStatus::Pending);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let service = service();
        let owner = Uuid::new_v4();
        let task = service.create(owner, input("Temp", None)).await.unwrap();

        service.delete(owner, task.id).await.unwrap();
        assert!(matches!(service.get(owner, task.id).await, Err(TaskError::NotFound(_))));
    }

    #[test]
    fn test_unparsable_id_is_not_found() {
        assert!(matches!(parse_task_id("42"), Err(TaskError::NotFound(_))));
        assert!(parse_task_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
