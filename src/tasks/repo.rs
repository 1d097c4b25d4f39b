use async_trait::async_trait;
use uuid::Uuid;

use super::query::TaskQuery;
use super::repo_types::{NewTask, Task, TaskChanges};
use crate::store::StoreError;

/// Task store. Every method is scoped by `owner`; there is no unscoped access.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, StoreError>;

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StoreError>;

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Returns `None` when no task with `id` belongs to `owner`.
    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns whether a task was removed.
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError>;
}
