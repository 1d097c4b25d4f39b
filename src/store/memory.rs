use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::auth::{
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::tasks::{
    query::TaskQuery,
    repo::TaskStore,
    repo_types::{NewTask, Task, TaskChanges},
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    // insertion order
    tasks: Vec<Task>,
    last_stamp: Option<OffsetDateTime>,
}

impl Inner {
    /// Strictly increasing timestamps so creation order is always observable.
    fn stamp(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let next = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(next);
        next
    }
}

/// In-process store used by tests and when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = inner.stamp();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        let now = inner.stamp();
        Ok(inner.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = name.to_string();
            u.updated_at = now;
            u.clone()
        }))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .iter()
            .filter(|t| t.user_id == owner && query.matches(t))
            .cloned()
            .collect();
        // stable: ties keep insertion order
        tasks.sort_by(|a, b| query.sort.compare(a, b));
        Ok(tasks)
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let now = inner.stamp();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, StoreError> {
        let mut inner = self.inner.write().await;
        let now = inner.stamp();
        Ok(inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
            .map(|t| {
                changes.apply(t);
                t.updated_at = now;
                t.clone()
            }))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| !(t.id == id && t.user_id == owner));
        Ok(inner.tasks.len() != before)
    }
}
