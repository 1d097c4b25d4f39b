//! Task operations. The caller is always passed explicitly and every store
//! call is scoped by the caller's id.

use tracing::{debug, info};
use uuid::Uuid;

use super::{
    dto::{CreateTaskRequest, ListTasksParams, TaskView, UpdateTaskRequest},
    query::{Filter, TaskQuery, TaskSort},
    repo::TaskStore,
    repo_types::{NewTask, TaskChanges, TaskPriority, TaskStatus},
};
use crate::{auth::dto::PublicUser, error::AppError};

const TASK_NOT_FOUND: &str = "Task not found";

/// Unparseable ids cannot name a task the caller owns.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(TASK_NOT_FOUND))
}

pub async fn list(
    tasks: &dyn TaskStore,
    caller: &PublicUser,
    params: ListTasksParams,
) -> Result<Vec<TaskView>, AppError> {
    let status = match Filter::<TaskStatus>::parse(params.status.as_deref()) {
        Filter::Any => None,
        Filter::Only(s) => Some(s),
        Filter::Unmatchable => return Ok(Vec::new()),
    };
    let priority = match Filter::<TaskPriority>::parse(params.priority.as_deref()) {
        Filter::Any => None,
        Filter::Only(p) => Some(p),
        Filter::Unmatchable => return Ok(Vec::new()),
    };
    let query = TaskQuery {
        search: params.search.filter(|s| !s.is_empty()),
        status,
        priority,
        sort: TaskSort::parse_or_default(params.sort.as_deref()),
    };

    let found = tasks.list(caller.id, &query).await?;
    debug!(user_id = %caller.id, count = found.len(), "tasks listed");
    Ok(found
        .into_iter()
        .map(|t| TaskView::new(t, caller))
        .collect())
}

pub async fn get(
    tasks: &dyn TaskStore,
    caller: &PublicUser,
    id: &str,
) -> Result<TaskView, AppError> {
    let id = parse_task_id(id)?;
    let task = tasks
        .find(caller.id, id)
        .await?
        .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))?;
    Ok(TaskView::new(task, caller))
}

pub async fn create(
    tasks: &dyn TaskStore,
    caller: &PublicUser,
    req: CreateTaskRequest,
) -> Result<TaskView, AppError> {
    let title = req.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }

    let task = tasks
        .insert(NewTask {
            user_id: caller.id,
            title: title.to_string(),
            description: req
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            status: req.status.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
        })
        .await?;

    info!(user_id = %caller.id, task_id = %task.id, "task created");
    Ok(TaskView::new(task, caller))
}

pub async fn update(
    tasks: &dyn TaskStore,
    caller: &PublicUser,
    id: &str,
    req: UpdateTaskRequest,
) -> Result<TaskView, AppError> {
    let id = parse_task_id(id)?;

    let title = req.title.map(|t| t.trim().to_string());
    if matches!(title.as_deref(), Some("")) {
        return Err(AppError::validation("Title cannot be empty"));
    }
    let changes = TaskChanges {
        title,
        description: req.description.map(|d| d.trim().to_string()),
        status: req.status,
        priority: req.priority,
    };

    let task = tasks
        .update(caller.id, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))?;

    info!(user_id = %caller.id, task_id = %task.id, "task updated");
    Ok(TaskView::new(task, caller))
}

pub async fn delete(tasks: &dyn TaskStore, caller: &PublicUser, id: &str) -> Result<(), AppError> {
    let id = parse_task_id(id)?;
    if !tasks.delete(caller.id, id).await? {
        return Err(AppError::not_found(TASK_NOT_FOUND));
    }
    info!(user_id = %caller.id, task_id = %id, "task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn user(name: &str) -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn titled(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_applies_defaults_and_owner() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        let task = create(&store, &ada, titled("Buy milk")).await.unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.user_id.id, ada.id);
        assert_eq!(task.user_id.name, "Ada");
    }

    #[tokio::test]
    async fn create_requires_title() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        for req in [titled("   "), titled(""), CreateTaskRequest::default()] {
            let err = create(&store, &ada, req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn create_trims_fields() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        let task = create(
            &store,
            &ada,
            CreateTaskRequest {
                title: Some("  Write report ".into()),
                description: Some(" quarterly  ".into()),
                priority: Some(TaskPriority::High),
                status: Some(TaskStatus::InProgress),
            },
        )
        .await
        .unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "quarterly");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        let created = create(
            &store,
            &ada,
            CreateTaskRequest {
                title: Some("Plan trip".into()),
                description: Some("book hotel".into()),
                priority: Some(TaskPriority::Low),
                status: Some(TaskStatus::Completed),
            },
        )
        .await
        .unwrap();
        let fetched = get(&store, &ada, &created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn partial_update_only_touches_given_fields() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        let created = create(
            &store,
            &ada,
            CreateTaskRequest {
                title: Some("Buy milk".into()),
                description: Some("2 litres".into()),
                priority: Some(TaskPriority::High),
                status: None,
            },
        )
        .await
        .unwrap();

        let updated = update(
            &store,
            &ada,
            &created.id.to_string(),
            UpdateTaskRequest {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.description, "2 litres");
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_rejects_blank_title() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        let created = create(&store, &ada, titled("Buy milk")).await.unwrap();
        let err = update(
            &store,
            &ada,
            &created.id.to_string(),
            UpdateTaskRequest {
                title: Some("  ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let unchanged = get(&store, &ada, &created.id.to_string()).await.unwrap();
        assert_eq!(unchanged.title, "Buy milk");
    }

    #[tokio::test]
    async fn other_users_tasks_are_invisible() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        let bob = user("Bob");
        let task = create(&store, &ada, titled("private")).await.unwrap();
        let id = task.id.to_string();

        assert!(list(&store, &bob, ListTasksParams::default()).await.unwrap().is_empty());
        assert!(matches!(get(&store, &bob, &id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            update(&store, &bob, &id, UpdateTaskRequest { title: Some("mine".into()), ..Default::default() }).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(delete(&store, &bob, &id).await, Err(AppError::NotFound(_))));

        let still_there = get(&store, &ada, &id).await.unwrap();
        assert_eq!(still_there.title, "private");
    }

    #[tokio::test]
    async fn missing_and_malformed_ids_are_not_found() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        assert!(matches!(
            get(&store, &ada, &Uuid::new_v4().to_string()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(get(&store, &ada, "not-a-uuid").await, Err(AppError::NotFound(_))));
        assert!(matches!(delete(&store, &ada, "42").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        let task = create(&store, &ada, titled("temp")).await.unwrap();
        delete(&store, &ada, &task.id.to_string()).await.unwrap();
        assert!(matches!(
            get(&store, &ada, &task.id.to_string()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            delete(&store, &ada, &task.id.to_string()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn search_matches_title_or_description_case_insensitively() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        create(&store, &ada, titled("Buy MILK")).await.unwrap();
        create(
            &store,
            &ada,
            CreateTaskRequest {
                title: Some("Groceries".into()),
                description: Some("eggs and milk".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        create(&store, &ada, titled("Call mum")).await.unwrap();

        let found = list(
            &store,
            &ada,
            ListTasksParams {
                search: Some("milk".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let mut titles: Vec<_> = found.iter().map(|t| t.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, ["Buy MILK", "Groceries"]);
    }

    #[tokio::test]
    async fn search_keeps_surrounding_whitespace() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        create(&store, &ada, titled("Buttermilk pancakes")).await.unwrap();
        create(&store, &ada, titled("Oat milk")).await.unwrap();

        let search = |q: &str| ListTasksParams {
            search: Some(q.into()),
            ..Default::default()
        };
        let found = list(&store, &ada, search(" milk")).await.unwrap();
        let titles: Vec<_> = found.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Oat milk"]);

        assert_eq!(list(&store, &ada, search("")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn filters_and_sort() {
        let store = MemoryStore::new();
        let ada = user("Ada");
        for (title, priority, status) in [
            ("a", TaskPriority::Low, TaskStatus::Pending),
            ("b", TaskPriority::High, TaskStatus::Completed),
            ("c", TaskPriority::High, TaskStatus::Pending),
        ] {
            create(
                &store,
                &ada,
                CreateTaskRequest {
                    title: Some(title.into()),
                    priority: Some(priority),
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let all = list(&store, &ada, ListTasksParams::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["c", "b", "a"]);

        let high = list(
            &store,
            &ada,
            ListTasksParams {
                priority: Some("high".into()),
                status: Some("all".into()),
                sort: Some("title".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let titles: Vec<_> = high.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["b", "c"]);

        let pending_high = list(
            &store,
            &ada,
            ListTasksParams {
                priority: Some("high".into()),
                status: Some("pending".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(pending_high.len(), 1);
        assert_eq!(pending_high[0].title, "c");

        let none = list(
            &store,
            &ada,
            ListTasksParams {
                status: Some("archived".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(none.is_empty());
    }
}
