use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        CreateTaskRequest, ListTasksParams, MessageResponse, TaskListResponse, TaskResponse,
        UpdateTaskRequest,
    },
    services,
};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state, caller, params))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    params: Result<Query<ListTasksParams>, QueryRejection>,
) -> Result<Json<TaskListResponse>, AppError> {
    let Query(params) = params.map_err(|e| AppError::validation(e.body_text()))?;
    let tasks = services::list(state.tasks.as_ref(), &caller, params).await?;
    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks,
    }))
}

#[instrument(skip(state, caller))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, AppError> {
    let task = services::get(state.tasks.as_ref(), &caller, &id).await?;
    Ok(Json(TaskResponse {
        message: None,
        task,
    }))
}

#[instrument(skip(state, caller, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let Json(payload) = payload?;
    let task = services::create(state.tasks.as_ref(), &caller, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: Some("Task created successfully"),
            task,
        }),
    ))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, AppError> {
    let Json(payload) = payload?;
    let task = services::update(state.tasks.as_ref(), &caller, &id, payload).await?;
    Ok(Json(TaskResponse {
        message: Some("Task updated successfully"),
        task,
    }))
}

#[instrument(skip(state, caller))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete(state.tasks.as_ref(), &caller, &id).await?;
    Ok(Json(MessageResponse {
        message: "Task deleted successfully",
    }))
}
