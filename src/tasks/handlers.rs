// JSON API for the signed-in user's tasks

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::middleware::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse};
use crate::tasks::{
    models::{Task, TaskInput},
    service::parse_task_id,
};
use crate::AppState;

/// List the caller's tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Tasks owned by the caller, newest first", body = Vec<Task>),
        (status = 401, description = "No valid session cookie"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    tracing::debug!("Listing tasks for user_id={}", user.user_id);

    let tasks = state.tasks.list(user.user_id).await?;
    Ok(Json(tasks))
}

/// Create a task owned by the caller
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = TaskInput,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 401, description = "No valid session cookie"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(input) = payload?;

    let task = state.tasks.create(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetch one of the caller's tasks
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 401, description = "No valid session cookie"),
        (status = 404, description = "Task not found or owned by another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_task_id(&id)?;

    let task = state.tasks.get(user.user_id, id).await?;
    Ok(Json(task))
}

/// Replace one of the caller's tasks
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = TaskInput,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 401, description = "No valid session cookie"),
        (status = 404, description = "Task not found or owned by another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_task_id(&id)?;
    let Json(input) = payload?;

    let task = state.tasks.update(user.user_id, id, input).await?;
    Ok(Json(task))
}

/// Delete one of the caller's tasks
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "No valid session cookie"),
        (status = 404, description = "Task not found or owned by another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_task_id(&id)?;

    state.tasks.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
