// Server-rendered task pages (dashboard and create/edit forms)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::{debug, error};

use crate::auth::{middleware::AuthenticatedUser, models::PageMessage};
use crate::tasks::{
    models::TaskForm,
    service::{parse_task_id, TaskError},
};
use crate::{views, AppState};

/// Render a task failure for a browser; `form_path` is where validation errors go back to
fn page_error(err: TaskError, form_path: &str) -> Response {
    match err {
        TaskError::Validation(errors) => {
            debug!("Task form rejected: {:?}", errors);
            Redirect::to(&format!("{}?error=invalid_task", form_path)).into_response()
        }
        TaskError::NotFound(id) => {
            debug!("Task page for unknown task: {}", id);
            (
                StatusCode::NOT_FOUND,
                views::error_page("Not found", "That task does not exist."),
            )
                .into_response()
        }
        TaskError::Storage(err) => {
            error!("Storage error on task page: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::error_page("Error", "Something went wrong."),
            )
                .into_response()
        }
    }
}

/// GET /
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(message): Query<PageMessage>,
) -> Response {
    match state.tasks.list(user.user_id).await {
        Ok(tasks) => views::dashboard(&user, &tasks, &message).into_response(),
        Err(err) => page_error(err, "/"),
    }
}

/// GET /tasks/new
pub async fn new_task_page(user: AuthenticatedUser, Query(message): Query<PageMessage>) -> Response {
    views::task_form(&user, None, &message).into_response()
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Form(form): Form<TaskForm>,
) -> Response {
    match state.tasks.create(user.user_id, form.into_input()).await {
        Ok(_) => Redirect::to("/?success=task_created").into_response(),
        Err(err) => page_error(err, "/tasks/new"),
    }
}

/// GET /tasks/{id}/edit
pub async fn edit_task_page(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(message): Query<PageMessage>,
) -> Response {
    let result = match parse_task_id(&id) {
        Ok(id) => state.tasks.get(user.user_id, id).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(task) => views::task_form(&user, Some(&task), &message).into_response(),
        Err(err) => page_error(err, "/"),
    }
}

/// POST /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<TaskForm>,
) -> Response {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(err) => return page_error(err, "/"),
    };

    match state.tasks.update(user.user_id, task_id, form.into_input()).await {
        Ok(_) => Redirect::to("/?success=task_updated").into_response(),
        Err(err) => page_error(err, &format!("/tasks/{}/edit", task_id)),
    }
}

/// POST /tasks/{id}/delete
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Response {
    let result = match parse_task_id(&id) {
        Ok(id) => state.tasks.delete(user.user_id, id).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => Redirect::to("/?success=task_deleted").into_response(),
        Err(err) => page_error(err, "/"),
    }
}
