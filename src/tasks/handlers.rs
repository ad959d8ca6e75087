use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    pagination::{PageQuery, PageRequest},
    response::ApiResponse,
    state::AppState,
    tasks::{
        dto::TaskPayload,
        repo_types::Task,
        services::{self, parse_task_id},
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/task", get(list_all_tasks).post(create_task))
        .route(
            "/task/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/user-tasks", get(list_my_tasks))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Task>>), ApiError> {
    let Json(payload) = payload?;
    let task = services::create_task(&state, user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(task).with_message("Task created successfully")),
    ))
}

/// Every user's tasks. `page=0` returns the whole collection.
#[instrument(skip(state))]
pub async fn list_all_tasks(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(q): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Task>>>, ApiError> {
    let request = PageRequest::resolve(&q, true);
    let (tasks, meta) = services::list_tasks(&state, None, request).await?;
    Ok(Json(
        ApiResponse::data(tasks)
            .with_message("Tasks fetched successfully")
            .with_meta(meta),
    ))
}

/// The caller's tasks, always paginated.
#[instrument(skip(state))]
pub async fn list_my_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Task>>>, ApiError> {
    let request = PageRequest::resolve(&q, false);
    let (tasks, meta) = services::list_tasks(&state, Some(user_id), request).await?;
    Ok(Json(
        ApiResponse::data(tasks)
            .with_message("Tasks fetched successfully")
            .with_meta(meta),
    ))
}

#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let id = parse_task_id(&id)?;
    let task = services::get_task(&state, user_id, id).await?;
    Ok(Json(ApiResponse::data(task)))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_task_id(&id)?;
    let Json(payload) = payload?;
    services::update_task(&state, user_id, id, payload).await?;
    Ok(Json(ApiResponse::message("Task updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_task_id(&id)?;
    services::delete_task(&state, user_id, id).await?;
    Ok(Json(ApiResponse::message("Task deleted successfully")))
}
