use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::{query, query_as};
use uuid::Uuid;

use super::parse_id;
use crate::{
    error::AppError,
    extract::ValidatedJson,
    model::{CurrentUser, Todo},
    schema::{clean_text, CreateTodoSchema, UpdateTodoSchema},
    AppState,
};

const TODO_NOT_FOUND: &str = "Todo not found";

const TODO_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, user_id, created_at, updated_at";

// Handler for getting all Todo items, newest first
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let todos = query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? ORDER BY created_at DESC"
    ))
    .bind(user.user_id)
    .fetch_all(&data.db)
    .await?;

    Ok(Json(todos))
}

// Handler for getting a specific Todo by ID
pub async fn get_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, TODO_NOT_FOUND)?;

    let todo = query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.to_string()))?;

    Ok(Json(todo))
}

// Handler for creating a new Todo
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<CreateTodoSchema>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let todo = query_as::<_, Todo>(&format!(
        "INSERT INTO todos \
         (id, title, description, completed, priority, due_date, user_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {TODO_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(body.title.trim())
    .bind(clean_text(body.description))
    .bind(body.completed.unwrap_or(false))
    .bind(body.priority.unwrap_or_default())
    .bind(body.due_date)
    .bind(user.user_id)
    .bind(now)
    .bind(now)
    .fetch_one(&data.db)
    .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

// Handler for updating a Todo by ID; `dueDate: null` clears the due date
pub async fn update_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<UpdateTodoSchema>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, TODO_NOT_FOUND)?;

    let todo = query_as::<_, Todo>(&format!(
        "UPDATE todos SET \
            title = COALESCE(?, title), \
            description = COALESCE(?, description), \
            completed = COALESCE(?, completed), \
            priority = COALESCE(?, priority), \
            due_date = CASE WHEN ? THEN ? ELSE due_date END, \
            updated_at = ? \
         WHERE id = ? AND user_id = ? RETURNING {TODO_COLUMNS}"
    ))
    .bind(body.title.map(|title| title.trim().to_string()))
    .bind(body.description.map(|description| description.trim().to_string()))
    .bind(body.completed)
    .bind(body.priority)
    .bind(body.due_date.is_some())
    .bind(body.due_date.flatten())
    .bind(Utc::now())
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.to_string()))?;

    Ok(Json(todo))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, TODO_NOT_FOUND)?;

    let rows_affected = query("DELETE FROM todos WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user.user_id)
        .execute(&data.db)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        return Err(AppError::NotFound(TODO_NOT_FOUND.to_string()));
    }

    Ok(Json(json!({ "message": "Todo deleted successfully" })))
}

// Flips `completed` in one statement
pub async fn toggle_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, TODO_NOT_FOUND)?;

    let todo = query_as::<_, Todo>(&format!(
        "UPDATE todos SET completed = NOT completed, updated_at = ? \
         WHERE id = ? AND user_id = ? RETURNING {TODO_COLUMNS}"
    ))
    .bind(Utc::now())
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.to_string()))?;

    Ok(Json(todo))
}
