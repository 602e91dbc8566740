use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
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
    dates::parse_date,
    error::AppError,
    extract::ValidatedJson,
    model::{CurrentUser, Event, DEFAULT_EVENT_COLOR},
    schema::{clean_text, CreateEventSchema, EventRangeQuery, UpdateEventSchema},
    AppState,
};

const EVENT_NOT_FOUND: &str = "Event not found";

pub(crate) const EVENT_COLUMNS: &str =
    "id, title, description, start_date, end_date, all_day, color, user_id, created_at, updated_at";

// Handler for getting all of the caller's events, earliest first
pub async fn get_events(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let events = query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = ? ORDER BY start_date ASC"
    ))
    .bind(user.user_id)
    .fetch_all(&data.db)
    .await?;

    Ok(Json(events))
}

// Events that start at or after `start` and end at or before `end`
pub async fn get_events_range(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(range): Query<EventRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, end) = match (range.start.as_deref(), range.end.as_deref()) {
        (Some(start), Some(end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
            (start, end)
        }
        _ => return Err(AppError::validation("Start and end dates are required")),
    };
    let (start, end) = match (parse_date(start), parse_date(end)) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(AppError::validation("Invalid start or end date")),
    };

    let events = query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE user_id = ? AND start_date >= ? AND end_date <= ? \
         ORDER BY start_date ASC"
    ))
    .bind(user.user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&data.db)
    .await?;

    Ok(Json(events))
}

pub async fn get_event(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, EVENT_NOT_FOUND)?;

    let event = query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))?;

    Ok(Json(event))
}

pub async fn create_event(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<CreateEventSchema>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(
        start = %body.start_date.to_rfc3339(),
        end = %body.end_date.to_rfc3339(),
        "creating event"
    );

    let now = Utc::now();
    let event = query_as::<_, Event>(&format!(
        "INSERT INTO events \
         (id, title, description, start_date, end_date, all_day, color, user_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {EVENT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(body.title.trim())
    .bind(clean_text(body.description))
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(body.all_day.unwrap_or(false))
    .bind(body.color.unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()))
    .bind(user.user_id)
    .bind(now)
    .bind(now)
    .fetch_one(&data.db)
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

// Only the fields present in the body are changed
pub async fn update_event(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<UpdateEventSchema>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, EVENT_NOT_FOUND)?;

    let event = query_as::<_, Event>(&format!(
        "UPDATE events SET \
            title = COALESCE(?, title), \
            description = COALESCE(?, description), \
            start_date = COALESCE(?, start_date), \
            end_date = COALESCE(?, end_date), \
            all_day = COALESCE(?, all_day), \
            color = COALESCE(?, color), \
            updated_at = ? \
         WHERE id = ? AND user_id = ? RETURNING {EVENT_COLUMNS}"
    ))
    .bind(body.title.map(|title| title.trim().to_string()))
    .bind(body.description.map(|description| description.trim().to_string()))
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(body.all_day)
    .bind(body.color)
    .bind(Utc::now())
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))?;

    Ok(Json(event))
}

pub async fn delete_event(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, EVENT_NOT_FOUND)?;

    let rows_affected = query("DELETE FROM events WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user.user_id)
        .execute(&data.db)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        return Err(AppError::NotFound(EVENT_NOT_FOUND.to_string()));
    }

    Ok(Json(json!({ "message": "Event deleted successfully" })))
}
