//! Read-only feeds for the Magic Mirror display modules.
//!
//! These routes are not behind the auth middleware: they are meant for a
//! display on the local network. Each feed returns one block per user and the
//! display picks its own block by matching a configured username.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::query_as;
use uuid::Uuid;

use super::{events::EVENT_COLUMNS, lists::LIST_COLUMNS};
use crate::{
    dates::{day_window, start_of_day, target_date},
    db::Db,
    error::AppError,
    model::{Event, List, ListItem, ListRow, User},
    schema::MagicMirrorQuery,
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorEvent {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub color: String,
    pub all_day: bool,
}

impl From<Event> for MirrorEvent {
    fn from(event: Event) -> Self {
        MirrorEvent {
            id: event.id,
            title: event.title,
            description: event.description,
            start_date: event.start_date,
            end_date: event.end_date,
            color: event.color,
            all_day: event.all_day,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MirrorItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl From<ListItem> for MirrorItem {
    fn from(item: ListItem) -> Self {
        MirrorItem {
            id: item.id,
            title: item.title,
            description: item.description,
            completed: item.completed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorList {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub list_date: DateTime<Utc>,
    pub items: Vec<MirrorItem>,
}

impl From<List> for MirrorList {
    fn from(list: List) -> Self {
        MirrorList {
            id: list.id,
            title: list.title,
            description: list.description,
            list_date: list.list_date,
            items: list.items.into_iter().map(MirrorItem::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MirrorUser {
    pub name: String,
    pub events: Vec<MirrorEvent>,
    pub lists: Vec<MirrorList>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MirrorSummary {
    pub total_users: usize,
    pub total_events: usize,
    pub total_lists: usize,
}

impl MirrorSummary {
    pub fn of(users: &[MirrorUser]) -> Self {
        MirrorSummary {
            total_users: users.len(),
            total_events: users.iter().map(|user| user.events.len()).sum(),
            total_lists: users.iter().map(|user| user.lists.len()).sum(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugUser {
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub events: Vec<Event>,
    pub lists: Vec<List>,
}

// Every user's events and lists dated on one UTC day
pub async fn all_users_today(
    State(data): State<Arc<AppState>>,
    Query(params): Query<MagicMirrorQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = target_date(params.date.as_deref(), Utc::now())
        .ok_or_else(|| AppError::validation("Invalid date, expected YYYY-MM-DD"))?;
    let (start, end) = day_window(date);
    tracing::debug!(%date, %start, %end, "magic mirror day window");

    let users = collect_users(&data.db, start, Some(end)).await?;
    let summary = MirrorSummary::of(&users);

    Ok(Json(json!({
        "date": format_date(date),
        "users": users,
        "summary": summary,
    })))
}

// Everything dated from today's UTC midnight onwards
pub async fn future_data(
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let start = start_of_day(today);
    tracing::debug!(%start, "magic mirror future window");

    let users = collect_users(&data.db, start, None).await?;
    let summary = MirrorSummary::of(&users);

    Ok(Json(json!({
        "message": "Future events and lists (today and beyond)",
        "date": format_date(today),
        "users": users,
        "summary": summary,
    })))
}

// Unfiltered dump of every user's data, for diagnosing what the feeds miss
pub async fn debug_all_data(
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let mut users = Vec::new();
    for user in all_users(&data.db).await? {
        let events = query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = ? ORDER BY start_date ASC"
        ))
        .bind(user.id)
        .fetch_all(&data.db)
        .await?;

        let lists = query_as::<_, ListRow>(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE user_id = ? ORDER BY list_date ASC"
        ))
        .bind(user.id)
        .fetch_all(&data.db)
        .await?;

        users.push(DebugUser {
            user_id: user.id,
            username: user.username().to_string(),
            name: user.name,
            events,
            lists: lists.into_iter().map(List::from).collect(),
        });
    }

    Ok(Json(json!({
        "message": "All data without date filtering",
        "users": users,
    })))
}

async fn all_users(db: &Db) -> Result<Vec<User>, AppError> {
    let users = query_as::<_, User>(
        "SELECT id, name, email, password_hash, created_at FROM users ORDER BY created_at ASC",
    )
    .fetch_all(db)
    .await?;
    Ok(users)
}

/// One block per user with the events starting, and lists dated, inside
/// `[from, until)`; an open `until` means no upper bound.
async fn collect_users(
    db: &Db,
    from: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
) -> Result<Vec<MirrorUser>, AppError> {
    let mut blocks = Vec::new();

    for user in all_users(db).await? {
        let events = query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE user_id = ? AND start_date >= ? AND (? IS NULL OR start_date < ?) \
             ORDER BY start_date ASC"
        ))
        .bind(user.id)
        .bind(from)
        .bind(until)
        .bind(until)
        .fetch_all(db)
        .await?;

        let lists = query_as::<_, ListRow>(&format!(
            "SELECT {LIST_COLUMNS} FROM lists \
             WHERE user_id = ? AND list_date >= ? AND (? IS NULL OR list_date < ?) \
             ORDER BY list_date ASC"
        ))
        .bind(user.id)
        .bind(from)
        .bind(until)
        .bind(until)
        .fetch_all(db)
        .await?;

        tracing::debug!(
            username = user.username(),
            events = events.len(),
            lists = lists.len(),
            "magic mirror user block"
        );

        blocks.push(MirrorUser {
            name: user.name,
            events: events.into_iter().map(MirrorEvent::from).collect(),
            lists: lists
                .into_iter()
                .map(|row| MirrorList::from(List::from(row)))
                .collect(),
        });
    }

    Ok(blocks)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(events: usize, lists: usize) -> MirrorUser {
        let now = Utc::now();
        MirrorUser {
            name: "someone".into(),
            events: (0..events)
                .map(|_| MirrorEvent {
                    id: Uuid::new_v4(),
                    title: "e".into(),
                    description: String::new(),
                    start_date: now,
                    end_date: now,
                    color: "#3b82f6".into(),
                    all_day: false,
                })
                .collect(),
            lists: (0..lists)
                .map(|_| MirrorList {
                    id: Uuid::new_v4(),
                    title: "l".into(),
                    description: String::new(),
                    list_date: now,
                    items: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn summary_counts_across_users() {
        let users = vec![block(2, 1), block(0, 0), block(3, 2)];
        assert_eq!(
            MirrorSummary::of(&users),
            MirrorSummary {
                total_users: 3,
                total_events: 5,
                total_lists: 3,
            }
        );
    }

    #[test]
    fn summary_serializes_camel_case() {
        let value = serde_json::to_value(MirrorSummary::of(&[])).unwrap();
        assert_eq!(value["totalUsers"], 0);
        assert_eq!(value["totalEvents"], 0);
        assert_eq!(value["totalLists"], 0);
    }
}
