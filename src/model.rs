use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

pub const DEFAULT_EVENT_COLOR: &str = "#3b82f6";

// Registered account; the hash never leaves the server
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Username the Magic Mirror modules match on: the email's local part.
    pub fn username(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

// Data model representing a calendar event
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub all_day: bool,
    pub color: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

// Data model representing a Todo item
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry embedded in a [`List`]; its id is only unique within that list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub list_date: DateTime<Utc>,
    pub items: Vec<ListItem>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    pub fn add_item(&mut self, title: String, description: String, now: DateTime<Utc>) -> &ListItem {
        self.items.push(ListItem {
            id: Uuid::new_v4(),
            title,
            description,
            completed: false,
            created_at: now,
        });
        self.updated_at = now;
        &self.items[self.items.len() - 1]
    }

    /// Flips the item's `completed` flag. `None` if the id is not in this list.
    pub fn toggle_item(&mut self, item_id: Uuid, now: DateTime<Utc>) -> Option<&ListItem> {
        let item = self.items.iter_mut().find(|item| item.id == item_id)?;
        item.completed = !item.completed;
        self.updated_at = now;
        Some(item)
    }

    pub fn remove_item(&mut self, item_id: Uuid, now: DateTime<Utc>) -> Option<ListItem> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        self.updated_at = now;
        Some(self.items.remove(index))
    }
}

// Row shape of the lists table; items live in a JSON column
#[derive(Debug, sqlx::FromRow)]
pub struct ListRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub list_date: DateTime<Utc>,
    pub items: Json<Vec<ListItem>>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ListRow> for List {
    fn from(row: ListRow) -> Self {
        List {
            id: row.id,
            title: row.title,
            description: row.description,
            list_date: row.list_date,
            items: row.items.0,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Identity the auth middleware attaches to every gated request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub(crate) user_id: Uuid,
    pub(crate) email: String,
}
