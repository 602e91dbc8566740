use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::{query, query_as, types::Json as SqlJson};
use uuid::Uuid;

use super::parse_id;
use crate::{
    db::Db,
    error::AppError,
    extract::ValidatedJson,
    model::{CurrentUser, List, ListItem, ListRow},
    schema::{clean_text, AddItemSchema, CreateListSchema, UpdateListSchema},
    AppState,
};

const LIST_NOT_FOUND: &str = "List not found";
const ITEM_NOT_FOUND: &str = "Item not found";

pub(crate) const LIST_COLUMNS: &str =
    "id, title, description, list_date, items, user_id, created_at, updated_at";

pub async fn get_lists(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let rows = query_as::<_, ListRow>(&format!(
        "SELECT {LIST_COLUMNS} FROM lists WHERE user_id = ? ORDER BY created_at DESC"
    ))
    .bind(user.user_id)
    .fetch_all(&data.db)
    .await?;

    Ok(Json(rows.into_iter().map(List::from).collect::<Vec<_>>()))
}

pub async fn get_list(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, LIST_NOT_FOUND)?;
    let list = fetch_owned_list(&data.db, id, user.user_id).await?;
    Ok(Json(list))
}

pub async fn create_list(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<CreateListSchema>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let row = query_as::<_, ListRow>(&format!(
        "INSERT INTO lists \
         (id, title, description, list_date, items, user_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {LIST_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(body.title.trim())
    .bind(clean_text(body.description))
    .bind(body.list_date)
    .bind(SqlJson(Vec::<ListItem>::new()))
    .bind(user.user_id)
    .bind(now)
    .bind(now)
    .fetch_one(&data.db)
    .await?;

    Ok((StatusCode::CREATED, Json(List::from(row))))
}

pub async fn update_list(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<UpdateListSchema>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, LIST_NOT_FOUND)?;

    let row = query_as::<_, ListRow>(&format!(
        "UPDATE lists SET \
            title = COALESCE(?, title), \
            description = COALESCE(?, description), \
            list_date = COALESCE(?, list_date), \
            updated_at = ? \
         WHERE id = ? AND user_id = ? RETURNING {LIST_COLUMNS}"
    ))
    .bind(body.title.map(|title| title.trim().to_string()))
    .bind(body.description.map(|description| description.trim().to_string()))
    .bind(body.list_date)
    .bind(Utc::now())
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| AppError::NotFound(LIST_NOT_FOUND.to_string()))?;

    Ok(Json(List::from(row)))
}

pub async fn delete_list(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, LIST_NOT_FOUND)?;

    let rows_affected = query("DELETE FROM lists WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user.user_id)
        .execute(&data.db)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        return Err(AppError::NotFound(LIST_NOT_FOUND.to_string()));
    }

    Ok(Json(json!({ "message": "List deleted successfully" })))
}

pub async fn add_list_item(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<AddItemSchema>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, LIST_NOT_FOUND)?;
    let mut list = fetch_owned_list(&data.db, id, user.user_id).await?;

    list.add_item(
        body.title.trim().to_string(),
        clean_text(body.description),
        Utc::now(),
    );
    save_items(&data.db, &list).await?;

    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn toggle_list_item(
    Path((list_id, item_id)): Path<(String, String)>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let list_id = parse_id(&list_id, LIST_NOT_FOUND)?;
    let mut list = fetch_owned_list(&data.db, list_id, user.user_id).await?;

    let item_id = parse_id(&item_id, ITEM_NOT_FOUND)?;
    if list.toggle_item(item_id, Utc::now()).is_none() {
        return Err(AppError::NotFound(ITEM_NOT_FOUND.to_string()));
    }
    save_items(&data.db, &list).await?;

    Ok(Json(list))
}

pub async fn delete_list_item(
    Path((list_id, item_id)): Path<(String, String)>,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let list_id = parse_id(&list_id, LIST_NOT_FOUND)?;
    let mut list = fetch_owned_list(&data.db, list_id, user.user_id).await?;

    let item_id = parse_id(&item_id, ITEM_NOT_FOUND)?;
    if list.remove_item(item_id, Utc::now()).is_none() {
        return Err(AppError::NotFound(ITEM_NOT_FOUND.to_string()));
    }
    save_items(&data.db, &list).await?;

    Ok(Json(list))
}

async fn fetch_owned_list(db: &Db, id: Uuid, user_id: Uuid) -> Result<List, AppError> {
    let row = query_as::<_, ListRow>(&format!(
        "SELECT {LIST_COLUMNS} FROM lists WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound(LIST_NOT_FOUND.to_string()))?;

    Ok(List::from(row))
}

// Writes back the embedded items. Read and write are separate statements, so
// two sessions editing the same list concurrently can overwrite each other.
async fn save_items(db: &Db, list: &List) -> Result<(), AppError> {
    let rows_affected = query("UPDATE lists SET items = ?, updated_at = ? WHERE id = ? AND user_id = ?")
        .bind(SqlJson(&list.items))
        .bind(list.updated_at)
        .bind(list.id)
        .bind(list.user_id)
        .execute(db)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        // Deleted between the read and the write
        return Err(AppError::NotFound(LIST_NOT_FOUND.to_string()));
    }
    Ok(())
}
