use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::Utc;
use serde_json::json;
use sqlx::{query, query_as};
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password},
    error::AppError,
    extract::{JsonBody, ValidatedJson},
    model::{CurrentUser, PublicUser, User},
    schema::{ChangePasswordSchema, LoginSchema, RegisterSchema},
    AppState,
};

const USER_EXISTS: &str = "User already exists with this email";
const BAD_CREDENTIALS: &str = "Invalid email or password";

pub async fn register(
    State(data): State<Arc<AppState>>,
    JsonBody(body): JsonBody<RegisterSchema>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.normalize()?;

    let existing = query("SELECT id FROM users WHERE email = ?")
        .bind(&body.email)
        .fetch_optional(&data.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::validation(USER_EXISTS));
    }

    let password_hash = hash_password(&body.password, data.config.bcrypt_cost).await?;

    let user_result = query_as::<_, User>(
        "INSERT INTO users (id, name, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?) \
         RETURNING id, name, email, password_hash, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.email)
    .bind(&password_hash)
    .bind(Utc::now())
    .fetch_one(&data.db)
    .await;

    let user = match user_result {
        Ok(user) => user,
        // Lost the race against a concurrent registration of the same email
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Err(AppError::validation(USER_EXISTS));
        }
        Err(err) => return Err(err.into()),
    };

    let token = data.keys.issue(user.id, &user.email)?;
    tracing::info!(user_id = %user.id, "registered new user");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "token": token,
            "user": { "id": user.id, "name": user.name, "email": user.email }
        })),
    ))
}

pub async fn login(
    State(data): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginSchema>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.normalize()?;

    let user = query_as::<_, User>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(&body.email)
    .fetch_optional(&data.db)
    .await?;

    // Unknown email and wrong password must be indistinguishable
    let verified = match &user {
        Some(user) => verify_password(&body.password, &user.password_hash).await?,
        None => false,
    };
    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::debug!("failed login attempt");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }
    };

    let token = data.keys.issue(user.id, &user.email)?;
    tracing::debug!(user_id = %user.id, "user logged in");

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": { "id": user.id, "name": user.name, "email": user.email }
    })))
}

pub async fn get_current_user(
    State(data): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user(&data, current.user_id).await?;
    Ok(Json(PublicUser::from(user)))
}

pub async fn change_password(
    State(data): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(body): ValidatedJson<ChangePasswordSchema>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user(&data, current.user_id).await?;

    if !verify_password(&body.current_password, &user.password_hash).await? {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&body.new_password, data.config.bcrypt_cost).await?;
    query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(&password_hash)
        .bind(user.id)
        .execute(&data.db)
        .await?;

    tracing::info!(user_id = %user.id, email = %current.email, "password changed");
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

async fn find_user(data: &AppState, user_id: Uuid) -> Result<User, AppError> {
    query_as::<_, User>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
