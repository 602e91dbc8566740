use std::sync::Arc;

use axum::{
    extract::State,
    http::{self, Request},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, model::CurrentUser, AppState};

pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(bearer_token);

    let token = if let Some(token) = token {
        token
    } else {
        return Err(AppError::Unauthorized("Access token required".to_string()));
    };

    match state.keys.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(CurrentUser {
                user_id: claims.user_id,
                email: claims.email,
            });
        }
        Err(err) => {
            tracing::debug!("rejected bearer token: {err}");
            return Err(AppError::Forbidden("Invalid or expired token".to_string()));
        }
    }

    Ok(next.run(request).await)
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
