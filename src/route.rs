use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handler::*, middleware::mw_require_auth, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(app_state.config.cors_origin.as_deref());

    // Everything registered before `route_layer` requires a bearer token
    Router::new()
        .route("/api/auth/me", get(get_current_user))
        .route("/api/auth/password", put(change_password))
        .route("/api/events", get(get_events).post(create_event))
        .route("/api/events/range", get(get_events_range))
        .route(
            "/api/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/todos", get(get_todos).post(create_todo))
        .route(
            "/api/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/todos/:id/toggle", patch(toggle_todo))
        .route("/api/lists", get(get_lists).post(create_list))
        .route(
            "/api/lists/:id",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/api/lists/:id/items", post(add_list_item))
        .route(
            "/api/lists/:id/items/:item_id/toggle",
            patch(toggle_list_item),
        )
        .route("/api/lists/:id/items/:item_id", delete(delete_list_item))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/magic-mirror/all-users-today", get(all_users_today))
        .route("/api/magic-mirror/future-data", get(future_data))
        .route("/api/magic-mirror/debug-all-data", get(debug_all_data))
        .route("/api/health", get(health_checker_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// An unset origin allows any client
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ];

    match origin.and_then(|origin| origin.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_credentials(true)
            .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    }
}
