pub mod auth;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod extract;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;

use std::sync::Arc;

use auth::TokenKeys;
use config::Config;
use db::Db;

// Struct representing the application state
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub keys: TokenKeys,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Arc<AppState> {
        let keys = TokenKeys::from_config(&config);
        Arc::new(AppState { db, config, keys })
    }
}
