use axum::Server;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use planner_api::{config::Config, db, route::create_router, AppState};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("planner_api=debug,tower_http=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
}

// Entry point of the application
#[tokio::main]
async fn main() {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    };

    // Connect to the database, creating it on first run
    let pool = match db::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!("failed to connect to the database: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = db::init_schema(&pool).await {
        tracing::error!("failed to create tables: {err}");
        std::process::exit(1);
    }

    let addr = match config.addr() {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    };

    let app = create_router(AppState::new(pool, config));

    tracing::info!("server is running on {addr}");

    if let Err(err) = Server::bind(&addr).serve(app.into_make_service()).await {
        tracing::error!("server error: {err}");
        std::process::exit(1);
    }
}
