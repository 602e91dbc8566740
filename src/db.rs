use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};

pub type Db = Pool<Sqlite>;

// Ids are UUID blobs. Timestamps are RFC 3339 UTC text, which compares
// chronologically, so range filters and ORDER BY work on the raw column.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id BLOB PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    );"#,
    r#"CREATE TABLE IF NOT EXISTS events (
        id BLOB PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        all_day BOOLEAN NOT NULL DEFAULT 0,
        color TEXT NOT NULL DEFAULT '#3b82f6',
        user_id BLOB NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );"#,
    "CREATE INDEX IF NOT EXISTS events_user_start ON events (user_id, start_date);",
    r#"CREATE TABLE IF NOT EXISTS todos (
        id BLOB PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        completed BOOLEAN NOT NULL DEFAULT 0,
        priority TEXT NOT NULL DEFAULT 'medium' CHECK (priority IN ('low', 'medium', 'high')),
        due_date TEXT,
        user_id BLOB NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );"#,
    "CREATE INDEX IF NOT EXISTS todos_user_created ON todos (user_id, created_at);",
    r#"CREATE TABLE IF NOT EXISTS lists (
        id BLOB PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        list_date TEXT NOT NULL,
        items TEXT NOT NULL DEFAULT '[]',
        user_id BLOB NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );"#,
    "CREATE INDEX IF NOT EXISTS lists_user_date ON lists (user_id, list_date);",
];

/// Opens the pool, creating the database file first when it is missing.
pub async fn connect(url: &str) -> Result<Db, sqlx::Error> {
    let in_memory = url.contains(":memory:");

    if !in_memory && !Sqlite::database_exists(url).await.unwrap_or(false) {
        tracing::info!("creating database {url}");
        Sqlite::create_database(url).await?;
    }

    // Every connection to an in-memory database is its own database, so the
    // pool must hold exactly one and never recycle it.
    let options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    let pool = options.connect(url).await?;
    tracing::info!("connection to the database is successful");
    Ok(pool)
}

pub async fn init_schema(pool: &Db) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("database schema ready");
    Ok(())
}
