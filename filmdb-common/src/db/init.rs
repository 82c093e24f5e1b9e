//! Database initialization
//!
//! Opens (or creates) the SQLite store and applies the built-in schema.
//! Every statement is `CREATE ... IF NOT EXISTS`, so initialization is safe
//! to repeat against an existing database.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
///
/// The pool holds a single connection: the pipeline is strictly sequential
/// and SQLite serializes writers anyway.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the schema applied
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    // One connection that never idles out, otherwise the database vanishes
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_movies_table(pool).await?;
    create_genres_table(pool).await?;
    create_directors_table(pool).await?;

    // Linking tables
    create_movie_genres_table(pool).await?;
    create_movie_directors_table(pool).await?;

    create_ratings_table(pool).await?;

    Ok(())
}

/// Execute an external SQL script against the store
///
/// The script may contain several statements. It runs once, before the
/// pipeline writes anything.
pub async fn run_schema_script(pool: &SqlitePool, script_path: &Path) -> Result<()> {
    let script = std::fs::read_to_string(script_path).map_err(|e| {
        Error::Config(format!(
            "Read schema script {} failed: {}",
            script_path.display(),
            e
        ))
    })?;

    sqlx::raw_sql(&script).execute(pool).await?;

    info!("Applied schema script: {}", script_path.display());
    Ok(())
}

async fn create_movies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            movie_id INTEGER NOT NULL,
            imdb_id TEXT UNIQUE,
            title TEXT NOT NULL,
            year INTEGER,
            runtime_minutes INTEGER,
            plot TEXT,
            box_office TEXT,
            imdb_rating REAL,
            lookup_status TEXT NOT NULL DEFAULT 'found',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (lookup_status IN ('found', 'not_found', 'mocked'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movies_movie_id_title ON movies(movie_id, title)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_genres_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS genres (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_directors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS directors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_movie_genres_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movie_genres (
            movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
            PRIMARY KEY (movie_id, genre_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_movie_directors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movie_directors (
            movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            director_id INTEGER NOT NULL REFERENCES directors(id) ON DELETE CASCADE,
            PRIMARY KEY (movie_id, director_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    // movie_id is the source-assigned id; it is not checked against movies
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            movie_id INTEGER NOT NULL,
            rating REAL NOT NULL,
            timestamp INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ratings_user_movie ON ratings(user_id, movie_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
