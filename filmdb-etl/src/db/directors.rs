//! Director database operations

use crate::error::EtlResult;
use sqlx::SqliteConnection;

/// Get the id of a director, creating it on miss
pub async fn get_or_create_director(conn: &mut SqliteConnection, name: &str) -> EtlResult<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM directors WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO directors (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(director = %name, "Created director");
    Ok(result.last_insert_rowid())
}

/// Link movie to director (no-op if already linked)
pub async fn link_movie_director(
    conn: &mut SqliteConnection,
    movie_row_id: i64,
    director_id: i64,
) -> EtlResult<()> {
    sqlx::query("INSERT OR IGNORE INTO movie_directors (movie_id, director_id) VALUES (?, ?)")
        .bind(movie_row_id)
        .bind(director_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
