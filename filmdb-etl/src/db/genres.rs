//! Genre database operations
//!
//! Genres are unique by name and created on first reference.

use crate::error::EtlResult;
use sqlx::SqliteConnection;

/// Get the id of a genre, creating it on miss
pub async fn get_or_create_genre(conn: &mut SqliteConnection, name: &str) -> EtlResult<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO genres (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(genre = %name, "Created genre");
    Ok(result.last_insert_rowid())
}

/// Link movie to genre (no-op if already linked)
pub async fn link_movie_genre(
    conn: &mut SqliteConnection,
    movie_row_id: i64,
    genre_id: i64,
) -> EtlResult<()> {
    sqlx::query("INSERT OR IGNORE INTO movie_genres (movie_id, genre_id) VALUES (?, ?)")
        .bind(movie_row_id)
        .bind(genre_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
