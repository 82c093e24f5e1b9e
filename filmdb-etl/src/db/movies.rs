//! Movie database operations
//!
//! A canonical movie is identified by its external (IMDb) id when it has
//! one, otherwise by the `(movie_id, title)` pair. Re-running an upsert
//! updates the matching row in place; it never inserts a duplicate.
//!
//! A row stored without an external id (provider down, or title not found)
//! is adopted by a later found record for the same `(movie_id, title)`.
//! A row that already carries an external id is never downgraded by a
//! later not-found or placeholder result.

use crate::error::EtlResult;
use crate::types::{CanonicalMovieRecord, LookupStatus};
use sqlx::{Row, SqliteConnection};

/// Movie row as stored
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMovie {
    pub id: i64,
    pub movie_id: i64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub runtime_minutes: Option<i32>,
    pub plot: Option<String>,
    pub box_office: Option<String>,
    pub imdb_rating: Option<f64>,
    pub lookup_status: Option<LookupStatus>,
}

/// Insert or update a canonical movie, returning its row id
pub async fn upsert_movie(
    conn: &mut SqliteConnection,
    record: &CanonicalMovieRecord,
) -> EtlResult<i64> {
    match &record.external_id {
        Some(imdb_id) => upsert_by_imdb_id(conn, imdb_id, record).await,
        None => upsert_by_movie_id_and_title(conn, record).await,
    }
}

async fn upsert_by_imdb_id(
    conn: &mut SqliteConnection,
    imdb_id: &str,
    record: &CanonicalMovieRecord,
) -> EtlResult<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM movies WHERE imdb_id = ?")
        .bind(imdb_id)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        sqlx::query(
            r#"
            UPDATE movies SET
                movie_id = ?, title = ?, year = ?, runtime_minutes = ?, plot = ?,
                box_office = ?, imdb_rating = ?, lookup_status = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(record.movie_id)
        .bind(&record.title)
        .bind(record.year)
        .bind(record.runtime_minutes)
        .bind(&record.plot)
        .bind(&record.box_office)
        .bind(record.external_rating)
        .bind(record.lookup_status.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        tracing::debug!(id, imdb_id = %imdb_id, "Updated movie by external id");
        return Ok(id);
    }

    let unidentified: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM movies WHERE movie_id = ? AND title = ? AND imdb_id IS NULL ORDER BY id LIMIT 1",
    )
    .bind(record.movie_id)
    .bind(&record.title)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = unidentified {
        sqlx::query(
            r#"
            UPDATE movies SET
                imdb_id = ?, year = ?, runtime_minutes = ?, plot = ?, box_office = ?,
                imdb_rating = ?, lookup_status = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(imdb_id)
        .bind(record.year)
        .bind(record.runtime_minutes)
        .bind(&record.plot)
        .bind(&record.box_office)
        .bind(record.external_rating)
        .bind(record.lookup_status.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        tracing::debug!(id, imdb_id = %imdb_id, "Adopted movie stored without external id");
        return Ok(id);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO movies (
            movie_id, imdb_id, title, year, runtime_minutes, plot, box_office,
            imdb_rating, lookup_status
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.movie_id)
    .bind(imdb_id)
    .bind(&record.title)
    .bind(record.year)
    .bind(record.runtime_minutes)
    .bind(&record.plot)
    .bind(&record.box_office)
    .bind(record.external_rating)
    .bind(record.lookup_status.as_str())
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(id, imdb_id = %imdb_id, "Inserted movie");
    Ok(id)
}

/// Fallback path: identity, title and external id are left untouched on update
async fn upsert_by_movie_id_and_title(
    conn: &mut SqliteConnection,
    record: &CanonicalMovieRecord,
) -> EtlResult<i64> {
    let existing: Option<(i64, Option<String>)> = sqlx::query_as(
        "SELECT id, imdb_id FROM movies WHERE movie_id = ? AND title = ? ORDER BY imdb_id IS NULL, id LIMIT 1",
    )
    .bind(record.movie_id)
    .bind(&record.title)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id, Some(imdb_id))) = &existing {
        tracing::debug!(
            id,
            imdb_id = %imdb_id,
            status = %record.lookup_status,
            "Keeping identified movie, enrichment not replaced"
        );
        return Ok(*id);
    }

    if let Some((id, None)) = existing {
        sqlx::query(
            r#"
            UPDATE movies SET
                year = ?, runtime_minutes = ?, plot = ?, box_office = ?,
                imdb_rating = ?, lookup_status = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(record.year)
        .bind(record.runtime_minutes)
        .bind(&record.plot)
        .bind(&record.box_office)
        .bind(record.external_rating)
        .bind(record.lookup_status.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        tracing::debug!(id, movie_id = record.movie_id, "Updated movie by local key");
        return Ok(id);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO movies (
            movie_id, title, year, runtime_minutes, plot, box_office,
            imdb_rating, lookup_status
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.movie_id)
    .bind(&record.title)
    .bind(record.year)
    .bind(record.runtime_minutes)
    .bind(&record.plot)
    .bind(&record.box_office)
    .bind(record.external_rating)
    .bind(record.lookup_status.as_str())
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(id, movie_id = record.movie_id, "Inserted movie without external id");
    Ok(id)
}

/// Load a movie by row id
pub async fn load_movie(conn: &mut SqliteConnection, id: i64) -> EtlResult<Option<StoredMovie>> {
    let row = sqlx::query(
        r#"
        SELECT id, movie_id, imdb_id, title, year, runtime_minutes, plot,
               box_office, imdb_rating, lookup_status
        FROM movies
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|row| {
        let status: String = row.get("lookup_status");
        StoredMovie {
            id: row.get("id"),
            movie_id: row.get("movie_id"),
            imdb_id: row.get("imdb_id"),
            title: row.get("title"),
            year: row.get("year"),
            runtime_minutes: row.get("runtime_minutes"),
            plot: row.get("plot"),
            box_office: row.get("box_office"),
            imdb_rating: row.get("imdb_rating"),
            lookup_status: LookupStatus::parse(&status),
        }
    }))
}
