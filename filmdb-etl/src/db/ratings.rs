//! Rating database operations
//!
//! Ratings are immutable facts keyed by the full
//! `(user_id, movie_id, rating, timestamp)` tuple. An identical tuple is
//! skipped; a tuple differing in any field is a new row.

use crate::error::EtlResult;
use crate::types::RatingEvent;
use sqlx::SqliteConnection;

/// Outcome of a rating load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingLoadStats {
    pub inserted: usize,
    pub skipped: usize,
}

/// Insert rating events that are not already stored
pub async fn load_ratings(
    conn: &mut SqliteConnection,
    events: &[RatingEvent],
) -> EtlResult<RatingLoadStats> {
    let mut stats = RatingLoadStats::default();

    for event in events {
        if rating_exists(conn, event).await? {
            stats.skipped += 1;
            continue;
        }

        sqlx::query("INSERT INTO ratings (user_id, movie_id, rating, timestamp) VALUES (?, ?, ?, ?)")
            .bind(event.user_id)
            .bind(event.movie_id)
            .bind(event.rating)
            .bind(event.timestamp)
            .execute(&mut *conn)
            .await?;
        stats.inserted += 1;
    }

    tracing::debug!(inserted = stats.inserted, skipped = stats.skipped, "Ratings loaded");
    Ok(stats)
}

/// `IS` compares NULL to NULL as equal, so an absent timestamp matches only
/// an absent timestamp
async fn rating_exists(conn: &mut SqliteConnection, event: &RatingEvent) -> EtlResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM ratings
        WHERE user_id = ? AND movie_id = ? AND rating = ? AND timestamp IS ?
        LIMIT 1
        "#,
    )
    .bind(event.user_id)
    .bind(event.movie_id)
    .bind(event.rating)
    .bind(event.timestamp)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(found.is_some())
}
