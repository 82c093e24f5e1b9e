//! Pipeline Orchestrator
//!
//! Drives each local movie row through lookup, reconciliation and storage,
//! then loads the ratings table.
//!
//! # Error Handling
//! - Provider failures never fail a row: they arrive as placeholder results
//! - Each movie is written in its own transaction; a database error aborts
//!   the run but leaves every previously committed movie intact
//! - Ratings are loaded in a single transaction after the movie pass
//!
//! # Example
//! ```rust,ignore
//! let pipeline = Pipeline::new(pool, MetadataLookup::new(Box::new(client)));
//! let summary = pipeline.run(&movies, &ratings).await?;
//! ```

use super::RunSummary;
use crate::db::{self, RatingLoadStats};
use crate::error::EtlResult;
use crate::services::{extract_embedded_year, reconcile, strip_embedded_year, MetadataLookup};
use crate::types::{CanonicalMovieRecord, LocalMovieRow, LookupQuery, LookupResult, RatingEvent};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Retry a not-found lookup once without the year hint
    pub retry_without_year: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_without_year: true,
        }
    }
}

/// Sequential ETL pipeline
pub struct Pipeline {
    pool: SqlitePool,
    lookup: MetadataLookup,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(pool: SqlitePool, lookup: MetadataLookup) -> Self {
        Self::with_config(pool, lookup, PipelineConfig::default())
    }

    pub fn with_config(pool: SqlitePool, lookup: MetadataLookup, config: PipelineConfig) -> Self {
        Self {
            pool,
            lookup,
            config,
        }
    }

    /// Run the full ETL: every movie, then every rating
    pub async fn run(
        &self,
        movies: &[LocalMovieRow],
        ratings: &[RatingEvent],
    ) -> EtlResult<RunSummary> {
        let mut summary = RunSummary::default();

        info!(movies = movies.len(), ratings = ratings.len(), "Starting ETL run");

        let movie_pass = self.process_movies(movies, &mut summary).await;

        // Answers fetched before a failed row are kept in the cache
        let flushed = self.lookup.flush().await;
        movie_pass?;
        flushed?;

        let stats = self.load_ratings(ratings).await?;
        summary.record_ratings(stats);

        info!(
            movies = summary.movies_processed,
            found = summary.found,
            not_found = summary.not_found,
            mocked = summary.mocked,
            genre_links = summary.genre_links,
            director_links = summary.director_links,
            ratings_inserted = summary.ratings_inserted,
            ratings_skipped = summary.ratings_skipped,
            "ETL run complete"
        );

        Ok(summary)
    }

    async fn process_movies(
        &self,
        movies: &[LocalMovieRow],
        summary: &mut RunSummary,
    ) -> EtlResult<()> {
        for row in movies {
            self.process_movie(row, summary).await?;
        }
        Ok(())
    }

    /// Look up a local row's title
    ///
    /// The year embedded in the title is sent as a hint. When the provider
    /// answers not-found for a query that carried a year, the lookup is
    /// repeated once without it. Returns the result and whether a retry
    /// happened.
    pub async fn resolve_metadata(&self, row: &LocalMovieRow) -> (LookupResult, bool) {
        let query = LookupQuery::by_title(
            strip_embedded_year(&row.title),
            extract_embedded_year(&row.title),
        );

        let result = self.lookup.lookup(&query).await;

        match result {
            LookupResult::NotFound { reason }
                if self.config.retry_without_year && query.year.is_some() =>
            {
                debug!(
                    movie_id = row.movie_id,
                    title = %query.title,
                    reason = %reason,
                    "Not found with year, retrying without"
                );
                (self.lookup.lookup(&query.without_year()).await, true)
            }
            other => (other, false),
        }
    }

    /// Process one local movie row, returning its movie row id
    pub async fn process_movie(
        &self,
        row: &LocalMovieRow,
        summary: &mut RunSummary,
    ) -> EtlResult<i64> {
        let (result, retried) = self.resolve_metadata(row).await;
        if retried {
            summary.retries_without_year += 1;
        }

        let record = reconcile(row, &result);
        let (movie_row_id, director_links) = self.store_movie(&record).await?;

        summary.record_movie(&record);
        summary.director_links += director_links;

        debug!(
            movie_id = record.movie_id,
            row_id = movie_row_id,
            status = %record.lookup_status,
            "Movie stored"
        );

        Ok(movie_row_id)
    }

    /// Persist a canonical record and its links atomically
    ///
    /// Directors are only present on found records, so placeholder names
    /// are never linked.
    async fn store_movie(&self, record: &CanonicalMovieRecord) -> EtlResult<(i64, usize)> {
        let mut tx = self.pool.begin().await?;

        let movie_row_id = db::upsert_movie(&mut *tx, record).await?;

        for name in &record.genres {
            let genre_id = db::get_or_create_genre(&mut *tx, name).await?;
            db::link_movie_genre(&mut *tx, movie_row_id, genre_id).await?;
        }

        for name in &record.directors {
            let director_id = db::get_or_create_director(&mut *tx, name).await?;
            db::link_movie_director(&mut *tx, movie_row_id, director_id).await?;
        }

        tx.commit().await?;

        Ok((movie_row_id, record.directors.len()))
    }

    /// Load ratings in one transaction
    pub async fn load_ratings(&self, ratings: &[RatingEvent]) -> EtlResult<RatingLoadStats> {
        let mut tx = self.pool.begin().await?;
        let stats = db::load_ratings(&mut *tx, ratings).await?;
        tx.commit().await?;
        Ok(stats)
    }
}
