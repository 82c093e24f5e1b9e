//! Run statistics

use crate::db::RatingLoadStats;
use crate::types::{CanonicalMovieRecord, LookupStatus};
use serde::Serialize;

/// Counters for one ETL run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub movies_processed: usize,
    pub found: usize,
    pub not_found: usize,
    pub mocked: usize,
    /// Lookups retried without a year after a not-found answer
    pub retries_without_year: usize,
    pub genre_links: usize,
    pub director_links: usize,
    pub ratings_inserted: usize,
    pub ratings_skipped: usize,
}

impl RunSummary {
    pub fn record_movie(&mut self, record: &CanonicalMovieRecord) {
        self.movies_processed += 1;
        match record.lookup_status {
            LookupStatus::Found => self.found += 1,
            LookupStatus::NotFound => self.not_found += 1,
            LookupStatus::Mocked => self.mocked += 1,
        }
        self.genre_links += record.genres.len();
    }

    pub fn record_ratings(&mut self, stats: RatingLoadStats) {
        self.ratings_inserted += stats.inserted;
        self.ratings_skipped += stats.skipped;
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} movies ({} found, {} not found, {} mocked), {} ratings inserted, {} skipped",
            self.movies_processed,
            self.found,
            self.not_found,
            self.mocked,
            self.ratings_inserted,
            self.ratings_skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: LookupStatus, genres: &[&str]) -> CanonicalMovieRecord {
        CanonicalMovieRecord {
            movie_id: 1,
            external_id: None,
            title: "Heat".to_string(),
            year: None,
            runtime_minutes: None,
            plot: None,
            box_office: None,
            external_rating: None,
            lookup_status: status,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            directors: Vec::new(),
        }
    }

    #[test]
    fn test_counts_by_status() {
        let mut summary = RunSummary::default();
        summary.record_movie(&record(LookupStatus::Found, &["Action", "Crime"]));
        summary.record_movie(&record(LookupStatus::NotFound, &["Drama"]));
        summary.record_movie(&record(LookupStatus::Mocked, &[]));
        summary.record_ratings(RatingLoadStats { inserted: 3, skipped: 1 });

        assert_eq!(summary.movies_processed, 3);
        assert_eq!((summary.found, summary.not_found, summary.mocked), (1, 1, 1));
        assert_eq!(summary.genre_links, 3);
        assert_eq!(
            summary.display_string(),
            "3 movies (1 found, 1 not found, 1 mocked), 3 ratings inserted, 1 skipped"
        );
    }
}
