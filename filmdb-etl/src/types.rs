//! Core types shared by the enrichment pipeline
//!
//! Local input rows, provider lookup results and the canonical record
//! that is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Movie row from the local movies table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocalMovieRow {
    /// Source-assigned movie id (natural key)
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    /// Raw title, optionally suffixed with "(YYYY)"
    pub title: String,
    /// Pipe-delimited genre list
    #[serde(default)]
    pub genres: Option<String>,
}

/// Rating event from the local ratings table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingEvent {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub rating: f64,
    /// Absent when the column is missing or the cell is empty
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Provider query
///
/// When `external_id` is set the provider is queried by identifier and
/// `title`/`year` are only used for logging and placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupQuery {
    pub title: String,
    pub external_id: Option<String>,
    pub year: Option<i32>,
}

impl LookupQuery {
    pub fn by_title(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            external_id: None,
            year,
        }
    }

    pub fn by_id(external_id: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            external_id: Some(external_id.into()),
            year: None,
        }
    }

    /// Same query with the year selector dropped
    pub fn without_year(&self) -> Self {
        Self {
            year: None,
            ..self.clone()
        }
    }
}

/// Metadata for a title the provider knows about
///
/// Fields hold the provider's raw text; parsing happens in the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub plot: Option<String>,
    pub box_office: Option<String>,
    pub rating: Option<String>,
    pub director: Option<String>,
    /// Provider genre text (local genres are authoritative)
    pub genre: Option<String>,
}

/// Synthetic stand-in produced when the provider is unreachable
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderRecord {
    pub title: String,
    pub year: Option<i32>,
    pub director: String,
    pub box_office: String,
    pub plot: String,
    /// Why real data was unavailable
    pub cause: String,
}

/// Outcome of a metadata lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    /// Provider returned a record
    Found(ProviderRecord),
    /// Provider answered but has no such title
    NotFound { reason: String },
    /// Provider failed; filler values were synthesized
    Placeholder(PlaceholderRecord),
}

impl LookupResult {
    pub fn status(&self) -> LookupStatus {
        match self {
            LookupResult::Found(_) => LookupStatus::Found,
            LookupResult::NotFound { .. } => LookupStatus::NotFound,
            LookupResult::Placeholder(_) => LookupStatus::Mocked,
        }
    }
}

/// Provenance marker persisted with every canonical record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStatus {
    Found,
    NotFound,
    /// Placeholder data, not authoritative
    Mocked,
}

impl LookupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStatus::Found => "found",
            LookupStatus::NotFound => "not_found",
            LookupStatus::Mocked => "mocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "found" => Some(LookupStatus::Found),
            "not_found" => Some(LookupStatus::NotFound),
            "mocked" => Some(LookupStatus::Mocked),
            _ => None,
        }
    }
}

impl fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciled movie, the persisted unit
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMovieRecord {
    pub movie_id: i64,
    /// IMDb id, only set for genuinely found records
    pub external_id: Option<String>,
    /// Title with the year suffix stripped
    pub title: String,
    pub year: Option<i32>,
    pub runtime_minutes: Option<i32>,
    pub plot: Option<String>,
    pub box_office: Option<String>,
    pub external_rating: Option<f64>,
    pub lookup_status: LookupStatus,
    /// Genre names from the local row
    pub genres: Vec<String>,
    /// Director names from the provider (found records only)
    pub directors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_status_markers() {
        assert_eq!(LookupResult::Found(ProviderRecord::default()).status(), LookupStatus::Found);
        assert_eq!(
            LookupResult::NotFound { reason: "Movie not found!".into() }.status(),
            LookupStatus::NotFound
        );

        for status in [LookupStatus::Found, LookupStatus::NotFound, LookupStatus::Mocked] {
            assert_eq!(LookupStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LookupStatus::Mocked.to_string(), "mocked");
    }

    #[test]
    fn test_query_without_year() {
        let query = LookupQuery::by_title("Heat", Some(1995));
        let retry = query.without_year();

        assert_eq!(retry.title, "Heat");
        assert_eq!(retry.year, None);
        assert_eq!(query.year, Some(1995));
    }
}
