//! CSV input
//!
//! Reads the movies and ratings tables into typed rows. Required columns
//! are checked from the header before any row is read, so a malformed
//! file aborts the run before the database is touched.

use crate::error::{EtlError, EtlResult};
use crate::types::{LocalMovieRow, RatingEvent};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Required columns of the movies table (`genres` is optional)
pub const MOVIE_COLUMNS: &[&str] = &["movieId", "title"];

/// Required columns of the ratings table (`timestamp` is optional)
pub const RATING_COLUMNS: &[&str] = &["userId", "movieId", "rating"];

pub fn read_movies(path: &Path) -> EtlResult<Vec<LocalMovieRow>> {
    let file = std::fs::File::open(path)?;
    read_movies_from(file, &file_label(path, "movies.csv"))
}

pub fn read_ratings(path: &Path) -> EtlResult<Vec<RatingEvent>> {
    let file = std::fs::File::open(path)?;
    read_ratings_from(file, &file_label(path, "ratings.csv"))
}

pub fn read_movies_from<R: Read>(reader: R, label: &str) -> EtlResult<Vec<LocalMovieRow>> {
    read_table(reader, label, MOVIE_COLUMNS)
}

pub fn read_ratings_from<R: Read>(reader: R, label: &str) -> EtlResult<Vec<RatingEvent>> {
    read_table(reader, label, RATING_COLUMNS)
}

fn file_label(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

/// Validate headers, then deserialize rows
///
/// Rows that fail to deserialize are skipped with a warning.
fn read_table<T, R>(reader: R, label: &str, required: &[&str]) -> EtlResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(EtlError::MissingColumns {
            file: label.to_string(),
            missing,
        });
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for record in rdr.deserialize::<T>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                warn!(file = %label, line, error = %e, "Skipping malformed row");
            }
        }
    }

    debug!(file = %label, rows = rows.len(), skipped, "Input table read");
    Ok(rows)
}
