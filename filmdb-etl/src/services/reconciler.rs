//! Record reconciliation
//!
//! Merges a local movie row with a lookup result into the canonical
//! record. Every parse step degrades to `None`; reconciliation never fails.
//!
//! Field sources:
//! - title, genres: local row
//! - external id, directors, runtime, rating: provider (found records only)
//! - year: provider year, else the year embedded in the local title
//! - plot, box office: provider or placeholder, unless "N/A"

use super::title_normalizer::{extract_embedded_year, strip_embedded_year};
use crate::types::{CanonicalMovieRecord, LocalMovieRow, LookupResult};

/// Provider marker for a missing value
const NOT_AVAILABLE: &str = "N/A";

/// MovieLens marker for a movie without genres
const NO_GENRES_LISTED: &str = "no genres listed";

/// Reconcile a local row with its lookup result
pub fn reconcile(row: &LocalMovieRow, result: &LookupResult) -> CanonicalMovieRecord {
    let title_year = extract_embedded_year(&row.title);

    let mut record = CanonicalMovieRecord {
        movie_id: row.movie_id,
        external_id: None,
        title: strip_embedded_year(&row.title),
        year: title_year,
        runtime_minutes: None,
        plot: None,
        box_office: None,
        external_rating: None,
        lookup_status: result.status(),
        genres: split_genres(row.genres.as_deref()),
        directors: Vec::new(),
    };

    match result {
        LookupResult::Found(found) => {
            record.external_id = available(found.external_id.as_deref());
            record.year = found
                .year
                .as_deref()
                .and_then(leading_integer)
                .or(title_year);
            record.runtime_minutes = found.runtime.as_deref().and_then(leading_integer);
            record.plot = available(found.plot.as_deref());
            record.box_office = available(found.box_office.as_deref());
            record.external_rating = found.rating.as_deref().and_then(parse_rating);
            record.directors = split_directors(found.director.as_deref());
        }
        LookupResult::NotFound { .. } => {}
        LookupResult::Placeholder(placeholder) => {
            record.year = placeholder.year.or(title_year);
            record.plot = available(Some(placeholder.plot.as_str()));
            record.box_office = available(Some(placeholder.box_office.as_str()));
        }
    }

    record
}

/// Trimmed value unless empty or the provider's "N/A" marker
fn available(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(NOT_AVAILABLE) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Leading integer token ("81 min" -> 81, "2010–2014" -> 2010)
fn leading_integer(text: &str) -> Option<i32> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    text[..end].parse().ok()
}

fn parse_rating(text: &str) -> Option<f64> {
    available(Some(text))?
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
}

fn is_no_genres_marker(token: &str) -> bool {
    token
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .eq_ignore_ascii_case(NO_GENRES_LISTED)
}

/// Pipe-delimited genre names, without blanks, markers or duplicates
pub fn split_genres(raw: Option<&str>) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();

    for token in raw.unwrap_or_default().split('|').map(str::trim) {
        if token.is_empty() || is_no_genres_marker(token) {
            continue;
        }
        if !genres.iter().any(|g| g == token) {
            genres.push(token.to_string());
        }
    }

    genres
}

/// Comma-delimited director names, without blanks, "N/A" or duplicates
pub fn split_directors(raw: Option<&str>) -> Vec<String> {
    let mut directors: Vec<String> = Vec::new();

    for token in raw.unwrap_or_default().split(',') {
        if let Some(name) = available(Some(token)) {
            if !directors.contains(&name) {
                directors.push(name);
            }
        }
    }

    directors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LookupStatus, PlaceholderRecord, ProviderRecord};

    fn toy_story_row() -> LocalMovieRow {
        LocalMovieRow {
            movie_id: 1,
            title: "Toy Story (1995)".to_string(),
            genres: Some("Adventure|Animation".to_string()),
        }
    }

    fn toy_story_found() -> ProviderRecord {
        ProviderRecord {
            external_id: Some("tt0114709".to_string()),
            title: Some("Toy Story".to_string()),
            year: Some("1995".to_string()),
            runtime: Some("81 min".to_string()),
            plot: Some("Toys come to life.".to_string()),
            box_office: Some("$223,225,679".to_string()),
            rating: Some("8.3".to_string()),
            director: Some("John Lasseter".to_string()),
            genre: Some("Animation, Adventure".to_string()),
        }
    }

    #[test]
    fn test_found_record() {
        let record = reconcile(&toy_story_row(), &LookupResult::Found(toy_story_found()));

        assert_eq!(record.movie_id, 1);
        assert_eq!(record.external_id.as_deref(), Some("tt0114709"));
        assert_eq!(record.title, "Toy Story");
        assert_eq!(record.year, Some(1995));
        assert_eq!(record.runtime_minutes, Some(81));
        assert_eq!(record.external_rating, Some(8.3));
        assert_eq!(record.box_office.as_deref(), Some("$223,225,679"));
        assert_eq!(record.genres, vec!["Adventure", "Animation"]);
        assert_eq!(record.directors, vec!["John Lasseter"]);
        assert_eq!(record.lookup_status, LookupStatus::Found);
    }

    #[test]
    fn test_not_available_fields_are_absent() {
        let found = ProviderRecord {
            external_id: Some("tt0000001".to_string()),
            year: Some("N/A".to_string()),
            runtime: Some("N/A".to_string()),
            plot: Some("N/A".to_string()),
            box_office: Some("N/A".to_string()),
            rating: Some("N/A".to_string()),
            director: Some("N/A".to_string()),
            ..Default::default()
        };

        let record = reconcile(&toy_story_row(), &LookupResult::Found(found));

        assert_eq!(record.year, Some(1995), "falls back to title year");
        assert_eq!(record.runtime_minutes, None);
        assert_eq!(record.plot, None);
        assert_eq!(record.box_office, None);
        assert_eq!(record.external_rating, None);
        assert!(record.directors.is_empty());
    }

    #[test]
    fn test_absent_and_garbage_fields_never_fail() {
        let garbage = ProviderRecord {
            year: Some("unknown".to_string()),
            runtime: Some("about two hours".to_string()),
            rating: Some("eight".to_string()),
            ..Default::default()
        };
        let row = LocalMovieRow {
            movie_id: 9,
            title: "Untitled".to_string(),
            genres: None,
        };

        for result in [
            LookupResult::Found(ProviderRecord::default()),
            LookupResult::Found(garbage),
        ] {
            let record = reconcile(&row, &result);
            assert_eq!(record.external_id, None);
            assert_eq!(record.year, None);
            assert_eq!(record.runtime_minutes, None);
            assert_eq!(record.external_rating, None);
            assert!(record.genres.is_empty());
        }
    }

    #[test]
    fn test_nan_rating_rejected() {
        assert_eq!(parse_rating("NaN"), None);
        assert_eq!(parse_rating("inf"), None);
        assert_eq!(parse_rating(" 7.1 "), Some(7.1));
    }

    #[test]
    fn test_provider_year_preferred_over_title() {
        let found = ProviderRecord {
            year: Some("1996".to_string()),
            ..Default::default()
        };

        let record = reconcile(&toy_story_row(), &LookupResult::Found(found));
        assert_eq!(record.year, Some(1996));
    }

    #[test]
    fn test_year_range_takes_first_year() {
        assert_eq!(leading_integer("2010–2014"), Some(2010));
        assert_eq!(leading_integer("81 min"), Some(81));
        assert_eq!(leading_integer("min 81"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn test_not_found_keeps_local_data_only() {
        let result = LookupResult::NotFound {
            reason: "Movie not found!".to_string(),
        };

        let record = reconcile(&toy_story_row(), &result);

        assert_eq!(record.external_id, None);
        assert_eq!(record.year, Some(1995));
        assert_eq!(record.plot, None);
        assert_eq!(record.genres, vec!["Adventure", "Animation"]);
        assert!(record.directors.is_empty());
        assert_eq!(record.lookup_status, LookupStatus::NotFound);
    }

    #[test]
    fn test_placeholder_is_marked_and_not_linked() {
        let placeholder = PlaceholderRecord {
            title: "Toy Story".to_string(),
            year: None,
            director: "Ridley Scott".to_string(),
            box_office: "$120,000,000".to_string(),
            plot: "A gripping story about hope and survival.".to_string(),
            cause: "connection refused".to_string(),
        };

        let record = reconcile(&toy_story_row(), &LookupResult::Placeholder(placeholder));

        assert_eq!(record.lookup_status, LookupStatus::Mocked);
        assert_eq!(record.external_id, None);
        assert_eq!(record.year, Some(1995));
        assert_eq!(record.box_office.as_deref(), Some("$120,000,000"));
        assert_eq!(record.plot.as_deref(), Some("A gripping story about hope and survival."));
        assert!(record.directors.is_empty());
    }

    #[test]
    fn test_split_genres() {
        assert_eq!(
            split_genres(Some(" Comedy | Romance ||Comedy")),
            vec!["Comedy", "Romance"]
        );
        assert!(split_genres(Some("(no genres listed)")).is_empty());
        assert!(split_genres(Some("(No Genres Listed)")).is_empty());
        assert!(split_genres(Some("")).is_empty());
        assert!(split_genres(None).is_empty());
        assert_eq!(split_genres(Some("Drama|(no genres listed)")), vec!["Drama"]);
    }

    #[test]
    fn test_split_directors() {
        assert_eq!(
            split_directors(Some("Lana Wachowski, Lilly Wachowski")),
            vec!["Lana Wachowski", "Lilly Wachowski"]
        );
        assert_eq!(split_directors(Some("Ang Lee, , Ang Lee")), vec!["Ang Lee"]);
        assert!(split_directors(Some("N/A")).is_empty());
        assert!(split_directors(None).is_empty());
    }
}
