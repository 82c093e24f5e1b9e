//! Test Helper Utilities
//!
//! Shared fixtures for filmdb-etl integration tests

#![allow(dead_code)]

use filmdb_etl::services::{CachedProvider, LookupCache, MetadataLookup, MetadataProvider, OmdbClient};
use filmdb_etl::workflow::Pipeline;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY: &str = "test-key";

pub const TOY_STORY_JSON: &str = r#"{
    "Title": "Toy Story",
    "Year": "1995",
    "Runtime": "81 min",
    "Genre": "Animation, Adventure, Comedy",
    "Director": "John Lasseter",
    "Plot": "A cowboy doll is profoundly threatened and jealous when a new spaceman action figure supplants him as top toy in a boy's bedroom.",
    "imdbRating": "8.3",
    "imdbID": "tt0114709",
    "BoxOffice": "$223,225,679",
    "Response": "True"
}"#;

pub const NOT_FOUND_JSON: &str = r#"{"Response": "False", "Error": "Movie not found!"}"#;

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// OMDb client pointed at a test server, without request spacing
pub fn test_client(base_url: &str) -> OmdbClient {
    OmdbClient::new(API_KEY.to_string(), base_url, Duration::from_secs(2), 0).unwrap()
}

/// Pipeline over a direct (uncached) client
pub fn direct_pipeline(pool: &SqlitePool, base_url: &str) -> Pipeline {
    let provider: Box<dyn MetadataProvider> = Box::new(test_client(base_url));
    Pipeline::new(pool.clone(), MetadataLookup::new(provider))
}

/// Pipeline over a client wrapped by the file-backed lookup cache
pub fn cached_pipeline(pool: &SqlitePool, base_url: &str, cache_path: &Path) -> Pipeline {
    let cache = LookupCache::load(cache_path);
    let provider: Box<dyn MetadataProvider> = Box::new(CachedProvider::new(test_client(base_url), cache));
    Pipeline::new(pool.clone(), MetadataLookup::new(provider))
}

pub async fn table_count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
