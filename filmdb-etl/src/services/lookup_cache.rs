//! Provider response cache
//!
//! A read-through/write-through decorator around a [`MetadataProvider`].
//! Keys are derived from the query (identifier, or title + year); values are
//! the raw provider responses. Only answers from the provider are cached:
//! transport errors are never stored, so a placeholder is never replayed.

use super::{MetadataProvider, OmdbError, OmdbResponse};
use crate::error::EtlResult;
use crate::types::LookupQuery;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Cached provider response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub response: OmdbResponse,
    /// RFC 3339 timestamp of when the response was fetched
    pub cached_at: String,
}

/// File-backed response cache
#[derive(Debug, Default)]
pub struct LookupCache {
    path: Option<PathBuf>,
    entries: HashMap<String, CacheEntry>,
    dirty: bool,
}

impl LookupCache {
    /// In-memory cache that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load a cache file
    ///
    /// A missing, unreadable or corrupt file yields an empty cache; the
    /// file is rewritten on the next [`save`](Self::save).
    pub fn load(path: &Path) -> Self {
        let entries = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
            {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable lookup cache {}: {}", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        debug!(entries = entries.len(), path = %path.display(), "Lookup cache loaded");

        Self {
            path: Some(path.to_path_buf()),
            entries,
            dirty: false,
        }
    }

    /// Cache key for a query
    pub fn key_for(query: &LookupQuery) -> String {
        match &query.external_id {
            Some(id) => format!("i:{}", id.trim()),
            None => format!(
                "t:{}|y:{}",
                query.title.trim().to_lowercase(),
                query.year.map(|y| y.to_string()).unwrap_or_default()
            ),
        }
    }

    pub fn get(&self, query: &LookupQuery) -> Option<&OmdbResponse> {
        self.entries.get(&Self::key_for(query)).map(|e| &e.response)
    }

    pub fn insert(&mut self, query: &LookupQuery, response: OmdbResponse) {
        self.entries.insert(
            Self::key_for(query),
            CacheEntry {
                response,
                cached_at: Utc::now().to_rfc3339(),
            },
        );
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache file if anything changed
    pub fn save(&mut self) -> EtlResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        self.dirty = false;

        info!(entries = self.entries.len(), "Lookup cache saved to {}", path.display());
        Ok(())
    }
}

/// Caching decorator around a provider
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<LookupCache>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<P: MetadataProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: LookupCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<P: MetadataProvider> MetadataProvider for CachedProvider<P> {
    fn provider_id(&self) -> &'static str {
        self.inner.provider_id()
    }

    async fn fetch(&self, query: &LookupQuery) -> Result<OmdbResponse, OmdbError> {
        if let Some(response) = self.cache.lock().await.get(query) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(title = %query.title, year = ?query.year, "Lookup cache hit");
            return Ok(response.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let response = self.inner.fetch(query).await?;
        self.cache.lock().await.insert(query, response.clone());

        Ok(response)
    }

    async fn flush(&self) -> EtlResult<()> {
        info!(hits = self.hits(), misses = self.misses(), "Lookup cache statistics");
        self.cache.lock().await.save()
    }
}
