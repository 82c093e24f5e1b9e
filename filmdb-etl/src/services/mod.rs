//! Enrichment services
//!
//! Title normalization, the OMDb transport and its cache, the lookup
//! boundary that absorbs provider failures, and the record reconciler.

pub mod lookup_cache;
pub mod metadata_lookup;
pub mod omdb_client;
pub mod reconciler;
pub mod title_normalizer;

pub use lookup_cache::{CachedProvider, LookupCache};
pub use metadata_lookup::MetadataLookup;
pub use omdb_client::{OmdbClient, OmdbError, OmdbResponse};
pub use reconciler::reconcile;
pub use title_normalizer::{extract_embedded_year, strip_embedded_year};

use crate::error::EtlResult;
use crate::types::LookupQuery;
use async_trait::async_trait;

/// Source of raw provider responses
///
/// Implemented by the HTTP client and by the caching decorator wrapped
/// around it.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider identifier for logging (e.g. "OMDb")
    fn provider_id(&self) -> &'static str;

    /// Fetch the raw response for a query
    async fn fetch(&self, query: &LookupQuery) -> Result<OmdbResponse, OmdbError>;

    /// Persist any buffered state (no-op unless the provider caches)
    async fn flush(&self) -> EtlResult<()> {
        Ok(())
    }
}
