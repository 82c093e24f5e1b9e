//! OMDb API client
//!
//! HTTP transport for the film metadata provider. Errors are returned as
//! [`OmdbError`]; turning them into placeholder records is the job of
//! [`MetadataLookup`](super::metadata_lookup::MetadataLookup).

use super::MetadataProvider;
use crate::types::{LookupQuery, ProviderRecord};
use async_trait::async_trait;
use filmdb_common::config::OmdbConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

const USER_AGENT: &str = concat!("filmdb-etl/", env!("CARGO_PKG_VERSION"));

/// OMDb client errors
#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Raw OMDb response document
///
/// `Response` is the success discriminator ("True"/"False"); a document
/// without it is malformed. This is also the value stored in the lookup cache.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OmdbResponse {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Plot", default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "BoxOffice", default, skip_serializing_if = "Option::is_none")]
    pub box_office: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Director", default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "imdbID", default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl OmdbResponse {
    /// Provider marked the response as a hit
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// Provider's reason for a miss
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Movie not found!".to_string())
    }

    pub fn into_record(self) -> ProviderRecord {
        ProviderRecord {
            external_id: self.imdb_id,
            title: self.title,
            year: self.year,
            runtime: self.runtime,
            plot: self.plot,
            box_office: self.box_office,
            rating: self.imdb_rating,
            director: self.director,
            genre: self.genre,
        }
    }
}

/// Enforces a minimum interval between consecutive requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("OMDb rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// OMDb API client
pub struct OmdbClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
        request_delay_ms: u64,
    ) -> Result<Self, OmdbError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| OmdbError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(request_delay_ms)),
            base_url: base_url.into(),
            api_key,
        })
    }

    pub fn from_config(api_key: String, config: &OmdbConfig) -> Result<Self, OmdbError> {
        Self::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.request_delay_ms,
        )
    }

    fn query_params(&self, query: &LookupQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("apikey", self.api_key.clone())];

        match &query.external_id {
            Some(id) => params.push(("i", id.clone())),
            None => {
                params.push(("t", query.title.clone()));
                if let Some(year) = query.year {
                    params.push(("y", year.to_string()));
                }
            }
        }

        params
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    fn provider_id(&self) -> &'static str {
        "OMDb"
    }

    async fn fetch(&self, query: &LookupQuery) -> Result<OmdbResponse, OmdbError> {
        self.rate_limiter.wait().await;

        tracing::debug!(
            title = %query.title,
            year = ?query.year,
            imdb_id = ?query.external_id,
            "Querying OMDb API"
        );

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OmdbError::Timeout(e.to_string())
                } else {
                    OmdbError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OmdbError::ApiError(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OmdbError::NetworkError(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| OmdbError::ParseError(e.to_string()))
    }
}
