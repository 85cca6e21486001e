//! Ports describing the catalog's collaborators: the TTL cache backend and
//! the remote content API client. Backends are swappable behind these traits.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::documents::DocumentPage;
use crate::domain::repository::RepositoryId;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Key/value store with per-entry expiration.
///
/// Entries past their expiration are treated as absent; implementations must
/// never return stale data. Values round-trip as JSON. Callers are expected to
/// absorb errors (a failed read is a miss, a failed write is logged), so
/// implementations should not retry internally.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    /// Overwrites any existing entry for `key` with `expires_at = now + ttl`.
    async fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Idempotent; removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("content request failed: {0}")]
    Transport(String),
    #[error("content repository `{repository}` responded with status {status}")]
    Status { repository: String, status: u16 },
    #[error("failed to decode content response: {0}")]
    Decode(String),
}

/// Optional parameters forwarded to the content API's search endpoint.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub lang: Option<String>,
}

/// Single-page fetch against a content repository. Pagination is driven by the
/// caller: the existence of a next page is only knowable from the current
/// response, so pages are requested strictly one after another.
#[async_trait]
pub trait ContentClient: Send + Sync {
    async fn fetch_page(
        &self,
        repository: &RepositoryId,
        page: u32,
        query: &DocumentQuery,
    ) -> Result<DocumentPage, FetchError>;
}
