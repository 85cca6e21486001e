//! The catalog service: fetches all documents of a repository through the
//! cache, and derives the document-type and slice-type aggregates from them.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::keys;
use crate::application::ports::{CacheStore, ContentClient, DocumentQuery, FetchError};
use crate::domain::documents::{SimplifiedDocument, SliceTypeSummary};
use crate::domain::error::DomainError;
use crate::domain::repository::RepositoryId;

const SOURCE: &str = "application::catalog::CatalogService";

/// TTL for per-repository aggregates (documents, types, slices).
const AGGREGATE_TTL: Duration = Duration::from_secs(3600);
/// TTL for the repository list: long-lived, 24x the aggregate TTL.
const REPOSITORY_LIST_TTL: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Aggregation layer between the remote content API and the HTTP handlers.
///
/// Every operation is scoped to one request: read the cache, on a miss fetch
/// from origin, derive, write through, return. Cache faults never escape this
/// service; remote-fetch faults always do. Concurrent misses for the same key
/// may each fetch independently, which is harmless because the derivations are
/// pure functions of remote state (last write wins).
#[derive(Clone)]
pub struct CatalogService {
    cache: Arc<dyn CacheStore>,
    content: Arc<dyn ContentClient>,
}

impl CatalogService {
    pub fn new(cache: Arc<dyn CacheStore>, content: Arc<dyn ContentClient>) -> Self {
        Self { cache, content }
    }

    /// All documents of `repository`, simplified, through the cache.
    ///
    /// On a miss the remote search is paged through sequentially starting at
    /// page 1 until the response carries no next page. The simplified form is
    /// what gets cached, never the raw remote shape, and only after the full
    /// fetch completes.
    pub async fn documents(
        &self,
        repository: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<SimplifiedDocument>, CatalogError> {
        let repository = RepositoryId::parse(repository)?;
        let key = keys::documents(&repository);

        if let Some(cached) = self.cached::<Vec<SimplifiedDocument>>(&key).await {
            debug!(
                target = "vetrina::catalog",
                repository = %repository,
                "cache hit: all documents"
            );
            return Ok(cached);
        }

        debug!(
            target = "vetrina::catalog",
            repository = %repository,
            "cache miss: all documents"
        );

        let mut page = 1u32;
        let mut results: Vec<SimplifiedDocument> = Vec::new();
        loop {
            debug!(
                target = "vetrina::catalog",
                repository = %repository,
                page,
                "fetching document page"
            );
            let response = self.content.fetch_page(&repository, page, query).await?;
            counter!("vetrina_remote_page_fetch_total").increment(1);

            results.extend(response.results.into_iter().map(SimplifiedDocument::from));

            if response.next_page.is_none() {
                break;
            }
            page += 1;
        }

        self.write_through(&key, &results, AGGREGATE_TTL).await;
        Ok(results)
    }

    /// Distinct document types of `repository`, in first-appearance order of
    /// the underlying document sequence.
    pub async fn document_types(&self, repository: &str) -> Result<Vec<String>, CatalogError> {
        let parsed = RepositoryId::parse(repository)?;
        let key = keys::document_types(&parsed);

        if let Some(cached) = self.cached::<Vec<String>>(&key).await {
            debug!(
                target = "vetrina::catalog",
                repository = %parsed,
                "cache hit: all document types"
            );
            return Ok(cached);
        }

        debug!(
            target = "vetrina::catalog",
            repository = %parsed,
            "cache miss: all document types"
        );

        let documents = self.documents(repository, &DocumentQuery::default()).await?;
        let mut types: Vec<String> = Vec::new();
        for document in &documents {
            if !types.contains(&document.doc_type) {
                types.push(document.doc_type.clone());
            }
        }

        self.write_through(&key, &types, AGGREGATE_TTL).await;
        Ok(types)
    }

    /// Slice-type summaries of `repository`: one per distinct `slice_type`,
    /// in first-insertion order, with variation names merged across all
    /// documents. A null variation is a valid member, appended at most once.
    pub async fn slices(&self, repository: &str) -> Result<Vec<SliceTypeSummary>, CatalogError> {
        let parsed = RepositoryId::parse(repository)?;
        let key = keys::slices(&parsed);

        if let Some(cached) = self.cached::<Vec<SliceTypeSummary>>(&key).await {
            debug!(
                target = "vetrina::catalog",
                repository = %parsed,
                "cache hit: all slices"
            );
            return Ok(cached);
        }

        debug!(
            target = "vetrina::catalog",
            repository = %parsed,
            "cache miss: all slices"
        );

        let documents = self.documents(repository, &DocumentQuery::default()).await?;
        let mut summaries: Vec<SliceTypeSummary> = Vec::new();
        for document in &documents {
            for slice in &document.slices {
                match summaries
                    .iter_mut()
                    .find(|summary| summary.slice_type == slice.slice_type)
                {
                    Some(summary) => {
                        if !summary.variations.contains(&slice.variation) {
                            summary.variations.push(slice.variation.clone());
                        }
                    }
                    None => summaries.push(SliceTypeSummary {
                        id: slice.id.clone(),
                        slice_type: slice.slice_type.clone(),
                        slice_label: slice.slice_label.clone(),
                        variations: vec![slice.variation.clone()],
                    }),
                }
            }
        }

        self.write_through(&key, &summaries, AGGREGATE_TTL).await;
        Ok(summaries)
    }

    /// Record `repository` in the cached repository list, newest first.
    ///
    /// Blank identifiers are silently ignored rather than rejected; the
    /// dashboard calls this on every selection and an empty selection is not
    /// an error. Adding a known id leaves the list unchanged.
    pub async fn add_repository(&self, repository: &str) {
        let Ok(repository) = RepositoryId::parse(repository) else {
            debug!(
                target = "vetrina::catalog",
                "ignoring blank repository id"
            );
            return;
        };

        let mut known: Vec<String> = self.cached(keys::REPOSITORIES).await.unwrap_or_default();
        if known.iter().any(|id| id == repository.as_str()) {
            return;
        }

        known.insert(0, repository.as_str().to_string());
        self.write_through(keys::REPOSITORIES, &known, REPOSITORY_LIST_TTL)
            .await;
    }

    /// Known repository identifiers, newest first. Empty when none recorded.
    pub async fn repositories(&self) -> Vec<String> {
        self.cached(keys::REPOSITORIES).await.unwrap_or_default()
    }

    /// Cache read that fails open: backend errors and undecodable entries are
    /// logged and treated as a miss so the operation completes via origin.
    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.cache.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                counter!("vetrina_cache_miss_total").increment(1);
                return None;
            }
            Err(err) => {
                counter!("vetrina_cache_error_total").increment(1);
                warn!(
                    target = "vetrina::catalog",
                    source = SOURCE,
                    key,
                    error = %err,
                    "cache read failed, treating as miss"
                );
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(decoded) => {
                counter!("vetrina_cache_hit_total").increment(1);
                Some(decoded)
            }
            Err(err) => {
                counter!("vetrina_cache_error_total").increment(1);
                warn!(
                    target = "vetrina::catalog",
                    source = SOURCE,
                    key,
                    error = %err,
                    "cached entry is undecodable, treating as miss"
                );
                None
            }
        }
    }

    /// Write-through that never fails the operation: the freshly computed
    /// value is returned to the caller even when persisting it did not work.
    async fn write_through<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(
                    target = "vetrina::catalog",
                    source = SOURCE,
                    key,
                    error = %err,
                    "failed to encode value for cache"
                );
                return;
            }
        };

        if let Err(err) = self.cache.set(key, &encoded, ttl).await {
            counter!("vetrina_cache_error_total").increment(1);
            warn!(
                target = "vetrina::catalog",
                source = SOURCE,
                key,
                error = %err,
                "cache write failed, returning uncached result"
            );
        }
    }
}
