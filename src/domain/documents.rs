//! Document entities: the raw shapes returned by the content API and the
//! simplified projections this service caches and serves.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One page of a paginated document search against the content API.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentPage {
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    /// URL of the following page, or `None` on the last (or only) page.
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<RemoteDocument>,
}

/// A document as the remote repository returns it. Embedded content fields
/// beyond the slice envelope are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub href: Option<String>,
    pub lang: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub first_publication_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_publication_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub slugs: Vec<String>,
    #[serde(default)]
    pub data: DocumentData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentData {
    #[serde(default)]
    pub slices: Vec<RemoteSlice>,
}

/// A typed, labeled content block embedded in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSlice {
    #[serde(default)]
    pub id: Option<String>,
    pub slice_type: String,
    #[serde(default)]
    pub slice_label: Option<String>,
    /// Named variation of the slice; legacy slices carry none.
    #[serde(default)]
    pub variation: Option<String>,
}

/// The projection of a [`RemoteDocument`] that gets cached and served.
/// This is always what crosses the cache boundary, never the raw shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedDocument {
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub href: Option<String>,
    pub lang: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub first_publication_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_publication_date: Option<OffsetDateTime>,
    pub slugs: Vec<String>,
    pub slices: Vec<SimplifiedSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedSlice {
    pub id: Option<String>,
    pub slice_type: String,
    pub slice_label: Option<String>,
    pub variation: Option<String>,
}

impl From<RemoteDocument> for SimplifiedDocument {
    fn from(document: RemoteDocument) -> Self {
        let slices = document
            .data
            .slices
            .into_iter()
            .map(|slice| SimplifiedSlice {
                id: slice.id,
                slice_type: slice.slice_type,
                slice_label: slice.slice_label,
                variation: slice.variation,
            })
            .collect();

        Self {
            id: document.id,
            uid: document.uid,
            doc_type: document.doc_type,
            href: document.href,
            lang: document.lang,
            first_publication_date: document.first_publication_date,
            last_publication_date: document.last_publication_date,
            slugs: document.slugs,
            slices,
        }
    }
}

/// Aggregate over every slice of a given `slice_type` across a repository.
///
/// `variations` holds every distinct variation name seen for the type, in
/// first-appearance order. A missing variation is a valid member: it shows up
/// as a single `null` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceTypeSummary {
    pub id: Option<String>,
    pub slice_type: String,
    pub slice_label: Option<String>,
    pub variations: Vec<Option<String>>,
}
