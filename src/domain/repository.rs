//! Repository identifiers.
//!
//! A repository (in the content-API sense, not version control) is an isolated
//! content source. Every cache key and every aggregate is partitioned by its id.

use std::fmt;

use super::error::DomainError;

/// Validated repository identifier. Construction trims surrounding whitespace
/// and rejects empty input, so an id in hand is always usable as a cache-key
/// prefix and a hostname segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId(String);

impl RepositoryId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("repository id must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
