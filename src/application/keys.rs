//! Cache key construction.
//!
//! The exact key patterns are part of the external contract: any persisted
//! cache written by an earlier deployment must stay readable.

use crate::domain::repository::RepositoryId;

/// Key holding the list of known repository identifiers.
pub const REPOSITORIES: &str = "repositories";

pub fn documents(repository: &RepositoryId) -> String {
    format!("{repository}-all-documents")
}

pub fn document_types(repository: &RepositoryId) -> String {
    format!("{repository}-all-document-types")
}

pub fn slices(repository: &RepositoryId) -> String {
    format!("{repository}-all-slices")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_patterns_are_stable() {
        let repository = RepositoryId::parse("demo").expect("valid id");

        assert_eq!(documents(&repository), "demo-all-documents");
        assert_eq!(document_types(&repository), "demo-all-document-types");
        assert_eq!(slices(&repository), "demo-all-slices");
        assert_eq!(REPOSITORIES, "repositories");
    }
}
