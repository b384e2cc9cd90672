// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Project metadata index mapping repository identifiers to local pages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::content::ContentRecord;

/// Per-project metadata derived from the local content scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Whether a locally authored page exists for the project.
    pub has_local_page: bool,
    /// Slug of the local page.
    pub slug:           String
}

/// Index from `owner/name` repository identifiers to local page metadata.
pub type MetadataIndex = BTreeMap<String, ProjectMetadata>;

/// Builds the metadata index from scanned content records.
///
/// Only records that declare a `repo` front-matter field participate. When
/// two pages claim the same repository the later record wins; the scan
/// supplies records in file-name order, so the outcome is deterministic and
/// the collision is logged with both slugs.
pub fn build_metadata_index(records: &[ContentRecord]) -> MetadataIndex {
    let mut index = MetadataIndex::new();

    for record in records {
        let Some(repo) = record.repo.as_deref() else {
            continue;
        };
        let repo = repo.trim();
        if repo.is_empty() {
            continue;
        }

        let metadata = ProjectMetadata {
            has_local_page: true,
            slug:           record.slug.clone()
        };

        if let Some(previous) = index.insert(repo.to_string(), metadata) {
            warn!(
                "multiple content files claim repository {repo}: replacing {} with {}",
                previous.slug, record.slug
            );
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::build_metadata_index;
    use crate::content::ContentRecord;

    fn record(slug: &str, repo: Option<&str>) -> ContentRecord {
        ContentRecord {
            slug: slug.to_string(),
            repo: repo.map(str::to_string),
            ..ContentRecord::default()
        }
    }

    #[test]
    fn indexes_records_with_repo_fields() {
        let records = vec![
            record("maps", Some("octocat/maps")),
            record("essay", None),
            record("viz", Some("octocat/viz"))
        ];

        let index = build_metadata_index(&records);
        assert_eq!(index.len(), 2);
        let entry = index.get("octocat/maps").expect("maps entry");
        assert!(entry.has_local_page);
        assert_eq!(entry.slug, "maps");
    }

    #[test]
    fn ignores_blank_repo_fields() {
        let records = vec![record("maps", Some("  "))];
        assert!(build_metadata_index(&records).is_empty());
    }

    #[test]
    fn later_record_wins_on_duplicate_repo() {
        // Records arrive sorted by file name, so the lexicographically last
        // file claims the repository.
        let records = vec![
            record("alpha-page", Some("octocat/maps")),
            record("zeta-page", Some("octocat/maps"))
        ];

        let index = build_metadata_index(&records);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("octocat/maps").expect("entry").slug, "zeta-page");
    }
}
