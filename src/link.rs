// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Local-versus-external project link resolution.

use crate::{metadata::MetadataIndex, project::Project};

/// Destination a project card links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLink {
    /// A locally authored project page, rendered at `/projects/{slug}`.
    Local {
        /// Slug of the local page.
        slug: String
    },
    /// An external destination, typically the repository or its homepage.
    External {
        /// Absolute URL.
        url: String
    }
}

impl ProjectLink {
    /// Renders the link as an href value.
    pub fn href(&self) -> String {
        match self {
            Self::Local {
                slug
            } => format!("/projects/{slug}"),
            Self::External {
                url
            } => url.clone()
        }
    }
}

/// Resolves where a project card should link.
///
/// A project whose repository has a locally authored page links to that page;
/// everything else keeps its external link. Pure over the metadata index so
/// resolution is trivially testable.
pub fn resolve_project_link(project: &Project, index: &MetadataIndex) -> ProjectLink {
    if let Some(repo) = project.repo.as_deref() {
        if let Some(metadata) = index.get(repo) {
            if metadata.has_local_page {
                return ProjectLink::Local {
                    slug: metadata.slug.clone()
                };
            }
        }
    }

    ProjectLink::External {
        url: project.link.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_project_link, ProjectLink};
    use crate::{
        metadata::{MetadataIndex, ProjectMetadata},
        project::Project
    };

    fn project(repo: Option<&str>, link: &str) -> Project {
        Project {
            repo: repo.map(str::to_string),
            link: link.to_string(),
            ..Project::default()
        }
    }

    fn index_with(repo: &str, slug: &str) -> MetadataIndex {
        let mut index = MetadataIndex::new();
        index.insert(
            repo.to_string(),
            ProjectMetadata {
                has_local_page: true,
                slug:           slug.to_string()
            }
        );
        index
    }

    #[test]
    fn links_to_local_page_when_indexed() {
        let index = index_with("octocat/maps", "maps");
        let link = resolve_project_link(&project(Some("octocat/maps"), "https://github.com/octocat/maps"), &index);
        assert_eq!(
            link,
            ProjectLink::Local {
                slug: "maps".to_string()
            }
        );
        assert_eq!(link.href(), "/projects/maps");
    }

    #[test]
    fn keeps_external_link_without_local_page() {
        let index = MetadataIndex::new();
        let link = resolve_project_link(&project(Some("octocat/maps"), "https://example.com"), &index);
        assert_eq!(link.href(), "https://example.com");
    }

    #[test]
    fn projects_without_repo_stay_external() {
        let index = index_with("octocat/maps", "maps");
        let link = resolve_project_link(&project(None, "https://example.com"), &index);
        assert_eq!(link.href(), "https://example.com");
    }

    #[test]
    fn resolution_is_idempotent_over_resolved_href() {
        // Feeding a resolved local href back through resolution keeps it
        // local: the repo identity is unchanged and the index still maps it.
        let index = index_with("octocat/maps", "maps");
        let mut card = project(Some("octocat/maps"), "https://github.com/octocat/maps");
        card.link = resolve_project_link(&card, &index).href();
        let second = resolve_project_link(&card, &index);
        assert_eq!(second.href(), "/projects/maps");
    }
}
