// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Render payload composition.
//!
//! Composition joins the persisted snapshots with the local content scan
//! into the single document the site renderer consumes: projects with their
//! links resolved against local pages, the curated selection, the metadata
//! index, and the publication list.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::SiteConfig,
    content::scan_local_content,
    error::Error,
    link::resolve_project_link,
    metadata::{build_metadata_index, MetadataIndex},
    project::{apply_content_overlay, Project},
    scholar::{fallback_publications, load_publications, Publication},
    select::resolve_selected,
    snapshot::{read_projects, write_github_projects_debug}
};

/// The complete document handed to the site renderer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    /// RFC 3339 timestamp of composition.
    pub generated_at: String,
    /// All surfaced projects, links resolved.
    pub projects:     Vec<Project>,
    /// Curated selection in configured order.
    pub selected:     Vec<Project>,
    /// Repository identifier to local-page metadata index.
    pub metadata:     MetadataIndex,
    /// Publications ordered by effective citations descending.
    pub publications: Vec<Publication>
}

/// Composes the render payload from the snapshots and local content under
/// `root`.
///
/// Snapshot and content paths from the configuration are resolved relative
/// to `root`. The debug artifact is rewritten as a side effect of every
/// compose pass.
///
/// # Errors
///
/// Returns an [`Error`] when the projects snapshot is missing or malformed,
/// the content directory cannot be read, or the debug artifact cannot be
/// written. A missing publications snapshot is not an error; the static
/// fallback list is used instead.
pub fn compose_render_payload(config: &SiteConfig, root: &Path) -> Result<RenderPayload, Error> {
    let projects_path = root.join(&config.snapshots.projects);
    let mut projects = read_projects(&projects_path)?;

    let content = scan_local_content(&root.join(&config.content_dir))?;
    let metadata = build_metadata_index(&content);
    debug!(
        "composing from {} projects, {} content pages, {} indexed repositories",
        projects.len(),
        content.len(),
        metadata.len()
    );

    projects = projects
        .into_iter()
        .map(|mut project| {
            let overlay = project
                .repo
                .as_deref()
                .and_then(|repo| content.iter().find(|record| record.repo.as_deref() == Some(repo)));
            if let Some(record) = overlay {
                project = apply_content_overlay(project, record);
            }
            project.link = resolve_project_link(&project, &metadata).href();
            project
        })
        .collect();

    let selected = resolve_selected(&config.selected, &projects, &content);

    let publications_path = root.join(&config.snapshots.publications);
    let mut publications =
        load_publications(&publications_path, config.scholar.max_publications);
    if publications.is_empty() {
        info!("no publications snapshot, using the static fallback list");
        publications = fallback_publications();
        publications.truncate(config.scholar.max_publications);
    }

    write_github_projects_debug(&root.join(&config.snapshots.github_projects), &projects)?;

    Ok(RenderPayload {
        generated_at: Utc::now().to_rfc3339(),
        projects,
        selected,
        metadata,
        publications
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::compose_render_payload;
    use crate::{
        config::parse_site_config,
        project::{Project, ProjectStats},
        snapshot::write_projects
    };

    fn sample_project(title: &str, repo: &str) -> Project {
        Project {
            title: title.to_string(),
            desc:  format!("{title} description"),
            tags:  vec!["rust".to_string()],
            link:  format!("https://github.com/{repo}"),
            repo:  Some(repo.to_string()),
            image: None,
            stats: Some(ProjectStats {
                stars:    5,
                forks:    1,
                rank:     None,
                rank_url: None
            })
        }
    }

    #[test]
    fn composes_payload_with_local_link_and_cover_resolution() {
        // A repository with an authored page ends up linking to that page,
        // and the page's bare cover file name resolves into the project
        // image folder.
        let dir = tempdir().expect("tempdir");
        let root = dir.path();

        let config = parse_site_config(
            "owner: alice\nselected:\n  - alice/tool\n"
        )
        .expect("valid config");

        write_projects(
            &root.join(&config.snapshots.projects),
            &[sample_project("tool", "alice/tool"), sample_project("other", "alice/other")]
        )
        .expect("write projects snapshot");

        let content_dir = root.join(&config.content_dir);
        std::fs::create_dir_all(&content_dir).expect("create content dir");
        std::fs::write(
            content_dir.join("2024-01-01-tool.md"),
            "---\ntitle: The Tool\nrepo: alice/tool\nimage: shot.png\n---\nBody\n"
        )
        .expect("write content file");

        let payload = compose_render_payload(&config, root).expect("compose should succeed");

        let tool = payload
            .projects
            .iter()
            .find(|p| p.repo.as_deref() == Some("alice/tool"))
            .expect("tool project");
        assert_eq!(tool.link, "/projects/tool");
        assert_eq!(tool.title, "The Tool");
        assert_eq!(tool.image.as_deref(), Some("/images/projects/tool/shot.png"));

        let other = payload
            .projects
            .iter()
            .find(|p| p.repo.as_deref() == Some("alice/other"))
            .expect("other project");
        assert_eq!(other.link, "https://github.com/alice/other");

        let entry = payload.metadata.get("alice/tool").expect("metadata entry");
        assert!(entry.has_local_page);
        assert_eq!(entry.slug, "tool");

        let page = payload
            .selected
            .first()
            .expect("selected entry");
        assert_eq!(page.link, "/projects/tool");

        assert!(root.join(&config.snapshots.github_projects).exists());
        assert!(!payload.generated_at.is_empty());
    }

    #[test]
    fn missing_publications_snapshot_uses_fallback() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();

        let config = parse_site_config("owner: alice\n").expect("valid config");
        write_projects(&root.join(&config.snapshots.projects), &[]).expect("write projects");

        let payload = compose_render_payload(&config, root).expect("compose should succeed");
        assert!(!payload.publications.is_empty());
    }

    #[test]
    fn missing_projects_snapshot_fails_composition() {
        let dir = tempdir().expect("tempdir");
        let config = parse_site_config("owner: alice\n").expect("valid config");
        assert!(compose_render_payload(&config, dir.path()).is_err());
    }
}
