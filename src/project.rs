// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! The canonical project model and its derivation from repository and
//! content records.

use serde::{Deserialize, Serialize};

use crate::{content::ContentRecord, github::RepoRecord, rank::rank_url};

/// Popularity statistics attached to a project card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    /// GitHub star count.
    pub stars:    u64,
    /// GitHub fork count.
    pub forks:    u64,
    /// Popularity rank on gitstar-ranking.com, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank:     Option<u32>,
    /// Page backing the rank figure, present whenever `rank` is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_url: Option<String>
}

/// A project card as rendered on the site and persisted in the projects
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Display title.
    pub title: String,
    /// Short description.
    pub desc:  String,
    /// Tag list shown on the card.
    #[serde(default)]
    pub tags:  Vec<String>,
    /// Destination the card links to.
    pub link:  String,
    /// Backing `owner/name` repository identifier, absent for content-only
    /// projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo:  Option<String>,
    /// Card image path or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Popularity statistics, absent for content-only projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProjectStats>
}

/// Derives a project card from an enriched repository record.
///
/// The description falls back to `"{name} - A {language} project"` when the
/// repository has none, and the card links to the homepage when one is
/// configured, otherwise to the repository page.
pub fn project_from_repo(repo: &RepoRecord) -> Project {
    let desc = repo
        .description
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map_or_else(|| fallback_description(repo), str::to_string);

    let link = repo
        .homepage
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(&repo.html_url)
        .to_string();

    let rank = repo.gitstar_rank;

    Project {
        title: repo.name.clone(),
        desc,
        tags: repo.languages.clone(),
        link,
        repo: Some(repo.full_name()),
        image: None,
        stats: Some(ProjectStats {
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            rank,
            rank_url: rank.map(|_| rank_url(&repo.owner.login, &repo.name))
        })
    }
}

fn fallback_description(repo: &RepoRecord) -> String {
    let language = repo.primary_language().unwrap_or("software");
    format!("{} - A {} project", repo.name, language)
}

/// Overlays locally authored content onto a repository-derived project.
///
/// Authored fields win over fetched metadata wherever both exist; fetched
/// values remain for anything the page does not set. Statistics always come
/// from the repository side.
pub fn apply_content_overlay(mut project: Project, content: &ContentRecord) -> Project {
    if let Some(title) = content.title.as_deref() {
        if !title.trim().is_empty() {
            project.title = title.trim().to_string();
        }
    }
    if let Some(excerpt) = content.excerpt.as_deref() {
        if !excerpt.trim().is_empty() {
            project.desc = excerpt.trim().to_string();
        }
    }
    if !content.tags.is_empty() {
        project.tags = content.tags.clone();
    }
    if content.cover.is_some() {
        project.image = content.cover.clone();
    }
    project
}

#[cfg(test)]
mod tests {
    use super::{apply_content_overlay, project_from_repo, Project};
    use crate::{content::ContentRecord, github::RepoRecord};

    fn repo(json: &str) -> RepoRecord {
        serde_json::from_str(json).expect("expected valid repository payload")
    }

    #[test]
    fn uses_repository_description_and_homepage() {
        let record = repo(
            r#"{
                "name": "maps",
                "owner": {"login": "octocat"},
                "description": "Street maps as art",
                "homepage": "https://maps.example.com",
                "html_url": "https://github.com/octocat/maps",
                "stargazers_count": 7,
                "forks_count": 2
            }"#
        );

        let project = project_from_repo(&record);
        assert_eq!(project.title, "maps");
        assert_eq!(project.desc, "Street maps as art");
        assert_eq!(project.link, "https://maps.example.com");
        assert_eq!(project.repo.as_deref(), Some("octocat/maps"));
        let stats = project.stats.expect("stats");
        assert_eq!(stats.stars, 7);
        assert_eq!(stats.forks, 2);
        assert!(stats.rank.is_none());
    }

    #[test]
    fn falls_back_to_synthesized_description() {
        let mut record = repo(
            r#"{"name": "viz", "owner": {"login": "octocat"}, "html_url": "https://github.com/octocat/viz"}"#
        );
        record.languages = vec!["Rust".to_string()];

        let project = project_from_repo(&record);
        assert_eq!(project.desc, "viz - A Rust project");
        assert_eq!(project.link, "https://github.com/octocat/viz");
    }

    #[test]
    fn blank_homepage_falls_back_to_repository_url() {
        let record = repo(
            r#"{"name": "viz", "owner": {"login": "octocat"}, "homepage": "  ", "html_url": "https://github.com/octocat/viz"}"#
        );
        assert_eq!(project_from_repo(&record).link, "https://github.com/octocat/viz");
    }

    #[test]
    fn rank_url_accompanies_rank() {
        let mut record = repo(
            r#"{"name": "maps", "owner": {"login": "octocat"}, "html_url": "https://github.com/octocat/maps"}"#
        );
        record.gitstar_rank = Some(1234);

        let stats = project_from_repo(&record).stats.expect("stats");
        assert_eq!(stats.rank, Some(1234));
        assert_eq!(
            stats.rank_url.as_deref(),
            Some("https://gitstar-ranking.com/octocat/maps")
        );
    }

    #[test]
    fn overlay_prefers_authored_fields() {
        let record = repo(
            r#"{"name": "maps", "owner": {"login": "octocat"}, "description": "fetched", "html_url": "https://github.com/octocat/maps", "stargazers_count": 7}"#
        );
        let content = ContentRecord {
            slug: "maps".to_string(),
            title: Some("Pen Plotter Maps".to_string()),
            excerpt: Some("authored".to_string()),
            tags: vec!["art".to_string()],
            cover: Some("/images/projects/maps/cover.png".to_string()),
            ..ContentRecord::default()
        };

        let project = apply_content_overlay(project_from_repo(&record), &content);
        assert_eq!(project.title, "Pen Plotter Maps");
        assert_eq!(project.desc, "authored");
        assert_eq!(project.tags, vec!["art"]);
        assert_eq!(project.image.as_deref(), Some("/images/projects/maps/cover.png"));
        assert_eq!(project.stats.expect("stats").stars, 7);
    }

    #[test]
    fn overlay_keeps_fetched_fields_when_content_is_silent() {
        let record = repo(
            r#"{"name": "maps", "owner": {"login": "octocat"}, "description": "fetched", "html_url": "https://github.com/octocat/maps"}"#
        );
        let content = ContentRecord {
            slug: "maps".to_string(),
            ..ContentRecord::default()
        };

        let project = apply_content_overlay(project_from_repo(&record), &content);
        assert_eq!(project.desc, "fetched");
        assert_eq!(project.title, "maps");
    }

    #[test]
    fn serializes_stats_in_camel_case() {
        let project = Project {
            title: "maps".to_string(),
            desc:  "d".to_string(),
            tags:  Vec::new(),
            link:  "https://example.com".to_string(),
            repo:  Some("octocat/maps".to_string()),
            image: None,
            stats: Some(super::ProjectStats {
                stars:    1,
                forks:    0,
                rank:     Some(9),
                rank_url: Some("https://gitstar-ranking.com/octocat/maps".to_string())
            })
        };

        let json = serde_json::to_string(&project).expect("serialize");
        assert!(json.contains("\"rankUrl\""));
        assert!(!json.contains("\"image\""));
    }
}
