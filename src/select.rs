// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Curated project selection with multi-level identifier fallback.
//!
//! The configuration names selected projects by loosely specified
//! identifiers that have accumulated over time: `owner/name` repository
//! identifiers, content slugs, and occasionally bare titles. Resolution
//! tries progressively weaker matches so old configurations keep working,
//! and silently drops identifiers that no longer match anything beyond a
//! warning, since a stale entry must not break the build.

use tracing::warn;

use crate::{content::ContentRecord, project::Project};

/// Resolves the curated identifier list against the project and content
/// collections.
///
/// Output order follows the identifier list. Identifiers that resolve to the
/// same project are deduplicated, keeping the first occurrence.
pub fn resolve_selected(
    ids: &[String],
    projects: &[Project],
    content: &[ContentRecord]
) -> Vec<Project> {
    let mut selected: Vec<Project> = Vec::new();

    for id in ids {
        match resolve_one(id, projects, content) {
            Some(project) => {
                let duplicate = selected
                    .iter()
                    .any(|existing| existing.link == project.link && existing.title == project.title);
                if !duplicate {
                    selected.push(project);
                }
            }
            None => {
                warn!("selected identifier {id:?} matched no project or content page");
            }
        }
    }

    selected
}

/// Resolves a single identifier through the fallback chain.
///
/// For identifiers containing `/` the chain is: exact `owner/name`
/// repository match, substring match against project links, trailing path
/// segment as a content slug, the whole identifier as a content slug, and
/// finally a case-insensitive project title match. Bare identifiers skip
/// straight to the content slug and title levels.
fn resolve_one(id: &str, projects: &[Project], content: &[ContentRecord]) -> Option<Project> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }

    if id.contains('/') {
        if let Some(project) = projects
            .iter()
            .find(|project| project.repo.as_deref() == Some(id))
        {
            return Some(project.clone());
        }

        if let Some(project) = projects.iter().find(|project| project.link.contains(id)) {
            return Some(project.clone());
        }

        if let Some(segment) = id.trim_end_matches('/').rsplit('/').next() {
            if let Some(record) = find_content(segment, content) {
                return Some(project_from_content(record));
            }
        }
    }

    if let Some(record) = find_content(id, content) {
        return Some(project_from_content(record));
    }

    projects
        .iter()
        .find(|project| project.title.eq_ignore_ascii_case(id))
        .cloned()
}

fn find_content<'a>(slug: &str, content: &'a [ContentRecord]) -> Option<&'a ContentRecord> {
    content.iter().find(|record| record.slug == slug)
}

/// Synthesizes a project card from a content-only page.
fn project_from_content(record: &ContentRecord) -> Project {
    Project {
        title: record
            .title
            .clone()
            .unwrap_or_else(|| record.slug.clone()),
        desc:  record.excerpt.clone().unwrap_or_default(),
        tags:  record.tags.clone(),
        link:  format!("/projects/{}", record.slug),
        repo:  record.repo.clone(),
        image: record.cover.clone(),
        stats: None
    }
}
