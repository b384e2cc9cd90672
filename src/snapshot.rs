// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! JSON snapshot persistence.
//!
//! Snapshots decouple fetching from rendering: the projects and publications
//! commands write them, composition reads them, and a site build never needs
//! network access. Writers create parent directories on demand and emit
//! pretty-printed JSON so snapshot diffs stay reviewable in version control.

use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::{
    error::{self, Error},
    project::Project
};

/// Serializes a value as pretty-printed JSON at the given path, creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns an [`Error`] when serialization fails or the file cannot be
/// written.
pub fn write_json<T>(path: &Path, value: &T) -> Result<(), Error>
where
    T: Serialize
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| error::snapshot_io_error(path, source))?;
        }
    }

    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    fs::write(path, contents).map_err(|source| error::snapshot_io_error(path, source))?;
    info!("wrote snapshot {path:?}");
    Ok(())
}

/// Reads and decodes a JSON snapshot.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read or decoded.
pub fn read_json<T>(path: &Path) -> Result<T, Error>
where
    T: DeserializeOwned
{
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Writes the authoritative projects snapshot.
///
/// # Errors
///
/// Returns an [`Error`] when serialization or the write fails.
pub fn write_projects(path: &Path, projects: &[Project]) -> Result<(), Error> {
    write_json(path, &projects)
}

/// Reads the authoritative projects snapshot.
///
/// # Errors
///
/// Returns an [`Error`] when the snapshot is missing or malformed. Unlike
/// the publications snapshot there is no fallback: composing without project
/// data would render an empty site, which is never intended.
pub fn read_projects(path: &Path) -> Result<Vec<Project>, Error> {
    read_json(path)
}

/// A flattened entry in the debug artifact mirroring the raw repository
/// figures behind each project card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshotEntry {
    /// Backing repository identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo:         Option<String>,
    /// Star count, absent for content-only projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars:        Option<u64>,
    /// Fork count, absent for content-only projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forks:        Option<u64>,
    /// Popularity rank, when one was scraped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitstar_rank: Option<u32>,
    /// Project title.
    pub name:         String,
    /// Project description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description:  Option<String>,
    /// Destination the card links to.
    pub link:         String,
    /// Tag list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics:       Option<Vec<String>>
}

impl From<&Project> for ProjectSnapshotEntry {
    fn from(project: &Project) -> Self {
        let stats = project.stats.as_ref();
        Self {
            repo:         project.repo.clone(),
            stars:        stats.map(|s| s.stars),
            forks:        stats.map(|s| s.forks),
            gitstar_rank: stats.and_then(|s| s.rank),
            name:         project.title.clone(),
            description:  if project.desc.is_empty() {
                None
            } else {
                Some(project.desc.clone())
            },
            link:         project.link.clone(),
            topics:       if project.tags.is_empty() {
                None
            } else {
                Some(project.tags.clone())
            }
        }
    }
}

/// Writes the debug artifact listing the raw figures behind each card.
///
/// The artifact is overwritten on every compose pass and consumed by
/// nothing; it exists for manual inspection of what the pipeline fetched.
///
/// # Errors
///
/// Returns an [`Error`] when serialization or the write fails.
pub fn write_github_projects_debug(path: &Path, projects: &[Project]) -> Result<(), Error> {
    let entries: Vec<ProjectSnapshotEntry> =
        projects.iter().map(ProjectSnapshotEntry::from).collect();
    write_json(path, &entries)
}
