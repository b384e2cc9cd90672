// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Two-tier repository exclusion filtering.
//!
//! Repositories are dropped either by identity (the hard-coded ignore list
//! plus the user-configurable deny-list) or by state flags (fork, archived,
//! disabled, private). The hard-coded list survives configuration resets by
//! design tools or template updates, which is why it lives in code rather
//! than in the YAML document.

use tracing::debug;

use crate::{config::GithubConfig, github::RepoRecord};

/// Repositories that never surface on the site regardless of configuration.
///
/// Entries are matched case-insensitively against both the bare repository
/// name and the `owner/name` identifier.
pub const IGNORE_REPOS: &[&str] = &[
    "Ethics-AI-Data",
    "Guerra-Mundial-POA-2020-Simulator",
    "Matematica-ONGEP",
    "rossetti-audio",
    "Gender-Bias",
    "Resume",
    "marceloprates",
    "marceloprates.github.io",
    "Hexmosaic-Wallpapers-Processing"
];

/// Returns `true` when the repository must not appear in the project list.
///
/// A repository is excluded when any of the following holds:
/// - its name or `owner/name` identifier appears in [`IGNORE_REPOS`];
/// - its `owner/name` identifier appears in the configured deny-list;
/// - it is a fork, archived, disabled, or private.
pub fn should_exclude(repo: &RepoRecord, config: &GithubConfig) -> bool {
    if repo.fork || repo.archived || repo.disabled || repo.private {
        return true;
    }

    let full_name = repo.full_name();
    if in_ignore_list(&repo.name) || in_ignore_list(&full_name) {
        return true;
    }

    // The configured tier matches owner/name identifiers only; bare-name
    // matching is reserved for the hard-coded list.
    config
        .exclude_from_pages
        .iter()
        .any(|entry| entry.eq_ignore_ascii_case(&full_name))
}

/// Applies [`should_exclude`] to a repository list, logging each drop.
pub fn filter_repositories(repos: Vec<RepoRecord>, config: &GithubConfig) -> Vec<RepoRecord> {
    repos
        .into_iter()
        .filter(|repo| {
            let excluded = should_exclude(repo, config);
            if excluded {
                debug!("excluding repository {}", repo.full_name());
            }
            !excluded
        })
        .collect()
}

fn in_ignore_list(candidate: &str) -> bool {
    IGNORE_REPOS
        .iter()
        .any(|entry| entry.eq_ignore_ascii_case(candidate))
}
