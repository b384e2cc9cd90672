// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! GitHub REST API access for repository enumeration and language breakdowns.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::fetch::{FetchFailure, HttpFetcher};

/// Base URL of the GitHub REST API.
pub const API_ROOT: &str = "https://api.github.com";

/// Page size used when enumerating repositories. The maximum GitHub allows,
/// so accounts with hundreds of repositories stay within a handful of calls.
const PER_PAGE: usize = 100;

/// Number of language entries retained per repository.
const LANGUAGE_LIMIT: usize = 5;

/// Repository metadata as decoded from the GitHub `/users/{user}/repos`
/// listing. Every field beyond the identifiers carries a `serde` default so a
/// partial API payload degrades to empty values instead of a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoRecord {
    /// Repository name without the owner prefix.
    pub name:             String,
    /// Owning account.
    #[serde(default)]
    pub owner:            RepoOwner,
    /// Free-form description, absent for undescribed repositories.
    #[serde(default)]
    pub description:      Option<String>,
    /// Project homepage, when one is configured.
    #[serde(default)]
    pub homepage:         Option<String>,
    /// Canonical repository URL on github.com.
    #[serde(default)]
    pub html_url:         String,
    /// Whether the repository is a fork of another repository.
    #[serde(default)]
    pub fork:             bool,
    /// Whether the repository has been archived.
    #[serde(default)]
    pub archived:         bool,
    /// Whether the repository has been disabled by GitHub.
    #[serde(default)]
    pub disabled:         bool,
    /// Whether the repository is private.
    #[serde(default)]
    pub private:          bool,
    /// Star count at fetch time.
    #[serde(default)]
    pub stargazers_count: u64,
    /// Fork count at fetch time.
    #[serde(default)]
    pub forks_count:      u64,
    /// Repository topics.
    #[serde(default)]
    pub topics:           Vec<String>,
    /// API endpoint listing the repository language byte counts.
    #[serde(default)]
    pub languages_url:    String,
    /// Language names ordered by prevalence, filled during enrichment.
    #[serde(default)]
    pub languages:        Vec<String>,
    /// Popularity rank scraped from gitstar-ranking.com, when available.
    #[serde(default)]
    pub gitstar_rank:     Option<u32>
}

/// Owning account of a repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoOwner {
    /// Account login.
    #[serde(default)]
    pub login: String
}

impl RepoRecord {
    /// Returns the `owner/name` identifier used throughout the pipeline.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }

    /// Returns the most prominent language, when the breakdown is known.
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }
}

/// Builds the request headers for a GitHub API call.
///
/// The token is optional; unauthenticated calls work against the public API
/// but exhaust the anonymous quota quickly.
pub fn api_headers(token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers = vec![("Accept", "application/vnd.github.v3+json".to_string())];
    if let Some(token) = token {
        headers.push(("Authorization", format!("token {token}")));
    }
    headers
}

/// Enumerates all public repositories owned by `username`.
///
/// Pagination walks pages of [`PER_PAGE`] entries until the API returns an
/// empty page, so the complete repository list is returned regardless of
/// account size.
///
/// # Errors
///
/// Returns [`FetchFailure`] when any page request fails after retries.
pub async fn list_public_repos(
    fetcher: &HttpFetcher,
    username: &str,
    token: Option<&str>
) -> Result<Vec<RepoRecord>, FetchFailure> {
    let headers = api_headers(token);
    let mut repos = Vec::new();
    let mut page = 1usize;

    loop {
        let url = format!(
            "{API_ROOT}/users/{username}/repos?per_page={PER_PAGE}&page={page}&type=public&sort=updated"
        );
        let batch: Vec<RepoRecord> = fetcher.get_json(&url, &headers).await?;

        debug!("fetched page {} with {} repositories", page, batch.len());
        let received = batch.len();
        repos.extend(batch);

        if received == 0 {
            break;
        }
        page += 1;
    }

    Ok(repos)
}

/// Fetches the language breakdown for a repository and returns the top
/// language names ordered by byte count, capped at [`LANGUAGE_LIMIT`].
///
/// # Errors
///
/// Returns [`FetchFailure`] when the request fails after retries.
pub async fn fetch_languages(
    fetcher: &HttpFetcher,
    languages_url: &str,
    token: Option<&str>
) -> Result<Vec<String>, FetchFailure> {
    let headers = api_headers(token);
    let breakdown: BTreeMap<String, u64> = fetcher.get_json(languages_url, &headers).await?;
    Ok(top_languages(&breakdown))
}

/// Orders a language byte-count breakdown by prevalence and keeps the top
/// [`LANGUAGE_LIMIT`] names. Ties break alphabetically for determinism.
pub fn top_languages(breakdown: &BTreeMap<String, u64>) -> Vec<String> {
    let mut entries: Vec<(&String, &u64)> = breakdown.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(LANGUAGE_LIMIT)
        .map(|(name, _)| name.clone())
        .collect()
}
