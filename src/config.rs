// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Site configuration document consumed by the pipeline commands.
//!
//! The types in this module mirror the structure of the YAML document
//! describing the portfolio owner, the repository deny-list, the citation
//! source, and the curated project selection. Optional values stay flexible
//! to allow user-supplied overrides, with helper methods deriving defaults
//! that satisfy downstream invariants.

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Environment variable names accepted for the GitHub bearer token.
///
/// GitHub Actions disallows creating secrets that start with `GITHUB_`, so
/// alternates are accepted alongside the canonical name.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN", "GITHUB_PAT", "PERSONAL_TOKEN"];

const DEFAULT_CONTENT_DIR: &str = "content/projects";
const DEFAULT_PROJECTS_SNAPSHOT: &str = "src/data/projects.json";
const DEFAULT_DEBUG_SNAPSHOT: &str = "src/data/github-projects.json";
const DEFAULT_SCHOLAR_SNAPSHOT: &str = "data/publications.scholar.json";
const DEFAULT_MIN_CITATIONS: u64 = 10;
const DEFAULT_MAX_PUBLICATIONS: usize = 9;

/// Root configuration document for the portfolio pipeline.
///
/// # Examples
///
/// ```
/// use folio::SiteConfig;
///
/// let yaml = r#"
/// owner: octocat
/// scholar:
///   author_id: "144677268"
/// "#;
/// let config: SiteConfig = serde_yaml::from_str(yaml).expect("valid configuration");
/// assert_eq!(config.owner, "octocat");
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// GitHub account whose public repositories seed the project list.
    #[serde(alias = "user", alias = "username")]
    pub owner: String,

    /// Directory holding locally authored project markdown files.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Repository handling overrides.
    #[serde(default)]
    pub github: GithubConfig,

    /// Citation source configuration.
    #[serde(default)]
    pub scholar: ScholarConfig,

    /// Curated ordered list of selected project identifiers. Entries are
    /// either `owner/name` repository identifiers or local content slugs.
    #[serde(default)]
    pub selected: Vec<String>,

    /// Snapshot output locations.
    #[serde(default)]
    pub snapshots: SnapshotPaths
}

/// Repository handling overrides mirroring the original `config/github.json`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GithubConfig {
    /// Repositories excluded from the generated project list, as
    /// `owner/name` identifiers. This list lives in user-editable
    /// configuration and may be accidentally reset; the hard-coded ignore
    /// list in the exclusion filter acts as the safety net.
    #[serde(default, alias = "excludeFromPages")]
    pub exclude_from_pages: Vec<String>
}

/// Citation source configuration for the publications command.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScholarConfig {
    /// Semantic Scholar author identifier.
    #[serde(default, alias = "authorId")]
    pub author_id: String,

    /// Accepted author-name spellings for exact-match identity filtering.
    /// The name reported by the API is always accepted in addition.
    #[serde(default, alias = "acceptedNames")]
    pub accepted_names: Vec<String>,

    /// Paper identifiers excluded as known incorrect attributions.
    #[serde(default, alias = "excludedPapers")]
    pub excluded_papers: Vec<String>,

    /// Minimum citation count for a paper to be retained.
    #[serde(default = "default_min_citations", alias = "minCitations")]
    pub min_citations: u64,

    /// Maximum number of publications surfaced on the page.
    #[serde(default = "default_max_publications", alias = "maxPublications")]
    pub max_publications: usize,

    /// Optional profile page scraped for secondary "Cited by N" counts.
    #[serde(default, alias = "profileUrl")]
    pub profile_url: Option<String>
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            author_id:        String::new(),
            accepted_names:   Vec::new(),
            excluded_papers:  Vec::new(),
            min_citations:    DEFAULT_MIN_CITATIONS,
            max_publications: DEFAULT_MAX_PUBLICATIONS,
            profile_url:      None
        }
    }
}

/// Locations of the persisted JSON snapshots.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SnapshotPaths {
    /// Authoritative generated project list, consumed by composition.
    #[serde(default = "default_projects_snapshot")]
    pub projects: String,

    /// Debug/inspection artifact overwritten on every compose pass.
    #[serde(default = "default_debug_snapshot", alias = "githubProjects")]
    pub github_projects: String,

    /// Publications snapshot produced by the publications command.
    #[serde(default = "default_scholar_snapshot")]
    pub publications: String
}

impl Default for SnapshotPaths {
    fn default() -> Self {
        Self {
            projects:        DEFAULT_PROJECTS_SNAPSHOT.to_owned(),
            github_projects: DEFAULT_DEBUG_SNAPSHOT.to_owned(),
            publications:    DEFAULT_SCHOLAR_SNAPSHOT.to_owned()
        }
    }
}

fn default_content_dir() -> String {
    DEFAULT_CONTENT_DIR.to_owned()
}

fn default_projects_snapshot() -> String {
    DEFAULT_PROJECTS_SNAPSHOT.to_owned()
}

fn default_debug_snapshot() -> String {
    DEFAULT_DEBUG_SNAPSHOT.to_owned()
}

fn default_scholar_snapshot() -> String {
    DEFAULT_SCHOLAR_SNAPSHOT.to_owned()
}

fn default_min_citations() -> u64 {
    DEFAULT_MIN_CITATIONS
}

fn default_max_publications() -> usize {
    DEFAULT_MAX_PUBLICATIONS
}

/// Loads the site configuration from the provided YAML file path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, the YAML cannot be
/// deserialized, or the configuration violates invariants.
pub fn load_site_config(path: &Path) -> Result<SiteConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_site_config(&contents)
}

/// Parses the site configuration from a YAML document string.
///
/// This function is suitable for unit tests and higher-level callers that
/// already obtained the configuration contents.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML cannot be decoded
/// and [`Error::Validation`](Error::Validation) when required entries are
/// missing.
pub fn parse_site_config(contents: &str) -> Result<SiteConfig, Error> {
    let config: SiteConfig = serde_yaml::from_str(contents)?;
    if config.owner.trim().is_empty() {
        return Err(Error::validation("owner cannot be empty"));
    }
    if config.owner.chars().any(char::is_whitespace) {
        return Err(Error::validation("owner cannot contain whitespace"));
    }
    Ok(config)
}

/// Resolves the GitHub bearer token from the accepted environment variables.
///
/// Returns the first non-empty value in [`TOKEN_ENV_VARS`] order.
pub fn github_token() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Resolves the GitHub bearer token or fails with a remediation message.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) naming the accepted
/// environment variables when none is set. Proceeding without a token would
/// hit unauthenticated rate limits almost immediately, so this is a fatal
/// configuration error.
pub fn require_github_token() -> Result<String, Error> {
    github_token().ok_or_else(|| {
        Error::validation(format!(
            "no GitHub token found in environment; set one of {} \
             (public_repo scope is sufficient)",
            TOKEN_ENV_VARS.join(", ")
        ))
    })
}
