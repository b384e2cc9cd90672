// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Semantic Scholar publication fetching, filtering, and normalization.
//!
//! Publications come from the Semantic Scholar Graph API, filtered down to
//! peer-reviewed, sufficiently cited papers verifiably authored by the site
//! owner. An optional profile-page scrape supplies secondary "Cited by N"
//! counts; the effective citation count for display is the larger of the two
//! sources, since both lag reality in different ways.

use std::{fs, path::Path, sync::LazyLock};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{config::ScholarConfig, error::Error, fetch::{FetchFailure, HttpFetcher}};

/// Base URL of the Semantic Scholar Graph API.
pub const API_ROOT: &str = "https://api.semanticscholar.org/graph/v1";

/// Paper fields requested from the API.
const PAPER_FIELDS: &str =
    "title,venue,year,url,openAccessPdf,citationCount,isOpenAccess,authors";

/// Page size for the author papers listing.
const PAGE_LIMIT: usize = 100;

static CITED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Cited by\s+([\d,]+)").expect("valid cited-by pattern"));

/// Characters of profile-page text searched after a title match for a
/// "Cited by N" marker.
const CITED_BY_WINDOW: usize = 400;

/// A normalized publication as persisted in the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    /// Paper title.
    pub title: String,
    /// Publication venue.
    pub venue: String,
    /// Publication year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Semantic Scholar paper page.
    pub url: String,
    /// Open-access PDF location, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    /// Citation count reported by the API.
    pub citations: u64,
    /// Citation count scraped from the scholar profile page, when found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_scholar_citations: Option<u64>,
    /// Whether the paper is open access.
    #[serde(default)]
    pub is_open_access: bool,
    /// Author names in listed order.
    #[serde(default)]
    pub authors: Vec<String>
}

impl Publication {
    /// Citation count used for ordering and display.
    ///
    /// Both sources undercount at times; the larger figure is the better
    /// estimate, and the primary count is the floor when no secondary count
    /// was scraped.
    pub fn effective_citations(&self) -> u64 {
        self.google_scholar_citations
            .map_or(self.citations, |scraped| scraped.max(self.citations))
    }
}

/// Snapshot document written by the publications command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarSnapshot {
    /// RFC 3339 timestamp of the fetch.
    pub fetched_at:   String,
    /// Data source identifier.
    pub source:       String,
    /// Semantic Scholar author identifier the fetch ran against.
    pub author_id:    String,
    /// Normalized publications, ordered by year descending.
    pub publications: Vec<Publication>
}

impl ScholarSnapshot {
    /// Builds a snapshot stamped with the current time.
    pub fn new(author_id: &str, publications: Vec<Publication>) -> Self {
        Self {
            fetched_at: Utc::now().to_rfc3339(),
            source: "semantic-scholar".to_string(),
            author_id: author_id.to_string(),
            publications
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiAuthor {
    #[serde(default)]
    name: Option<String>
}

#[derive(Debug, Deserialize)]
struct ApiPaperAuthor {
    #[serde(default)]
    name: Option<String>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPaper {
    #[serde(default)]
    paper_id:        Option<String>,
    #[serde(default)]
    title:           Option<String>,
    #[serde(default)]
    venue:           Option<String>,
    #[serde(default)]
    year:            Option<i32>,
    #[serde(default)]
    url:             Option<String>,
    #[serde(default)]
    open_access_pdf: Option<ApiOpenAccessPdf>,
    #[serde(default)]
    citation_count:  Option<u64>,
    #[serde(default)]
    is_open_access:  Option<bool>,
    #[serde(default)]
    authors:         Vec<ApiPaperAuthor>
}

#[derive(Debug, Deserialize)]
struct ApiOpenAccessPdf {
    #[serde(default)]
    url: Option<String>
}

#[derive(Debug, Deserialize)]
struct ApiPapersPage {
    #[serde(default)]
    data: Vec<ApiPaper>,
    #[serde(default)]
    next: Option<u64>
}

/// Returns the trailing path segment of a paper URL, which Semantic Scholar
/// uses as the paper identifier.
fn paper_id_from_url(url: &str) -> Option<&str> {
    url.trim_end_matches('/').rsplit('/').next()
}

/// Decides whether a paper survives the publication filter.
///
/// A paper is retained only when all of the following hold:
/// - it is not in the excluded identifier list;
/// - its venue is non-empty and not a bare arXiv listing;
/// - its citation count meets the configured minimum;
/// - one of its authors exactly matches an accepted author name.
pub fn retain_paper(paper: &ApiPublicationView<'_>, config: &ScholarConfig, accepted: &[String]) -> bool {
    if let Some(id) = paper.paper_id {
        if config.excluded_papers.iter().any(|excluded| excluded == id) {
            return false;
        }
    }
    if let Some(id) = paper.url.and_then(paper_id_from_url) {
        if config.excluded_papers.iter().any(|excluded| excluded == id) {
            return false;
        }
    }

    let venue = paper.venue.unwrap_or("").trim();
    if venue.is_empty() || venue.eq_ignore_ascii_case("arxiv.org") {
        return false;
    }

    if paper.citations < config.min_citations {
        return false;
    }

    paper
        .authors
        .iter()
        .any(|author| accepted.iter().any(|name| name == author))
}

/// Borrowed view over the fields the filter inspects, decoupling the filter
/// from the API decode types so it stays a pure testable function.
#[derive(Debug)]
pub struct ApiPublicationView<'a> {
    /// Semantic Scholar paper identifier.
    pub paper_id:  Option<&'a str>,
    /// Paper page URL.
    pub url:       Option<&'a str>,
    /// Publication venue.
    pub venue:     Option<&'a str>,
    /// Citation count reported by the API.
    pub citations: u64,
    /// Author names.
    pub authors:   Vec<&'a str>
}

impl ApiPaper {
    fn view(&self) -> ApiPublicationView<'_> {
        ApiPublicationView {
            paper_id:  self.paper_id.as_deref(),
            url:       self.url.as_deref(),
            venue:     self.venue.as_deref(),
            citations: self.citation_count.unwrap_or(0),
            authors:   self
                .authors
                .iter()
                .filter_map(|author| author.name.as_deref())
                .collect()
        }
    }

    fn into_publication(self) -> Publication {
        Publication {
            title: self.title.unwrap_or_default(),
            venue: self.venue.unwrap_or_default(),
            year: self.year,
            url: self.url.unwrap_or_default(),
            pdf_url: self.open_access_pdf.and_then(|pdf| pdf.url),
            citations: self.citation_count.unwrap_or(0),
            google_scholar_citations: None,
            is_open_access: self.is_open_access.unwrap_or(false),
            authors: self
                .authors
                .into_iter()
                .filter_map(|author| author.name)
                .collect()
        }
    }
}

/// Fetches, filters, and normalizes the author's publications.
///
/// The accepted author names are the configured spellings plus the name the
/// API reports for the author identifier. Results are ordered by year
/// descending, unknown years last.
///
/// # Errors
///
/// Returns [`FetchFailure`] when the author lookup or any papers page fails
/// after retries.
pub async fn fetch_author_publications(
    fetcher: &HttpFetcher,
    config: &ScholarConfig
) -> Result<Vec<Publication>, FetchFailure> {
    let author_url = format!("{API_ROOT}/author/{}?fields=name", config.author_id);
    let author: ApiAuthor = fetcher.get_json(&author_url, &[]).await?;

    let mut accepted = config.accepted_names.clone();
    if let Some(name) = author.name {
        if !accepted.contains(&name) {
            accepted.push(name);
        }
    }

    let mut papers: Vec<ApiPaper> = Vec::new();
    let mut offset = 0u64;
    loop {
        let url = format!(
            "{API_ROOT}/author/{}/papers?fields={PAPER_FIELDS}&limit={PAGE_LIMIT}&offset={offset}",
            config.author_id
        );
        let page: ApiPapersPage = fetcher.get_json(&url, &[]).await?;
        debug!("fetched {} papers at offset {offset}", page.data.len());
        papers.extend(page.data);

        match page.next {
            Some(next) => offset = next,
            None => break
        }
    }

    let total = papers.len();
    let mut publications: Vec<Publication> = papers
        .into_iter()
        .filter(|paper| retain_paper(&paper.view(), config, &accepted))
        .map(ApiPaper::into_publication)
        .collect();

    debug!("retained {} of {total} papers", publications.len());
    sort_by_year_desc(&mut publications);
    Ok(publications)
}

/// Orders publications by year descending, unknown years last, breaking ties
/// by citation count descending.
pub fn sort_by_year_desc(publications: &mut [Publication]) {
    publications.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| b.effective_citations().cmp(&a.effective_citations()))
    });
}

/// Extracts the numeric count from a "Cited by N" marker.
pub fn extract_cited_by(text: &str) -> Option<u64> {
    let captures = CITED_BY.captures(text)?;
    let digits: String = captures
        .get(1)?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Finds the "Cited by N" count for a title within profile-page text.
///
/// The search locates the title and inspects a bounded window after it, so
/// counts belonging to neighboring entries are not picked up.
pub fn cited_by_for_title(page: &str, title: &str) -> Option<u64> {
    let position = page.find(title)?;
    let start = position + title.len();
    let end = (start + CITED_BY_WINDOW).min(page.len());
    let window = page.get(start..end)?;
    extract_cited_by(window)
}

/// Scrapes secondary citation counts from the configured profile page and
/// attaches them to matching publications.
///
/// Scraping failures are logged and leave the counts unset; the primary API
/// counts remain authoritative in that case.
pub async fn scrape_citation_counts(
    fetcher: &HttpFetcher,
    profile_url: &str,
    publications: &mut [Publication]
) {
    let page = match fetcher.get_text(profile_url, &[]).await {
        Ok(page) => page,
        Err(failure) => {
            warn!("failed to fetch scholar profile page: {failure}");
            return;
        }
    };

    for publication in publications.iter_mut() {
        publication.google_scholar_citations = cited_by_for_title(&page, &publication.title);
    }
}

/// Loads publications from the snapshot, ordered by effective citations
/// descending and truncated to `max`.
///
/// A missing or unreadable snapshot yields an empty list; the page composer
/// substitutes its static fallback in that case.
pub fn load_publications(path: &Path, max: usize) -> Vec<Publication> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(read_error) => {
            debug!("no publications snapshot at {path:?}: {read_error}");
            return Vec::new();
        }
    };

    let snapshot: ScholarSnapshot = match serde_json::from_str(&contents) {
        Ok(snapshot) => snapshot,
        Err(decode_error) => {
            warn!("invalid publications snapshot at {path:?}: {decode_error}");
            return Vec::new();
        }
    };

    let mut publications = snapshot.publications;
    publications.sort_by(|a, b| b.effective_citations().cmp(&a.effective_citations()));
    publications.truncate(max);
    publications
}

/// Static publication list used when no snapshot exists.
///
/// Keeps the publications section populated on fresh checkouts and in CI
/// environments that have never run the publications command.
pub fn fallback_publications() -> Vec<Publication> {
    vec![
        Publication {
            title: "Learning to Solve NP-Complete Problems: A Graph Neural Network for \
                    Decision TSP"
                .to_string(),
            venue: "AAAI Conference on Artificial Intelligence".to_string(),
            year: Some(2019),
            url: "https://www.semanticscholar.org/paper/a3e1a50e549317587e04f4ec7d0eff4d2b72560e"
                .to_string(),
            pdf_url: None,
            citations: 180,
            google_scholar_citations: None,
            is_open_access: true,
            authors: vec![
                "Marcelo Prates".to_string(),
                "Pedro Avelar".to_string(),
                "Henrique Lemos".to_string(),
                "Luis Lamb".to_string(),
                "Moshe Vardi".to_string()
            ]
        },
        Publication {
            title: "Assessing Gender Bias in Machine Translation: a Case Study with Google \
                    Translate"
                .to_string(),
            venue: "Neural Computing and Applications".to_string(),
            year: Some(2020),
            url: "https://www.semanticscholar.org/paper/8d876e08a5d90f47293a1206f4a4de11415a3e6b"
                .to_string(),
            pdf_url: None,
            citations: 350,
            google_scholar_citations: None,
            is_open_access: false,
            authors: vec![
                "Marcelo Prates".to_string(),
                "Pedro Avelar".to_string(),
                "Luis Lamb".to_string()
            ]
        }
    ]
}

/// Writes the snapshot document as pretty-printed JSON.
///
/// # Errors
///
/// Returns an [`Error`] when serialization or the write fails.
pub fn write_snapshot(path: &Path, snapshot: &ScholarSnapshot) -> Result<(), Error> {
    crate::snapshot::write_json(path, snapshot)
}
