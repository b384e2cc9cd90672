// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Popularity rank scraping from gitstar-ranking.com.
//!
//! The ranking site has no API, so the rank is extracted from the repository
//! page markup. Scraping is inherently brittle; every failure mode degrades
//! to "no rank" rather than failing the pipeline.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::fetch::HttpFetcher;

/// Base URL of the ranking site.
pub const RANKING_ROOT: &str = "https://gitstar-ranking.com";

static RANK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="rank"[^>]*>\s*#?\s*([\d,]+)"#).expect("valid rank pattern")
});

/// Builds the ranking page URL for a repository.
pub fn rank_url(owner: &str, name: &str) -> String {
    format!("{RANKING_ROOT}/{owner}/{name}")
}

/// Extracts the numeric rank from ranking page markup.
///
/// Returns `None` when the markup carries no recognizable rank element or the
/// number does not fit `u32`.
pub fn extract_rank(html: &str) -> Option<u32> {
    let captures = RANK_PATTERN.captures(html)?;
    let digits: String = captures
        .get(1)?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Fetches the popularity rank for a repository.
///
/// Any failure, whether network, HTTP, or markup drift, is logged at `warn`
/// and surfaces as `None` so one broken scrape never blocks the build.
pub async fn fetch_rank(fetcher: &HttpFetcher, owner: &str, name: &str) -> Option<u32> {
    let url = rank_url(owner, name);
    match fetcher.get_text(&url, &[]).await {
        Ok(html) => {
            let rank = extract_rank(&html);
            if rank.is_none() {
                warn!("no rank found in page for {owner}/{name}");
            }
            rank
        }
        Err(failure) => {
            warn!("failed to fetch rank for {owner}/{name}: {failure}");
            None
        }
    }
}
