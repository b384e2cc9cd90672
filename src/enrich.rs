// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Concurrent per-repository enrichment.
//!
//! Each surviving repository gets its language breakdown and popularity rank
//! fetched over the network. Fan-out is bounded by a semaphore so the
//! pipeline stays well under API abuse thresholds, and per-repository
//! failures degrade to missing fields instead of failing the whole batch.

use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, warn};

use crate::{
    fetch::{FetchFailure, HttpFetcher},
    github::{fetch_languages, RepoRecord},
    rank::fetch_rank
};

/// Upper bound on simultaneous in-flight enrichment requests.
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// Enriches each repository with its language list and popularity rank.
///
/// Input order is preserved in the returned vector. A failed language fetch
/// leaves the list empty and a failed rank scrape leaves the rank unset; both
/// are logged and the repository is still returned.
pub async fn enrich_repositories(
    fetcher: &HttpFetcher,
    repos: Vec<RepoRecord>,
    token: Option<&str>
) -> Vec<RepoRecord> {
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES));
    let token: Option<Arc<str>> = token.map(Arc::from);
    let mut tasks: JoinSet<(usize, RepoRecord)> = JoinSet::new();

    for (index, repo) in repos.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fetcher = fetcher.clone();
        let token = token.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let enriched = enrich_one(&fetcher, repo, token.as_deref()).await;
            (index, enriched)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(indexed) => results.push(indexed),
            Err(join_error) => {
                warn!("enrichment task failed to join: {join_error}");
            }
        }
    }

    restore_input_order(results)
}

/// Reassembles indexed task results into the original input order.
///
/// Tasks complete in arbitrary order; the index carried through each task
/// pins every record back to its slot. Gaps left by joins that failed are
/// simply dropped.
fn restore_input_order(results: Vec<(usize, RepoRecord)>) -> Vec<RepoRecord> {
    let mut slots: Vec<Option<RepoRecord>> = Vec::new();
    for (index, repo) in results {
        if slots.len() <= index {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(repo);
    }
    slots.into_iter().flatten().collect()
}

/// Applies fetched enrichment results to a repository record.
///
/// A failed language fetch is logged and leaves the list empty; the rank is
/// stored as-is since the scrape already degrades to `None` internally.
fn apply_enrichment(
    mut repo: RepoRecord,
    languages: Result<Vec<String>, FetchFailure>,
    rank: Option<u32>
) -> RepoRecord {
    match languages {
        Ok(languages) => repo.languages = languages,
        Err(failure) => {
            warn!("failed to fetch languages for {}: {failure}", repo.full_name());
        }
    }
    repo.gitstar_rank = rank;
    repo
}

async fn enrich_one(
    fetcher: &HttpFetcher,
    repo: RepoRecord,
    token: Option<&str>
) -> RepoRecord {
    let languages = if repo.languages_url.is_empty() {
        debug!("no languages endpoint for {}", repo.full_name());
        Ok(Vec::new())
    } else {
        fetch_languages(fetcher, &repo.languages_url, token).await
    };

    let rank = fetch_rank(fetcher, &repo.owner.login, &repo.name).await;
    apply_enrichment(repo, languages, rank)
}

#[cfg(test)]
mod tests {
    use super::{apply_enrichment, restore_input_order, MAX_CONCURRENT_FETCHES};
    use crate::{fetch::FetchFailure, github::RepoRecord};

    fn repo(name: &str) -> RepoRecord {
        serde_json::from_str(&format!(
            r#"{{"name": "{name}", "owner": {{"login": "octocat"}}}}"#
        ))
        .expect("expected valid repository payload")
    }

    #[test]
    fn fan_out_stays_below_abuse_threshold() {
        assert!(MAX_CONCURRENT_FETCHES <= 10);
        assert!(MAX_CONCURRENT_FETCHES >= 1);
    }

    #[test]
    fn shuffled_completion_order_restores_input_order() {
        let results = vec![
            (2, repo("gamma")),
            (0, repo("alpha")),
            (3, repo("delta")),
            (1, repo("beta"))
        ];

        let ordered = restore_input_order(results);
        let names: Vec<&str> = ordered.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn missing_slots_are_dropped_without_shifting_order() {
        let results = vec![(3, repo("delta")), (1, repo("beta"))];
        let ordered = restore_input_order(results);
        let names: Vec<&str> = ordered.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["beta", "delta"]);
    }

    #[test]
    fn successful_enrichment_sets_languages_and_rank() {
        let enriched = apply_enrichment(
            repo("maps"),
            Ok(vec!["Rust".to_string(), "GLSL".to_string()]),
            Some(42)
        );

        assert_eq!(enriched.languages, vec!["Rust", "GLSL"]);
        assert_eq!(enriched.gitstar_rank, Some(42));
    }

    #[test]
    fn failed_language_fetch_degrades_to_empty_list() {
        let enriched = apply_enrichment(
            repo("maps"),
            Err(FetchFailure::transient("HTTP 500")),
            None
        );

        assert_eq!(enriched.name, "maps");
        assert!(enriched.languages.is_empty());
        assert!(enriched.gitstar_rank.is_none());
    }
}
