// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio::{
    config::GithubConfig,
    content::derive_slug,
    exclude::should_exclude,
    github::RepoRecord,
    scholar::Publication
};

fn bench_should_exclude(c: &mut Criterion) {
    let repo: RepoRecord = serde_json::from_str(
        r#"{"name": "hello-world", "owner": {"login": "octocat"}, "html_url": "https://github.com/octocat/hello-world"}"#
    )
    .expect("valid repository payload");
    let config = GithubConfig {
        exclude_from_pages: vec![
            "octocat/legacy-site".to_string(),
            "octocat/profile".to_string(),
            "octocat/archive".to_string()
        ]
    };

    c.bench_function("should_exclude", |b| {
        b.iter(|| should_exclude(black_box(&repo), black_box(&config)))
    });
}

fn bench_derive_slug(c: &mut Criterion) {
    c.bench_function("derive_slug", |b| {
        b.iter(|| derive_slug(black_box("2024-01-15-generative-pen-plotter-maps.md")))
    });
}

fn bench_effective_citations(c: &mut Criterion) {
    let publication = Publication {
        citations: 120,
        google_scholar_citations: Some(95),
        ..Publication::default()
    };

    c.bench_function("effective_citations", |b| {
        b.iter(|| black_box(&publication).effective_citations())
    });
}

criterion_group!(
    benches,
    bench_should_exclude,
    bench_derive_slug,
    bench_effective_citations
);
criterion_main!(benches);
