// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Command line interface for the portfolio pipeline.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process,
    time::Duration
};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use folio::{
    compose::compose_render_payload,
    config::{load_site_config, require_github_token, SiteConfig},
    content::scan_local_content,
    enrich::enrich_repositories,
    error::Error,
    exclude::filter_repositories,
    fetch::HttpFetcher,
    github::list_public_repos,
    project::{apply_content_overlay, project_from_repo, Project},
    scholar::{fetch_author_publications, scrape_citation_counts, write_snapshot, ScholarSnapshot},
    snapshot::write_projects
};

#[derive(Debug, Parser)]
#[command(
    name = "folio",
    about = "Build-time metadata pipeline for a personal portfolio site",
    version
)]
struct Cli {
    /// Path to the site configuration file.
    #[arg(long, global = true, default_value = "site.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the GitHub project list and persist the projects snapshot.
    Projects {
        /// GitHub account to fetch, overriding the configured owner.
        username: Option<String>
    },
    /// Fetch the publication list and persist the publications snapshot.
    Publications {
        /// Semantic Scholar author identifier, overriding the configuration.
        author_id: Option<String>
    },
    /// Compose the render payload from the snapshots and local content.
    Compose {
        /// Write the payload to this file instead of standard output.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print the payload.
        #[arg(long)]
        pretty: bool
    }
}

fn main() {
    init_tracing();

    if let Err(error) = run() {
        eprintln!("Error: {}", error.to_display_string());
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = load_site_config(&cli.config)?;

    match cli.command {
        Command::Projects {
            username
        } => run_projects(&config, username.as_deref()).await,
        Command::Publications {
            author_id
        } => run_publications(&config, author_id.as_deref()).await,
        Command::Compose {
            output,
            pretty
        } => run_compose(&config, output.as_deref(), pretty)
    }
}

async fn run_projects(config: &SiteConfig, username: Option<&str>) -> Result<(), Error> {
    let username = username.unwrap_or(&config.owner);
    let token = require_github_token()?;

    let fetcher = HttpFetcher::new()?;
    let spinner = make_spinner(&format!("Fetching repositories for {username}..."));

    let repos = list_public_repos(&fetcher, username, Some(&token)).await?;
    spinner.set_message(format!("Enriching {} repositories...", repos.len()));

    let repos = filter_repositories(repos, &config.github);
    let repos = enrich_repositories(&fetcher, repos, Some(&token)).await;

    let content = scan_local_content(Path::new(&config.content_dir))?;
    let mut projects: Vec<Project> = repos
        .iter()
        .map(|repo| {
            let project = project_from_repo(repo);
            let full_name = repo.full_name();
            match content
                .iter()
                .find(|record| record.repo.as_deref() == Some(full_name.as_str()))
            {
                Some(record) => apply_content_overlay(project, record),
                None => project
            }
        })
        .collect();
    projects.sort_by(|a, b| {
        let a_stars = a.stats.as_ref().map_or(0, |s| s.stars);
        let b_stars = b.stats.as_ref().map_or(0, |s| s.stars);
        b_stars.cmp(&a_stars).then_with(|| a.title.cmp(&b.title))
    });

    let path = Path::new(&config.snapshots.projects);
    write_projects(path, &projects)?;
    spinner.finish_with_message(format!("Wrote {} projects to {path:?}", projects.len()));
    Ok(())
}

async fn run_publications(config: &SiteConfig, author_id: Option<&str>) -> Result<(), Error> {
    let mut scholar = config.scholar.clone();
    if let Some(author_id) = author_id {
        scholar.author_id = author_id.to_string();
    }
    if scholar.author_id.trim().is_empty() {
        return Err(Error::validation(
            "no Semantic Scholar author id configured; set scholar.author_id or pass one as an argument"
        ));
    }

    let fetcher = HttpFetcher::new()?;
    let spinner = make_spinner(&format!(
        "Fetching publications for author {}...",
        scholar.author_id
    ));

    let mut publications = fetch_author_publications(&fetcher, &scholar).await?;

    if let Some(profile_url) = scholar.profile_url.as_deref() {
        spinner.set_message("Scraping secondary citation counts...");
        scrape_citation_counts(&fetcher, profile_url, &mut publications).await;
    }

    let snapshot = ScholarSnapshot::new(&scholar.author_id, publications);
    let path = Path::new(&config.snapshots.publications);
    write_snapshot(path, &snapshot)?;
    spinner.finish_with_message(format!(
        "Wrote {} publications to {path:?}",
        snapshot.publications.len()
    ));
    Ok(())
}

fn run_compose(config: &SiteConfig, output: Option<&Path>, pretty: bool) -> Result<(), Error> {
    let payload = compose_render_payload(config, Path::new("."))?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .map_err(|source| folio::error::snapshot_io_error(path, source))?;
            info!("wrote render payload to {path:?}");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{rendered}")
                .map_err(|source| folio::error::snapshot_io_error(Path::new("-"), source))?;
        }
    }

    Ok(())
}

fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}").expect("valid template")
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
