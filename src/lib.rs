// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Build-time metadata pipeline for a personal portfolio site.
//!
//! The pipeline enumerates the owner's public GitHub repositories, enriches
//! them with language breakdowns and popularity ranks, overlays locally
//! authored markdown pages, fetches the owner's publications from Semantic
//! Scholar, and composes everything into JSON snapshots and a single render
//! payload consumed by the static site build.
//!
//! Three commands cover the workflow:
//!
//! - `projects` fetches and persists the project list;
//! - `publications` fetches and persists the publication list;
//! - `compose` joins the snapshots with local content into the render
//!   payload, entirely offline.

pub mod compose;
pub mod config;
pub mod content;
pub mod enrich;
pub mod error;
pub mod exclude;
pub mod fetch;
pub mod github;
pub mod link;
pub mod metadata;
pub mod project;
pub mod rank;
pub mod scholar;
pub mod select;
pub mod snapshot;

pub use compose::{compose_render_payload, RenderPayload};
pub use config::{load_site_config, SiteConfig};
pub use content::{scan_local_content, ContentRecord};
pub use error::Error;
pub use fetch::{FetchFailure, HttpFetcher, RetryConfig};
pub use github::RepoRecord;
pub use link::ProjectLink;
pub use project::{Project, ProjectStats};
pub use scholar::{Publication, ScholarSnapshot};
