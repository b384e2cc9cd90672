// SPDX-FileCopyrightText: 2025 Marcelo Prates
//
// SPDX-License-Identifier: MIT

//! Local markdown content scanning and front-matter extraction.
//!
//! Project pages authored as markdown files override repository metadata and
//! mark projects as having a local page. File names double as identity: the
//! slug is the file name without its extension and without an optional
//! `YYYY-MM-DD-` date prefix.

use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{self, Error};

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").expect("valid date prefix pattern"));

static IMAGE_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]*\ssrc=["']([^"']+)["']"#).expect("valid image pattern")
});

/// A locally authored project page.
#[derive(Debug, Clone, Default)]
pub struct ContentRecord {
    /// Identity derived from the file name.
    pub slug:    String,
    /// Display title, when the front matter provides one.
    pub title:   Option<String>,
    /// Publication date string, passed through verbatim.
    pub date:    Option<String>,
    /// Tags from the front matter.
    pub tags:    Vec<String>,
    /// Short description from the front matter.
    pub excerpt: Option<String>,
    /// Resolved cover image path or URL.
    pub cover:   Option<String>,
    /// Repository identifier linking this page to a GitHub project.
    pub repo:    Option<String>,
    /// Markdown body following the front matter.
    pub body:    String
}

/// Front matter fields recognized in project markdown files.
///
/// Aliases cover the spellings that accumulated across years of authored
/// content; all map onto one canonical record.
#[derive(Debug, Default, Deserialize)]
pub struct FrontMatter {
    /// Display title overriding the fetched repository name.
    #[serde(default)]
    pub title:   Option<String>,
    /// Publication date, passed through verbatim.
    #[serde(default)]
    pub date:    Option<String>,
    /// Tags in either list or comma-separated string form.
    #[serde(default)]
    pub tags:    Option<TagsInput>,
    /// Short description shown on the project card.
    #[serde(default, alias = "summary", alias = "description")]
    pub excerpt: Option<String>,
    /// Cover image file name, path, or URL.
    #[serde(default, alias = "image", alias = "thumbnail")]
    pub cover:   Option<String>,
    /// `owner/name` identifier linking the page to a GitHub repository.
    #[serde(default, alias = "repository", alias = "github")]
    pub repo:    Option<String>
}

/// Tags may be written either as a YAML list or as a single string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    /// A single string, split on commas during normalization.
    One(String),
    /// An explicit YAML list.
    Many(Vec<String>)
}

impl TagsInput {
    /// Normalizes both spellings into a list. A single string is split on
    /// commas so `tags: art, rust` behaves like the list form.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => value
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
            Self::Many(values) => values
        }
    }
}

/// Derives the content slug from a markdown file name.
///
/// Strips the extension and an optional leading `YYYY-MM-DD-` date prefix,
/// so `2024-01-01-generative-maps.md` and `generative-maps.md` share the
/// slug `generative-maps`.
pub fn derive_slug(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    DATE_PREFIX.replace(stem, "").into_owned()
}

/// Splits a markdown document into its YAML front matter and body.
///
/// Returns `(None, document)` when the document carries no front-matter
/// block. The block must start on the first line with `---` and end with a
/// matching `---` line.
pub fn split_front_matter(document: &str) -> (Option<&str>, &str) {
    let Some(rest) = document.strip_prefix("---") else {
        return (None, document);
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return (None, document);
    };

    for terminator in ["\n---\n", "\n---\r\n", "\r\n---\r\n", "\r\n---\n"] {
        if let Some(position) = rest.find(terminator) {
            let front = &rest[..position];
            let body = &rest[position + terminator.len()..];
            return (Some(front), body);
        }
    }

    // Front matter may also terminate the document without a trailing body.
    for terminator in ["\n---", "\r\n---"] {
        if let Some(stripped) = rest.strip_suffix(terminator) {
            return (Some(stripped), "");
        }
    }

    (None, document)
}

/// Resolves a cover image reference relative to the project's image folder.
///
/// Absolute URLs and site-absolute paths pass through unchanged; bare file
/// names are rewritten to `/images/projects/{slug}/{file}`. When the front
/// matter has no cover, the first `<img>` tag in the body is used instead.
pub fn resolve_cover_image(cover: Option<&str>, body: &str, slug: &str) -> Option<String> {
    let reference = match cover {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => first_image_src(body)?
    };

    if reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with('/')
    {
        return Some(reference);
    }

    Some(format!("/images/projects/{slug}/{reference}"))
}

/// Returns the `src` of the first `<img>` tag in a markdown body.
pub fn first_image_src(body: &str) -> Option<String> {
    IMAGE_SRC
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parses a single markdown document into a [`ContentRecord`].
///
/// Malformed front matter is logged and treated as absent so one broken file
/// never takes down the whole scan.
pub fn parse_content(file_name: &str, document: &str) -> ContentRecord {
    let slug = derive_slug(file_name);
    let (front, body) = split_front_matter(document);

    let matter = match front {
        Some(yaml) => match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(matter) => matter,
            Err(parse_error) => {
                warn!("malformed front matter in {file_name}: {parse_error}");
                FrontMatter::default()
            }
        },
        None => FrontMatter::default()
    };

    let cover = resolve_cover_image(matter.cover.as_deref(), body, &slug);

    ContentRecord {
        slug,
        title: matter.title,
        date: matter.date,
        tags: matter.tags.map(TagsInput::into_vec).unwrap_or_default(),
        excerpt: matter.excerpt,
        cover,
        repo: matter.repo,
        body: body.to_string()
    }
}

/// Scans a directory of markdown files into content records.
///
/// Files are processed in file-name order so downstream duplicate handling is
/// deterministic. A missing directory yields an empty list; sites without
/// authored pages are a supported configuration.
///
/// # Errors
///
/// Returns an [`Error`] when the directory exists but cannot be listed or a
/// file inside it cannot be read.
pub fn scan_local_content(dir: &Path) -> Result<Vec<ContentRecord>, Error> {
    if !dir.exists() {
        debug!("content directory {dir:?} does not exist, skipping");
        return Ok(Vec::new());
    }

    let mut file_names: Vec<String> = Vec::new();
    let entries = fs::read_dir(dir).map_err(|source| error::io_error(dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| error::io_error(dir, source))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"));
        if !is_markdown {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            file_names.push(name.to_string());
        }
    }

    file_names.sort();

    let mut records = Vec::with_capacity(file_names.len());
    for file_name in &file_names {
        let path = dir.join(file_name);
        let document = fs::read_to_string(&path).map_err(|source| error::io_error(&path, source))?;
        records.push(parse_content(file_name, &document));
    }

    debug!("scanned {} content files from {dir:?}", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tempfile::tempdir;

    use super::{
        derive_slug, first_image_src, parse_content, resolve_cover_image, scan_local_content,
        split_front_matter
    };

    #[test]
    fn derive_slug_strips_extension_and_date_prefix() {
        assert_eq!(derive_slug("2024-01-01-generative-maps.md"), "generative-maps");
        assert_eq!(derive_slug("generative-maps.md"), "generative-maps");
        assert_eq!(derive_slug("notes.markdown"), "notes");
    }

    #[test]
    fn derive_slug_keeps_partial_date_lookalikes() {
        // Only a full YYYY-MM-DD- prefix is stripped.
        assert_eq!(derive_slug("2024-plans.md"), "2024-plans");
        assert_eq!(derive_slug("2024-01-roadmap.md"), "2024-01-roadmap");
    }

    #[test]
    fn split_front_matter_extracts_block_and_body() {
        let document = "---\ntitle: Maps\n---\nBody text\n";
        let (front, body) = split_front_matter(document);
        assert_eq!(front, Some("title: Maps"));
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn split_front_matter_without_block_returns_whole_document() {
        let document = "Just a body\n";
        let (front, body) = split_front_matter(document);
        assert!(front.is_none());
        assert_eq!(body, document);
    }

    #[test]
    fn split_front_matter_handles_document_ending_at_delimiter() {
        let document = "---\ntitle: Maps\n---";
        let (front, body) = split_front_matter(document);
        assert_eq!(front, Some("title: Maps"));
        assert_eq!(body, "");
    }

    #[test]
    fn parse_content_reads_aliased_fields() {
        let document = "---\ntitle: Maps\nsummary: Street maps as art\nimage: cover.png\n---\nBody\n";
        let record = parse_content("2024-03-05-maps.md", document);

        assert_eq!(record.slug, "maps");
        assert_eq!(record.title.as_deref(), Some("Maps"));
        assert_eq!(record.excerpt.as_deref(), Some("Street maps as art"));
        assert_eq!(record.cover.as_deref(), Some("/images/projects/maps/cover.png"));
    }

    #[test]
    fn parse_content_accepts_tags_as_string_or_list() {
        let as_string = parse_content("a.md", "---\ntags: art, rust\n---\n");
        assert_eq!(as_string.tags, vec!["art", "rust"]);

        let as_list = parse_content("a.md", "---\ntags:\n  - art\n  - rust\n---\n");
        assert_eq!(as_list.tags, vec!["art", "rust"]);
    }

    #[test]
    fn parse_content_degrades_on_malformed_front_matter() {
        let document = "---\ntitle: [unclosed\n---\nBody survives\n";
        let record = parse_content("broken.md", document);

        assert_eq!(record.slug, "broken");
        assert!(record.title.is_none());
        assert_eq!(record.body, "Body survives\n");
    }

    #[test]
    fn resolve_cover_passes_through_absolute_references() {
        assert_eq!(
            resolve_cover_image(Some("https://cdn.example.com/a.png"), "", "maps"),
            Some("https://cdn.example.com/a.png".to_string())
        );
        assert_eq!(
            resolve_cover_image(Some("/images/shared/a.png"), "", "maps"),
            Some("/images/shared/a.png".to_string())
        );
    }

    #[test]
    fn resolve_cover_rewrites_bare_file_names() {
        assert_eq!(
            resolve_cover_image(Some("shot.png"), "", "maps"),
            Some("/images/projects/maps/shot.png".to_string())
        );
    }

    #[test]
    fn resolve_cover_falls_back_to_first_body_image() {
        let body = r#"Intro <img alt="x" src="https://example.com/inline.png"> more"#;
        assert_eq!(
            resolve_cover_image(None, body, "maps"),
            Some("https://example.com/inline.png".to_string())
        );
        assert_eq!(resolve_cover_image(None, "no images", "maps"), None);
    }

    #[test]
    fn first_image_src_finds_single_quoted_sources() {
        let body = "<img class='wide' src='pic.jpg'>";
        assert_eq!(first_image_src(body), Some("pic.jpg".to_string()));
    }

    #[test]
    fn scan_returns_empty_for_missing_directory() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("does-not-exist");
        let records = scan_local_content(&missing).expect("scan should succeed");
        assert!(records.is_empty());
    }

    #[test]
    fn scan_reads_markdown_files_in_name_order() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("b-second.md"), "---\ntitle: B\n---\n").expect("write");
        std::fs::write(dir.path().join("a-first.md"), "---\ntitle: A\n---\n").expect("write");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let records = scan_local_content(dir.path()).expect("scan should succeed");
        let slugs: Vec<&str> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a-first", "b-second"]);
    }

    proptest! {
        // Slugs never retain the markdown extension or a full date prefix.
        #[test]
        fn derived_slug_has_no_extension_or_date_prefix(
            stem in "[a-z][a-z0-9-]{0,20}",
            year in 1990u32..2100,
            month in 1u32..13,
            day in 1u32..29
        ) {
            prop_assume!(!stem.ends_with('-'));
            let file_name = format!("{year:04}-{month:02}-{day:02}-{stem}.md");
            let slug = derive_slug(&file_name);
            prop_assert_eq!(slug, stem);
        }
    }
}
