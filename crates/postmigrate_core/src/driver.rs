//! Post selection, migration and output writing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use similar::TextDiff;

use crate::config::MigrationConfig;
use crate::corpus::{Corpus, Post};
use crate::crossref::CrossRefIndex;
use crate::error::MigrateError;
use crate::frontmatter::FrontMatter;
use crate::log;
use crate::metadata::normalize;
use crate::rewrite::rewrite_body;

pub const OUTPUT_EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedDocument {
    pub slug: String,
    pub title: String,
    pub front_matter: FrontMatter,
    pub body: String,
    pub warnings: Vec<String>,
}

impl MigratedDocument {
    pub fn render(&self) -> String {
        format!("{}{}", self.front_matter.render(), self.body)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{OUTPUT_EXTENSION}", self.slug)
    }

    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub bytes: usize,
    pub content_hash: String,
    /// `false` when the file already held exactly this content.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub document: MigratedDocument,
    pub report: WriteReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub written: usize,
    pub unchanged: usize,
    /// Titles of posts without contents.
    pub skipped: Vec<String>,
    pub warnings: Vec<String>,
}

/// Exact slug matches win; otherwise the query is a case-insensitive title
/// substring that must match exactly one post.
pub fn select_post<'a>(posts: &'a [Post], query: &str) -> Result<&'a Post, MigrateError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(MigrateError::InvalidArgument(
            "a post title is required".to_string(),
        ));
    }

    let by_slug = posts
        .iter()
        .filter(|post| post.slug == query)
        .collect::<Vec<_>>();
    let candidates = if by_slug.is_empty() {
        let needle = query.to_lowercase();
        posts
            .iter()
            .filter(|post| post.title.to_lowercase().contains(&needle))
            .collect::<Vec<_>>()
    } else {
        by_slug
    };

    match candidates.as_slice() {
        [] => Err(MigrateError::NotFound {
            query: query.to_string(),
        }),
        [post] => Ok(*post),
        many => Err(MigrateError::Ambiguous {
            query: query.to_string(),
            titles: many.iter().map(|post| post.title.clone()).collect(),
        }),
    }
}

pub fn build_index(corpus: &Corpus, config: &MigrationConfig) -> CrossRefIndex {
    let index = CrossRefIndex::build(&corpus.posts, &config.sources.domains);
    log!("index"; "recorded {} post hashes", index.len());
    index
}

pub fn migrate_post(
    post: &Post,
    index: &CrossRefIndex,
    config: &MigrationConfig,
) -> Result<MigratedDocument, MigrateError> {
    let normalized = normalize(post, config)?;
    let markdown = post
        .content()
        .map(|contents| contents.markdown.as_str())
        .unwrap_or_default();
    Ok(MigratedDocument {
        slug: post.slug.clone(),
        title: post.title.clone(),
        front_matter: normalized.front_matter,
        body: rewrite_body(markdown, index),
        warnings: normalized.warnings,
    })
}

/// Select and migrate one post without touching the filesystem.
pub fn prepare_document(
    corpus: &Corpus,
    query: &str,
    config: &MigrationConfig,
) -> Result<MigratedDocument> {
    let post = select_post(&corpus.posts, query)?;
    if !post.has_content() {
        return Err(MigrateError::MissingContent {
            title: post.title.clone(),
        }
        .into());
    }
    let index = build_index(corpus, config);
    Ok(migrate_post(post, &index, config)?)
}

/// Write `<slug>.md` under `output_dir`. A file that already holds the same
/// content is left alone.
pub fn write_document(document: &MigratedDocument, output_dir: &Path) -> Result<WriteReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let path = document.output_path(output_dir);
    let content = document.render();
    let changed = match fs::read_to_string(&path) {
        Ok(existing) => existing != content,
        Err(_) => true,
    };
    if changed {
        fs::write(&path, &content).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(WriteReport {
        path,
        bytes: content.len(),
        content_hash: compute_hash(&content),
        changed,
    })
}

pub fn migrate_matching(
    corpus: &Corpus,
    query: &str,
    config: &MigrationConfig,
    output_dir: &Path,
) -> Result<MigrationOutcome> {
    let document = prepare_document(corpus, query, config)?;
    let report = write_document(&document, output_dir)?;
    Ok(MigrationOutcome { document, report })
}

/// Migrate every post that has contents.
pub fn migrate_all(
    corpus: &Corpus,
    config: &MigrationConfig,
    output_dir: &Path,
) -> Result<BatchReport> {
    let index = build_index(corpus, config);
    let mut report = BatchReport::default();
    for post in &corpus.posts {
        if !post.has_content() {
            report.skipped.push(post.title.clone());
            continue;
        }
        let document = migrate_post(post, &index, config)?;
        let written = write_document(&document, output_dir)
            .with_context(|| format!("failed to migrate '{}'", post.title))?;
        if written.changed {
            log!("write"; "{}", written.path.display());
            report.written += 1;
        } else {
            report.unchanged += 1;
        }
        report.warnings.extend(document.warnings);
    }
    Ok(report)
}

/// Unified diff from the file on disk to `document`. Empty when identical.
pub fn diff_document(document: &MigratedDocument, output_dir: &Path) -> Result<String> {
    let path = document.output_path(output_dir);
    let existing = if path.exists() {
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        String::new()
    };
    let rendered = document.render();
    if existing == rendered {
        return Ok(String::new());
    }
    let label = path.to_string_lossy().replace('\\', "/");
    let diff = TextDiff::from_lines(existing.as_str(), rendered.as_str());
    Ok(diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("{label} (on disk)"), &format!("{label} (migrated)"))
        .to_string())
}

fn compute_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut output = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
