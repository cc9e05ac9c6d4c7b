//! Reading and writing the `description` front-matter field of migrated files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_yaml::Value;
use walkdir::WalkDir;

use crate::frontmatter::{DELIMITER, parse_front_matter, quote_scalar, split_document};

pub const DESCRIPTION_KEY: &str = "description";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionStatus {
    Missing,
    Empty,
    NoFrontMatter,
}

impl DescriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
            Self::NoFrontMatter => "no front matter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDescription {
    pub path: PathBuf,
    pub status: DescriptionStatus,
}

/// Markdown files under `content_dir` that still need a description, in path order.
pub fn find_missing_descriptions(content_dir: &Path) -> Result<Vec<MissingDescription>> {
    let mut out = Vec::new();
    if !content_dir.exists() {
        return Ok(out);
    }
    for entry in WalkDir::new(content_dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("failed to walk {}", content_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        if let Some(status) = description_status(&content)
            .with_context(|| format!("failed to inspect {}", path.display()))?
        {
            out.push(MissingDescription {
                path: path.to_path_buf(),
                status,
            });
        }
    }
    Ok(out)
}

fn description_status(document: &str) -> Result<Option<DescriptionStatus>> {
    if split_document(document).is_none() {
        return Ok(Some(DescriptionStatus::NoFrontMatter));
    }
    let mapping = parse_front_matter(document)?;
    Ok(match mapping.get(DESCRIPTION_KEY) {
        None => Some(DescriptionStatus::Missing),
        Some(Value::Null) => Some(DescriptionStatus::Empty),
        Some(Value::String(text)) if text.trim().is_empty() => Some(DescriptionStatus::Empty),
        Some(_) => None,
    })
}

/// Insert or replace the `description:` line of the file's front matter.
/// Returns `true` when the file changed.
pub fn set_description(path: &Path, text: &str) -> Result<bool> {
    let document =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let Some(updated) = with_description(&document, text) else {
        bail!("{} has no front matter block", path.display());
    };
    if updated == document {
        return Ok(false);
    }
    fs::write(path, &updated).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

fn with_description(document: &str, text: &str) -> Option<String> {
    split_document(document)?;
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let line = format!("{DESCRIPTION_KEY}: {}\n", quote_scalar(&single_line));
    let prefix = format!("{DESCRIPTION_KEY}:");

    let mut output = String::with_capacity(document.len() + line.len());
    let mut lines = document.split_inclusive('\n');
    output.push_str(lines.next()?);
    let mut written = false;
    for current in lines.by_ref() {
        if current.trim_end() == DELIMITER {
            if !written {
                output.push_str(&line);
            }
            output.push_str(current);
            break;
        }
        if current.starts_with(&prefix) && !written {
            output.push_str(&line);
            written = true;
        } else {
            output.push_str(current);
        }
    }
    for rest in lines {
        output.push_str(rest);
    }
    Some(output)
}
