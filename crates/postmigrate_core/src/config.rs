use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use toml::Value;

const EMBEDDED_CONFIG: &str = include_str!("../../../config/default-migration.toml");

pub const DEFAULT_PRIMARY_AUTHOR: &str = "Alex Turner";
pub const DEFAULT_REFERRAL_PREFIX: &str = "https://www.lesswrong.com/out?url=";
pub const DEFAULT_SOURCE_DOMAINS: [&str; 2] = ["lesswrong.com", "alignmentforum.org"];

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct MigrationConfig {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub sources: SourcesSection,
    #[serde(default)]
    pub authors: AuthorsSection,
    #[serde(default)]
    pub tags: TagsSection,
    /// Original slug to published permalink.
    #[serde(default)]
    pub permalinks: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct PathsSection {
    pub corpus: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourcesSection {
    #[serde(default = "default_source_domains")]
    pub domains: Vec<String>,
    #[serde(default = "default_referral_prefix")]
    pub referral_prefix: String,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            domains: default_source_domains(),
            referral_prefix: default_referral_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorsSection {
    #[serde(default = "default_primary_author")]
    pub primary: String,
    /// Platform display name to the name printed in front matter.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Default for AuthorsSection {
    fn default() -> Self {
        Self {
            primary: default_primary_author(),
            aliases: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct TagsSection {
    /// Allow-list. Tags outside it never reach the output.
    #[serde(default)]
    pub keep: Vec<String>,
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
}

fn default_source_domains() -> Vec<String> {
    DEFAULT_SOURCE_DOMAINS
        .iter()
        .map(|domain| (*domain).to_string())
        .collect()
}

fn default_referral_prefix() -> String {
    DEFAULT_REFERRAL_PREFIX.to_string()
}

fn default_primary_author() -> String {
    DEFAULT_PRIMARY_AUTHOR.to_string()
}

impl MigrationConfig {
    /// The configuration shipped with the binary.
    pub fn embedded() -> Result<Self> {
        toml::from_str(EMBEDDED_CONFIG).context("failed to parse embedded default configuration")
    }

    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.authors
            .aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    pub fn keeps_tag(&self, tag: &str) -> bool {
        self.tags.keep.iter().any(|kept| kept == tag)
    }

    pub fn renamed_tag<'a>(&'a self, tag: &'a str) -> &'a str {
        self.tags.rename.get(tag).map(String::as_str).unwrap_or(tag)
    }

    pub fn permalink_for<'a>(&'a self, slug: &'a str) -> &'a str {
        self.permalinks.get(slug).map(String::as_str).unwrap_or(slug)
    }
}

pub fn embedded_config() -> &'static str {
    EMBEDDED_CONFIG
}

/// Load a MigrationConfig from a TOML file layered over the embedded defaults.
/// Returns the embedded defaults if the file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<MigrationConfig> {
    if !config_path.exists() {
        return MigrationConfig::embedded();
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    parse_config(&content).with_context(|| format!("failed to parse {}", config_path.display()))
}

/// Parse user TOML; tables missing from it keep their embedded values.
pub fn parse_config(content: &str) -> Result<MigrationConfig> {
    let mut base: Value =
        toml::from_str(EMBEDDED_CONFIG).context("failed to parse embedded default configuration")?;
    let overlay: Value = toml::from_str(content).context("invalid TOML")?;
    merge_values(&mut base, overlay);
    base.try_into::<MigrationConfig>()
        .context("configuration does not match the expected schema")
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Write the embedded configuration to `config_path`.
/// Returns `true` when a write occurred.
pub fn write_default_config(config_path: &Path, force: bool) -> Result<bool> {
    if config_path.exists() && !force {
        return Ok(false);
    }
    let parent = config_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("config path has no parent: {}", config_path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    fs::write(config_path, EMBEDDED_CONFIG)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    Ok(true)
}
