use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{MigrationConfig, write_default_config};

pub const STATE_DIR_NAME: &str = ".postmigrate";
pub const CONTENT_DIR_NAME: &str = "content";
pub const CONFIG_FILENAME: &str = "config.toml";
pub const CORPUS_FILENAME: &str = "all_posts.json";

pub const PROJECT_ROOT_ENV: &str = "POSTMIGRATE_PROJECT_ROOT";
pub const CONFIG_ENV: &str = "POSTMIGRATE_CONFIG";
pub const CORPUS_ENV: &str = "POSTMIGRATE_CORPUS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Config,
    Heuristic,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Config => "config",
            Self::Heuristic => "heuristic",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub project_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub corpus: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
}

impl ResolutionContext {
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        Ok(Self { cwd })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub project_root: PathBuf,
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub root_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    /// Corpus file and output directory, which may come from the loaded config.
    pub fn locate(&self, overrides: &PathOverrides, config: &MigrationConfig) -> DataPaths {
        self.locate_with_lookup(overrides, config, |key| env::var(key).ok())
    }

    fn locate_with_lookup<F>(
        &self,
        overrides: &PathOverrides,
        config: &MigrationConfig,
        lookup_env: F,
    ) -> DataPaths
    where
        F: Fn(&str) -> Option<String>,
    {
        let (corpus_path, corpus_source) = if let Some(path) = overrides.corpus.as_deref() {
            (self.absolutize(path), ValueSource::Flag)
        } else if let Some(value) = lookup_env(CORPUS_ENV) {
            (self.absolutize(Path::new(value.trim())), ValueSource::Env)
        } else if let Some(value) = config.paths.corpus.as_deref() {
            (self.absolutize(Path::new(value)), ValueSource::Config)
        } else {
            (self.state_dir.join(CORPUS_FILENAME), ValueSource::Default)
        };

        let (output_dir, output_source) = if let Some(path) = overrides.output_dir.as_deref() {
            (self.absolutize(path), ValueSource::Flag)
        } else if let Some(value) = config.paths.output_dir.as_deref() {
            (self.absolutize(Path::new(value)), ValueSource::Config)
        } else {
            (self.project_root.join(CONTENT_DIR_NAME), ValueSource::Default)
        };

        DataPaths {
            corpus_path,
            output_dir,
            corpus_source,
            output_source,
        }
    }

    pub fn diagnostics(&self, data: &DataPaths) -> String {
        format!(
            "project_root={} ({})\nstate_dir={}\nconfig_path={} ({})\ncorpus_path={} ({})\noutput_dir={} ({})",
            normalize_for_display(&self.project_root),
            self.root_source.as_str(),
            normalize_for_display(&self.state_dir),
            normalize_for_display(&self.config_path),
            self.config_source.as_str(),
            normalize_for_display(&data.corpus_path),
            data.corpus_source.as_str(),
            normalize_for_display(&data.output_dir),
            data.output_source.as_str(),
        )
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        absolutize(path, &self.project_root)
    }
}

#[derive(Debug, Clone)]
pub struct DataPaths {
    pub corpus_path: PathBuf,
    pub output_dir: PathBuf,
    pub corpus_source: ValueSource,
    pub output_source: ValueSource,
}

#[derive(Debug, Clone)]
pub struct InitReport {
    pub created_state_dir: bool,
    pub wrote_config: bool,
}

pub fn resolve_paths(
    context: &ResolutionContext,
    overrides: &PathOverrides,
) -> Result<ResolvedPaths> {
    resolve_paths_with_lookup(context, overrides, |key| env::var(key).ok())
}

fn resolve_paths_with_lookup<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: F,
) -> Result<ResolvedPaths>
where
    F: Fn(&str) -> Option<String>,
{
    let (project_root, root_source) = resolve_project_root(context, overrides, &lookup_env);
    let state_dir = project_root.join(STATE_DIR_NAME);

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (absolutize(path, &project_root), ValueSource::Flag)
    } else if let Some(value) = lookup_env(CONFIG_ENV) {
        (
            absolutize(Path::new(value.trim()), &project_root),
            ValueSource::Env,
        )
    } else {
        (state_dir.join(CONFIG_FILENAME), ValueSource::Default)
    };

    Ok(ResolvedPaths {
        project_root,
        state_dir,
        config_path,
        root_source,
        config_source,
    })
}

/// Create the state directory and write the default configuration.
pub fn init_layout(paths: &ResolvedPaths, force: bool) -> Result<InitReport> {
    let created_state_dir = !paths.state_dir.exists();
    if created_state_dir {
        fs::create_dir_all(&paths.state_dir)
            .with_context(|| format!("failed to create {}", paths.state_dir.display()))?;
    }
    let wrote_config = write_default_config(&paths.config_path, force)?;
    Ok(InitReport {
        created_state_dir,
        wrote_config,
    })
}

fn resolve_project_root<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: &F,
) -> (PathBuf, ValueSource)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = overrides.project_root.as_deref() {
        return (absolutize(path, &context.cwd), ValueSource::Flag);
    }

    if let Some(value) = lookup_env(PROJECT_ROOT_ENV) {
        return (
            absolutize(Path::new(value.trim()), &context.cwd),
            ValueSource::Env,
        );
    }

    match detect_project_root_heuristic(&context.cwd) {
        Some(root) => (root, ValueSource::Heuristic),
        None => (context.cwd.clone(), ValueSource::Default),
    }
}

fn detect_project_root_heuristic(cwd: &Path) -> Option<PathBuf> {
    for candidate in cwd.ancestors() {
        if candidate.join(CONTENT_DIR_NAME).is_dir() || candidate.join(STATE_DIR_NAME).is_dir() {
            return Some(candidate.to_path_buf());
        }
    }
    None
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
