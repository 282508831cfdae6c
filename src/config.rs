use serde::Deserialize;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::patch::{FileFilter, LayoutMode};
use crate::report;

pub const DEFAULT_EXTENSIONS: &[&str] = &["c", "h"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub git: Option<String>,
    #[serde(default)]
    pub all_files: Option<bool>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub mirror_repo: Option<bool>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub ignore_whitespace: Option<bool>,
    #[serde(default)]
    pub context_lines: Option<usize>,
}

/// Effective settings after merging the config file with CLI flags.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    pub git: String,
    pub filter: FileFilter,
    pub layout: LayoutMode,
    pub jobs: usize,
    pub ignore_whitespace: bool,
    pub context_lines: Option<usize>,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            filter: FileFilter::extensions(DEFAULT_EXTENSIONS.iter().copied()),
            layout: LayoutMode::TargetRelative,
            jobs: 1,
            ignore_whitespace: false,
            context_lines: None,
        }
    }
}

impl PatchConfig {
    /// Merge CLI flags over config-file settings (CLI wins).
    pub fn resolve(file: &ConfigFile, cli: &Cli) -> Self {
        let defaults = Self::default();
        let filter = if cli.all || file.all_files.unwrap_or(false) {
            FileFilter::All
        } else if !cli.extensions.is_empty() {
            FileFilter::extensions(cli.extensions.iter())
        } else if let Some(ref exts) = file.extensions {
            FileFilter::extensions(exts.iter())
        } else {
            defaults.filter.clone()
        };
        let filter = if filter.is_empty() {
            report::error("No usable extensions given, falling back to .c and .h");
            defaults.filter
        } else {
            filter
        };

        let layout = if cli.mirror_repo || file.mirror_repo.unwrap_or(false) {
            LayoutMode::RepoRelative
        } else {
            LayoutMode::TargetRelative
        };

        let jobs = cli
            .jobs
            .map(usize::from)
            .or(file.jobs)
            .unwrap_or(defaults.jobs)
            .max(1);

        Self {
            git: file.git.clone().unwrap_or(defaults.git),
            filter,
            layout,
            jobs,
            ignore_whitespace: cli.ignore_whitespace || file.ignore_whitespace.unwrap_or(false),
            context_lines: cli.context_lines.or(file.context_lines),
        }
    }
}

fn config_path() -> PathBuf {
    let mut path = dirs_home().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("mpatch");
    path.push("config.toml");
    path
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

pub fn parse_config(contents: &str) -> Option<ConfigFile> {
    match toml::from_str(contents) {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::warn!("ignoring malformed config: {e}");
            None
        }
    }
}

/// Load config from `~/.config/mpatch/config.toml`, falling back to defaults.
pub fn load_config() -> ConfigFile {
    let path = config_path();

    let Ok(contents) = std::fs::read_to_string(&path) else {
        return ConfigFile::default();
    };

    tracing::debug!(path = %path.display(), "loaded config");
    parse_config(&contents).unwrap_or_default()
}
