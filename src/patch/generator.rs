use futures::stream::{self, StreamExt};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::filter::FileFilter;
use super::layout::PatchLayout;
use crate::config::PatchConfig;
use crate::error::ConfigError;
use crate::git::{DiffFlags, GitCli};
use crate::report;

/// A file found under the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Relative to the repository root; used as the diff pathspec.
    pub repo_rel: PathBuf,
    /// Relative to the target directory.
    pub target_rel: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Created { artifact: PathBuf, bytes: u64 },
    /// No change between the two revisions; nothing kept.
    Empty,
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scanned: usize,
    pub filtered: usize,
    pub created: usize,
    pub empty: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &PatchOutcome) {
        match outcome {
            PatchOutcome::Created { .. } => self.created += 1,
            PatchOutcome::Empty => self.empty += 1,
            PatchOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done: {} scanned, {} created, {} empty, {} filtered, {} failed",
            self.scanned, self.created, self.empty, self.filtered, self.failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct PatchRequest {
    pub repo_root: PathBuf,
    pub target_dir: PathBuf,
    pub src: String,
    pub dst: String,
    pub output_base: PathBuf,
}

#[derive(Debug, Default)]
pub struct Scan {
    pub entries: Vec<FileEntry>,
    pub filtered: usize,
}

pub struct PatchGenerator {
    request: PatchRequest,
    git: GitCli,
    flags: DiffFlags,
    filter: FileFilter,
    layout: PatchLayout,
    jobs: usize,
}

impl PatchGenerator {
    pub fn new(request: PatchRequest, config: &PatchConfig) -> Self {
        Self {
            git: GitCli::new(&config.git, &request.repo_root),
            flags: DiffFlags {
                ignore_whitespace: config.ignore_whitespace,
                context_lines: config.context_lines,
            },
            filter: config.filter.clone(),
            layout: PatchLayout::new(&request.output_base, config.layout),
            jobs: config.jobs.max(1),
            request,
        }
    }

    fn full_target(&self) -> PathBuf {
        self.request.repo_root.join(&self.request.target_dir)
    }

    /// Walk the target directory and split files into those that qualify
    /// and a count of those the filter rejected.
    pub fn scan(&self) -> Result<Scan, ConfigError> {
        let full_target = self.full_target();
        if !full_target.is_dir() {
            return Err(ConfigError::TargetNotFound(full_target));
        }

        let mut scan = Scan::default();
        let walker = WalkDir::new(&full_target)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            // Symlinks count as files unless they point at a directory;
            // git tracks them as blobs and diffs their target text.
            let file_type = entry.file_type();
            let is_file =
                file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir());
            if !is_file {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !self.filter.accepts(&file_name) {
                scan.filtered += 1;
                continue;
            }

            let path = entry.path();
            let repo_rel = match path.strip_prefix(&self.request.repo_root) {
                Ok(rel) => normalize(rel),
                Err(_) => PathBuf::new(),
            };
            let escapes = repo_rel.as_os_str().is_empty()
                || repo_rel
                    .components()
                    .any(|c| matches!(c, Component::ParentDir));
            if escapes {
                report::error(format!(
                    "Skipping {}: not inside the repository",
                    path.display()
                ));
                continue;
            }
            let target_rel = match path.strip_prefix(&full_target) {
                Ok(rel) => normalize(rel),
                Err(_) => repo_rel.clone(),
            };

            scan.entries.push(FileEntry {
                repo_rel,
                target_rel,
            });
        }

        Ok(scan)
    }

    /// Produce the artifact for one file. Blocks on the git subprocess.
    pub fn generate(&self, entry: &FileEntry) -> PatchOutcome {
        let artifact = self.layout.artifact_path(entry);
        tracing::debug!(file = %entry.repo_rel.display(), artifact = %artifact.display(), "diffing");

        let outcome = match self.layout.create_artifact(&artifact) {
            Ok(file) => {
                match self.git.diff_to_file(
                    &self.request.src,
                    &self.request.dst,
                    &entry.repo_rel,
                    &self.flags,
                    file,
                ) {
                    Ok(()) => match fs::metadata(&artifact) {
                        Ok(meta) if meta.len() > 0 => {
                            return PatchOutcome::Created {
                                artifact,
                                bytes: meta.len(),
                            };
                        }
                        Ok(_) => PatchOutcome::Empty,
                        Err(e) => PatchOutcome::Failed {
                            reason: format!("cannot read {}: {e}", artifact.display()),
                        },
                    },
                    Err(e) => PatchOutcome::Failed {
                        reason: format!("{e:#}"),
                    },
                }
            }
            Err(e) => PatchOutcome::Failed {
                reason: format!("cannot create {}: {e}", artifact.display()),
            },
        };

        if let Err(e) = self.layout.discard_artifact(&artifact) {
            tracing::warn!(artifact = %artifact.display(), "failed to remove artifact: {e}");
        }
        outcome
    }

    fn report(&self, entry: &FileEntry, outcome: &PatchOutcome) {
        let file = entry.repo_rel.display();
        match outcome {
            PatchOutcome::Created { artifact, bytes } => {
                report::log(format!(
                    "Patch created successfully: {} ({bytes} bytes)",
                    artifact.display()
                ));
            }
            PatchOutcome::Empty => report::log(format!("Patch for {file} is empty, skipped.")),
            PatchOutcome::Failed { reason } => {
                report::error(format!("Failed to create patch for {file}: {reason}"));
            }
        }
    }

    /// Scan the target directory and generate every patch.
    ///
    /// Up to `jobs` files are diffed at once, but outcomes are reported in
    /// scan order so the log does not depend on scheduling.
    pub async fn run(self: Arc<Self>) -> Result<RunSummary, ConfigError> {
        let full_target = self.full_target();
        if !full_target.is_dir() {
            return Err(ConfigError::TargetNotFound(full_target));
        }
        report::log(format!(
            "Scanning {} in {}",
            self.filter.label(),
            self.request.target_dir.display()
        ));

        let scan = self.scan()?;
        let mut summary = RunSummary {
            scanned: scan.entries.len() + scan.filtered,
            filtered: scan.filtered,
            ..Default::default()
        };

        let mut outcomes = stream::iter(scan.entries.into_iter().map(|entry| {
            let generator = Arc::clone(&self);
            async move {
                let worker_entry = entry.clone();
                let outcome =
                    match tokio::task::spawn_blocking(move || generator.generate(&worker_entry))
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(e) => PatchOutcome::Failed {
                            reason: format!("worker failed: {e}"),
                        },
                    };
                (entry, outcome)
            }
        }))
        .buffered(self.jobs);

        while let Some((entry, outcome)) = outcomes.next().await {
            report::log(format!(
                "Creating patch for {} -> {}",
                entry.repo_rel.display(),
                self.layout.artifact_path(&entry).display()
            ));
            self.report(&entry, &outcome);
            summary.record(&outcome);
        }

        Ok(summary)
    }
}

/// Drop `.` components so `target_dir = "."` yields clean relative paths.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
