//! Typed errors for the checks that run before any patch is generated.
//!
//! Per-file diff failures are not errors; they surface as
//! `PatchOutcome::Failed` and never abort a run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The repository path does not exist or is not a directory: {}", .0.display())]
    RepoNotFound(PathBuf),

    #[error("The target directory does not exist or is not a directory: {}", .0.display())]
    TargetNotFound(PathBuf),

    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
