use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::generator::FileEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// `out/<path under target dir>.patch`
    TargetRelative,
    /// `out/<path under repo root>.patch`
    RepoRelative,
}

/// Maps source files to artifact paths under the output base and owns
/// directory creation/removal there.
pub struct PatchLayout {
    output_base: PathBuf,
    mode: LayoutMode,
    // Directories this run created. The lock is held while creating or
    // pruning so a concurrent prune cannot remove a directory between
    // create_dir_all and File::create.
    created_dirs: Mutex<HashSet<PathBuf>>,
}

impl PatchLayout {
    pub fn new(output_base: &Path, mode: LayoutMode) -> Self {
        Self {
            output_base: output_base.to_path_buf(),
            mode,
            created_dirs: Mutex::new(HashSet::new()),
        }
    }

    pub fn artifact_path(&self, entry: &FileEntry) -> PathBuf {
        let rel = match self.mode {
            LayoutMode::TargetRelative => &entry.target_rel,
            LayoutMode::RepoRelative => &entry.repo_rel,
        };
        let mut name = rel.file_name().map(OsString::from).unwrap_or_default();
        name.push(".patch");
        self.output_base.join(rel).with_file_name(name)
    }

    /// Create (or truncate) the artifact, making parent directories first.
    pub fn create_artifact(&self, path: &Path) -> io::Result<File> {
        let mut created = self.created_dirs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = path.parent() {
            let missing: Vec<PathBuf> = parent
                .ancestors()
                .take_while(|d| !d.as_os_str().is_empty() && !d.exists())
                .map(Path::to_path_buf)
                .collect();
            fs::create_dir_all(parent)?;
            created.extend(missing);
        }
        File::create(path)
    }

    /// Delete the artifact if present, then any directories it leaves empty
    /// below the output base. Only directories created by `create_artifact`
    /// are removed; empty directories that existed beforehand stay.
    pub fn discard_artifact(&self, path: &Path) -> io::Result<()> {
        let mut created = self.created_dirs.lock().unwrap_or_else(|e| e.into_inner());
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.output_base || !d.starts_with(&self.output_base) {
                break;
            }
            if !created.contains(d) || fs::remove_dir(d).is_err() {
                break;
            }
            created.remove(d);
            dir = d.parent();
        }
        Ok(())
    }
}
