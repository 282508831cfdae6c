use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Extra flags passed to `git diff` ahead of the revisions.
#[derive(Debug, Clone, Default)]
pub struct DiffFlags {
    pub ignore_whitespace: bool,
    pub context_lines: Option<usize>,
}

pub struct GitCli {
    program: String,
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(program: &str, workdir: &Path) -> Self {
        Self {
            program: program.to_string(),
            workdir: workdir.to_path_buf(),
        }
    }

    /// Arguments for `git diff <src> <dst> -- <path>`.
    pub fn diff_args(&self, src: &str, dst: &str, path: &Path, flags: &DiffFlags) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["diff".into()];
        if flags.ignore_whitespace {
            args.push("--ignore-all-space".into());
        }
        if let Some(n) = flags.context_lines {
            args.push(format!("--unified={n}").into());
        }
        args.push(src.into());
        args.push(dst.into());
        args.push("--".into());
        args.push(path.as_os_str().to_owned());
        args
    }

    /// Run the diff for one file with stdout streamed straight into `out`.
    ///
    /// `path` is relative to the working directory. A non-zero exit status
    /// is an error carrying git's stderr.
    pub fn diff_to_file(
        &self,
        src: &str,
        dst: &str,
        path: &Path,
        flags: &DiffFlags,
        out: File,
    ) -> Result<()> {
        let output = Command::new(&self.program)
            .args(self.diff_args(src, dst, path, flags))
            .current_dir(&self.workdir)
            .env("GIT_LITERAL_PATHSPECS", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::from(out))
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to run {} diff", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                anyhow::bail!("git diff failed: {}", output.status);
            }
            anyhow::bail!("git diff failed: {stderr}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_diff_args() {
        let git = GitCli::new("git", Path::new("/repo"));
        let args = git.diff_args("v1", "v2", Path::new("src/a.c"), &DiffFlags::default());
        assert_eq!(args, vec!["diff", "v1", "v2", "--", "src/a.c"]);
    }

    #[test]
    fn test_flagged_diff_args() {
        let git = GitCli::new("git", Path::new("/repo"));
        let flags = DiffFlags {
            ignore_whitespace: true,
            context_lines: Some(0),
        };
        let args = git.diff_args("main", "HEAD", Path::new("a.h"), &flags);
        assert_eq!(
            args,
            vec!["diff", "--ignore-all-space", "--unified=0", "main", "HEAD", "--", "a.h"]
        );
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let out = File::create(dir.path().join("x.patch")).unwrap();
        let git = GitCli::new("mpatch-no-such-git", dir.path());
        let err = git
            .diff_to_file("a", "b", Path::new("x"), &DiffFlags::default(), out)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to run mpatch-no-such-git diff"));
    }
}
