use git2::{Commit, IndexAddOption, Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Throwaway repository for tests, committed through git2.
pub struct FixtureRepo {
    dir: TempDir,
    repo: Repository,
}

impl FixtureRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Point `rel` at `target`, replacing any existing link.
    #[cfg(unix)]
    pub fn symlink(&self, rel: &str, target: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let _ = fs::remove_file(&path);
        std::os::unix::fs::symlink(target, path).unwrap();
    }

    /// Stage everything in the worktree, commit it, and tag the commit.
    pub fn commit_and_tag(&self, tag: &str) -> Oid {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::now("mpatch", "mpatch@example.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, tag, &tree, &parents)
            .unwrap();

        let obj = self.repo.find_object(oid, None).unwrap();
        self.repo.tag_lightweight(tag, &obj, false).unwrap();
        oid
    }
}
