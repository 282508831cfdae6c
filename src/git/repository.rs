use anyhow::{Context, Result};
use git2::{Oid, Repository};
use std::path::Path;

pub struct RepoCache {
    repo: Repository,
}

impl RepoCache {
    pub fn open(path: &Path) -> Result<Self> {
        let repo =
            Repository::open(path).context("Not a git repository (or not its root directory)")?;
        Ok(Self { repo })
    }

    /// Resolve a revision the way `git diff` would, down to a commit.
    pub fn resolve(&self, rev: &str) -> Result<Oid> {
        let obj = self
            .repo
            .revparse_single(rev)
            .with_context(|| format!("Could not resolve: {rev}"))?;
        let commit = obj
            .peel_to_commit()
            .with_context(|| format!("{rev} does not point to a commit"))?;
        Ok(commit.id())
    }
}

/// Check the repository and both revisions up front.
///
/// Returns one message per problem; nothing here stops the run.
pub fn preflight(repo_path: &Path, src: &str, dst: &str) -> Vec<String> {
    let repo = match RepoCache::open(repo_path) {
        Ok(r) => r,
        Err(e) => return vec![format!("{e:#}")],
    };

    [src, dst]
        .into_iter()
        .filter_map(|rev| repo.resolve(rev).err().map(|e| format!("{e:#}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testutil::FixtureRepo;

    #[test]
    fn test_resolve_tag_and_branch() {
        let fixture = FixtureRepo::new();
        fixture.write("a.c", "int a;\n");
        let first = fixture.commit_and_tag("v1");
        let repo = RepoCache::open(fixture.path()).unwrap();
        assert_eq!(repo.resolve("v1").unwrap(), first);
        assert_eq!(repo.resolve("HEAD").unwrap(), first);
    }

    #[test]
    fn test_preflight_clean() {
        let fixture = FixtureRepo::new();
        fixture.write("a.c", "int a;\n");
        fixture.commit_and_tag("v1");
        fixture.write("a.c", "int b;\n");
        fixture.commit_and_tag("v2");
        assert!(preflight(fixture.path(), "v1", "v2").is_empty());
    }

    #[test]
    fn test_preflight_unknown_revision() {
        let fixture = FixtureRepo::new();
        fixture.write("a.c", "int a;\n");
        fixture.commit_and_tag("v1");
        let problems = preflight(fixture.path(), "v1", "nope");
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("Could not resolve: nope"));
    }

    #[test]
    fn test_preflight_not_a_repo() {
        let dir = tempfile::tempdir().unwrap();
        let problems = preflight(dir.path(), "v1", "v2");
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("Not a git repository"));
    }
}
