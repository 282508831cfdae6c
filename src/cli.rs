use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mpatch",
    version,
    about = "Generate one git patch per file between two revisions"
)]
pub struct Cli {
    /// Root of the git repository
    pub repo_path: PathBuf,

    /// Directory to scan, relative to the repository root
    pub target_dir: PathBuf,

    /// Source revision (commit, branch, or tag)
    pub commit_id_src: String,

    /// Destination revision (commit, branch, or tag)
    pub commit_id_dst: String,

    /// Directory the patch tree is written into
    pub output_base_dir: PathBuf,

    /// Patch every file instead of only matching extensions
    #[arg(long)]
    pub all: bool,

    /// Extension to include (repeatable, replaces the default c/h set)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Mirror paths relative to the repository root instead of the target dir
    #[arg(long)]
    pub mirror_repo: bool,

    /// Number of files diffed concurrently
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Ignore whitespace changes
    #[arg(short = 'w', long = "ignore-ws")]
    pub ignore_whitespace: bool,

    /// Lines of context around each hunk
    #[arg(short = 'U', long = "context", value_name = "N")]
    pub context_lines: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_positionals() {
        let cli = Cli::try_parse_from(["mpatch", "repo", "src", "v1", "v2", "out"]).unwrap();
        assert_eq!(cli.repo_path, PathBuf::from("repo"));
        assert_eq!(cli.target_dir, PathBuf::from("src"));
        assert_eq!(cli.commit_id_src, "v1");
        assert_eq!(cli.commit_id_dst, "v2");
        assert_eq!(cli.output_base_dir, PathBuf::from("out"));
        assert!(!cli.all);
        assert!(cli.extensions.is_empty());
        assert_eq!(cli.jobs, None);
    }

    #[test]
    fn test_wrong_arg_count() {
        assert!(Cli::try_parse_from(["mpatch", "repo", "src", "v1", "v2"]).is_err());
        assert!(Cli::try_parse_from(["mpatch", "repo", "src", "v1", "v2", "out", "x"]).is_err());
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "mpatch", "--ext", "rs", "--ext", ".toml", "-j", "4", "-w", "-U", "5", "repo",
            "src", "v1", "v2", "out",
        ])
        .unwrap();
        assert_eq!(cli.extensions, vec!["rs", ".toml"]);
        assert_eq!(cli.jobs, Some(4));
        assert!(cli.ignore_whitespace);
        assert_eq!(cli.context_lines, Some(5));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["mpatch", "-j", "0", "r", "t", "a", "b", "o"]).is_err());
    }
}
