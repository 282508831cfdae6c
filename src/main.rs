mod cli;
mod config;
mod error;
mod git;
mod patch;
mod report;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::PatchConfig;
use crate::error::ConfigError;
use crate::patch::{PatchGenerator, PatchRequest};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Print a fatal configuration error and exit with status 1.
fn fail(err: impl std::fmt::Display) -> ! {
    report::error(err);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprint!("{e}");
            fail(
                "Usage: mpatch <repo_path> <target_dir> <commit_id_src> <commit_id_dst> <output_base_dir>",
            );
        }
    };

    let params: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    report::log(format!("Starting patch creation with parameters: {params:?}"));

    if !cli.repo_path.is_dir() {
        fail(ConfigError::RepoNotFound(cli.repo_path));
    }

    // Merge CLI flags with config-file settings (CLI wins)
    let config = PatchConfig::resolve(&config::load_config(), &cli);

    for problem in git::preflight(&cli.repo_path, &cli.commit_id_src, &cli.commit_id_dst) {
        report::log(format!("warning: {problem}"));
    }

    if let Err(source) = std::fs::create_dir_all(&cli.output_base_dir) {
        fail(ConfigError::OutputDir {
            path: cli.output_base_dir,
            source,
        });
    }

    let request = PatchRequest {
        repo_root: cli.repo_path,
        target_dir: cli.target_dir,
        src: cli.commit_id_src,
        dst: cli.commit_id_dst,
        output_base: cli.output_base_dir,
    };
    let generator = Arc::new(PatchGenerator::new(request, &config));

    // A missing target directory aborts the scan but not the process.
    match generator.run().await {
        Ok(summary) => report::log(summary),
        Err(e) => report::error(e),
    }

    Ok(())
}
