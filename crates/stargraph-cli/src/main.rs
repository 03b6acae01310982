//! Main entry point for stargraph.

use anyhow::Result;
use clap::Parser;
use stargraph_cli::{app::App, summary};
use stargraph_common::{init_logging, LoggingConfig, RepoTarget};
use stargraph_config::{Config, ConfigLoader};
use std::path::Path;
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "stargraph", author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Repository to chart in owner/name form; may be given multiple times
    #[arg(short, long, value_name = "OWNER/NAME")]
    repo: Vec<RepoTarget>,

    /// Account whose repositories are charted when no --repo is given
    #[arg(short, long)]
    user: Option<String>,

    /// Directory chart files are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Summary file name; pass an empty string to disable the summary
    #[arg(long, value_name = "FILE")]
    summary: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn apply_cli_overrides(config: &mut Config, args: &Args) {
    if let Some(user) = &args.user {
        config.github.user = Some(user.clone());
    }

    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }

    if let Some(file) = &args.summary {
        config.output.summary_file = file.clone();
    }

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    apply_cli_overrides(&mut config, &args);
    config
        .validate_all()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Initialize logging
    init_logging(LoggingConfig {
        level: config.logging.level.clone(),
        json_format: config.logging.json_format,
        ..LoggingConfig::default()
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting stargraph");

    let app = App::new(config.clone())?;
    let run = app.run(&args.repo).await?;

    if !config.output.summary_file.is_empty() {
        let path = Path::new(&config.output.summary_file);
        summary::write_summary(path, &run, &config.output.directory)?;
        info!("Wrote summary to {}", path.display());
    }

    if run.nothing_succeeded() {
        anyhow::bail!("All {} repositories failed", run.failed.len());
    }

    info!(
        "Done: {} charts in {}",
        run.charts.len(),
        config.output.directory
    );
    Ok(())
}
