//! Application orchestration
//!
//! `App` owns the GitHub client, the renderer and the loaded configuration,
//! and drives the per-repository pipeline: fetch metadata and stargazers,
//! aggregate into a cumulative series, render the chart. Repositories are
//! processed sequentially; one failing repository never aborts the batch.

use chrono::{DateTime, Utc};
use stargraph_charts::{
    ChartRenderer, ChartStyle, Granularity, PngRenderer, StarHistoryAggregator, StarHistoryChart,
};
use stargraph_common::{utils, GithubClient, Repo, RepoTarget, Result, StarGraphError};
use stargraph_config::Config;
use std::path::Path;
use tracing::{info, instrument, warn};

/// One successfully rendered chart
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    /// Repository the chart belongs to
    pub target: RepoTarget,
    /// Star total at the reference time
    pub stars: u64,
    /// Granularity the window was bucketed at
    pub granularity: Granularity,
    /// PNG file name inside the output directory
    pub file_name: String,
}

/// A repository that produced no chart, with the reason
#[derive(Debug, Clone)]
pub struct SkippedRepo {
    /// Repository that was skipped
    pub target: RepoTarget,
    /// Human readable reason
    pub reason: String,
}

/// Outcome of one batch run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Reference time shared by every chart in the batch
    pub generated_at: DateTime<Utc>,
    /// Charts that were rendered
    pub charts: Vec<ChartArtifact>,
    /// Repositories skipped because they have no stars yet
    pub skipped: Vec<SkippedRepo>,
    /// Repositories that failed with an error
    pub failed: Vec<SkippedRepo>,
}

impl RunSummary {
    /// True when every attempted repository failed
    pub fn nothing_succeeded(&self) -> bool {
        self.charts.is_empty() && !self.failed.is_empty()
    }
}

/// The stargraph application
pub struct App {
    config: Config,
    client: GithubClient,
    renderer: PngRenderer,
    style: ChartStyle,
}

impl App {
    /// Build the application from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = GithubClient::new(config.github.client_config())?;
        if !client.metrics().authenticated {
            warn!("No GitHub token configured; unauthenticated requests are heavily rate limited");
        }
        let style = chart_style(&config);
        Ok(Self {
            config,
            client,
            renderer: PngRenderer::new(),
            style,
        })
    }

    /// The repositories this run will chart
    ///
    /// Explicit targets win; without them the configured account's
    /// repositories are listed from the API.
    pub async fn resolve_targets(&self, explicit: &[RepoTarget]) -> Result<Vec<RepoTarget>> {
        if !explicit.is_empty() {
            return Ok(explicit.to_vec());
        }

        match &self.config.github.user {
            Some(user) => {
                let repos = self.client.list_user_repos(user).await?;
                repos.iter().map(Repo::target).collect()
            }
            None => Err(StarGraphError::config(
                "No repositories specified: pass --repo or configure github.user",
            )),
        }
    }

    /// Run the batch: one chart per repository, skip-and-continue on errors
    pub async fn run(&self, explicit: &[RepoTarget]) -> Result<RunSummary> {
        let targets = self.resolve_targets(explicit).await?;
        std::fs::create_dir_all(&self.config.output.directory)?;

        // One reference time for the whole batch, so charts generated in
        // the same run agree on their window even across midnight
        let aggregator = StarHistoryAggregator::at_current_time();
        info!(
            "Charting {} repositories as of {}",
            targets.len(),
            utils::format_timestamp(&aggregator.reference_time())
        );

        let mut summary = RunSummary {
            generated_at: aggregator.reference_time(),
            charts: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        };

        for target in targets {
            match self.process_repository(&aggregator, &target).await {
                Ok(Some(artifact)) => summary.charts.push(artifact),
                Ok(None) => summary.skipped.push(SkippedRepo {
                    target,
                    reason: "no stars yet".to_string(),
                }),
                Err(e) => {
                    warn!("Skipping {}: {}", target, e);
                    summary.failed.push(SkippedRepo {
                        target,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Generated {} charts ({} without stars, {} failed)",
            summary.charts.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    #[instrument(skip(self, aggregator), fields(repo = %target))]
    async fn process_repository(
        &self,
        aggregator: &StarHistoryAggregator,
        target: &RepoTarget,
    ) -> Result<Option<ChartArtifact>> {
        let repo = self.client.get_repo(target).await?;
        if repo.stargazers_count == 0 {
            info!("{} has no stars yet, skipping chart", repo.full_name);
            return Ok(None);
        }

        let events = self.client.fetch_stargazers(target).await?;
        let series = aggregator.aggregate(&events, repo.created_at)?;
        let granularity = series.granularity;
        let stars = series.total();

        let file_name = utils::chart_file_name(&repo.name);
        let output_path = Path::new(&self.config.output.directory).join(&file_name);
        let chart = StarHistoryChart::new(format!("{} Star History", repo.full_name), series);
        self.renderer
            .render_to_file(&chart, &self.style, &output_path)
            .await?;

        Ok(Some(ChartArtifact {
            target: target.clone(),
            stars,
            granularity,
            file_name,
        }))
    }
}

fn chart_style(config: &Config) -> ChartStyle {
    ChartStyle {
        width: config.chart.width,
        height: config.chart.height,
        background_color: config.chart.background_color.clone(),
        line_color: config.chart.line_color.clone(),
        fill_color: config.chart.fill_color.clone(),
        title_font_size: config.chart.title_font_size,
        label_font_size: config.chart.label_font_size,
        ..ChartStyle::default()
    }
}
