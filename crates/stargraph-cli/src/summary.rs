//! Markdown summary of a batch run
//!
//! Written into the working directory; chart links are prefixed with the
//! output directory so they resolve from the summary's location, e.g.
//! `images/myrepo_star_chart.png`.

use crate::app::RunSummary;
use stargraph_common::{utils, with_context, Result};
use std::fmt::Write as _;
use std::path::Path;

/// Render the run summary as a Markdown document
pub fn render_summary(summary: &RunSummary, chart_dir: &str) -> String {
    let mut out = String::new();
    out.push_str("# Star History\n\n");
    let _ = writeln!(
        out,
        "Generated {}\n",
        utils::format_timestamp(&summary.generated_at)
    );

    if summary.charts.is_empty() {
        out.push_str("No charts were generated.\n");
    } else {
        out.push_str("| Repository | Stars | Granularity | Chart |\n");
        out.push_str("| --- | ---: | --- | --- |\n");
        for artifact in &summary.charts {
            let _ = writeln!(
                out,
                "| [{target}](https://github.com/{target}) | {stars} | {granularity} | ![{target}]({dir}/{file}) |",
                target = artifact.target,
                stars = artifact.stars,
                granularity = artifact.granularity,
                dir = chart_dir,
                file = artifact.file_name,
            );
        }
    }

    if !summary.skipped.is_empty() {
        out.push_str("\n## Skipped\n\n");
        for skip in &summary.skipped {
            let _ = writeln!(out, "- {}: {}", skip.target, skip.reason);
        }
    }

    if !summary.failed.is_empty() {
        out.push_str("\n## Failed\n\n");
        for failure in &summary.failed {
            let _ = writeln!(out, "- {}: {}", failure.target, failure.reason);
        }
    }

    out
}

/// Write the run summary to the given path
pub fn write_summary(path: &Path, summary: &RunSummary, chart_dir: &str) -> Result<()> {
    let content = render_summary(summary, chart_dir);
    std::fs::write(path, content)
        .map_err(|e| with_context!(e, "Failed to write summary file {}", path.display()))?;
    Ok(())
}
