//! Chart rendering to PNG files
//!
//! `StarHistoryChart` pairs a cumulative series with a title and knows how
//! to project itself onto plot coordinates; `ChartRenderer` is the trait
//! the application drives, with `PngRenderer` as the plotters-backed
//! implementation.

use crate::types::{ChartStyle, StarSeries};
use async_trait::async_trait;
use plotters::prelude::*;
use stargraph_common::{Result, StarGraphError};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Upper bound on x-axis tick labels so long series stay readable
const MAX_X_TICKS: usize = 16;

/// A renderable star history chart for one repository
#[derive(Debug, Clone)]
pub struct StarHistoryChart {
    title: String,
    series: StarSeries,
}

impl StarHistoryChart {
    /// Create a chart from a title and an aggregated series
    pub fn new(title: impl Into<String>, series: StarSeries) -> Self {
        Self {
            title: title.into(),
            series,
        }
    }

    /// Chart title drawn as the caption
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The aggregated series backing this chart
    pub fn series(&self) -> &StarSeries {
        &self.series
    }

    /// Project series points onto (index, cumulative) plot coordinates
    fn plot_data(&self) -> Vec<(f64, f64)> {
        self.series
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| (i as f64, point.cumulative as f64))
            .collect()
    }

    /// Y-axis upper bound: 10% headroom over the peak, never below 1
    ///
    /// The floor keeps the axis well-formed for all-zero series.
    fn y_axis_max(&self) -> f64 {
        let max = self
            .series
            .points
            .iter()
            .map(|p| p.cumulative)
            .max()
            .unwrap_or(0) as f64;
        (max * 1.1).max(1.0)
    }
}

/// Trait for rendering star history charts to image files
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Render the chart to the given path
    async fn render_to_file(
        &self,
        chart: &StarHistoryChart,
        style: &ChartStyle,
        output_path: &Path,
    ) -> Result<()>;

    /// Parse a `#RRGGBB` hex color, falling back to black on bad input
    fn parse_color(&self, color: &str) -> RGBColor {
        let hex = color.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return RGBColor(r, g, b);
            }
        }
        BLACK
    }
}

/// Plotters-backed renderer producing PNG files
#[derive(Debug, Default, Clone)]
pub struct PngRenderer;

impl PngRenderer {
    /// Create a new PNG renderer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChartRenderer for PngRenderer {
    #[instrument(skip(self, chart, style), fields(title = %chart.title))]
    async fn render_to_file(
        &self,
        chart: &StarHistoryChart,
        style: &ChartStyle,
        output_path: &Path,
    ) -> Result<()> {
        let data = chart.plot_data();
        if data.is_empty() {
            return Err(StarGraphError::chart(
                "Cannot render a chart with no data points",
            ));
        }

        debug!(
            "Rendering {} points at {}x{}",
            data.len(),
            style.width,
            style.height
        );

        let background = self.parse_color(&style.background_color);
        let line = self.parse_color(&style.line_color);
        let fill = self.parse_color(&style.fill_color);

        let labels: Vec<String> = chart
            .series
            .points
            .iter()
            .map(|p| p.label.clone())
            .collect();
        let max_x = (data.len() - 1).max(1) as f64;
        let max_y = chart.y_axis_max();

        let root = BitMapBackend::new(output_path, (style.width, style.height))
            .into_drawing_area();
        root.fill(&background)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", style.title_font_size))
            .margin(style.margin)
            .x_label_area_size(style.x_label_area)
            .y_label_area_size(style.y_label_area)
            .build_cartesian_2d(0f64..max_x, 0f64..max_y)?;

        ctx.configure_mesh()
            .x_desc(chart.series.granularity.axis_caption())
            .y_desc("Stars")
            .x_labels(labels.len().min(MAX_X_TICKS))
            .x_label_formatter(&|x| {
                let idx = x.round() as usize;
                labels.get(idx).cloned().unwrap_or_default()
            })
            .label_style(("sans-serif", style.label_font_size))
            .draw()?;

        ctx.draw_series(AreaSeries::new(data.iter().copied(), 0.0, fill.mix(0.2)))?;
        ctx.draw_series(LineSeries::new(
            data.iter().copied(),
            line.stroke_width(2),
        ))?;
        ctx.draw_series(
            data.iter()
                .map(|&point| Circle::new(point, 3, line.filled())),
        )?;

        root.present()?;

        info!(
            "Rendered {} point chart to {}",
            data.len(),
            output_path.display()
        );
        Ok(())
    }
}
