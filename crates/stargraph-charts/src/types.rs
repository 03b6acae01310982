//! Data types for star history aggregation and rendering

use chrono::NaiveDate;
use std::fmt;

/// Display granularity chosen from the aggregation window length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One bucket per calendar day
    Day,
    /// One bucket per 7-day span anchored at the origin date
    Week,
    /// One bucket per calendar month
    Month,
    /// One bucket per calendar year
    Year,
}

impl Granularity {
    /// Axis caption used by the renderer for this granularity
    pub fn axis_caption(&self) -> &'static str {
        match self {
            Granularity::Day => "Date",
            Granularity::Week => "Week",
            Granularity::Month => "Month",
            Granularity::Year => "Year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        };
        write!(f, "{}", name)
    }
}

/// One time bucket of the aggregation window
///
/// `start` and `end` are both inclusive: an event on the last day of the
/// interval belongs to this bucket, not the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSpec {
    /// Display label (`YYYY-MM-DD`, `YYYY-Www`, `YYYY-MM` or `YYYY`)
    pub label: String,
    /// First calendar day covered by the bucket
    pub start: NaiveDate,
    /// Last calendar day covered by the bucket
    pub end: NaiveDate,
}

/// One point of the cumulative output series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    /// Bucket label, or `Now` for the trailing point
    pub label: String,
    /// Events accumulated up to and including this point
    pub cumulative: u64,
}

/// Ordered cumulative series produced by the aggregator
///
/// The first point anchors the chart at the origin date with a count of
/// zero. The last point is always labeled `Now` and carries the exact
/// total event count, even when bucket boundaries would undercount it;
/// cumulative values are non-decreasing across the whole series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarSeries {
    /// Granularity the buckets were generated at
    pub granularity: Granularity,
    /// Chronologically ordered points, origin anchor first, `Now` last
    pub points: Vec<SeriesPoint>,
}

impl StarSeries {
    /// Total event count, as reported by the trailing `Now` point
    pub fn total(&self) -> u64 {
        self.points.last().map(|p| p.cumulative).unwrap_or(0)
    }

    /// Number of points in the series
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Visual styling for rendered charts
#[derive(Debug, Clone)]
pub struct ChartStyle {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Background color as `#RRGGBB`
    pub background_color: String,
    /// Line and point color as `#RRGGBB`
    pub line_color: String,
    /// Area fill color as `#RRGGBB`; drawn at 20% opacity under the line
    pub fill_color: String,
    /// Caption font size
    pub title_font_size: u32,
    /// Axis label font size
    pub label_font_size: u32,
    /// Outer margin in pixels
    pub margin: u32,
    /// Height reserved for the x axis label area
    pub x_label_area: u32,
    /// Width reserved for the y axis label area
    pub y_label_area: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background_color: "#FFFFFF".to_string(),
            line_color: "#4BC0C0".to_string(),
            fill_color: "#4BC0C0".to_string(),
            title_font_size: 24,
            label_font_size: 14,
            margin: 10,
            x_label_area: 40,
            y_label_area: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_captions() {
        assert_eq!(Granularity::Day.axis_caption(), "Date");
        assert_eq!(Granularity::Week.axis_caption(), "Week");
        assert_eq!(Granularity::Month.axis_caption(), "Month");
        assert_eq!(Granularity::Year.axis_caption(), "Year");
    }

    #[test]
    fn test_granularity_display() {
        assert_eq!(Granularity::Day.to_string(), "day");
        assert_eq!(Granularity::Year.to_string(), "year");
    }

    #[test]
    fn test_series_total_reads_last_point() {
        let series = StarSeries {
            granularity: Granularity::Day,
            points: vec![
                SeriesPoint {
                    label: "2024-01-01".to_string(),
                    cumulative: 0,
                },
                SeriesPoint {
                    label: "Now".to_string(),
                    cumulative: 7,
                },
            ],
        };
        assert_eq!(series.total(), 7);
        assert_eq!(series.len(), 2);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_empty_series_total() {
        let series = StarSeries {
            granularity: Granularity::Day,
            points: Vec::new(),
        };
        assert_eq!(series.total(), 0);
        assert!(series.is_empty());
    }

    #[test]
    fn test_default_chart_style() {
        let style = ChartStyle::default();
        assert_eq!(style.width, 800);
        assert_eq!(style.height, 400);
        assert_eq!(style.line_color, "#4BC0C0");
        assert_eq!(style.background_color, "#FFFFFF");
    }
}
