//! Adaptive temporal bucketing and cumulative series construction
//!
//! The heart of stargraph. Given one repository's star timestamps, its
//! creation time and a single reference time, this module picks a display
//! granularity from the window length, partitions the window into calendar
//! buckets, counts events per bucket, and folds the counts into a
//! monotonically non-decreasing cumulative series ready for rendering.
//!
//! Everything here is pure and synchronous; all I/O lives in the client
//! and renderer crates.

use crate::types::{BucketSpec, Granularity, SeriesPoint, StarSeries};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use stargraph_common::{Result, StarGraphError};
use tracing::{debug, instrument};

const SECS_PER_DAY: i64 = 86_400;

/// Windows shorter than this many days render one bucket per day
const WEEK_THRESHOLD_DAYS: u64 = 30;
/// Windows shorter than this many days render one bucket per 7-day span
const MONTH_THRESHOLD_DAYS: u64 = 180;
/// Windows shorter than this many days render one bucket per calendar
/// month; anything longer gets one bucket per calendar year
const YEAR_THRESHOLD_DAYS: u64 = 1000;

/// Number of whole days spanned by `[origin, now]`, rounded up
///
/// Fails with `InvalidWindow` when the reference time precedes the origin,
/// checked on the raw timestamps so even a sub-day inversion is rejected
/// instead of rounding up to an empty span.
pub fn elapsed_days(origin: DateTime<Utc>, now: DateTime<Utc>) -> Result<u64> {
    if now < origin {
        return Err(StarGraphError::invalid_window(origin, now));
    }
    let secs = (now - origin).num_seconds();
    Ok(((secs + SECS_PER_DAY - 1) / SECS_PER_DAY) as u64)
}

/// Choose the display granularity for a window of `elapsed` whole days
///
/// A pure step function over the window length; event density plays no
/// part. The thresholds keep the axis to a bounded number of ticks
/// regardless of repository age: at most 30 day ticks, 26 week ticks or
/// 33 month ticks before switching to years.
pub fn select_granularity(elapsed: u64) -> Granularity {
    if elapsed < WEEK_THRESHOLD_DAYS {
        Granularity::Day
    } else if elapsed < MONTH_THRESHOLD_DAYS {
        Granularity::Week
    } else if elapsed < YEAR_THRESHOLD_DAYS {
        Granularity::Month
    } else {
        Granularity::Year
    }
}

/// Generate the ordered bucket covering of `[origin, now]`
///
/// A pure function of its inputs. Buckets are contiguous, non-overlapping
/// and cover every calendar day of the window; the last week bucket may
/// extend past `now` so the reference day is never left uncovered.
pub fn build_buckets(
    origin: DateTime<Utc>,
    now: DateTime<Utc>,
    granularity: Granularity,
) -> Vec<BucketSpec> {
    let first = origin.date_naive();
    let last = now.date_naive();

    match granularity {
        Granularity::Day => first
            .iter_days()
            .take_while(|day| *day <= last)
            .map(|day| BucketSpec {
                label: day.format("%Y-%m-%d").to_string(),
                start: day,
                end: day,
            })
            .collect(),

        Granularity::Week => {
            // 7-day spans anchored at the origin, not at ISO week starts;
            // the label still names the ISO week of each span's first day
            let mut buckets = Vec::new();
            let mut start = first;
            while start <= last {
                buckets.push(BucketSpec {
                    label: iso_week_label(start),
                    start,
                    end: start + Days::new(6),
                });
                start = start + Days::new(7);
            }
            buckets
        }

        Granularity::Month => {
            let month_count = (last.year() - first.year()) * 12
                + (last.month() as i32 - first.month() as i32)
                + 1;
            let mut buckets = Vec::with_capacity(month_count.max(0) as usize);
            // The 1st exists in every month, so the fallback never fires
            let mut cursor = first.with_day(1).unwrap_or(first);
            for _ in 0..month_count {
                let next = cursor + Months::new(1);
                buckets.push(BucketSpec {
                    label: cursor.format("%Y-%m").to_string(),
                    start: cursor,
                    end: next - Days::new(1),
                });
                cursor = next;
            }
            buckets
        }

        Granularity::Year => (first.year()..=last.year())
            .filter_map(|year| {
                let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
                let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
                Some(BucketSpec {
                    label: year.to_string(),
                    start,
                    end,
                })
            })
            .collect(),
    }
}

/// ISO-8601 week label (`YYYY-Www`) for the week containing `date`
///
/// The ISO week year can differ from the calendar year near January 1st;
/// 2021-01-01 for example belongs to 2020-W53.
fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Count events per bucket using calendar-aware membership
///
/// Day buckets match on the exact date and week buckets on inclusive
/// interval membership; month and year buckets match on the calendar unit.
/// O(buckets x events), which stays trivial at the bucket counts the
/// thresholds allow.
pub fn count_per_bucket(
    events: &[DateTime<Utc>],
    buckets: &[BucketSpec],
    granularity: Granularity,
) -> Vec<u64> {
    buckets
        .iter()
        .map(|bucket| {
            events
                .iter()
                .filter(|ts| bucket_contains(bucket, granularity, ts.date_naive()))
                .count() as u64
        })
        .collect()
}

fn bucket_contains(bucket: &BucketSpec, granularity: Granularity, date: NaiveDate) -> bool {
    match granularity {
        Granularity::Day => date == bucket.start,
        Granularity::Week => date >= bucket.start && date <= bucket.end,
        Granularity::Month => {
            date.year() == bucket.start.year() && date.month() == bucket.start.month()
        }
        Granularity::Year => date.year() == bucket.start.year(),
    }
}

/// Fold per-bucket counts into the cumulative output series
///
/// Prepends a zero-valued anchor labeled with the origin date, running-sums
/// the bucket counts, then appends the `Now` point carrying
/// `total_event_count` verbatim, so an event falling outside the generated
/// bucket range still reaches the chart instead of being silently dropped.
/// As long as `total_event_count` is the length of the event list the
/// counts were taken from, the series stays non-decreasing.
pub fn to_cumulative_series(
    origin: DateTime<Utc>,
    granularity: Granularity,
    buckets: &[BucketSpec],
    counts: &[u64],
    total_event_count: u64,
) -> StarSeries {
    let mut points = Vec::with_capacity(buckets.len() + 2);

    points.push(SeriesPoint {
        label: origin.date_naive().format("%Y-%m-%d").to_string(),
        cumulative: 0,
    });

    let mut running = 0u64;
    for (bucket, count) in buckets.iter().zip(counts) {
        running += count;
        points.push(SeriesPoint {
            label: bucket.label.clone(),
            cumulative: running,
        });
    }

    points.push(SeriesPoint {
        label: "Now".to_string(),
        cumulative: total_event_count,
    });

    StarSeries {
        granularity,
        points,
    }
}

/// Star history aggregator with a single captured reference time
///
/// One instance is built per run and reused for every repository, so all
/// charts in a batch share the same upper window bound even when the run
/// crosses midnight.
#[derive(Debug, Clone, Copy)]
pub struct StarHistoryAggregator {
    now: DateTime<Utc>,
}

impl StarHistoryAggregator {
    /// Create an aggregator pinned to the given reference time
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Create an aggregator pinned to the current time
    pub fn at_current_time() -> Self {
        Self::new(Utc::now())
    }

    /// The reference time every aggregation through this instance uses
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.now
    }

    /// Run the full pipeline for one repository's events
    ///
    /// Either returns a complete series satisfying every invariant or
    /// fails outright; a malformed series is never partially emitted.
    #[instrument(skip(self, events), fields(event_count = events.len()))]
    pub fn aggregate(&self, events: &[DateTime<Utc>], origin: DateTime<Utc>) -> Result<StarSeries> {
        let elapsed = elapsed_days(origin, self.now)?;
        let granularity = select_granularity(elapsed);
        let buckets = build_buckets(origin, self.now, granularity);
        if buckets.is_empty() {
            return Err(StarGraphError::empty_window(origin, self.now));
        }

        let counts = count_per_bucket(events, &buckets, granularity);
        debug!(
            "Partitioned {} events into {} {} buckets over {} days",
            events.len(),
            buckets.len(),
            granularity,
            elapsed
        );

        Ok(to_cumulative_series(
            origin,
            granularity,
            &buckets,
            &counts,
            events.len() as u64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn ts_at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    // ------------------------------------------------------------------
    // elapsed_days
    // ------------------------------------------------------------------

    #[test]
    fn test_elapsed_days_zero_for_identical_instants() {
        let t = ts(2024, 6, 1);
        assert_eq!(elapsed_days(t, t).unwrap(), 0);
    }

    #[test]
    fn test_elapsed_days_rounds_up() {
        let origin = ts(2024, 1, 1);
        assert_eq!(elapsed_days(origin, ts_at(2024, 1, 1, 0, 0, 1)).unwrap(), 1);
        assert_eq!(elapsed_days(origin, ts(2024, 1, 15)).unwrap(), 14);
        assert_eq!(
            elapsed_days(origin, ts_at(2024, 1, 15, 0, 0, 1)).unwrap(),
            15
        );
    }

    #[test]
    fn test_elapsed_days_rejects_inverted_window() {
        let origin = ts(2024, 6, 1);
        let now = ts(2024, 1, 1);
        let err = elapsed_days(origin, now).unwrap_err();
        assert!(matches!(err, StarGraphError::InvalidWindow { .. }));

        // Even a sub-day inversion is rejected, not rounded away
        let err = elapsed_days(ts_at(2024, 6, 1, 12, 0, 0), ts_at(2024, 6, 1, 11, 0, 0))
            .unwrap_err();
        assert!(matches!(err, StarGraphError::InvalidWindow { .. }));
    }

    // ------------------------------------------------------------------
    // select_granularity
    // ------------------------------------------------------------------

    #[test]
    fn test_granularity_thresholds() {
        assert_eq!(select_granularity(0), Granularity::Day);
        assert_eq!(select_granularity(29), Granularity::Day);
        assert_eq!(select_granularity(30), Granularity::Week);
        assert_eq!(select_granularity(179), Granularity::Week);
        assert_eq!(select_granularity(180), Granularity::Month);
        assert_eq!(select_granularity(999), Granularity::Month);
        assert_eq!(select_granularity(1000), Granularity::Year);
        assert_eq!(select_granularity(100_000), Granularity::Year);
    }

    #[test]
    fn test_granularity_is_a_step_function() {
        for elapsed in 0..=1100u64 {
            let expected = match elapsed {
                0..=29 => Granularity::Day,
                30..=179 => Granularity::Week,
                180..=999 => Granularity::Month,
                _ => Granularity::Year,
            };
            assert_eq!(select_granularity(elapsed), expected, "at {}", elapsed);
        }
    }

    // ------------------------------------------------------------------
    // build_buckets
    // ------------------------------------------------------------------

    #[test]
    fn test_day_buckets_cover_every_date_inclusive() {
        let buckets = build_buckets(ts(2024, 1, 1), ts(2024, 1, 15), Granularity::Day);
        assert_eq!(buckets.len(), 15);
        assert_eq!(buckets[0].label, "2024-01-01");
        assert_eq!(buckets[14].label, "2024-01-15");
        assert_eq!(buckets[4].start, date(2024, 1, 5));
        assert_eq!(buckets[4].end, date(2024, 1, 5));
    }

    #[test]
    fn test_single_day_bucket_for_same_day_window() {
        // A repository created earlier the same day still gets one bucket
        let buckets = build_buckets(
            ts_at(2024, 6, 5, 8, 0, 0),
            ts_at(2024, 6, 5, 17, 30, 0),
            Granularity::Day,
        );
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "2024-06-05");
    }

    #[test]
    fn test_week_buckets_are_anchored_at_origin() {
        let buckets = build_buckets(ts(2024, 1, 1), ts(2024, 3, 1), Granularity::Week);
        // Spans start every 7 days from the origin date
        assert_eq!(buckets.len(), 9);
        assert_eq!(buckets[0].start, date(2024, 1, 1));
        assert_eq!(buckets[0].end, date(2024, 1, 7));
        assert_eq!(buckets[1].start, date(2024, 1, 8));
        assert_eq!(buckets[8].start, date(2024, 2, 26));
        // The last span reaches past the reference day, never short of it
        assert!(buckets[8].end >= date(2024, 3, 1));
    }

    #[test]
    fn test_week_buckets_cover_whole_window() {
        let origin = ts(2024, 1, 3);
        let now = ts(2024, 4, 20);
        let buckets = build_buckets(origin, now, Granularity::Week);

        let mut day = origin.date_naive();
        let last = now.date_naive();
        while day <= last {
            let covering = buckets
                .iter()
                .filter(|b| day >= b.start && day <= b.end)
                .count();
            assert_eq!(covering, 1, "day {} covered by {} buckets", day, covering);
            day = day + Days::new(1);
        }
    }

    #[test]
    fn test_week_labels_use_iso_weeks() {
        let buckets = build_buckets(ts(2024, 1, 1), ts(2024, 2, 15), Granularity::Week);
        // 2024-01-01 is the Monday of ISO week 1
        assert_eq!(buckets[0].label, "2024-W01");
        assert_eq!(buckets[1].label, "2024-W02");
    }

    #[test]
    fn test_iso_week_label_year_boundary() {
        // 2021-01-01 is a Friday and belongs to the previous ISO week year
        assert_eq!(iso_week_label(date(2021, 1, 1)), "2020-W53");
        // 2021-01-04 is the first Monday of 2021
        assert_eq!(iso_week_label(date(2021, 1, 4)), "2021-W01");
    }

    #[test]
    fn test_month_buckets_follow_calendar_months() {
        let buckets = build_buckets(ts(2023, 11, 15), ts(2024, 2, 3), Granularity::Month);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2023-11", "2023-12", "2024-01", "2024-02"]);

        assert_eq!(buckets[0].start, date(2023, 11, 1));
        assert_eq!(buckets[0].end, date(2023, 11, 30));
        // Leap year February
        assert_eq!(buckets[3].end, date(2024, 2, 29));
    }

    #[test]
    fn test_year_buckets_inclusive_of_both_endpoint_years() {
        let buckets = build_buckets(ts(2020, 1, 1), ts(2024, 1, 1), Granularity::Year);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2020", "2021", "2022", "2023", "2024"]);
        assert_eq!(buckets[0].start, date(2020, 1, 1));
        assert_eq!(buckets[0].end, date(2020, 12, 31));
    }

    // ------------------------------------------------------------------
    // count_per_bucket
    // ------------------------------------------------------------------

    #[test]
    fn test_day_counting_matches_exact_dates() {
        let buckets = build_buckets(ts(2024, 1, 1), ts(2024, 1, 10), Granularity::Day);
        let events = vec![
            ts_at(2024, 1, 5, 9, 30, 0),
            ts_at(2024, 1, 5, 23, 59, 59),
            ts_at(2024, 1, 8, 0, 0, 0),
        ];
        let counts = count_per_bucket(&events, &buckets, Granularity::Day);
        assert_eq!(counts[4], 2);
        assert_eq!(counts[7], 1);
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_week_counting_is_end_inclusive() {
        let buckets = build_buckets(ts(2024, 1, 1), ts(2024, 3, 1), Granularity::Week);
        // Last instant of the first span belongs to it, not the next
        let events = vec![ts_at(2024, 1, 7, 23, 0, 0), ts(2024, 1, 8)];
        let counts = count_per_bucket(&events, &buckets, Granularity::Week);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[1], 1);
    }

    #[test]
    fn test_month_counting_matches_calendar_unit() {
        let buckets = build_buckets(ts(2023, 11, 1), ts(2024, 4, 1), Granularity::Month);
        let events = vec![
            ts(2023, 11, 1),
            ts_at(2023, 11, 30, 23, 59, 59),
            ts(2024, 2, 29),
        ];
        let counts = count_per_bucket(&events, &buckets, Granularity::Month);
        assert_eq!(counts[0], 2);
        assert_eq!(counts[3], 1);
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let origin = ts(2024, 1, 1);
        let now = ts(2024, 5, 20);
        let granularity = select_granularity(elapsed_days(origin, now).unwrap());
        assert_eq!(granularity, Granularity::Week);

        let in_window = vec![
            ts(2024, 1, 1),
            ts_at(2024, 1, 7, 12, 0, 0),
            ts(2024, 2, 14),
            ts(2024, 3, 31),
            ts_at(2024, 5, 19, 23, 59, 59),
            ts(2024, 5, 20),
        ];
        let mut events = in_window.clone();
        events.push(ts(2023, 12, 31)); // before origin, outside every bucket

        let buckets = build_buckets(origin, now, granularity);
        let counts = count_per_bucket(&events, &buckets, granularity);
        assert_eq!(counts.iter().sum::<u64>(), in_window.len() as u64);
    }

    // ------------------------------------------------------------------
    // to_cumulative_series
    // ------------------------------------------------------------------

    #[test]
    fn test_series_starts_at_zero_and_accumulates() {
        let origin = ts(2024, 1, 1);
        let buckets = build_buckets(origin, ts(2024, 1, 5), Granularity::Day);
        let counts = vec![1, 0, 2, 0, 1];
        let series = to_cumulative_series(origin, Granularity::Day, &buckets, &counts, 4);

        assert_eq!(series.points[0].label, "2024-01-01");
        assert_eq!(series.points[0].cumulative, 0);
        let values: Vec<u64> = series.points.iter().map(|p| p.cumulative).collect();
        assert_eq!(values, [0, 1, 1, 3, 3, 4, 4]);
        assert_eq!(series.points.last().unwrap().label, "Now");
    }

    #[test]
    fn test_trailing_point_overrides_bucket_sum() {
        // An event recorded before the repository origin never lands in a
        // bucket, but the exact total still reaches the chart
        let origin = ts(2024, 1, 10);
        let now = ts(2024, 1, 20);
        let events = vec![ts(2024, 1, 5), ts(2024, 1, 12), ts(2024, 1, 12)];

        let series = StarHistoryAggregator::new(now)
            .aggregate(&events, origin)
            .unwrap();

        let bucket_total = series.points[series.len() - 2].cumulative;
        assert_eq!(bucket_total, 2);
        assert_eq!(series.total(), 3);
        assert_eq!(series.points.last().unwrap().label, "Now");
    }

    // ------------------------------------------------------------------
    // Full pipeline
    // ------------------------------------------------------------------

    fn assert_non_decreasing(series: &StarSeries) {
        for pair in series.points.windows(2) {
            assert!(
                pair[1].cumulative >= pair[0].cumulative,
                "series decreased between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_two_week_old_repository_charts_by_day() {
        let origin = ts(2024, 1, 1);
        let now = ts(2024, 1, 15);
        let events = vec![
            ts_at(2024, 1, 5, 10, 0, 0),
            ts_at(2024, 1, 5, 11, 0, 0),
            ts(2024, 1, 10),
        ];

        let series = StarHistoryAggregator::new(now)
            .aggregate(&events, origin)
            .unwrap();

        assert_eq!(series.granularity, Granularity::Day);
        // Origin anchor + 15 day buckets + trailing point
        assert_eq!(series.len(), 17);
        assert_eq!(series.points[0].label, "2024-01-01");
        assert_eq!(series.points[0].cumulative, 0);

        let by_label = |label: &str| {
            series
                .points
                .iter()
                .rev()
                .find(|p| p.label == label)
                .map(|p| p.cumulative)
                .unwrap()
        };
        assert_eq!(by_label("2024-01-05"), 2);
        assert_eq!(by_label("2024-01-10"), 3);
        assert_eq!(by_label("Now"), 3);
        assert_non_decreasing(&series);
    }

    #[test]
    fn test_four_year_old_repository_charts_by_year() {
        let origin = ts(2020, 1, 1);
        let now = ts(2024, 1, 1);
        assert_eq!(elapsed_days(origin, now).unwrap(), 1461);

        let events = vec![ts(2020, 6, 1), ts(2021, 6, 1), ts(2023, 6, 1)];
        let series = StarHistoryAggregator::new(now)
            .aggregate(&events, origin)
            .unwrap();

        assert_eq!(series.granularity, Granularity::Year);
        // Origin anchor + 5 year buckets + trailing point
        assert_eq!(series.len(), 7);
        assert_eq!(series.total(), 3);
        assert_non_decreasing(&series);
    }

    #[test]
    fn test_zero_events_yield_an_all_zero_series() {
        let series = StarHistoryAggregator::new(ts(2024, 3, 1))
            .aggregate(&[], ts(2024, 1, 1))
            .unwrap();

        assert!(series.points.iter().all(|p| p.cumulative == 0));
        assert_eq!(series.total(), 0);
    }

    #[test]
    fn test_zero_length_window_still_produces_one_bucket() {
        let origin = ts(2024, 6, 5);
        let series = StarHistoryAggregator::new(origin)
            .aggregate(&[], origin)
            .unwrap();

        assert_eq!(series.granularity, Granularity::Day);
        // Origin anchor + one bucket for the creation day + trailing point
        assert_eq!(series.len(), 3);
        assert_eq!(series.points[1].label, "2024-06-05");
        assert_eq!(series.total(), 0);
    }

    #[test]
    fn test_inverted_window_is_rejected_before_bucketing() {
        let result = StarHistoryAggregator::new(ts(2024, 1, 1))
            .aggregate(&[], ts(2024, 6, 1));
        assert!(matches!(
            result,
            Err(StarGraphError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_reference_time_is_fixed_per_aggregator() {
        let now = ts(2024, 2, 1);
        let aggregator = StarHistoryAggregator::new(now);
        assert_eq!(aggregator.reference_time(), now);

        // Two aggregations against the same instance agree on the window
        let a = aggregator.aggregate(&[], ts(2024, 1, 1)).unwrap();
        let b = aggregator.aggregate(&[], ts(2024, 1, 1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_month_window_series() {
        // 240 elapsed days selects month buckets
        let origin = ts_at(2023, 9, 10, 14, 0, 0);
        let now = ts_at(2024, 5, 7, 9, 0, 0);
        let events = vec![ts(2023, 9, 30), ts(2023, 10, 1), ts(2024, 5, 7)];

        let series = StarHistoryAggregator::new(now)
            .aggregate(&events, origin)
            .unwrap();

        assert_eq!(series.granularity, Granularity::Month);
        // Anchor + 9 months (2023-09 through 2024-05) + trailing point
        assert_eq!(series.len(), 11);
        assert_eq!(series.points[1].label, "2023-09");
        assert_eq!(series.points[1].cumulative, 1);
        assert_eq!(series.total(), 3);
        assert_non_decreasing(&series);
    }
}
