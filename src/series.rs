//! Timestamped series covering a single representative year.
//!
//! Every hourly series used by the model lives on the same [`HourlyGrid`]: the 8760 hours of the
//! representative year, with 29 February removed if the year is a leap year. Series are merged
//! by exact timestamp match.
use anyhow::{Context, Result, bail, ensure};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use indexmap::IndexMap;
use log::{debug, warn};
use serde_string_enum::DeserializeLabeledStringEnum;
use std::iter;
use std::ops::Index;

/// The number of hours in a representative year
pub const HOURS_PER_YEAR: usize = 8760;

/// Whether the timestamp falls on 29 February
fn is_leap_day(time: &NaiveDateTime) -> bool {
    time.month() == 2 && time.day() == 29
}

/// The hours of a representative year
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyGrid {
    year: i32,
    timestamps: Vec<NaiveDateTime>,
}

impl HourlyGrid {
    /// Create the grid of hours for the given year
    pub fn new(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .with_context(|| format!("Invalid representative year: {year}"))?
            .and_time(NaiveTime::MIN);
        let timestamps: Vec<_> = iter::successors(Some(start), |time| {
            time.checked_add_signed(TimeDelta::hours(1))
        })
        .take_while(|time| time.year() == year)
        .filter(|time| !is_leap_day(time))
        .collect();
        ensure!(
            timestamps.len() == HOURS_PER_YEAR,
            "Representative year {year} does not contain {HOURS_PER_YEAR} hours"
        );

        Ok(Self { year, timestamps })
    }

    /// The representative year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The number of hours in the grid
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the grid is empty (never true for a valid grid)
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Iterate over the hours of the grid in order
    pub fn iter(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.timestamps.iter().copied()
    }

    /// Whether the timestamp lies within the representative year (excluding any leap day)
    pub fn in_year(&self, time: &NaiveDateTime) -> bool {
        time.year() == self.year && !is_leap_day(time)
    }

    /// Whether the timestamp is one of the hours of the grid
    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        self.in_year(time) && time.minute() == 0 && time.second() == 0 && time.nanosecond() == 0
    }

    /// Map a timestamp which has rolled over to midnight on 1 January of the following year
    /// back to the start of the representative year.
    ///
    /// Hour-ending data labels the last hour of the year as `24:00` on 31 December, which
    /// becomes 00:00 on 1 January of the next year.
    pub fn wrap(&self, time: NaiveDateTime) -> NaiveDateTime {
        if time.year() == self.year + 1 && time.ordinal() == 1 && time.time() == NaiveTime::MIN {
            time.with_year(self.year).unwrap_or(time)
        } else {
            time
        }
    }
}

/// A series of values indexed by timestamp, sorted in time order
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    points: IndexMap<NaiveDateTime, T>,
}

impl<T: Copy> TimeSeries<T> {
    /// Create a series from (possibly unordered) points.
    ///
    /// Every point must lie within the representative year of `grid` and timestamps must be
    /// unique. The points need not be hourly.
    pub fn from_points<I>(points: I, grid: &HourlyGrid) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDateTime, T)>,
    {
        let mut map = IndexMap::new();
        for (time, value) in points {
            ensure!(
                grid.in_year(&time),
                "Timestamp {time} is outside the representative year {}",
                grid.year()
            );
            ensure!(
                map.insert(time, value).is_none(),
                "Duplicate timestamp: {time}"
            );
        }
        map.sort_unstable_keys();

        Ok(Self { points: map })
    }

    /// Create an hourly series with one value for every hour of `grid`
    pub fn from_fn<F>(grid: &HourlyGrid, mut f: F) -> Self
    where
        F: FnMut(NaiveDateTime) -> T,
    {
        Self {
            points: grid.iter().map(|time| (time, f(time))).collect(),
        }
    }

    /// Broadcast a single value to every hour of `grid`
    pub fn constant(grid: &HourlyGrid, value: T) -> Self {
        Self::from_fn(grid, |_| value)
    }

    /// Apply `f` to every value of the series
    pub fn map<U, F>(&self, mut f: F) -> TimeSeries<U>
    where
        F: FnMut(T) -> U,
    {
        TimeSeries {
            points: self
                .points
                .iter()
                .map(|(time, value)| (*time, f(*value)))
                .collect(),
        }
    }

    /// Combine with `other` at the timestamps present in both series.
    ///
    /// Timestamps present in only one of the series are dropped.
    pub fn inner_join<U, V, F>(&self, other: &TimeSeries<U>, mut f: F) -> TimeSeries<V>
    where
        U: Copy,
        F: FnMut(T, U) -> V,
    {
        TimeSeries {
            points: self
                .points
                .iter()
                .filter_map(|(time, value)| {
                    let other = other.get(time)?;
                    Some((*time, f(*value, other)))
                })
                .collect(),
        }
    }

    /// The value at exactly the given timestamp, if any
    pub fn get(&self, time: &NaiveDateTime) -> Option<T> {
        self.points.get(time).copied()
    }

    /// The number of points in the series
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points of the series in time order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, T)> + '_ {
        self.points.iter().map(|(time, value)| (*time, *value))
    }

    /// Iterate over the values of the series in time order
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.points.values().copied()
    }

    /// The number of hours of `grid` for which the series has no value
    pub fn missing_hours(&self, grid: &HourlyGrid) -> usize {
        grid.iter().filter(|time| !self.points.contains_key(time)).count()
    }

    /// The number of points which do not fall exactly on an hour of `grid`
    pub fn off_grid_points(&self, grid: &HourlyGrid) -> usize {
        self.points.keys().filter(|time| !grid.contains(time)).count()
    }

    /// The sum of all values in the series
    pub fn total(&self) -> T
    where
        T: iter::Sum,
    {
        self.values().sum()
    }
}

impl<T> Index<&NaiveDateTime> for TimeSeries<T> {
    type Output = T;

    fn index(&self, time: &NaiveDateTime) -> &Self::Output {
        self.points
            .get(time)
            .unwrap_or_else(|| panic!("No value for timestamp {time}"))
    }
}

/// Summary of the alignment problems found when densifying a sparse series
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DensifyReport {
    /// Hours at the start of the year before the first sparse point, which were back-filled
    pub leading_hours: usize,
    /// Sparse points which do not fall exactly on an hour of the grid
    pub off_grid_points: usize,
}

/// Expand a sparse series (e.g. daily prices) to every hour of `grid`.
///
/// Each hour takes the value of the latest sparse point at or before it. Hours before the first
/// sparse point take the first value and hours after the last sparse point hold the last value.
pub fn densify<T: Copy>(
    sparse: &TimeSeries<T>,
    grid: &HourlyGrid,
) -> Result<(TimeSeries<T>, DensifyReport)> {
    let mut points = sparse.iter().peekable();
    let Some(&(_, mut current)) = points.peek() else {
        bail!("Cannot expand an empty series to hourly values");
    };

    let mut report = DensifyReport {
        off_grid_points: sparse.off_grid_points(grid),
        ..DensifyReport::default()
    };
    let mut started = false;
    let dense = TimeSeries::from_fn(grid, |time| {
        while let Some((_, value)) = points.next_if(|(point_time, _)| *point_time <= time) {
            current = value;
            started = true;
        }
        if !started {
            report.leading_hours += 1;
        }
        current
    });
    debug!(
        "Expanded {} sparse points to {} hourly values",
        sparse.len(),
        dense.len()
    );

    Ok((dense, report))
}

/// How to treat series whose timestamps do not line up with the hourly grid
#[derive(PartialEq, Debug, Clone, Copy, Default, DeserializeLabeledStringEnum)]
pub enum AlignmentPolicy {
    /// Zero-fill or hold values without reporting
    #[string = "lenient"]
    Lenient,
    /// Zero-fill or hold values and log a warning
    #[default]
    #[string = "warn"]
    Warn,
    /// Treat any misalignment as an error
    #[string = "strict"]
    Strict,
}

impl AlignmentPolicy {
    /// Apply the policy to `misaligned` affected hours or points of the series described by
    /// `description`
    pub fn check(self, misaligned: usize, description: &str) -> Result<()> {
        if misaligned == 0 {
            return Ok(());
        }

        match self {
            AlignmentPolicy::Lenient => debug!("{description} ({misaligned} affected)"),
            AlignmentPolicy::Warn => warn!("{description} ({misaligned} affected)"),
            AlignmentPolicy::Strict => bail!("{description} ({misaligned} affected)"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, grid};
    use rstest::rstest;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[rstest]
    #[case(2019)]
    #[case(2020)] // leap year: 29 February is dropped
    fn test_grid_has_8760_hours(#[case] year: i32) {
        let grid = HourlyGrid::new(year).unwrap();
        assert_eq!(grid.len(), HOURS_PER_YEAR);
        assert_eq!(grid.iter().next().unwrap(), ts(&format!("{year}-01-01 00:00")));
        assert_eq!(grid.iter().last().unwrap(), ts(&format!("{year}-12-31 23:00")));
        assert!(grid.iter().all(|time| !is_leap_day(&time)));
    }

    #[rstest]
    fn test_grid_contains(grid: HourlyGrid) {
        assert!(grid.contains(&ts("2019-06-01 12:00")));
        assert!(!grid.contains(&ts("2019-06-01 12:30")));
        assert!(!grid.contains(&ts("2020-06-01 12:00")));
        assert!(grid.in_year(&ts("2019-06-01 12:30")));
    }

    #[rstest]
    fn test_grid_wrap(grid: HourlyGrid) {
        assert_eq!(grid.wrap(ts("2020-01-01 00:00")), ts("2019-01-01 00:00"));
        assert_eq!(grid.wrap(ts("2020-01-01 01:00")), ts("2020-01-01 01:00"));
        assert_eq!(grid.wrap(ts("2019-03-01 00:00")), ts("2019-03-01 00:00"));
    }

    #[rstest]
    fn test_from_points_sorts(grid: HourlyGrid) {
        let series = TimeSeries::from_points(
            [(ts("2019-01-01 02:00"), 2.0), (ts("2019-01-01 01:00"), 1.0)],
            &grid,
        )
        .unwrap();
        assert_eq!(
            series.iter().collect::<Vec<_>>(),
            [(ts("2019-01-01 01:00"), 1.0), (ts("2019-01-01 02:00"), 2.0)]
        );
    }

    #[rstest]
    fn test_from_points_duplicate(grid: HourlyGrid) {
        assert_error!(
            TimeSeries::from_points(
                [(ts("2019-01-01 01:00"), 1.0), (ts("2019-01-01 01:00"), 2.0)],
                &grid,
            ),
            "Duplicate timestamp: 2019-01-01 01:00:00"
        );
    }

    #[rstest]
    fn test_from_points_outside_year(grid: HourlyGrid) {
        assert_error!(
            TimeSeries::from_points([(ts("2018-12-31 23:00"), 1.0)], &grid),
            "Timestamp 2018-12-31 23:00:00 is outside the representative year 2019"
        );
    }

    #[rstest]
    fn test_constant_and_total(grid: HourlyGrid) {
        let series = TimeSeries::constant(&grid, crate::units::Energy(0.5));
        assert_eq!(series.len(), HOURS_PER_YEAR);
        assert_eq!(series.missing_hours(&grid), 0);
        assert_eq!(series.total(), crate::units::Energy(4380.0));
    }

    #[rstest]
    fn test_missing_hours_and_off_grid_points(grid: HourlyGrid) {
        let series = TimeSeries::from_points(
            [
                (ts("2019-01-01 00:00"), 1.0),
                (ts("2019-01-01 00:30"), 2.0),
                (ts("2019-01-01 01:00"), 3.0),
            ],
            &grid,
        )
        .unwrap();
        assert_eq!(series.missing_hours(&grid), HOURS_PER_YEAR - 2);
        assert_eq!(series.off_grid_points(&grid), 1);
    }

    #[rstest]
    fn test_map_and_inner_join(grid: HourlyGrid) {
        let a = TimeSeries::from_points(
            [(ts("2019-01-01 00:00"), 1.0), (ts("2019-01-01 01:00"), 2.0)],
            &grid,
        )
        .unwrap();
        let b = TimeSeries::from_points(
            [(ts("2019-01-01 01:00"), 10.0), (ts("2019-01-01 02:00"), 20.0)],
            &grid,
        )
        .unwrap();

        let doubled = a.map(|value| value * 2.0);
        assert_eq!(doubled[&ts("2019-01-01 01:00")], 4.0);

        let joined = a.inner_join(&b, |a, b| a + b);
        assert_eq!(
            joined.iter().collect::<Vec<_>>(),
            [(ts("2019-01-01 01:00"), 12.0)]
        );
    }

    #[rstest]
    #[should_panic(expected = "No value for timestamp 2019-01-01 05:00:00")]
    fn test_index_missing(grid: HourlyGrid) {
        let series = TimeSeries::from_points([(ts("2019-01-01 00:00"), 1.0)], &grid).unwrap();
        let _ = series[&ts("2019-01-01 05:00")];
    }

    #[rstest]
    fn test_densify_daily(grid: HourlyGrid) {
        let sparse = TimeSeries::from_points(
            [
                (ts("2019-01-02 00:00"), 20.0),
                (ts("2019-01-01 00:00"), 10.0),
                (ts("2019-12-30 00:00"), 30.0),
            ],
            &grid,
        )
        .unwrap();
        let (dense, report) = densify(&sparse, &grid).unwrap();

        assert_eq!(dense.len(), HOURS_PER_YEAR);
        assert_eq!(report, DensifyReport::default());
        assert_eq!(dense.get(&ts("2019-01-01 00:00")), Some(10.0));
        assert_eq!(dense.get(&ts("2019-01-01 23:00")), Some(10.0));
        assert_eq!(dense.get(&ts("2019-01-02 00:00")), Some(20.0));
        assert_eq!(dense.get(&ts("2019-12-29 23:00")), Some(20.0));
        // Last value is held to the end of the year
        assert_eq!(dense.get(&ts("2019-12-31 23:00")), Some(30.0));
    }

    #[rstest]
    fn test_densify_leading_gap(grid: HourlyGrid) {
        let sparse = TimeSeries::from_points(
            [(ts("2019-01-01 03:00"), 5.0), (ts("2019-01-01 04:30"), 6.0)],
            &grid,
        )
        .unwrap();
        let (dense, report) = densify(&sparse, &grid).unwrap();

        assert_eq!(
            report,
            DensifyReport {
                leading_hours: 3,
                off_grid_points: 1
            }
        );
        assert_eq!(dense.get(&ts("2019-01-01 00:00")), Some(5.0));
        assert_eq!(dense.get(&ts("2019-01-01 04:00")), Some(5.0));
        assert_eq!(dense.get(&ts("2019-01-01 05:00")), Some(6.0));
    }

    #[rstest]
    fn test_densify_empty(grid: HourlyGrid) {
        let sparse = TimeSeries::<f64>::from_points([], &grid).unwrap();
        assert_error!(
            densify(&sparse, &grid),
            "Cannot expand an empty series to hourly values"
        );
    }

    #[rstest]
    #[case(AlignmentPolicy::Lenient, 5, true)]
    #[case(AlignmentPolicy::Warn, 5, true)]
    #[case(AlignmentPolicy::Strict, 0, true)]
    #[case(AlignmentPolicy::Strict, 5, false)]
    fn test_alignment_policy(
        #[case] policy: AlignmentPolicy,
        #[case] misaligned: usize,
        #[case] ok: bool,
    ) {
        assert_eq!(policy.check(misaligned, "Some series").is_ok(), ok);
    }

    #[test]
    fn test_alignment_policy_strict_message() {
        assert_error!(
            AlignmentPolicy::Strict.check(3, "Production series is missing hours"),
            "Production series is missing hours (3 affected)"
        );
    }
}
