//! Code for reading household electricity usage from a CSV file.
use super::*;
use crate::id::IDCollection;
use crate::location::{LocationID, LocationMap};
use crate::units::Energy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const USAGE_FILE_NAME: &str = "usage.csv";

/// A single sub-metered reading
#[derive(PartialEq, Debug, Deserialize)]
struct UsageRaw {
    location_id: String,
    #[serde(deserialize_with = "deserialise_timestamp")]
    time: NaiveDateTime,
    /// The sub-metered circuit (e.g. "grid", "air conditioning")
    channel: String,
    usage: Energy,
}

/// Read hourly usage for a single household at each location.
///
/// Readings for different channels at the same time are summed.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `locations` - All known locations
/// * `grid` - The hours of the representative year
///
/// # Returns
///
/// The usage series for each location listed in the file
pub fn read_usage(
    model_dir: &Path,
    locations: &LocationMap,
    grid: &HourlyGrid,
) -> Result<IndexMap<LocationID, TimeSeries<Energy>>> {
    let file_path = model_dir.join(USAGE_FILE_NAME);
    let usage_csv = read_csv(&file_path)?;
    read_usage_from_iter(usage_csv, locations, grid).with_context(|| input_err_msg(&file_path))
}

fn read_usage_from_iter<I>(
    iter: I,
    locations: &LocationMap,
    grid: &HourlyGrid,
) -> Result<IndexMap<LocationID, TimeSeries<Energy>>>
where
    I: Iterator<Item = UsageRaw>,
{
    let mut readings = HashSet::new();
    let mut totals: IndexMap<(LocationID, NaiveDateTime), Energy> = IndexMap::new();
    for record in iter {
        let location_id = locations.get_id_by_str(&record.location_id)?;
        ensure!(
            record.usage.is_finite() && record.usage >= Energy(0.0),
            "Usage for location {location_id} at {} must be a finite, non-negative number",
            record.time
        );
        ensure!(
            readings.insert((location_id.clone(), record.time, record.channel.clone())),
            "Duplicate reading for location {location_id}, channel {} at {}",
            record.channel,
            record.time
        );

        *totals.entry((location_id, record.time)).or_default() += record.usage;
    }

    collect_series(
        totals
            .into_iter()
            .map(|((location_id, time), usage)| (location_id, time, usage)),
        grid,
    )
}
