//! Code for reading household solar production from a CSV file.
use super::*;
use crate::id::IDCollection;
use crate::location::{LocationID, LocationMap};
use crate::units::Energy;
use serde::Deserialize;
use std::path::Path;

const PRODUCTION_FILE_NAME: &str = "production.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct ProductionRaw {
    location_id: String,
    #[serde(deserialize_with = "deserialise_timestamp")]
    time: NaiveDateTime,
    production: Energy,
}

/// Read hourly solar production for a single household at each location.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `locations` - All known locations
/// * `grid` - The hours of the representative year
///
/// # Returns
///
/// The production series for each location listed in the file
pub fn read_production(
    model_dir: &Path,
    locations: &LocationMap,
    grid: &HourlyGrid,
) -> Result<IndexMap<LocationID, TimeSeries<Energy>>> {
    let file_path = model_dir.join(PRODUCTION_FILE_NAME);
    let production_csv = read_csv(&file_path)?;
    read_production_from_iter(production_csv, locations, grid)
        .with_context(|| input_err_msg(&file_path))
}

fn read_production_from_iter<I>(
    iter: I,
    locations: &LocationMap,
    grid: &HourlyGrid,
) -> Result<IndexMap<LocationID, TimeSeries<Energy>>>
where
    I: Iterator<Item = ProductionRaw>,
{
    let rows: Vec<_> = iter
        .map(|record| -> Result<_> {
            let location_id = locations.get_id_by_str(&record.location_id)?;
            ensure!(
                record.production.is_finite() && record.production >= Energy(0.0),
                "Production for location {location_id} at {} must be a finite, non-negative \
                number",
                record.time
            );

            Ok((location_id, record.time, record.production))
        })
        .try_collect()?;

    collect_series(rows, grid)
}
