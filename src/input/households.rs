//! Code for reading the number of households at each location from a CSV file.
use super::*;
use crate::id::IDCollection;
use crate::location::{LocationID, LocationMap};
use serde::Deserialize;
use std::path::Path;

const HOUSEHOLDS_FILE_NAME: &str = "households.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct HouseholdsRaw {
    location_id: String,
    households: u32,
}

/// Read household counts from a CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `locations` - All known locations
///
/// # Returns
///
/// The number of households for each location listed in the file
pub fn read_households(
    model_dir: &Path,
    locations: &LocationMap,
) -> Result<IndexMap<LocationID, u32>> {
    let file_path = model_dir.join(HOUSEHOLDS_FILE_NAME);
    let households_csv = read_csv(&file_path)?;
    read_households_from_iter(households_csv, locations).with_context(|| input_err_msg(&file_path))
}

fn read_households_from_iter<I>(
    iter: I,
    locations: &LocationMap,
) -> Result<IndexMap<LocationID, u32>>
where
    I: Iterator<Item = HouseholdsRaw>,
{
    let mut map = IndexMap::new();
    for record in iter {
        let location_id = locations.get_id_by_str(&record.location_id)?;
        ensure!(
            record.households > 0,
            "Number of households for location {location_id} must be greater than zero"
        );
        ensure!(
            map.insert(location_id.clone(), record.households).is_none(),
            "Duplicate entry for location {location_id}"
        );
    }

    Ok(map)
}
