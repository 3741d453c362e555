//! Code for reading retail tariffs from a CSV file.
use super::*;
use crate::id::IDCollection;
use crate::location::{LocationID, LocationMap};
use crate::reference::Tariff;
use crate::units::{Money, MoneyPerEnergy};
use serde::Deserialize;
use std::path::Path;

const TARIFFS_FILE_NAME: &str = "tariffs.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct TariffRaw {
    location_id: String,
    utility_price: MoneyPerEnergy,
    fixed_monthly_charge: Money,
}

/// Read the retail tariff for each location from a CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `locations` - All known locations
///
/// # Returns
///
/// The tariff for each location listed in the file
pub fn read_tariffs(
    model_dir: &Path,
    locations: &LocationMap,
) -> Result<IndexMap<LocationID, Tariff>> {
    let file_path = model_dir.join(TARIFFS_FILE_NAME);
    let tariffs_csv = read_csv(&file_path)?;
    read_tariffs_from_iter(tariffs_csv, locations).with_context(|| input_err_msg(&file_path))
}

fn read_tariffs_from_iter<I>(
    iter: I,
    locations: &LocationMap,
) -> Result<IndexMap<LocationID, Tariff>>
where
    I: Iterator<Item = TariffRaw>,
{
    let mut map = IndexMap::new();
    for record in iter {
        let location_id = locations.get_id_by_str(&record.location_id)?;
        ensure!(
            record.utility_price.is_finite() && record.utility_price >= MoneyPerEnergy(0.0),
            "Utility price for location {location_id} must be a finite, non-negative number"
        );
        ensure!(
            record.fixed_monthly_charge.is_finite() && record.fixed_monthly_charge >= Money(0.0),
            "Fixed monthly charge for location {location_id} must be a finite, non-negative \
            number"
        );

        let tariff = Tariff {
            utility_price: record.utility_price,
            fixed_monthly_charge: record.fixed_monthly_charge,
        };
        ensure!(
            map.insert(location_id.clone(), tariff).is_none(),
            "Duplicate entry for location {location_id}"
        );
    }

    Ok(map)
}
