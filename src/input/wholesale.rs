//! Code for reading wholesale electricity prices from a CSV file.
use super::*;
use crate::location::{LocationMap, MarketID};
use crate::units::MoneyPerEnergy;
use indexmap::IndexSet;
use log::debug;
use serde::Deserialize;
use std::path::Path;

const WHOLESALE_PRICES_FILE_NAME: &str = "wholesale_prices.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct WholesalePriceRaw {
    market: String,
    #[serde(deserialize_with = "deserialise_timestamp")]
    time: NaiveDateTime,
    price: MoneyPerEnergy,
}

/// Read wholesale prices for each market used by a location.
///
/// Prices are in the units of the source data and may be sparser than hourly. Rows for markets
/// which no location uses are ignored.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `locations` - All known locations
/// * `grid` - The hours of the representative year
///
/// # Returns
///
/// The price series for each market
pub fn read_wholesale_prices(
    model_dir: &Path,
    locations: &LocationMap,
    grid: &HourlyGrid,
) -> Result<IndexMap<MarketID, TimeSeries<MoneyPerEnergy>>> {
    let file_path = model_dir.join(WHOLESALE_PRICES_FILE_NAME);
    let prices_csv = read_csv(&file_path)?;
    read_wholesale_prices_from_iter(prices_csv, locations, grid)
        .with_context(|| input_err_msg(&file_path))
}

fn read_wholesale_prices_from_iter<I>(
    iter: I,
    locations: &LocationMap,
    grid: &HourlyGrid,
) -> Result<IndexMap<MarketID, TimeSeries<MoneyPerEnergy>>>
where
    I: Iterator<Item = WholesalePriceRaw>,
{
    let markets: IndexSet<_> = locations
        .values()
        .map(|location| location.wholesale_market.clone())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0;
    for record in iter {
        let Some(market) = markets.get(record.market.as_str()) else {
            skipped += 1;
            continue;
        };
        ensure!(
            record.price.is_finite(),
            "Wholesale price for market {market} at {} must be a finite number",
            record.time
        );
        rows.push((market.clone(), record.time, record.price));
    }
    if skipped > 0 {
        debug!("Skipped {skipped} wholesale prices for markets not used by any location");
    }

    collect_series(rows, grid)
}
