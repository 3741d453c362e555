//! Fixtures for tests

use crate::location::{Location, LocationID};
use crate::model::{Model, ModelParameters};
use crate::reference::{ReferenceTables, Tariff};
use crate::series::{HourlyGrid, TimeSeries};
use crate::units::{Energy, Money, MoneyPerEnergy};
use chrono::{Datelike, Timelike};
use indexmap::indexmap;
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn grid() -> HourlyGrid {
    HourlyGrid::new(2019).unwrap()
}

#[fixture]
pub fn location_id() -> LocationID {
    "PIT".into()
}

#[fixture]
pub fn location(location_id: LocationID) -> Location {
    Location {
        id: location_id,
        description: "Pittsburgh, PA".into(),
        latitude: 40.5,
        longitude: -80.233,
        wholesale_market: "PJM".into(),
    }
}

/// Household usage with an evening peak
#[fixture]
pub fn usage(grid: HourlyGrid) -> TimeSeries<Energy> {
    TimeSeries::from_fn(&grid, |time| match time.hour() {
        17..=21 => Energy(1.2),
        _ => Energy(0.5),
    })
}

/// Solar production which exceeds usage around midday
#[fixture]
pub fn production(grid: HourlyGrid) -> TimeSeries<Energy> {
    TimeSeries::from_fn(&grid, |time| match time.hour() {
        10..=14 => Energy(1.2),
        7..=9 | 15..=17 => Energy(0.4),
        _ => Energy(0.0),
    })
}

/// Daily wholesale prices per MWh, set at midnight
#[fixture]
pub fn wholesale_prices(grid: HourlyGrid) -> TimeSeries<MoneyPerEnergy> {
    let points = grid
        .iter()
        .filter(|time| time.hour() == 0)
        .map(|time| (time, MoneyPerEnergy(20.0 + (time.ordinal0() % 7) as f64)));
    TimeSeries::from_points(points, &grid).unwrap()
}

#[fixture]
pub fn model_parameters() -> ModelParameters {
    ModelParameters::default()
}

/// Reference data for a single location with 100 households
#[fixture]
pub fn reference_tables(
    location: Location,
    usage: TimeSeries<Energy>,
    production: TimeSeries<Energy>,
    wholesale_prices: TimeSeries<MoneyPerEnergy>,
) -> ReferenceTables {
    let id = location.id.clone();
    ReferenceTables {
        wholesale_prices: indexmap! { location.wholesale_market.clone() => wholesale_prices },
        locations: indexmap! { id.clone() => location },
        households: indexmap! { id.clone() => 100 },
        usage: indexmap! { id.clone() => usage },
        production: indexmap! { id.clone() => production },
        tariffs: indexmap! {
            id => Tariff {
                utility_price: MoneyPerEnergy(0.12),
                fixed_monthly_charge: Money(10.0),
            }
        },
    }
}

#[fixture]
pub fn model(
    model_parameters: ModelParameters,
    grid: HourlyGrid,
    reference_tables: ReferenceTables,
) -> Model {
    Model {
        model_path: PathBuf::from("model"),
        parameters: model_parameters,
        grid,
        reference: reference_tables,
    }
}
