//! A region is the population of households served by a utility at one location, for one
//! simulated year.
use crate::house::Households;
use crate::location::LocationID;
use crate::model::ModelParameters;
use crate::reference::ReferenceData;
use crate::series::{HourlyGrid, TimeSeries, densify};
use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};

/// Months in a year, for converting monthly fixed charges to an annual amount
const MONTHS_PER_YEAR: f64 = 12.0;

/// Days in a year. Leap years are ignored.
const DAYS_PER_YEAR: f64 = 365.0;

/// The households and hourly finances of a utility's service region for one simulated year
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// The location of the region
    pub location_id: LocationID,
    /// Fraction of households with solar panels
    pub solar_penetration: Dimensionless,
    /// Total number of households
    pub num_houses: u32,
    /// The region's houses
    pub households: Households,
    /// Hourly wholesale price, in the same units as the utility price
    pub wholesale_prices: TimeSeries<MoneyPerEnergy>,
    /// Hourly retail price charged to customers
    pub utility_prices: TimeSeries<MoneyPerEnergy>,
    /// Hourly revenue from fixed charges across all households
    pub fixed_prices: TimeSeries<Money>,
    /// Net demand summed over all houses for each hour
    pub total_demand: TimeSeries<Energy>,
    /// The utility's profit for each hour
    pub profit: TimeSeries<Money>,
}

impl Region {
    /// Construct and evaluate a region.
    ///
    /// All of the region's series are computed here. Afterwards only the annual totals are
    /// usually of interest.
    ///
    /// # Arguments
    ///
    /// * `reference` - Source of the location's households, usage, production and prices
    /// * `parameters` - Model parameters
    /// * `grid` - The hours of the representative year
    /// * `location_id` - The region's location
    /// * `solar_penetration` - Fraction of households with solar panels, between 0 and 1
    pub fn new<R: ReferenceData + ?Sized>(
        reference: &R,
        parameters: &ModelParameters,
        grid: &HourlyGrid,
        location_id: &LocationID,
        solar_penetration: Dimensionless,
    ) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&solar_penetration.0),
            "Solar penetration must be between 0 and 1, got {solar_penetration}"
        );

        let num_houses = reference.household_count(location_id)?;

        let usage = reference.usage(location_id)?;
        parameters.alignment.check(
            usage.missing_hours(grid),
            &format!("Usage series for location {location_id} is missing some hours"),
        )?;
        parameters.alignment.check(
            usage.off_grid_points(grid),
            &format!("Usage series for location {location_id} includes points between hours"),
        )?;

        let production = reference.production(location_id)?;
        parameters.alignment.check(
            production.off_grid_points(grid),
            &format!(
                "Production series for location {location_id} includes points between hours"
            ),
        )?;

        let wholesale_prices = hourly_wholesale_prices(reference, parameters, grid, location_id)?;
        let utility_prices = TimeSeries::constant(grid, reference.utility_price(location_id)?);
        let fixed_prices = TimeSeries::constant(
            grid,
            hourly_fixed_revenue(reference.fixed_monthly_charge(location_id)?, num_houses),
        );

        let households = Households::new(
            location_id,
            num_houses,
            solar_penetration,
            usage,
            production,
            parameters.alignment,
        )?;
        let total_demand = households.total_demand(grid);

        // Every series above covers the whole grid
        let profit = TimeSeries::from_fn(grid, |time| {
            total_demand[&time] * (utility_prices[&time] - wholesale_prices[&time])
                + fixed_prices[&time]
        });

        Ok(Self {
            location_id: location_id.clone(),
            solar_penetration,
            num_houses,
            households,
            wholesale_prices,
            utility_prices,
            fixed_prices,
            total_demand,
            profit,
        })
    }

    /// Profit summed over the year
    pub fn annual_profit(&self) -> Money {
        self.profit.total()
    }

    /// Total demand summed over the year
    pub fn annual_demand(&self) -> Energy {
        self.total_demand.total()
    }

    /// The (constant) retail price per unit of energy
    pub fn utility_price(&self) -> MoneyPerEnergy {
        self.utility_prices.values().next().unwrap_or_default()
    }
}

/// Expand the location's wholesale prices to every hour of the grid and convert their units
fn hourly_wholesale_prices<R: ReferenceData + ?Sized>(
    reference: &R,
    parameters: &ModelParameters,
    grid: &HourlyGrid,
    location_id: &LocationID,
) -> Result<TimeSeries<MoneyPerEnergy>> {
    let (prices, report) = densify(reference.wholesale_prices(location_id)?, grid)
        .with_context(|| format!("Invalid wholesale prices for location {location_id}"))?;
    parameters.alignment.check(
        report.leading_hours,
        &format!(
            "Wholesale prices for location {location_id} start after the beginning of the year"
        ),
    )?;
    parameters.alignment.check(
        report.off_grid_points,
        &format!("Wholesale prices for location {location_id} include points between hours"),
    )?;

    Ok(prices.map(|price| price * parameters.wholesale_price_scale))
}

/// Revenue from fixed charges across all households, applied at every hour.
///
/// This is `monthly_charge * 12 / 365 * households`, i.e. the revenue for a day rather than an
/// hour. It is the same in every simulated year and so does not affect the cost increases
/// derived from differences in profit.
pub fn hourly_fixed_revenue(monthly_charge: Money, households: u32) -> Money {
    monthly_charge
        * Dimensionless(MONTHS_PER_YEAR / DAYS_PER_YEAR)
        * Dimensionless(households as f64)
}
