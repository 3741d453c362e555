//! Converting solar set-aside targets into a yearly schedule of household solar penetration.
use crate::units::{Dimensionless, Energy};
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Constants used to convert a solar set-aside into a solar penetration.
///
/// A set-aside is the fraction of a state's electricity sales that must come from solar. The
/// share of that attributable to residential customers in the region is converted into a number
/// of solar-equipped households and then a fraction of all households in the region.
///
/// Defaults are for Allegheny County, Pennsylvania.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SetAsideConversion {
    /// Total annual electricity sales in the state
    pub state_sales: Energy,
    /// Population of the region
    pub region_population: u32,
    /// Population of the state
    pub state_population: u32,
    /// Fraction of sales made to residential customers
    pub residential_fraction: Dimensionless,
    /// Annual electricity consumption of an average household
    pub average_residential_consumption: Energy,
    /// Number of households in the region
    pub region_households: u32,
}

impl Default for SetAsideConversion {
    fn default() -> Self {
        Self {
            state_sales: Energy(145_580_383_000.0),
            region_population: 300_286,
            state_population: 12_801_989,
            residential_fraction: Dimensionless(0.8),
            average_residential_consumption: Energy(10_402.0),
            region_households: 138_058,
        }
    }
}

impl SetAsideConversion {
    /// Convert a solar set-aside into the fraction of the region's households with solar
    pub fn to_penetration(&self, set_aside: Dimensionless) -> Dimensionless {
        let population_share =
            Dimensionless(self.region_population as f64 / self.state_population as f64);
        let residential_solar =
            self.state_sales * population_share * set_aside * self.residential_fraction;
        let solar_households = residential_solar / self.average_residential_consumption;

        solar_households / Dimensionless(self.region_households as f64)
    }

    /// Check that the conversion constants are valid
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.state_sales.is_finite() && self.state_sales >= Energy(0.0),
            "state_sales must be a finite, non-negative number"
        );
        ensure!(
            self.state_population > 0,
            "state_population must be greater than zero"
        );
        ensure!(
            self.region_households > 0,
            "region_households must be greater than zero"
        );
        ensure!(
            self.residential_fraction.is_finite()
                && (0.0..=1.0).contains(&self.residential_fraction.0),
            "residential_fraction must be between 0 and 1"
        );
        ensure!(
            self.average_residential_consumption.is_finite()
                && self.average_residential_consumption > Energy(0.0),
            "average_residential_consumption must be a finite number greater than zero"
        );

        Ok(())
    }
}

/// Generate the solar penetration for each year of a scenario.
///
/// Penetration varies linearly from the value for `initial_set_aside` in year 0 to the value for
/// `final_set_aside` in year `time_horizon`, giving `time_horizon + 1` values in total.
pub fn annual_penetration(
    initial_set_aside: Dimensionless,
    final_set_aside: Dimensionless,
    time_horizon: u32,
    conversion: &SetAsideConversion,
) -> Result<Vec<Dimensionless>> {
    ensure!(time_horizon > 0, "Time horizon must be at least one year");

    let initial = conversion.to_penetration(initial_set_aside);
    let last = conversion.to_penetration(final_set_aside);
    let schedule = (0..=time_horizon)
        .map(|year| {
            let progress = Dimensionless(year as f64 / time_horizon as f64);
            initial + (last - initial) * progress
        })
        .collect();

    Ok(schedule)
}
