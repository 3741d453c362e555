//! Households and their hourly net electricity demand.
use crate::location::LocationID;
use crate::series::{AlignmentPolicy, HourlyGrid, TimeSeries};
use crate::units::{Dimensionless, Energy};
use anyhow::Result;
use log::debug;
use std::iter;

/// A single household for one simulated year
#[derive(Debug, Clone, PartialEq)]
pub struct House {
    /// The location of the household
    pub location_id: LocationID,
    /// Whether the house has solar panels installed
    pub has_solar: bool,
    /// Net electricity demand for each hour. Never negative.
    pub demand: TimeSeries<Energy>,
}

impl House {
    /// Create a new [`House`].
    ///
    /// Net demand is usage minus production (if the house has solar panels), floored at zero:
    /// excess production is dissipated rather than exported. Production is matched to usage by
    /// exact timestamp and hours with usage but no production contribute no demand.
    ///
    /// # Arguments
    ///
    /// * `location_id` - The house's location
    /// * `usage` - Gross hourly electricity usage
    /// * `production` - Hourly solar production, or `None` for a house without solar panels
    /// * `alignment` - How to treat usage hours for which there is no production value
    pub fn new(
        location_id: LocationID,
        usage: &TimeSeries<Energy>,
        production: Option<&TimeSeries<Energy>>,
        alignment: AlignmentPolicy,
    ) -> Result<Self> {
        let Some(production) = production else {
            return Ok(Self {
                location_id,
                has_solar: false,
                demand: usage.map(|usage| usage.max(Energy(0.0))),
            });
        };

        let demand = usage.inner_join(production, |usage, production| {
            (usage - production).max(Energy(0.0))
        });
        alignment.check(
            usage.len() - demand.len(),
            &format!("Production series for location {location_id} is missing some usage hours"),
        )?;

        Ok(Self {
            location_id,
            has_solar: true,
            demand,
        })
    }
}

/// The houses in a region.
///
/// All houses of the same kind (with or without solar panels) are built from the same series and
/// are therefore identical, so each kind is stored once along with the number of such houses.
#[derive(Debug, Clone, PartialEq)]
pub struct Households {
    kinds: Vec<(House, u32)>,
}

impl Households {
    /// Create the houses for a region.
    ///
    /// `floor(num_houses * solar_penetration)` houses have solar panels and the rest do not.
    ///
    /// # Arguments
    ///
    /// * `location_id` - The location of the region
    /// * `num_houses` - Total number of households
    /// * `solar_penetration` - Fraction of households with solar panels, between 0 and 1
    /// * `usage` - Hourly usage shared by all houses
    /// * `production` - Hourly solar production shared by all houses with solar panels
    /// * `alignment` - How to treat misaligned usage and production series
    pub fn new(
        location_id: &LocationID,
        num_houses: u32,
        solar_penetration: Dimensionless,
        usage: &TimeSeries<Energy>,
        production: &TimeSeries<Energy>,
        alignment: AlignmentPolicy,
    ) -> Result<Self> {
        let solar_count = solar_house_count(num_houses, solar_penetration);
        let non_solar_count = num_houses - solar_count;
        debug!(
            "Location {location_id}: {solar_count} houses with solar panels and {non_solar_count} \
            without"
        );

        let mut kinds = Vec::with_capacity(2);
        if solar_count > 0 {
            let house = House::new(location_id.clone(), usage, Some(production), alignment)?;
            kinds.push((house, solar_count));
        }
        if non_solar_count > 0 {
            let house = House::new(location_id.clone(), usage, None, alignment)?;
            kinds.push((house, non_solar_count));
        }

        Ok(Self { kinds })
    }

    /// Total number of houses
    pub fn len(&self) -> u32 {
        self.kinds.iter().map(|(_, count)| count).sum()
    }

    /// Whether there are no houses
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of houses with solar panels
    pub fn solar_count(&self) -> u32 {
        self.count_where(|house| house.has_solar)
    }

    /// Number of houses without solar panels
    pub fn non_solar_count(&self) -> u32 {
        self.count_where(|house| !house.has_solar)
    }

    fn count_where<F>(&self, predicate: F) -> u32
    where
        F: Fn(&House) -> bool,
    {
        self.kinds
            .iter()
            .filter(|(house, _)| predicate(house))
            .map(|(_, count)| count)
            .sum()
    }

    /// Iterate over every house individually
    pub fn iter(&self) -> impl Iterator<Item = &House> {
        self.kinds
            .iter()
            .flat_map(|(house, count)| iter::repeat_n(house, *count as usize))
    }

    /// Sum the net demand of all houses for each hour of `grid`.
    ///
    /// Hours for which a house has no demand value contribute nothing.
    pub fn total_demand(&self, grid: &HourlyGrid) -> TimeSeries<Energy> {
        TimeSeries::from_fn(grid, |time| {
            self.kinds
                .iter()
                .map(|(house, count)| {
                    house.demand.get(&time).unwrap_or_default() * Dimensionless(*count as f64)
                })
                .sum()
        })
    }
}

/// The number of houses with solar panels for the given penetration
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn solar_house_count(num_houses: u32, solar_penetration: Dimensionless) -> u32 {
    (num_houses as f64 * solar_penetration.0).floor() as u32
}
