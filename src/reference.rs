//! Reference data describing the locations which can be modelled.
//!
//! The [`ReferenceData`] trait is the interface through which a region's households, usage,
//! production and prices are resolved. [`ReferenceTables`] implements it from the tables loaded
//! from a model directory.
use crate::id::IDLike;
use crate::location::{LocationID, LocationMap, MarketID};
use crate::series::TimeSeries;
use crate::units::{Energy, Money, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;

/// The retail tariff for a location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariff {
    /// Price per unit of energy charged to customers
    pub utility_price: MoneyPerEnergy,
    /// Fixed charge per household per month
    pub fixed_monthly_charge: Money,
}

/// Source of location-specific data for constructing a region.
///
/// Every method fails if the location is unknown.
pub trait ReferenceData {
    /// The number of households at the location
    fn household_count(&self, location_id: &LocationID) -> Result<u32>;

    /// Hourly gross electricity usage for a single household
    fn usage(&self, location_id: &LocationID) -> Result<&TimeSeries<Energy>>;

    /// Hourly solar production for a single household with solar panels
    fn production(&self, location_id: &LocationID) -> Result<&TimeSeries<Energy>>;

    /// Wholesale prices for the location's market, in source units. May be sparser than hourly.
    fn wholesale_prices(&self, location_id: &LocationID) -> Result<&TimeSeries<MoneyPerEnergy>>;

    /// The constant retail price per unit of energy
    fn utility_price(&self, location_id: &LocationID) -> Result<MoneyPerEnergy>;

    /// The constant fixed charge per household per month
    fn fixed_monthly_charge(&self, location_id: &LocationID) -> Result<Money>;
}

/// The reference data for all locations in a model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceTables {
    /// Known locations
    pub locations: LocationMap,
    /// Number of households for each location
    pub households: IndexMap<LocationID, u32>,
    /// Hourly usage for each location
    pub usage: IndexMap<LocationID, TimeSeries<Energy>>,
    /// Hourly solar production for each location
    pub production: IndexMap<LocationID, TimeSeries<Energy>>,
    /// Wholesale prices for each market
    pub wholesale_prices: IndexMap<MarketID, TimeSeries<MoneyPerEnergy>>,
    /// Retail tariffs for each location
    pub tariffs: IndexMap<LocationID, Tariff>,
}

/// Look up a location-keyed entry, naming the table in the error
fn lookup<'a, ID: IDLike, V>(
    table: &'a IndexMap<ID, V>,
    id: &ID,
    table_name: &str,
) -> Result<&'a V> {
    table
        .get(id)
        .with_context(|| format!("{id} not found in {table_name}"))
}

impl ReferenceTables {
    /// Check that every location can be resolved in every table.
    ///
    /// Each location must have households, usage, production and tariff entries and its
    /// wholesale market must have prices.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.locations.is_empty(), "No locations defined");

        for (id, location) in &self.locations {
            ensure!(
                self.households.contains_key(id),
                "Location {id} is missing from households"
            );
            ensure!(
                self.usage.contains_key(id),
                "Location {id} is missing from usage"
            );
            ensure!(
                self.production.contains_key(id),
                "Location {id} is missing from production"
            );
            ensure!(
                self.tariffs.contains_key(id),
                "Location {id} is missing from tariffs"
            );
            ensure!(
                self.wholesale_prices
                    .contains_key(&location.wholesale_market),
                "Wholesale market {} for location {id} is missing from wholesale prices",
                location.wholesale_market
            );
        }

        Ok(())
    }

    /// Find the location at the given coordinates
    pub fn find_location(&self, latitude: f64, longitude: f64) -> Result<LocationID> {
        self.locations
            .values()
            .find(|location| location.is_at(latitude, longitude))
            .map(|location| location.id.clone())
            .with_context(|| {
                format!("No location found at latitude {latitude}, longitude {longitude}")
            })
    }

    fn tariff(&self, location_id: &LocationID) -> Result<&Tariff> {
        lookup(&self.tariffs, location_id, "tariffs")
    }
}

impl ReferenceData for ReferenceTables {
    fn household_count(&self, location_id: &LocationID) -> Result<u32> {
        lookup(&self.households, location_id, "households").copied()
    }

    fn usage(&self, location_id: &LocationID) -> Result<&TimeSeries<Energy>> {
        lookup(&self.usage, location_id, "usage")
    }

    fn production(&self, location_id: &LocationID) -> Result<&TimeSeries<Energy>> {
        lookup(&self.production, location_id, "production")
    }

    fn wholesale_prices(&self, location_id: &LocationID) -> Result<&TimeSeries<MoneyPerEnergy>> {
        let location = lookup(&self.locations, location_id, "locations")?;
        lookup(
            &self.wholesale_prices,
            &location.wholesale_market,
            "wholesale prices",
        )
    }

    fn utility_price(&self, location_id: &LocationID) -> Result<MoneyPerEnergy> {
        Ok(self.tariff(location_id)?.utility_price)
    }

    fn fixed_monthly_charge(&self, location_id: &LocationID) -> Result<Money> {
        Ok(self.tariff(location_id)?.fixed_monthly_charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, reference_tables};
    use rstest::rstest;

    #[rstest]
    fn test_validate(reference_tables: ReferenceTables) {
        assert!(reference_tables.validate().is_ok());
    }

    #[rstest]
    fn test_validate_missing_usage(mut reference_tables: ReferenceTables) {
        reference_tables.usage.clear();
        assert_error!(
            reference_tables.validate(),
            "Location PIT is missing from usage"
        );
    }

    #[rstest]
    fn test_validate_missing_market(mut reference_tables: ReferenceTables) {
        reference_tables.wholesale_prices.clear();
        assert_error!(
            reference_tables.validate(),
            "Wholesale market PJM for location PIT is missing from wholesale prices"
        );
    }

    #[test]
    fn test_validate_empty() {
        assert_error!(ReferenceTables::default().validate(), "No locations defined");
    }

    #[rstest]
    fn test_find_location(reference_tables: ReferenceTables) {
        assert_eq!(
            reference_tables.find_location(40.5, -80.233).unwrap(),
            "PIT".into()
        );
        assert_error!(
            reference_tables.find_location(38.867, -77.033),
            "No location found at latitude 38.867, longitude -77.033"
        );
    }

    #[rstest]
    fn test_lookups(reference_tables: ReferenceTables) {
        let id: LocationID = "PIT".into();
        assert_eq!(reference_tables.household_count(&id).unwrap(), 100);
        assert_eq!(
            reference_tables.utility_price(&id).unwrap(),
            MoneyPerEnergy(0.12)
        );
        assert_eq!(
            reference_tables.fixed_monthly_charge(&id).unwrap(),
            Money(10.0)
        );
        assert!(reference_tables.wholesale_prices(&id).is_ok());
    }

    #[rstest]
    fn test_lookup_unknown_location(reference_tables: ReferenceTables) {
        let id: LocationID = "DCA".into();
        assert_error!(
            reference_tables.household_count(&id),
            "DCA not found in households"
        );
        assert_error!(
            reference_tables.wholesale_prices(&id),
            "DCA not found in locations"
        );
        assert_error!(
            reference_tables.utility_price(&id),
            "DCA not found in tariffs"
        );
    }
}
