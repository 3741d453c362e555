//! Locations represent the utility service regions for which reference data is available.
use crate::id::{define_id_getter, define_id_type};
use float_cmp::approx_eq;
use indexmap::IndexMap;
use serde::Deserialize;

define_id_type! {LocationID}
define_id_type! {MarketID}

/// A map of [`Location`]s, keyed by location ID
pub type LocationMap = IndexMap<LocationID, Location>;

/// Absolute tolerance used when matching coordinates to a location
const COORDINATE_TOLERANCE: f64 = 1e-6;

/// Represents a location (typically a weather station) with its associated wholesale market.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Location {
    /// A unique identifier for a location (e.g. "PIT").
    pub id: LocationID,
    /// A text description of the location (e.g. "Pittsburgh, PA").
    pub description: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// The wholesale market from which the utility buys electricity
    pub wholesale_market: MarketID,
}
define_id_getter! {Location, LocationID}

impl Location {
    /// Whether the location is at the given coordinates
    pub fn is_at(&self, latitude: f64, longitude: f64) -> bool {
        approx_eq!(
            f64,
            self.latitude,
            latitude,
            epsilon = COORDINATE_TOLERANCE
        ) && approx_eq!(
            f64,
            self.longitude,
            longitude,
            epsilon = COORDINATE_TOLERANCE
        )
    }
}
