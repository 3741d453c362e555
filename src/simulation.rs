//! Functionality for running the solar revenue-impact simulation.
use crate::impact::{AnnualSummary, calculate_impact};
use crate::location::LocationID;
use crate::model::Model;
use crate::output::{write_annual_summary, write_metadata, write_results};
use crate::penetration::annual_penetration;
use crate::region::Region;
use crate::units::Dimensionless;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::Path;

/// The arguments which define a scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    /// Solar set-aside in the first year
    pub initial_set_aside: Dimensionless,
    /// Solar set-aside in the final year
    pub final_set_aside: Dimensionless,
    /// Number of years after the first year
    pub time_horizon: u32,
    /// Latitude of the location to model
    pub latitude: f64,
    /// Longitude of the location to model
    pub longitude: f64,
}

/// Evaluate the region at the location for each year's solar penetration.
///
/// Year `n` of the result corresponds to entry `n` of `penetrations`.
pub fn simulate(
    model: &Model,
    location_id: &LocationID,
    penetrations: &[Dimensionless],
) -> Result<Vec<AnnualSummary>> {
    penetrations
        .iter()
        .zip(0..)
        .map(|(&solar_penetration, year)| {
            let region = Region::new(
                &model.reference,
                &model.parameters,
                &model.grid,
                location_id,
                solar_penetration,
            )
            .with_context(|| format!("Failed to evaluate region for year {year}"))?;
            let summary = AnnualSummary::from_region(year, &region);
            info!(
                "Year {year}: solar penetration {:.6}, annual profit {:.2}",
                solar_penetration.0,
                summary.profit.value()
            );

            Ok(summary)
        })
        .collect()
}

/// Run the simulation.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `scenario` - The scenario arguments
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, scenario: &Scenario, output_path: &Path) -> Result<()> {
    write_metadata(output_path, &model.model_path, scenario)
        .context("Failed to save metadata")?;

    let location_id = model
        .reference
        .find_location(scenario.latitude, scenario.longitude)?;
    info!("Location: {location_id}");

    let penetrations = annual_penetration(
        scenario.initial_set_aside,
        scenario.final_set_aside,
        scenario.time_horizon,
        &model.parameters.set_aside,
    )?;
    let summaries = simulate(model, &location_id, &penetrations)?;
    let impacts = calculate_impact(&summaries);

    write_results(output_path, &summaries, &impacts).context("Failed to write results")?;
    write_annual_summary(output_path, &summaries, &impacts)
        .context("Failed to write annual summary")?;

    Ok(())
}
