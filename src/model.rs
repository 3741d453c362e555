//! The model represents the reference data and parameters for a run.
use crate::reference::ReferenceTables;
use crate::series::HourlyGrid;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// The hours of the representative year
    pub grid: HourlyGrid,
    /// Reference data for every location
    pub reference: ReferenceTables,
}
