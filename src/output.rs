//! The module responsible for writing output data to disk.
use crate::impact::{AnnualSummary, CostImpact};
use anyhow::{Context, Result, ensure};
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;
pub use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "solar_impact_results";

/// The output file name for the cost increases in each year
pub const RESULTS_FILE_NAME: &str = "results.csv";

/// The output file name for the annual totals and cost increases
pub const ANNUAL_SUMMARY_FILE_NAME: &str = "annual_summary.csv";

/// How undefined values are written to the results file
const UNDEFINED_VALUE: &str = "NaN";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory.
///
/// An existing, non-empty directory is only replaced if `allow_overwrite` is true.
///
/// # Returns
///
/// True if an existing directory was deleted, false otherwise.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut entries) = fs::read_dir(output_dir) {
        if entries.next().is_none() {
            // Directory exists but is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete the folder or pass the \
            --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Format a value for the results file
fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED_VALUE.to_string(), |value| value.to_string())
}

/// Write the results file.
///
/// The file has no header and one column per year. The rows are the year, the fixed charge
/// increase for all houses, the fixed charge increase for houses with solar panels and the
/// variable price increase. Undefined values are written as `NaN`.
pub fn write_results(
    output_path: &Path,
    summaries: &[AnnualSummary],
    impacts: &[CostImpact],
) -> Result<()> {
    let file_path = output_path.join(RESULTS_FILE_NAME);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&file_path)?;

    writer.write_record(summaries.iter().map(|summary| summary.year.to_string()))?;
    writer.write_record(impacts.iter().map(|impact| {
        format_value(impact.fixed_increase_all_houses.map(|value| value.value()))
    }))?;
    writer.write_record(impacts.iter().map(|impact| {
        format_value(impact.fixed_increase_solar_houses.map(|value| value.value()))
    }))?;
    writer.write_record(
        impacts
            .iter()
            .map(|impact| format_value(impact.variable_increase.map(f64::from))),
    )?;
    writer.flush()?;

    Ok(())
}

/// Write one row per year with the annual totals and the cost increases
pub fn write_annual_summary(
    output_path: &Path,
    summaries: &[AnnualSummary],
    impacts: &[CostImpact],
) -> Result<()> {
    let file_path = output_path.join(ANNUAL_SUMMARY_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)?;
    for row in summaries.iter().zip(impacts) {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
