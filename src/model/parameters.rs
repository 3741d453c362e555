//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::penetration::SetAsideConversion;
use crate::series::AlignmentPolicy;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::from($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_representative_year, u16, 2019);
define_unit_param_default!(default_wholesale_price_scale, Dimensionless, 0.001);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ModelParameters {
    /// The year whose calendar defines the hourly grid.
    ///
    /// If this is a leap year, 29 February is excluded.
    #[serde(default = "default_representative_year")]
    pub representative_year: u16,
    /// How to treat series which do not line up with the hourly grid
    #[serde(default)]
    pub alignment: AlignmentPolicy,
    /// Factor applied to wholesale prices to convert them to the units of the retail price.
    ///
    /// The default converts prices per MWh into prices per kWh.
    #[serde(default = "default_wholesale_price_scale")]
    pub wholesale_price_scale: Dimensionless,
    /// Constants for converting set-asides into solar penetration
    #[serde(default)]
    pub set_aside: SetAsideConversion,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            representative_year: default_representative_year(),
            alignment: AlignmentPolicy::default(),
            wholesale_price_scale: default_wholesale_price_scale(),
            set_aside: SetAsideConversion::default(),
        }
    }
}

/// Check that the `wholesale_price_scale` parameter is valid
fn check_wholesale_price_scale(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value > Dimensionless(0.0),
        "wholesale_price_scale must be a finite number greater than zero"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // representative_year can be any year chrono can represent, which is checked when the
        // hourly grid is built

        // wholesale_price_scale
        check_wholesale_price_scale(self.wholesale_price_scale)?;

        // set_aside
        self.set_aside
            .validate()
            .context("Invalid set_aside parameters")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Energy;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_model_params_from_path_defaults() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(model_params, ModelParameters::default());
    }

    #[test]
    fn test_model_params_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "representative_year = 2020
alignment = \"strict\"
wholesale_price_scale = 0.01

[set_aside]
region_households = 100
average_residential_consumption = 9000.0"
            )
            .unwrap();
        }

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(model_params.representative_year, 2020);
        assert_eq!(model_params.alignment, AlignmentPolicy::Strict);
        assert_eq!(model_params.wholesale_price_scale, Dimensionless(0.01));
        assert_eq!(model_params.set_aside.region_households, 100);
        assert_eq!(
            model_params.set_aside.average_residential_consumption,
            Energy(9000.0)
        );

        // Unspecified constants keep their defaults
        assert_eq!(
            model_params.set_aside.state_population,
            SetAsideConversion::default().state_population
        );
    }

    #[test]
    fn test_model_params_from_path_invalid() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(file, "[set_aside]\nregion_households = 0").unwrap();
        }

        assert!(ModelParameters::from_path(dir.path()).is_err());
    }

    #[rstest]
    #[case(0.001, true)] // Valid default value
    #[case(1.0, true)] // Valid: prices already in the right units
    #[case(0.0, false)] // Invalid: exactly zero
    #[case(-0.001, false)] // Invalid: negative value
    #[case(f64::INFINITY, false)] // Invalid: infinite value
    #[case(f64::NAN, false)] // Invalid: NaN value
    fn test_check_wholesale_price_scale(#[case] value: f64, #[case] expected_valid: bool) {
        let result = check_wholesale_price_scale(Dimensionless(value));
        assert_eq!(result.is_ok(), expected_valid);
        if let Err(err) = result {
            assert_eq!(
                err.to_string(),
                "wholesale_price_scale must be a finite number greater than zero"
            );
        }
    }
}
