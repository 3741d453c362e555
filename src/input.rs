//! Common routines for handling input data.
use crate::id::{HasID, IDLike};
use crate::model::{Model, ModelParameters};
use crate::reference::ReferenceTables;
use crate::series::{HourlyGrid, TimeSeries};
use anyhow::{Context, Result, bail, ensure};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

mod households;
use households::read_households;
mod location;
use location::read_locations;
mod production;
use production::read_production;
mod tariff;
use tariff::read_tariffs;
mod usage;
use usage::read_usage;
mod wholesale;
use wholesale::read_wholesale_prices;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = csv::Reader::from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a CSV file of items with IDs.
///
/// As this function is only ever used for top-level CSV files (i.e. the ones which actually define
/// the IDs for a given type), we use an ordered map to maintain the order in the input files.
fn read_csv_id_file<T, ID: IDLike>(file_path: &Path) -> Result<IndexMap<ID, T>>
where
    T: HasID<ID> + DeserializeOwned,
{
    fn fill_and_validate_map<T, ID: IDLike>(file_path: &Path) -> Result<IndexMap<ID, T>>
    where
        T: HasID<ID> + DeserializeOwned,
    {
        let mut map = IndexMap::new();
        for record in read_csv::<T>(file_path)? {
            let id = record.get_id().clone();
            let existing = map.insert(id.clone(), record).is_some();
            ensure!(!existing, "Duplicate ID found: {id}");
        }

        Ok(map)
    }

    fill_and_validate_map(file_path).with_context(|| input_err_msg(file_path))
}

/// Parse a timestamp of the form `YYYY-MM-DD HH:MM[:SS]`.
///
/// The hour-ending convention `24:00` is accepted and means midnight at the start of the
/// following day.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let (date, time) = s
        .split_whitespace()
        .collect_tuple()
        .with_context(|| format!("Invalid timestamp: {s}"))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date in timestamp: {s}"))?;

    if matches!(time, "24:00" | "24:00:00") {
        return date
            .succ_opt()
            .map(|date| date.and_time(NaiveTime::MIN))
            .with_context(|| format!("Timestamp out of range: {s}"));
    }

    let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .with_context(|| format!("Invalid time in timestamp: {s}"))?;

    Ok(date.and_time(time))
}

/// Deserialise a timestamp with [`parse_timestamp`]
pub fn deserialise_timestamp<'de, D>(deserialiser: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserialiser)?;
    parse_timestamp(&value).map_err(serde::de::Error::custom)
}

/// Group timestamped values by ID and build a series for each group.
///
/// Timestamps which have rolled over into the following year are wrapped back to the start of
/// the representative year.
fn collect_series<ID, T, I>(iter: I, grid: &HourlyGrid) -> Result<IndexMap<ID, TimeSeries<T>>>
where
    ID: IDLike,
    T: Copy,
    I: IntoIterator<Item = (ID, NaiveDateTime, T)>,
{
    let mut groups: IndexMap<ID, Vec<(NaiveDateTime, T)>> = IndexMap::new();
    for (id, time, value) in iter {
        groups
            .entry(id)
            .or_default()
            .push((grid.wrap(time), value));
    }

    groups
        .into_iter()
        .map(|(id, points)| {
            let series = TimeSeries::from_points(points, grid)
                .with_context(|| format!("Invalid series for {id}"))?;
            Ok((id, series))
        })
        .try_collect()
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The loaded and validated model, or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let grid = HourlyGrid::new(parameters.representative_year.into())?;

    let locations = read_locations(model_dir)?;
    let households = read_households(model_dir, &locations)?;
    let usage = read_usage(model_dir, &locations, &grid)?;
    let production = read_production(model_dir, &locations, &grid)?;
    let wholesale_prices = read_wholesale_prices(model_dir, &locations, &grid)?;
    let tariffs = read_tariffs(model_dir, &locations)?;

    let reference = ReferenceTables {
        locations,
        households,
        usage,
        production,
        wholesale_prices,
        tariffs,
    };
    reference.validate().context("Invalid reference data")?;

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        grid,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, grid};
    use crate::id::GenericID;
    use rstest::rstest;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: GenericID,
        value: u32,
    }

    impl HasID<GenericID> for Record {
        fn get_id(&self) -> &GenericID {
            &self.id
        }
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello,1\nworld,2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".into(),
                    value: 1,
                },
                Record {
                    id: "world".into(),
                    value: 2,
                }
            ]
        );

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_id_file() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\na,1\nb,2\n");
        let map: IndexMap<GenericID, Record> = read_csv_id_file(&file_path).unwrap();
        assert_eq!(
            map.keys().collect_vec(),
            [&GenericID::from("a"), &GenericID::from("b")]
        );

        let file_path = create_csv_file(dir.path(), "id,value\na,1\na,2\n");
        assert!(read_csv_id_file::<Record, GenericID>(&file_path).is_err());
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }

        #[derive(Debug, PartialEq, Deserialize)]
        struct Value {
            value: u32,
        }

        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });

        // Missing file
        assert!(read_toml::<Value>(&dir.path().join("missing.toml")).is_err());
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[rstest]
    #[case("2019-03-04 05:00", "2019-03-04 05:00:00")]
    #[case("2019-03-04 05:30:15", "2019-03-04 05:30:15")]
    #[case("  2019-03-04   05:00 ", "2019-03-04 05:00:00")]
    #[case("2019-03-04 24:00", "2019-03-05 00:00:00")]
    #[case("2019-12-31 24:00:00", "2020-01-01 00:00:00")]
    fn test_parse_timestamp(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_timestamp(input).unwrap(), ts(expected));
    }

    #[rstest]
    #[case("2019-03-04")]
    #[case("2019-03-04 05:00 extra")]
    #[case("2019-13-04 05:00")]
    #[case("2019-03-04 25:00")]
    #[case("2019-03-04 24:30")]
    fn test_parse_timestamp_invalid(#[case] input: &str) {
        assert!(parse_timestamp(input).is_err());
    }

    #[rstest]
    fn test_collect_series(grid: HourlyGrid) {
        let rows = [
            (GenericID::from("b"), ts("2019-01-01 01:00:00"), 2.0),
            (GenericID::from("a"), ts("2019-01-01 00:00:00"), 1.0),
            (GenericID::from("b"), ts("2020-01-01 00:00:00"), 3.0),
        ];
        let series = collect_series(rows, &grid).unwrap();
        assert_eq!(
            series.keys().collect_vec(),
            [&GenericID::from("b"), &GenericID::from("a")]
        );
        assert_eq!(
            series["b"].iter().collect_vec(),
            [
                (ts("2019-01-01 00:00:00"), 3.0),
                (ts("2019-01-01 01:00:00"), 2.0)
            ]
        );
    }

    #[rstest]
    fn test_collect_series_duplicate(grid: HourlyGrid) {
        let rows = [
            (GenericID::from("a"), ts("2019-01-01 00:00:00"), 1.0),
            (GenericID::from("a"), ts("2019-01-01 00:00:00"), 2.0),
        ];
        assert_error!(collect_series(rows, &grid), "Invalid series for a");
    }
}
