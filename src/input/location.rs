//! Code for reading location-related information from a CSV file.
use super::*;
use crate::location::LocationMap;
use std::path::Path;

const LOCATIONS_FILE_NAME: &str = "locations.csv";

/// Reads locations from a CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A [`LocationMap`] with the parsed locations or an error
pub fn read_locations(model_dir: &Path) -> Result<LocationMap> {
    let file_path = model_dir.join(LOCATIONS_FILE_NAME);
    let locations = read_csv_id_file(&file_path)?;
    check_coordinates(&locations).with_context(|| input_err_msg(&file_path))?;

    Ok(locations)
}

/// Check that every location has a valid latitude and longitude
fn check_coordinates(locations: &LocationMap) -> Result<()> {
    for location in locations.values() {
        ensure!(
            (-90.0..=90.0).contains(&location.latitude),
            "Latitude for location {} must be between -90 and 90",
            location.id
        );
        ensure!(
            (-180.0..=180.0).contains(&location.longitude),
            "Longitude for location {} must be between -180 and 180",
            location.id
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, location};
    use crate::location::{Location, LocationID};
    use indexmap::indexmap;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Create an example locations file in dir_path
    fn create_locations_file(dir_path: &Path) {
        let file_path = dir_path.join(LOCATIONS_FILE_NAME);
        let mut file = File::create(file_path).unwrap();
        writeln!(
            file,
            "id,description,latitude,longitude,wholesale_market
PIT,\"Pittsburgh, PA\",40.5,-80.233,PJM
DCA,\"Washington, DC\",38.867,-77.033,PJM"
        )
        .unwrap();
    }

    #[test]
    fn test_read_locations() {
        let dir = tempdir().unwrap();
        create_locations_file(dir.path());
        let locations = read_locations(dir.path()).unwrap();
        assert_eq!(locations.len(), 2);

        let pit = &locations["PIT"];
        assert_eq!(pit.description, "Pittsburgh, PA");
        assert_eq!(pit.wholesale_market, "PJM".into());
        assert!(pit.is_at(40.5, -80.233));
        assert_eq!(locations.get_index(1).unwrap().0, &LocationID::from("DCA"));
    }

    #[rstest]
    #[case(91.0, 0.0, "Latitude for location PIT must be between -90 and 90")]
    #[case(0.0, -180.5, "Longitude for location PIT must be between -180 and 180")]
    fn test_check_coordinates_invalid(
        mut location: Location,
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] msg: &str,
    ) {
        location.latitude = latitude;
        location.longitude = longitude;
        let locations = indexmap! { location.id.clone() => location };
        assert_error!(check_coordinates(&locations), msg);
    }
}
