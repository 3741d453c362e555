//! Common functionality for estimating the revenue impact of residential solar adoption.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod house;
pub mod id;
pub mod impact;
pub mod input;
pub mod location;
pub mod log;
pub mod model;
pub mod output;
pub mod penetration;
pub mod reference;
pub mod region;
pub mod series;
pub mod settings;
pub mod simulation;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the directory in which the program's configuration files are stored.
///
/// Falls back to the working directory if the platform has no config directory.
pub fn get_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::new();
    };
    dir.push("solar-impact");

    dir
}
