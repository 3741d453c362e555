//! The command line interface for the simulation.
use crate::input::load_model;
use crate::log;
use crate::output::{create_output_directory, get_output_dir};
use crate::settings::Settings;
use crate::simulation::Scenario;
use crate::units::Dimensionless;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// The scenario to simulate
#[derive(Args, Debug, Clone, Copy, PartialEq)]
pub struct ScenarioArgs {
    /// Solar set-aside in the first year, as a fraction of state electricity sales
    pub initial_set_aside: f64,
    /// Solar set-aside in the final year, as a fraction of state electricity sales
    pub final_set_aside: f64,
    /// Number of years to simulate after the first year
    pub time_horizon: u32,
    /// Latitude of the location to model
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,
    /// Longitude of the location to model
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,
}

impl From<ScenarioArgs> for Scenario {
    fn from(args: ScenarioArgs) -> Self {
        Self {
            initial_set_aside: Dimensionless(args.initial_set_aside),
            final_set_aside: Dimensionless(args.final_set_aside),
            time_horizon: args.time_horizon,
            latitude: args.latitude,
            longitude: args.longitude,
        }
    }
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run a simulation model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// The scenario to simulate
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example models.
    Example {
        /// The available subcommands for managing example models.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run {
                model_dir,
                scenario,
                opts,
            } => handle_run_command(&model_dir, &scenario.into(), &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ solar-impact --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_path: &Path,
    scenario: &Scenario,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(model_path)?;
        &pathbuf
    };

    let allow_overwrite = opts.overwrite || settings.overwrite;
    let overwrite = create_output_directory(output_path, allow_overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path)).context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    // Load the model to run
    let model = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    // Run the simulation
    crate::simulation::run(&model, scenario, output_path)?;
    info!("Simulation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    // Load/validate the model
    load_model(model_path).context("Failed to validate model.")?;
    info!("Model validation successful!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_negative_longitude() {
        let cli = Cli::try_parse_from([
            "solar-impact",
            "run",
            "model",
            "0",
            "0.01",
            "5",
            "40.5",
            "-80.233",
        ])
        .unwrap();
        let Some(Commands::Run {
            model_dir,
            scenario,
            opts,
        }) = cli.command
        else {
            panic!("Expected run command");
        };

        assert_eq!(model_dir, PathBuf::from("model"));
        assert_eq!(
            Scenario::from(scenario),
            Scenario {
                initial_set_aside: Dimensionless(0.0),
                final_set_aside: Dimensionless(0.01),
                time_horizon: 5,
                latitude: 40.5,
                longitude: -80.233,
            }
        );
        assert!(opts.output_dir.is_none());
        assert!(!opts.overwrite);
    }

    #[test]
    fn test_cli_missing_scenario_args() {
        assert!(Cli::try_parse_from(["solar-impact", "run", "model", "0", "0.01"]).is_err());
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }
}
