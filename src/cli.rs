//! The command line interface for bill-xray.
use crate::analysis::HouseholdAnalysis;
use crate::bill::{classify_tier, compute_bill, tier_message};
use crate::id::get_by_id;
use crate::input::household::Household;
use crate::input::tariff::read_tariffs;
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir, write_results};
use crate::report::{write_breakdown, write_cost_chart};
use crate::scenario::{Action, ReductionLevel};
use crate::settings::Settings;
use crate::tariff::{SUPPORTED_TARIFF_ID, TariffMap, TariffSchedule, default_tariffs};
use crate::units::Energy;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for bill-xray.
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

/// Options for choosing a tariff table
#[derive(Args, Default)]
pub struct TariffOpts {
    /// A TOML file with a custom tariff table (overrides the settings file)
    #[arg(long = "tariffs", value_name = "FILE")]
    pub tariffs_file: Option<PathBuf>,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Tariff table options
    #[command(flatten)]
    pub tariff_opts: TariffOpts,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Analyse a household and save the results.
    Run {
        /// Path to the household file.
        household_file: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Estimate a single monthly bill.
    Bill {
        /// Monthly consumption in kWh.
        kwh: f64,
        /// The ID of the tariff to bill under.
        #[arg(long, default_value = SUPPORTED_TARIFF_ID)]
        tariff: String,
        /// Tariff table options
        #[command(flatten)]
        tariff_opts: TariffOpts,
    },
    /// List the available tariffs.
    Tariffs {
        /// Tariff table options
        #[command(flatten)]
        tariff_opts: TariffOpts,
    },
    /// List the energy-saving actions and reduction levels which can be simulated.
    Actions,
    /// Manage example households.
    Example {
        /// The available subcommands for managing example households.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage the program settings file.
    Settings {
        /// The available subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run {
                household_file,
                opts,
            } => handle_run_command(&household_file, &opts, None),
            Self::Bill {
                kwh,
                tariff,
                tariff_opts,
            } => handle_bill_command(Energy(kwh), &tariff, &tariff_opts, None),
            Self::Tariffs { tariff_opts } => handle_tariffs_command(&tariff_opts, None),
            Self::Actions => {
                print!("{}", actions_list());
                Ok(())
            }
            Self::Example { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start bill-xray
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ bill-xray --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// The tariff file to use: the command line wins over the settings file
fn tariffs_path<'a>(opts: &'a TariffOpts, settings: &'a Settings) -> Option<&'a Path> {
    opts.tariffs_file
        .as_deref()
        .or(settings.tariffs_file.as_deref())
}

/// Load a tariff table from file, or the built-in table if no file is given
pub fn load_tariffs(tariffs_path: Option<&Path>) -> Result<TariffMap> {
    match tariffs_path {
        Some(path) => read_tariffs(path),
        None => default_tariffs(),
    }
}

/// Initialise logging for commands which don't write output files
fn init_console_logging(settings: &Settings) -> Result<()> {
    if log::is_logger_initialised() {
        return Ok(());
    }

    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")
}

/// Handle the `run` command.
pub fn handle_run_command(
    household_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(household_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    log::init(Some(settings.log_level.as_str()), Some(output_path))
        .context("Failed to initialise logging.")?;

    let tariffs_path = tariffs_path(&opts.tariff_opts, &settings);
    let tariffs = load_tariffs(tariffs_path).context("Failed to load tariffs.")?;
    let household = Household::from_path(household_path).context("Failed to load household.")?;
    info!("Loaded household from {}", household_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let analysis = HouseholdAnalysis::new(&household, &tariffs)?;
    println!("{analysis}");

    write_results(output_path, &analysis).context("Failed to write results.")?;
    write_metadata(output_path, household_path, tariffs_path)
        .context("Failed to save metadata.")?;
    info!("Analysis complete!");

    Ok(())
}

/// Handle the `bill` command.
pub fn handle_bill_command(
    kwh: Energy,
    tariff_id: &str,
    opts: &TariffOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    init_console_logging(&settings)?;

    let tariffs = load_tariffs(tariffs_path(opts, &settings)).context("Failed to load tariffs.")?;
    let tariff = get_by_id(&tariffs, tariff_id, "tariff")?;
    print!("{}", bill_summary(tariff, kwh)?);

    Ok(())
}

/// Render a single bill with its breakdown and tier status
fn bill_summary(tariff: &TariffSchedule, kwh: Energy) -> Result<String> {
    let bill = compute_bill(tariff, kwh)?;
    let status = classify_tier(tariff, kwh)?;

    let mut out = String::new();
    writeln!(out, "Tariff: {}", tariff.description)?;
    writeln!(out, "Consumption: {kwh} kWh ({status} tier)")?;
    writeln!(out, "{}", tier_message(tariff, kwh)?)?;
    writeln!(out)?;
    writeln!(
        out,
        "Estimated monthly bill: {:.2} JOD",
        bill.total_cost.value()
    )?;
    write_breakdown(&mut out, &bill)?;
    writeln!(out)?;
    write_cost_chart(&mut out, &bill)?;

    Ok(out)
}

/// Handle the `tariffs` command.
pub fn handle_tariffs_command(opts: &TariffOpts, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;
    init_console_logging(&settings)?;

    let tariffs = load_tariffs(tariffs_path(opts, &settings)).context("Failed to load tariffs.")?;
    print!("{}", tariffs_list(&tariffs)?);

    Ok(())
}

/// Render the tariff table, one line per tier
fn tariffs_list(tariffs: &TariffMap) -> Result<String> {
    let mut out = String::new();
    for tariff in tariffs.values() {
        writeln!(out, "{} ({})", tariff.id, tariff.description)?;
        for (i, tier) in tariff.tiers.iter().enumerate() {
            let range = match tier.end {
                Some(end) => format!("{}-{end} kWh", tier.start),
                None => format!("above {} kWh", tier.start),
            };
            writeln!(
                out,
                "  Tier {}: {range} at {:.3} JOD/kWh",
                i + 1,
                tier.rate.value()
            )?;
        }
    }

    Ok(out)
}

/// Render the catalogues of actions and reduction levels
fn actions_list() -> String {
    let mut out = String::from("Energy-saving actions:\n");
    for action in Action::iter() {
        out += &format!(
            "  {:<20} {} (~{} kWh/month)\n",
            action.key(),
            action.description(),
            action.savings()
        );
    }

    out += "\nReduction levels:\n";
    for level in ReductionLevel::iter() {
        out += &format!("  {level}\n");
    }

    out
}
