//! The headless command-line runner.
//!
//! Builds a world from an optional JSON parameter file, runs it for a number of simulated days
//! and optionally writes the history as CSV.
use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches as _};
use log::info;

use crate::engine::Engine;
use crate::error::EpinetError;
use crate::log::{set_log_level, LevelFilter};
use crate::params::Params;
use crate::report::write_history_csv;

/// File name of the history export inside `--output-dir`.
pub const HISTORY_FILE: &str = "history.csv";

/// Default cli arguments for the epinet runner
#[derive(Args, Debug, Clone)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path to a JSON parameter file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Simulated days to run
    #[arg(short, long, default_value = "10")]
    pub days: u32,

    /// Optional directory for the history CSV
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short, long)]
    pub log_level: Option<LevelFilter>,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            random_seed: 0,
            config: None,
            days: 10,
            output_dir: None,
            log_level: None,
        }
    }
}

fn create_epinet_cli() -> Command {
    let cli = Command::new("epinet");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation with the command line arguments of the current process.
///
/// `setup_fn` is called on the freshly built engine before it runs, and may adjust it (for
/// example with [`Engine::set_params`]).
///
/// # Errors
/// Returns an error if argument parsing, parameter loading, the setup function or the history
/// export fails
pub fn run_with_args<F>(setup_fn: F) -> Result<Engine, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Engine, &BaseArgs) -> Result<(), EpinetError>,
{
    let matches = create_epinet_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_base_args(args, setup_fn)?)
}

/// Runs a simulation with already parsed arguments.
///
/// # Errors
/// Returns an `EpinetError` if the parameter file cannot be loaded, the setup function fails or
/// the history cannot be written
pub fn run_with_base_args<F>(args: BaseArgs, setup_fn: F) -> Result<Engine, EpinetError>
where
    F: FnOnce(&mut Engine, &BaseArgs) -> Result<(), EpinetError>,
{
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let params = match &args.config {
        Some(path) => {
            info!("Loading parameters from: {}", path.display());
            Params::load_from_json(path)?
        }
        None => Params::default(),
    };

    let mut engine = Engine::new(params, args.random_seed);
    setup_fn(&mut engine, &args)?;
    engine.run_until_day(args.days);

    let census = engine.census();
    info!(
        "day {}: S={} L={} IA={} IS={} H={} R={} D={} vaccinated={}",
        engine.day(),
        census.susceptible,
        census.latent,
        census.asymptomatic,
        census.symptomatic,
        census.hospitalized,
        census.recovered,
        census.dead,
        census.vaccinated
    );

    if let Some(dir) = &args.output_dir {
        let path = dir.join(HISTORY_FILE);
        write_history_csv(engine.history(), &path)?;
        info!("wrote {}", path.display());
    }
    Ok(engine)
}
