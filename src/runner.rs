use std::path::Path;

use clap::{Args, Command, FromArgMatches as _};
use log::info;

use crate::config::{load_config, SimulationConfig};
use crate::error::SimError;
use crate::log::{set_log_level, set_module_filters, LevelFilter};
use crate::simulation::VirusSimulation;

/// Default cli arguments for the simulator
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for a simulation config file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Stop after this many days even if infections remain
    #[arg(short, long, default_value = "1000")]
    pub max_days: u32,

    /// Log level, optionally with per-module levels, e.g. `info` or
    /// `virus_sim::simulation=debug,warn`
    #[arg(short, long)]
    pub log_level: Option<String>,
}

fn create_cli() -> Command {
    let cli = Command::new("virus-sim");
    BaseArgs::augment_args(cli)
}

/// Parses the command line and runs a simulation.
///
/// # Errors
/// Returns an error if argument parsing, config loading or the run fails
pub fn run_with_args() -> Result<VirusSimulation, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    run(&args)
}

/// Builds a simulation from `args` and steps it until no infections remain or the day
/// budget runs out.
///
/// # Errors
/// Returns an error if the log level or config is invalid, or if the run fails.
pub fn run(args: &BaseArgs) -> Result<VirusSimulation, Box<dyn std::error::Error>> {
    if let Some(filters) = &args.log_level {
        let (level, module_filters) = parse_log_level(filters)?;
        set_module_filters(&module_filters);
        set_log_level(level);
    }

    // Optionally load the config from a file
    let config = if args.config.is_empty() {
        SimulationConfig::default()
    } else {
        load_config(Path::new(&args.config))?
    };
    if config.population.size == 0 {
        return Err(SimError::invalid_config(
            "a population size is required; set population.size in a config file",
        )
        .into());
    }

    let mut simulation = VirusSimulation::new(&config, args.random_seed)?;
    info!(
        "running {} on {} people for up to {} days (seed={})",
        simulation.virus().name(),
        simulation.population().initial_population(),
        args.max_days,
        args.random_seed
    );
    simulation.run(args.max_days)?;
    info!("finished after {} days", simulation.day());
    Ok(simulation)
}

/// Parses a comma separated list of `level` and `module=level` entries. The last bare
/// level wins; without one the global level is `info`.
///
/// # Errors
/// Returns `SimError::InvalidConfig` for an unknown level name.
pub fn parse_log_level(
    filters: &str,
) -> Result<(LevelFilter, Vec<(String, LevelFilter)>), SimError> {
    let parse = |name: &str| {
        name.trim().parse::<LevelFilter>().map_err(|_| {
            SimError::invalid_config(format!("unknown log level `{}`", name.trim()))
        })
    };
    let mut global = LevelFilter::Info;
    let mut module_filters = Vec::new();
    for entry in filters.split(',').filter(|entry| !entry.trim().is_empty()) {
        match entry.split_once('=') {
            Some((module, level)) => {
                module_filters.push((module.trim().to_string(), parse(level)?));
            }
            None => global = parse(entry)?,
        }
    }
    Ok((global, module_filters))
}
