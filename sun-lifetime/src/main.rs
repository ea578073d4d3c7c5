mod chart;

use clap::Parser;
use solar_offload_core::constants::{LIFETIME_HORIZON_YEARS, LIFETIME_TIMESTEP_YEARS};
use solar_offload_core::{report, simulate, GigatonnesPerSecond, LifetimeParams, Years};
use std::error::Error;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PROGRAM: &str = env!("CARGO_BIN_NAME");

/// Can offloading mass keep the Sun from reaching the helium flash?
#[derive(Parser, Debug)]
#[command(name = "sun-lifetime")]
#[command(about = "Simulate solar mass loss against the helium-flash deadline", long_about = None)]
struct Args {
    /// Mass-loss rate in gigatonnes per second
    #[arg(allow_negative_numbers = true)]
    mass_loss: Option<f64>,

    /// Simulation timestep in years
    #[arg(long, default_value_t = LIFETIME_TIMESTEP_YEARS)]
    timestep_years: f64,

    /// Stop before elapsed time reaches this many years
    #[arg(long, default_value_t = LIFETIME_HORIZON_YEARS)]
    horizon_years: f64,

    /// Print a summary instead of opening the chart
    #[arg(long)]
    headless: bool,

    /// With --headless, print the full outcome as JSON
    #[arg(long, requires = "headless")]
    json: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    debug!("{:?}", args);

    let Some(mass_loss) = args.mass_loss else {
        for line in
            report::usage_lines(PROGRAM, "mass_loss_in_gigatonnes_per_second", "1.3")
        {
            println!("{line}");
        }
        return ExitCode::from(1);
    };

    match run(&args, GigatonnesPerSecond::new(mass_loss)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args, mass_loss: GigatonnesPerSecond) -> Result<(), Box<dyn Error>> {
    let params = LifetimeParams::default()
        .with_timestep(Years::new(args.timestep_years))
        .with_horizon(Years::new(args.horizon_years));
    let outcome = simulate(params, mass_loss)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if args.headless {
        println!("{}", report::lifetime_summary(&outcome));
    } else {
        chart::show(&outcome)?;
    }
    Ok(())
}

/// Log to stderr; the chart owns stdout while it is open.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
