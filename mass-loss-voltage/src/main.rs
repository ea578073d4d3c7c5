use clap::Parser;
use solar_offload_core::constants::{
    BASELINE_SOLAR_WIND_LOSS_TONS_PER_S, CHROMOSPHERE_TEMPERATURE_K,
};
use solar_offload_core::{
    escape_report, report, sweep, sweep_voltages, EscapeParams, Kelvin, TonsPerSecond, Volts,
};
use std::error::Error;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PROGRAM: &str = env!("CARGO_BIN_NAME");

/// Solar-wind mass loss under an externally applied voltage
#[derive(Parser, Debug)]
#[command(name = "mass-loss-voltage")]
#[command(about = "Estimate solar mass ejection for a voltage applied to the Sun", long_about = None)]
struct Args {
    /// Voltage applied to the Sun in volts
    #[arg(allow_negative_numbers = true)]
    voltage: Option<f64>,

    /// Temperature of the escaping plasma in Kelvin
    #[arg(long, default_value_t = CHROMOSPHERE_TEMPERATURE_K)]
    temperature: f64,

    /// Natural solar-wind mass loss in tons/s
    #[arg(long, default_value_t = BASELINE_SOLAR_WIND_LOSS_TONS_PER_S)]
    baseline_loss: f64,

    /// Sweep from VOLTAGE up to this voltage and print a table
    #[arg(long, allow_negative_numbers = true)]
    sweep_to: Option<f64>,

    /// Voltage increment for --sweep-to
    #[arg(long, default_value_t = 100.0)]
    sweep_step: f64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    debug!("{:?}", args);

    let Some(voltage) = args.voltage else {
        for line in report::usage_lines(PROGRAM, "Sun_voltage_in_volts", "630") {
            println!("{line}");
        }
        return ExitCode::from(1);
    };

    match run(&args, Volts::new(voltage)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args, voltage: Volts) -> Result<(), Box<dyn Error>> {
    let params = EscapeParams::default()
        .with_temperature(Kelvin::new(args.temperature))
        .with_baseline_loss(TonsPerSecond::new(args.baseline_loss));

    if let Some(end) = args.sweep_to {
        let voltages = sweep_voltages(voltage, Volts::new(end), Volts::new(args.sweep_step))?;
        let reports = sweep(&params, &voltages)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            println!(
                "Computed solar gravitational potential barrier: {} V",
                report::fixed(*params.gravitational_barrier(), 1)
            );
            print!("{}", report::sweep_table(&reports));
        }
        return Ok(());
    }

    let result = escape_report(&params, voltage)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{result}");
    }
    Ok(())
}

/// Log to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
