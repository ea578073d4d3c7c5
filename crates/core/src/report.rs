//! Text output shared by the command-line tools
//!
//! Numbers in scientific notation use a signed, at-least-two-digit exponent
//! (`3.659e-07`, `1.050e+06`), which is what downstream comparison scripts
//! expect. Rust's `{:e}` writes `3.659e-7`.

use crate::core_types::units::GigatonnesPerSecond;
use crate::physics::escape::EscapeReport;
use crate::simulation::lifetime::SimulationOutcome;
use std::fmt;

pub const ELAPSED_AXIS_LABEL: &str = "Elapsed Time (billion years)";
pub const REMAINING_AXIS_LABEL: &str = "Remaining Time Before Flash (billion years)";
pub const REMAINING_SERIES_LABEL: &str = "Remaining Lifetime of the Sun";
pub const ELAPSED_SERIES_LABEL: &str = "Elapsed Time";

/// Format `value` in scientific notation with `precision` mantissa digits
/// after the decimal point and a signed two-digit exponent.
///
/// ```
/// use solar_offload_core::report::scientific;
///
/// assert_eq!(scientific(3.6594e-7, 3), "3.659e-07");
/// assert_eq!(scientific(1.05e6, 3), "1.050e+06");
/// ```
pub fn scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }

    let formatted = format!("{value:.precision$e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exponent) => {
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}

/// Fixed-point formatting with lowercase `nan` / `inf`.
pub fn fixed(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        non_finite(value)
    }
}

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

/// The two lines printed when the positional argument is missing.
pub fn usage_lines(program: &str, argument: &str, example: &str) -> [String; 2] {
    [
        format!("Usage: {program} <{argument}>"),
        format!("Example: {program} {example}"),
    ]
}

impl fmt::Display for EscapeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Computed solar gravitational potential barrier: {} V",
            fixed(*self.gravitational_barrier, 1)
        )?;
        writeln!(
            f,
            "Solar mass ejection with V = {} V:",
            fixed(*self.applied_voltage, 1)
        )?;
        writeln!(
            f,
            "  Escaping particle fraction: {}",
            scientific(self.escaping_fraction, 3)
        )?;
        writeln!(
            f,
            "  Relative to natural solar wind: {}x",
            fixed(self.ratio, 3)
        )?;
        write!(
            f,
            "  Estimated mass loss: {} tons/sec",
            scientific(*self.mass_loss_rate, 3)
        )
    }
}

/// Voltage sweep laid out as a table, one row per voltage under a header.
pub struct SweepTable<'a>(pub &'a [EscapeReport]);

impl fmt::Display for SweepTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>14} {:>14} {:>18}",
            "Voltage (V)", "Fraction", "Ratio", "Mass loss (t/s)"
        )?;
        for report in self.0 {
            let clamp_marker = if report.barrier_clamped { " *" } else { "" };
            writeln!(
                f,
                "{:>12} {:>14} {:>14} {:>18}{}",
                fixed(*report.applied_voltage, 1),
                scientific(report.escaping_fraction, 3),
                fixed(report.ratio, 3),
                scientific(*report.mass_loss_rate, 3),
                clamp_marker
            )?;
        }
        if self.0.iter().any(|r| r.barrier_clamped) {
            writeln!(
                f,
                "* applied voltage exceeds the gravitational barrier; whole distribution escapes"
            )?;
        }
        Ok(())
    }
}

/// Table text for a sweep, ending in a newline.
pub fn sweep_table(reports: &[EscapeReport]) -> String {
    SweepTable(reports).to_string()
}

/// Title of the lifetime chart
pub fn chart_title(mass_loss_rate: GigatonnesPerSecond) -> String {
    format!(
        "Can the Sun Outlive the Flash at {} Gt/s Mass Loss?",
        fixed(*mass_loss_rate, 2)
    )
}

/// Plain-text summary of a lifetime run, used when no chart is drawn.
pub struct LifetimeSummary<'a>(pub &'a SimulationOutcome);

impl fmt::Display for LifetimeSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let series = &outcome.series;
        writeln!(f, "{}", chart_title(outcome.mass_loss_rate))?;
        writeln!(f, "  Recorded steps: {}", series.len())?;
        writeln!(f, "  Termination: {}", outcome.termination)?;

        if let Some(last) = series.points().last() {
            writeln!(
                f,
                "  Last point: elapsed {} Gyr, remaining {} Gyr",
                fixed(last.elapsed_gyr, 4),
                fixed(last.remaining_gyr, 4)
            )?;
        }

        match outcome.crossover() {
            Some(point) => write!(
                f,
                "  Elapsed time overtakes the remaining margin at {} Gyr",
                fixed(point.elapsed_gyr, 4)
            ),
            None => write!(
                f,
                "  Remaining margin stays ahead of elapsed time for every recorded step"
            ),
        }
    }
}

/// Summary text without a trailing newline.
pub fn lifetime_summary(outcome: &SimulationOutcome) -> String {
    LifetimeSummary(outcome).to_string()
}
