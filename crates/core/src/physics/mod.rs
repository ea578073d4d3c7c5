//! Physics models
//!
//! - Escape: Maxwell-Boltzmann tail above the solar gravitational barrier

pub mod escape;

pub use escape::{
    escape_report, maxwell_boltzmann_tail, maxwell_energy_density, sweep, sweep_voltages,
    EscapeFraction, EscapeParams, EscapeReport, MAX_SWEEP_POINTS,
};
