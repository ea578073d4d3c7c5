//! Solar Offload Core Library
//!
//! Two calculators for the question "can removing mass from the Sun keep it
//! from reaching the helium flash?":
//!
//! - **Escape model**: how much an applied voltage multiplies the solar-wind
//!   mass-loss rate, by integrating the Maxwell-Boltzmann tail above the
//!   gravitational potential barrier.
//! - **Lifetime simulation**: steps the Sun's mass down at a constant rate and
//!   tracks how much time it would have left before the flash.
//!
//! Both are pure computations; the `mass-loss-voltage` and `sun-lifetime`
//! binaries wrap them with argument parsing and output.

// Core types and utilities
pub mod constants;
pub mod core_types;
pub mod error;
pub mod numerics;

// Models
pub mod physics;
pub mod simulation;

// Output formatting
pub mod report;

pub use core_types::{GigatonnesPerSecond, Kelvin, TonsPerSecond, Volts, Years};
pub use error::{SolarError, SolarResult};
pub use physics::{escape_report, sweep, sweep_voltages, EscapeParams, EscapeReport};
pub use simulation::{simulate, LifetimeParams, SimulationOutcome, Termination};
