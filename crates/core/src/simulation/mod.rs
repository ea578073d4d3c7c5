//! Forward simulations
//!
//! - Lifetime: solar mass decay against the helium-flash deadline

pub mod lifetime;

pub use lifetime::{
    simulate, LifetimeParams, LifetimePoint, LifetimeSeries, LifetimeSimulation,
    SimulationOutcome, StepResult, Termination, MAX_LIFETIME_STEPS,
};
