//! Forward Solar Mass-Decay Simulation
//!
//! Steps elapsed time forward on a fixed grid and asks, at every step, how
//! much time a Sun that has lost mass at the given rate would have left
//! before the helium flash.
//!
//! # Model
//! ```text
//! M(t)        = M_0 - Ṁ · t                 (constant rate since t = 0)
//! t_life(M)   = t_total · (M / M_0)^-2.5
//! margin(t)   = t_life(M(t)) - t_remaining
//! ```
//!
//! Mass lost is the rate multiplied by elapsed time, not an integral over a
//! varying rate. The run stops at the horizon, when the mass reaches zero, or
//! when the margin reaches zero, whichever comes first.

use crate::constants::{
    LIFETIME_HORIZON_YEARS, LIFETIME_TIMESTEP_YEARS, MASS_LIFETIME_EXPONENT, SOLAR_MASS_KG,
    SUN_REMAINING_LIFE_YEARS, SUN_TOTAL_LIFETIME_YEARS,
};
use crate::core_types::units::{
    GigatonnesPerSecond, Kilograms, KilogramsPerSecond, Seconds, Years,
};
use crate::error::{ensure_finite, ensure_positive, SolarError, SolarResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Largest number of grid points a run may record (the default grid has 150 000)
pub const MAX_LIFETIME_STEPS: usize = 10_000_000;

/// Inputs of the mass-decay simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeParams {
    pub initial_mass: Kilograms,
    pub timestep: Years,
    /// Simulation stops before elapsed time reaches this
    pub horizon: Years,
    /// Hypothetical total lifetime at the initial mass
    pub total_lifetime: Years,
    /// Time the current Sun has left before the flash
    pub remaining_life: Years,
    /// Exponent of the lifetime-mass power law
    pub mass_lifetime_exponent: f64,
}

impl Default for LifetimeParams {
    fn default() -> Self {
        Self {
            initial_mass: Kilograms::new(SOLAR_MASS_KG),
            timestep: Years::new(LIFETIME_TIMESTEP_YEARS),
            horizon: Years::new(LIFETIME_HORIZON_YEARS),
            total_lifetime: Years::new(SUN_TOTAL_LIFETIME_YEARS),
            remaining_life: Years::new(SUN_REMAINING_LIFE_YEARS),
            mass_lifetime_exponent: MASS_LIFETIME_EXPONENT,
        }
    }
}

impl LifetimeParams {
    pub fn with_timestep(mut self, timestep: Years) -> Self {
        self.timestep = timestep;
        self
    }

    pub fn with_horizon(mut self, horizon: Years) -> Self {
        self.horizon = horizon;
        self
    }

    /// Number of grid points with elapsed time below the horizon.
    ///
    /// Elapsed time is `index × timestep`, so this is `ceil(horizon / timestep)`.
    pub fn step_count(&self) -> usize {
        (self.horizon / self.timestep).ceil() as usize
    }

    /// Total lifetime of a star of the given mass (power law in mass ratio)
    pub fn lifetime_at_mass(&self, mass: Kilograms) -> Seconds {
        self.total_lifetime.to_seconds() * (mass / self.initial_mass).powf(self.mass_lifetime_exponent)
    }

    fn validate(&self) -> SolarResult<()> {
        ensure_positive("initial mass", *self.initial_mass)?;
        ensure_positive("timestep", *self.timestep)?;
        ensure_positive("horizon", *self.horizon)?;
        let steps = (self.horizon / self.timestep).ceil();
        if !steps.is_finite() || steps > MAX_LIFETIME_STEPS as f64 {
            return Err(SolarError::TooManyPoints {
                quantity: "lifetime simulation",
                count: steps,
                limit: MAX_LIFETIME_STEPS,
            });
        }
        ensure_positive("total lifetime", *self.total_lifetime)?;
        ensure_finite("remaining life", *self.remaining_life)?;
        ensure_finite("mass-lifetime exponent", self.mass_lifetime_exponent)?;
        Ok(())
    }
}

/// One recorded step, both coordinates in billions of years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimePoint {
    pub elapsed_gyr: f64,
    /// Margin between the mass-adjusted lifetime and the current remaining life
    pub remaining_gyr: f64,
}

/// Why the simulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// Elapsed time reached the horizon
    HorizonReached,
    /// The Sun evaporated completely
    MassDepleted { elapsed_gyr: f64 },
    /// The flash would occur before this elapsed time
    FlashReached { elapsed_gyr: f64 },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::HorizonReached => write!(f, "reached the simulation horizon"),
            Termination::MassDepleted { elapsed_gyr } => {
                write!(f, "Sun fully evaporated at {elapsed_gyr:.4} Gyr")
            }
            Termination::FlashReached { elapsed_gyr } => {
                write!(f, "flash margin exhausted at {elapsed_gyr:.4} Gyr")
            }
        }
    }
}

/// Ordered sequence of recorded steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LifetimeSeries {
    points: Vec<LifetimePoint>,
}

impl LifetimeSeries {
    pub fn points(&self) -> &[LifetimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn elapsed_times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.elapsed_gyr).collect()
    }

    pub fn remaining_lifetimes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.remaining_gyr).collect()
    }

    /// `(elapsed, remaining)` pairs, the remaining-lifetime curve
    pub fn remaining_curve(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.elapsed_gyr, p.remaining_gyr))
            .collect()
    }

    /// `(elapsed, elapsed)` pairs, the reference line the curve must stay above
    pub fn identity_line(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.elapsed_gyr, p.elapsed_gyr))
            .collect()
    }

    fn push(&mut self, point: LifetimePoint) {
        self.points.push(point);
    }
}

/// Result of one advance of the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepResult {
    Recorded(LifetimePoint),
    Finished(Termination),
}

/// Stepwise mass-decay simulation
#[derive(Debug, Clone)]
pub struct LifetimeSimulation {
    params: LifetimeParams,
    mass_loss_rate: GigatonnesPerSecond,
    loss_kg_per_s: KilogramsPerSecond,
    timestep: Seconds,
    step_count: usize,
    next_step: usize,
    series: LifetimeSeries,
    termination: Option<Termination>,
}

impl LifetimeSimulation {
    /// Create a simulation for a constant mass-loss rate.
    ///
    /// # Errors
    /// Returns an error for a non-finite rate or invalid parameters.
    pub fn new(params: LifetimeParams, mass_loss_rate: GigatonnesPerSecond) -> SolarResult<Self> {
        ensure_finite("mass-loss rate", *mass_loss_rate)?;
        params.validate()?;

        let step_count = params.step_count();
        info!(
            "Lifetime simulation: rate={:.3} Gt/s, {} steps of {:.0} yr",
            *mass_loss_rate, step_count, *params.timestep
        );

        Ok(Self {
            params,
            mass_loss_rate,
            loss_kg_per_s: mass_loss_rate.to_kg_per_second(),
            timestep: params.timestep.to_seconds(),
            step_count,
            next_step: 0,
            series: LifetimeSeries::default(),
            termination: None,
        })
    }

    /// Evaluate the next grid point.
    ///
    /// Once finished, keeps returning the same termination.
    pub fn advance(&mut self) -> StepResult {
        if let Some(termination) = self.termination {
            return StepResult::Finished(termination);
        }

        let result = self.evaluate(self.next_step);
        match result {
            StepResult::Recorded(point) => {
                self.series.push(point);
                self.next_step += 1;
            }
            StepResult::Finished(termination) => {
                debug!("Simulation finished after {} steps: {}", self.next_step, termination);
                self.termination = Some(termination);
            }
        }
        result
    }

    fn evaluate(&self, step: usize) -> StepResult {
        if step >= self.step_count {
            return StepResult::Finished(Termination::HorizonReached);
        }

        let elapsed = self.timestep * step as f64;
        let elapsed_gyr = elapsed.to_gigayears();

        let mass = self.params.initial_mass - self.loss_kg_per_s * elapsed;
        if *mass <= 0.0 {
            return StepResult::Finished(Termination::MassDepleted { elapsed_gyr });
        }

        let margin = self.params.lifetime_at_mass(mass) - self.params.remaining_life.to_seconds();
        if *margin <= 0.0 {
            return StepResult::Finished(Termination::FlashReached { elapsed_gyr });
        }

        StepResult::Recorded(LifetimePoint {
            elapsed_gyr,
            remaining_gyr: margin.to_gigayears(),
        })
    }

    /// Points recorded so far
    pub fn series(&self) -> &LifetimeSeries {
        &self.series
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Advance until a terminal state and return the outcome.
    pub fn run(mut self) -> SimulationOutcome {
        let termination = loop {
            if let StepResult::Finished(termination) = self.advance() {
                break termination;
            }
        };

        info!(
            "Recorded {} points; {}",
            self.series.len(),
            termination
        );

        SimulationOutcome {
            mass_loss_rate: self.mass_loss_rate,
            series: self.series,
            termination,
        }
    }
}

/// Completed simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub mass_loss_rate: GigatonnesPerSecond,
    pub series: LifetimeSeries,
    pub termination: Termination,
}

impl SimulationOutcome {
    /// First recorded point where elapsed time has caught up with the
    /// remaining margin, i.e. where the two plotted lines meet.
    ///
    /// `None` means the margin stayed ahead for every recorded step.
    pub fn crossover(&self) -> Option<LifetimePoint> {
        self.series
            .points()
            .iter()
            .find(|p| p.elapsed_gyr >= p.remaining_gyr)
            .copied()
    }
}

/// Run the simulation to completion.
///
/// # Example
/// ```
/// use solar_offload_core::simulation::{simulate, LifetimeParams, Termination};
/// use solar_offload_core::core_types::GigatonnesPerSecond;
///
/// let outcome = simulate(LifetimeParams::default(), GigatonnesPerSecond::new(1e6)).unwrap();
/// assert_eq!(outcome.series.len(), 1);
/// assert!(matches!(outcome.termination, Termination::MassDepleted { .. }));
/// ```
pub fn simulate(
    params: LifetimeParams,
    mass_loss_rate: GigatonnesPerSecond,
) -> SolarResult<SimulationOutcome> {
    Ok(LifetimeSimulation::new(params, mass_loss_rate)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_step_count() {
        assert_eq!(LifetimeParams::default().step_count(), 150_000);
        let odd = LifetimeParams::default()
            .with_timestep(Years::new(3.0))
            .with_horizon(Years::new(10.0));
        // t = 0, 3, 6, 9
        assert_eq!(odd.step_count(), 4);
    }

    #[test]
    fn test_lifetime_power_law() {
        let params = LifetimeParams::default();
        let full = params.lifetime_at_mass(params.initial_mass);
        assert_eq!(full, params.total_lifetime.to_seconds());

        let half = params.lifetime_at_mass(Kilograms::new(*params.initial_mass / 2.0));
        assert_relative_eq!(*half / *full, 2f64.powf(2.5), max_relative = 1e-12);
    }

    #[test]
    fn test_first_step_is_at_time_zero() {
        let mut sim =
            LifetimeSimulation::new(LifetimeParams::default(), GigatonnesPerSecond::new(1.0))
                .unwrap();
        let StepResult::Recorded(point) = sim.advance() else {
            panic!("first step should record a point");
        };
        assert_eq!(point.elapsed_gyr, 0.0);
        assert_relative_eq!(point.remaining_gyr, 4.0, max_relative = 1e-12);
        assert_eq!(sim.series().len(), 1);
        assert!(sim.termination().is_none());
    }

    #[test]
    fn test_finished_simulation_stays_finished() {
        let mut sim =
            LifetimeSimulation::new(LifetimeParams::default(), GigatonnesPerSecond::new(1e6))
                .unwrap();
        assert!(matches!(sim.advance(), StepResult::Recorded(_)));
        let first = sim.advance();
        assert!(matches!(first, StepResult::Finished(Termination::MassDepleted { .. })));
        assert_eq!(sim.advance(), first);
        assert_eq!(sim.series().len(), 1);
    }

    #[test]
    fn test_flash_before_first_step_leaves_series_empty() {
        let params = LifetimeParams {
            remaining_life: Years::new(9e9),
            ..LifetimeParams::default()
        };
        let outcome = simulate(params, GigatonnesPerSecond::new(0.0)).unwrap();
        assert!(outcome.series.is_empty());
        assert_eq!(
            outcome.termination,
            Termination::FlashReached { elapsed_gyr: 0.0 }
        );
        assert!(outcome.crossover().is_none());
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(
            LifetimeSimulation::new(LifetimeParams::default(), GigatonnesPerSecond::new(f64::NAN))
                .is_err()
        );
        let params = LifetimeParams::default().with_timestep(Years::new(0.0));
        assert!(LifetimeSimulation::new(params, GigatonnesPerSecond::new(1.0)).is_err());
    }

    #[test]
    fn test_rejects_grids_above_step_limit() {
        let tiny = LifetimeParams::default().with_timestep(Years::new(1e-300));
        let err = LifetimeSimulation::new(tiny, GigatonnesPerSecond::new(0.0)).unwrap_err();
        assert!(matches!(
            err,
            SolarError::TooManyPoints { count, limit: MAX_LIFETIME_STEPS, .. } if count.is_infinite()
        ));

        let dense = LifetimeParams::default().with_timestep(Years::new(1.0));
        assert!(matches!(
            simulate(dense, GigatonnesPerSecond::new(0.0)),
            Err(SolarError::TooManyPoints { .. })
        ));

        let at_limit = LifetimeParams::default()
            .with_timestep(Years::new(1.0))
            .with_horizon(Years::new(MAX_LIFETIME_STEPS as f64));
        assert!(LifetimeSimulation::new(at_limit, GigatonnesPerSecond::new(0.0)).is_ok());
    }

    #[test]
    fn test_series_accessors() {
        let params = LifetimeParams::default()
            .with_timestep(Years::new(1e9))
            .with_horizon(Years::new(3e9));
        let outcome = simulate(params, GigatonnesPerSecond::new(0.0)).unwrap();
        let series = &outcome.series;

        assert_eq!(series.len(), 3);
        assert_eq!(outcome.termination, Termination::HorizonReached);
        let elapsed = series.elapsed_times();
        for (i, t) in elapsed.iter().enumerate() {
            assert_relative_eq!(*t, i as f64, epsilon = 1e-12);
        }
        assert_eq!(series.identity_line().len(), 3);
        for ((x, y), t) in series.identity_line().iter().zip(&elapsed) {
            assert_eq!(x, t);
            assert_eq!(y, t);
        }
        for (x, y) in series.remaining_curve() {
            assert_relative_eq!(y, 4.0, max_relative = 1e-12);
            assert!(x < 3.0);
        }
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(
            Termination::MassDepleted { elapsed_gyr: 0.6307 }.to_string(),
            "Sun fully evaporated at 0.6307 Gyr"
        );
        assert_eq!(
            Termination::HorizonReached.to_string(),
            "reached the simulation horizon"
        );
    }
}
