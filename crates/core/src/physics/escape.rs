//! Solar-Wind Escape Model
//!
//! Estimates how an external potential applied to the Sun changes the
//! solar-wind mass-loss rate. Coronal protons follow a Maxwell-Boltzmann
//! energy distribution; only those above the gravitational potential barrier
//! escape. An applied voltage lowers the barrier, which fattens the escaping
//! tail, and the natural loss rate scales with it.
//!
//! # Formula
//! ```text
//! φ_grav = G·M☉·m_p / (R☉·e)                       (volts)
//! f(a)   = ∫_a^∞ √E · exp(-E / k_B·T) dE           (unnormalized tail)
//! ratio  = f(φ_grav - V) / f(φ_grav)
//! Ṁ(V)   = Ṁ_0 / f(φ_grav) · f(φ_grav - V)
//! ```
//!
//! # Negative barrier
//! Once `V > φ_grav` the effective barrier is negative. No proton has negative
//! kinetic energy, so the lower bound is clamped to zero and the tail becomes
//! the whole distribution, `Γ(3/2)·(k_B·T)^(3/2)`. The report records the clamp.

use crate::constants::{
    BASELINE_SOLAR_WIND_LOSS_TONS_PER_S, BOLTZMANN_EV_PER_K, CHROMOSPHERE_TEMPERATURE_K,
    ELEMENTARY_CHARGE_C, GRAVITATIONAL_CONSTANT, PROTON_MASS_KG, SOLAR_MASS_KG, SOLAR_RADIUS_M,
};
use crate::core_types::units::{ElectronVolts, Kelvin, Kilograms, TonsPerSecond, Volts};
use crate::error::{ensure_finite, ensure_positive, SolarError, SolarResult};
use crate::numerics::{integrate_to_infinity, QuadratureConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Physical inputs of the escape model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscapeParams {
    /// Temperature of the escaping population
    pub temperature: Kelvin,
    /// Boltzmann constant (eV/K)
    pub boltzmann_ev_per_k: f64,
    /// Gravitational constant (m³/(kg·s²))
    pub gravitational_constant: f64,
    pub solar_mass: Kilograms,
    /// Solar radius (m)
    pub solar_radius_m: f64,
    pub proton_mass: Kilograms,
    /// Elementary charge (C)
    pub elementary_charge_c: f64,
    /// Natural mass-loss rate with no applied voltage
    pub baseline_loss: TonsPerSecond,
    pub quadrature: QuadratureConfig,
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            temperature: Kelvin::new(CHROMOSPHERE_TEMPERATURE_K),
            boltzmann_ev_per_k: BOLTZMANN_EV_PER_K,
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            solar_mass: Kilograms::new(SOLAR_MASS_KG),
            solar_radius_m: SOLAR_RADIUS_M,
            proton_mass: Kilograms::new(PROTON_MASS_KG),
            elementary_charge_c: ELEMENTARY_CHARGE_C,
            baseline_loss: TonsPerSecond::new(BASELINE_SOLAR_WIND_LOSS_TONS_PER_S),
            quadrature: QuadratureConfig::default(),
        }
    }
}

impl EscapeParams {
    pub fn with_temperature(mut self, temperature: Kelvin) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_baseline_loss(mut self, baseline_loss: TonsPerSecond) -> Self {
        self.baseline_loss = baseline_loss;
        self
    }

    /// Thermal energy `k_B·T` of the population
    pub fn thermal_energy(&self) -> ElectronVolts {
        self.temperature.thermal_energy(self.boltzmann_ev_per_k)
    }

    /// Gravitational potential barrier a proton must climb from the solar
    /// surface, expressed as a voltage.
    pub fn gravitational_barrier(&self) -> Volts {
        Volts::new(
            self.gravitational_constant * *self.solar_mass * *self.proton_mass
                / (self.solar_radius_m * self.elementary_charge_c),
        )
    }

    fn validate(&self) -> SolarResult<()> {
        ensure_positive("temperature", *self.temperature)?;
        ensure_positive("Boltzmann constant", self.boltzmann_ev_per_k)?;
        ensure_positive("gravitational constant", self.gravitational_constant)?;
        ensure_positive("solar mass", *self.solar_mass)?;
        ensure_positive("solar radius", self.solar_radius_m)?;
        ensure_positive("proton mass", *self.proton_mass)?;
        ensure_positive("elementary charge", self.elementary_charge_c)?;
        ensure_finite("baseline loss", *self.baseline_loss)?;
        Ok(())
    }
}

/// Unnormalized Maxwell-Boltzmann energy density `√E · exp(-(E - E_ref)/kT)`.
///
/// `reference` rescales the density by `exp(E_ref/kT)` so that it stays
/// O(1) near `E = E_ref`; pass 0 for the plain `√E · exp(-E/kT)`.
/// Undefined (NaN) for negative energies.
#[inline]
pub fn maxwell_energy_density(energy: f64, reference: f64, thermal_energy: f64) -> f64 {
    energy.sqrt() * (-(energy - reference) / thermal_energy).exp()
}

/// Escaping tail of the distribution above a threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscapeFraction {
    /// Lower integration bound actually used
    pub lower_bound: ElectronVolts,
    /// `∫_lower^∞ √E · exp(-E/kT) dE`
    pub value: f64,
    /// True when a negative threshold was raised to zero
    pub clamped: bool,
}

/// Integrate the distribution tail above `threshold`.
///
/// The exponential is factored out at the bound,
/// `f(a) = exp(-a/kT) · ∫_a^∞ √E · exp(-(E-a)/kT) dE`,
/// so the quadrature works on an O(kT) integrand whatever the barrier height.
pub fn maxwell_boltzmann_tail(
    thermal_energy: ElectronVolts,
    threshold: ElectronVolts,
    config: &QuadratureConfig,
) -> SolarResult<EscapeFraction> {
    let kt = ensure_positive("thermal energy", *thermal_energy)?;
    ensure_finite("threshold energy", *threshold)?;

    let clamped = *threshold < 0.0;
    if clamped {
        warn!(
            "Effective barrier {:.1} eV is negative; clamping lower bound to 0 (whole distribution escapes)",
            *threshold
        );
    }
    let lower = *threshold.non_negative();

    let shifted = integrate_to_infinity(
        |energy| maxwell_energy_density(energy, lower, kt),
        lower,
        kt,
        config,
    )?;
    let value = shifted.value * (-lower / kt).exp();

    debug!(
        "Tail above {:.2} eV (kT={:.2} eV): {:.6e} ({} segments, {} evaluations)",
        lower, kt, value, shifted.subdivisions, shifted.evaluations
    );

    Ok(EscapeFraction {
        lower_bound: ElectronVolts::new(lower),
        value,
        clamped,
    })
}

/// Everything the voltage calculator reports for one applied voltage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscapeReport {
    /// `φ_grav`
    pub gravitational_barrier: Volts,
    pub applied_voltage: Volts,
    /// `φ_grav - V`, before any clamping
    pub effective_barrier: Volts,
    /// Tail above the gravitational barrier alone
    pub baseline_fraction: f64,
    /// Tail above the effective barrier
    pub escaping_fraction: f64,
    /// `escaping_fraction / baseline_fraction`
    pub ratio: f64,
    pub mass_loss_rate: TonsPerSecond,
    pub barrier_clamped: bool,
}

/// Compute the mass-loss report for an applied voltage.
///
/// # Errors
/// - `NonFinite` / `NonPositive` for invalid voltage or parameters
/// - `VanishingBaseline` when the baseline tail underflows to zero
/// - `QuadratureNotConverged` if either integral misses its tolerance
pub fn escape_report(params: &EscapeParams, applied_voltage: Volts) -> SolarResult<EscapeReport> {
    ensure_finite("applied voltage", *applied_voltage)?;
    params.validate()?;

    let thermal = params.thermal_energy();
    let gravitational_barrier = params.gravitational_barrier();
    let effective_barrier = gravitational_barrier - applied_voltage;

    let baseline = maxwell_boltzmann_tail(
        thermal,
        gravitational_barrier.energy_for_unit_charge(),
        &params.quadrature,
    )?;
    if baseline.value <= 0.0 {
        return Err(SolarError::VanishingBaseline(baseline.value));
    }

    let escaping = maxwell_boltzmann_tail(
        thermal,
        effective_barrier.energy_for_unit_charge(),
        &params.quadrature,
    )?;

    let ratio = escaping.value / baseline.value;
    let mass_loss_rate = params.baseline_loss / baseline.value * escaping.value;

    info!(
        "V={:.1} V: barrier {:.1} V -> {:.1} V, ratio={:.3}, loss={:.3e} tons/s",
        *applied_voltage, *gravitational_barrier, *effective_barrier, ratio, *mass_loss_rate
    );

    Ok(EscapeReport {
        gravitational_barrier,
        applied_voltage,
        effective_barrier,
        baseline_fraction: baseline.value,
        escaping_fraction: escaping.value,
        ratio,
        mass_loss_rate,
        barrier_clamped: escaping.clamped,
    })
}

/// Largest number of voltages a sweep may contain
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// Evenly spaced voltages from `start` to `end` inclusive.
///
/// # Errors
/// `TooManyPoints` when the range holds more than [`MAX_SWEEP_POINTS`] steps.
pub fn sweep_voltages(start: Volts, end: Volts, step: Volts) -> SolarResult<Vec<Volts>> {
    let start = ensure_finite("sweep start", *start)?;
    let end = ensure_finite("sweep end", *end)?;
    let step = ensure_positive("sweep step", *step)?;
    if end < start {
        return Err(SolarError::NonPositive {
            quantity: "sweep span",
            value: end - start,
        });
    }

    // Tolerate the end point landing a rounding error past an exact step
    let count = ((end - start) / step + 1e-9).floor() + 1.0;
    if !count.is_finite() || count > MAX_SWEEP_POINTS as f64 {
        return Err(SolarError::TooManyPoints {
            quantity: "voltage sweep",
            count,
            limit: MAX_SWEEP_POINTS,
        });
    }
    let count = count as usize;
    Ok((0..count)
        .map(|i| Volts::new(start + i as f64 * step))
        .collect())
}

/// Compute reports for many voltages in parallel, returned in input order.
pub fn sweep(params: &EscapeParams, voltages: &[Volts]) -> SolarResult<Vec<EscapeReport>> {
    info!("Sweeping {} voltages", voltages.len());
    voltages
        .par_iter()
        .map(|&voltage| escape_report(params, voltage))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_barrier_matches_formula() {
        let params = EscapeParams::default();
        let expected = 6.67430e-11 * 1.989e30 * 1.6726e-27 / (6.9634e8 * 1.6022e-19);
        assert_eq!(*params.gravitational_barrier(), expected);
        assert_relative_eq!(*params.gravitational_barrier(), 1990.19, epsilon = 0.01);
    }

    #[test]
    fn test_density_shape() {
        assert_eq!(maxwell_energy_density(0.0, 0.0, 86.17), 0.0);
        assert!(maxwell_energy_density(-1.0, 0.0, 86.17).is_nan());
        // Peak of √E·e^{-E/kT} sits at E = kT/2
        let kt = 86.17;
        let peak = maxwell_energy_density(kt / 2.0, 0.0, kt);
        assert!(peak > maxwell_energy_density(kt / 2.0 - 1.0, 0.0, kt));
        assert!(peak > maxwell_energy_density(kt / 2.0 + 1.0, 0.0, kt));
    }

    #[test]
    fn test_reference_energy_rescales_density() {
        let kt = 86.17;
        let plain = maxwell_energy_density(2000.0, 0.0, kt);
        let shifted = maxwell_energy_density(2000.0, 1990.0, kt);
        assert_relative_eq!(shifted, plain * (1990.0 / kt).exp(), max_relative = 1e-12);
        // At the reference energy only the √E factor is left
        assert_relative_eq!(shifted, 2000.0_f64.sqrt() * (-10.0 / kt).exp(), max_relative = 1e-12);
        // Far past the barrier the plain density underflows, the shifted one does not
        let cold = 0.01;
        assert_eq!(maxwell_energy_density(1990.0, 0.0, cold), 0.0);
        assert_relative_eq!(
            maxwell_energy_density(1990.0, 1990.0, cold),
            1990.0_f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_tail_matches_closed_form() {
        // T^{3/2}·Γ(3/2, a/T) evaluated independently
        let thermal = ElectronVolts::new(86.17);
        let config = QuadratureConfig::default();

        let f0 = maxwell_boltzmann_tail(thermal, ElectronVolts::new(1990.189949314924), &config)
            .unwrap();
        assert_relative_eq!(f0.value, 3.6594311757591775e-07, max_relative = 1e-8);
        assert!(!f0.clamped);

        let full = maxwell_boltzmann_tail(thermal, ElectronVolts::new(0.0), &config).unwrap();
        assert_relative_eq!(full.value, 708.8903756003343, max_relative = 1e-8);
    }

    #[test]
    fn test_negative_threshold_is_clamped() {
        let thermal = ElectronVolts::new(86.17);
        let config = QuadratureConfig::default();
        let tail = maxwell_boltzmann_tail(thermal, ElectronVolts::new(-500.0), &config).unwrap();
        let full = maxwell_boltzmann_tail(thermal, ElectronVolts::new(0.0), &config).unwrap();

        assert!(tail.clamped);
        assert_eq!(*tail.lower_bound, 0.0);
        assert_eq!(tail.value, full.value);
    }

    #[test]
    fn test_zero_voltage_is_baseline() {
        let report = escape_report(&EscapeParams::default(), Volts::new(0.0)).unwrap();
        assert_eq!(report.escaping_fraction, report.baseline_fraction);
        assert_eq!(report.ratio, 1.0);
        assert_relative_eq!(*report.mass_loss_rate, 1.05e6, max_relative = 1e-12);
        assert_eq!(report.effective_barrier, report.gravitational_barrier);
        assert!(!report.barrier_clamped);
    }

    #[test]
    fn test_report_at_630_volts() {
        let report = escape_report(&EscapeParams::default(), Volts::new(630.0)).unwrap();
        assert_relative_eq!(report.escaping_fraction, 4.570783754521098e-04, max_relative = 1e-8);
        assert_relative_eq!(report.ratio, 1249.042142068119, max_relative = 1e-8);
        assert_relative_eq!(*report.mass_loss_rate, 1311494249.1715248, max_relative = 1e-8);
    }

    #[test]
    fn test_rejects_non_finite_voltage() {
        let err = escape_report(&EscapeParams::default(), Volts::new(f64::NAN)).unwrap_err();
        assert!(matches!(
            err,
            SolarError::NonFinite {
                quantity: "applied voltage",
                ..
            }
        ));
    }

    #[test]
    fn test_cold_plasma_has_no_baseline() {
        // kT = 0.0086 eV against a ~2 kV barrier underflows exp()
        let params = EscapeParams::default().with_temperature(Kelvin::new(100.0));
        let err = escape_report(&params, Volts::new(0.0)).unwrap_err();
        assert!(matches!(err, SolarError::VanishingBaseline(_)));
    }

    #[test]
    fn test_sweep_voltages_inclusive() {
        let v = sweep_voltages(Volts::new(0.0), Volts::new(1.0), Volts::new(0.1)).unwrap();
        assert_eq!(v.len(), 11);
        assert_relative_eq!(*v[10], 1.0, epsilon = 1e-12);

        let single = sweep_voltages(Volts::new(5.0), Volts::new(5.0), Volts::new(1.0)).unwrap();
        assert_eq!(single, vec![Volts::new(5.0)]);

        assert!(sweep_voltages(Volts::new(5.0), Volts::new(1.0), Volts::new(1.0)).is_err());
        assert!(sweep_voltages(Volts::new(0.0), Volts::new(1.0), Volts::new(0.0)).is_err());
    }

    #[test]
    fn test_sweep_voltages_point_limit() {
        // Span over step overflows to infinity
        let err = sweep_voltages(Volts::new(0.0), Volts::new(1e300), Volts::new(1e-300)).unwrap_err();
        assert!(matches!(
            err,
            SolarError::TooManyPoints { count, limit: MAX_SWEEP_POINTS, .. } if count.is_infinite()
        ));

        // Finite but far too large to allocate
        let err = sweep_voltages(Volts::new(0.0), Volts::new(1e12), Volts::new(1.0)).unwrap_err();
        assert!(matches!(err, SolarError::TooManyPoints { .. }));

        // Exactly at the limit is still accepted
        let end = (MAX_SWEEP_POINTS - 1) as f64;
        let v = sweep_voltages(Volts::new(0.0), Volts::new(end), Volts::new(1.0)).unwrap();
        assert_eq!(v.len(), MAX_SWEEP_POINTS);
    }

    #[test]
    fn test_sweep_preserves_order() {
        let params = EscapeParams::default();
        let voltages = sweep_voltages(Volts::new(0.0), Volts::new(2000.0), Volts::new(250.0)).unwrap();
        let reports = sweep(&params, &voltages).unwrap();
        assert_eq!(reports.len(), voltages.len());
        for (report, voltage) in reports.iter().zip(&voltages) {
            assert_eq!(report.applied_voltage, *voltage);
        }
    }
}
