//! Physical constants shared by the escape model and the lifetime simulator.
//!
//! Values are the fixed literals the calculators have always used, not CODATA
//! best estimates. Changing one changes every printed number.

/// Boltzmann constant (eV/K)
pub const BOLTZMANN_EV_PER_K: f64 = 8.617e-5;

/// Chromospheric temperature (K)
pub const CHROMOSPHERE_TEMPERATURE_K: f64 = 1_000_000.0;

/// Gravitational constant (m³/(kg·s²))
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// Mass of the Sun (kg)
pub const SOLAR_MASS_KG: f64 = 1.989e30;

/// Radius of the Sun (m)
pub const SOLAR_RADIUS_M: f64 = 6.9634e8;

/// Proton mass (kg)
pub const PROTON_MASS_KG: f64 = 1.6726e-27;

/// Elementary charge (C)
pub const ELEMENTARY_CHARGE_C: f64 = 1.6022e-19;

/// Average natural solar-wind mass loss (tons/s)
pub const BASELINE_SOLAR_WIND_LOSS_TONS_PER_S: f64 = 2.1e6 / 2.0;

/// Seconds in a Julian year
pub const SECONDS_PER_YEAR: f64 = 3.154e7;

/// Years in one billion years (Gyr)
pub const YEARS_PER_GYR: f64 = 1e9;

/// Kilograms per gigatonne
pub const KG_PER_GIGATONNE: f64 = 1e12;

/// Simulation timestep (years)
pub const LIFETIME_TIMESTEP_YEARS: f64 = 1e5;

/// Simulation horizon (years)
pub const LIFETIME_HORIZON_YEARS: f64 = 15e9;

/// Hypothetical total lifetime of a lighter Sun (years)
pub const SUN_TOTAL_LIFETIME_YEARS: f64 = 8e9;

/// Remaining life of the current Sun before the flash (years)
pub const SUN_REMAINING_LIFE_YEARS: f64 = 4e9;

/// Main-sequence lifetime scaling `t ∝ M^-2.5`
pub const MASS_LIFETIME_EXPONENT: f64 = -2.5;
