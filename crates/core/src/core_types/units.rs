//! Semantic unit types for type-safe physical quantity handling
//!
//! Newtype wrappers keep volts apart from electron-volts and seconds apart
//! from years, so the calculators cannot silently mix the unit systems they
//! convert between.
//!
//! # Design Philosophy
//! - Every quantity is an f64: the lifetime simulator subtracts values near
//!   1e30 kg and the escape model works with tails near 1e-7
//! - Total ordering via `Ord` (NaN handled as greater than all values)
//! - Explicit conversion methods between related types
//! - Serde support for the JSON reports
//!
//! # Usage
//! ```
//! use solar_offload_core::core_types::units::{GigatonnesPerSecond, Seconds, Years};
//!
//! let step: Seconds = Years::new(1e5).into();
//! assert!((*step - 3.154e12).abs() < 1.0);
//!
//! let rate = GigatonnesPerSecond::new(1.3).to_kg_per_second();
//! assert!((*rate - 1.3e12).abs() < 1.0);
//! ```

use crate::constants::{KG_PER_GIGATONNE, SECONDS_PER_YEAR, YEARS_PER_GYR};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Neg, Sub};

/// Shared boilerplate for an f64 newtype: total ordering, `Deref`, raw
/// conversions and a `Display` that appends the unit symbol.
macro_rules! scalar_unit {
    ($name:ident, $symbol:expr) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl $name {
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if let Some(precision) = f.precision() {
                    write!(f, "{:.*} {}", precision, self.0, $symbol)
                } else {
                    write!(f, "{} {}", self.0, $symbol)
                }
            }
        }
    };
}

// ============================================================================
// ELECTRIC POTENTIAL AND ENERGY
// ============================================================================

/// Electric potential in volts
///
/// Can be negative: an effective barrier drops below zero once the applied
/// voltage exceeds the gravitational barrier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Volts(f64);

scalar_unit!(Volts, "V");

impl Volts {
    /// Energy gained by a singly charged particle crossing this potential.
    /// Numerically identical: 1 V across one elementary charge is 1 eV.
    #[inline]
    #[must_use]
    pub fn energy_for_unit_charge(self) -> ElectronVolts {
        ElectronVolts(self.0)
    }
}

impl Sub for Volts {
    type Output = Volts;
    fn sub(self, rhs: Volts) -> Volts {
        Volts(self.0 - rhs.0)
    }
}

impl Add for Volts {
    type Output = Volts;
    fn add(self, rhs: Volts) -> Volts {
        Volts(self.0 + rhs.0)
    }
}

impl Neg for Volts {
    type Output = Volts;
    fn neg(self) -> Volts {
        Volts(-self.0)
    }
}

/// Energy in electron-volts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ElectronVolts(f64);

scalar_unit!(ElectronVolts, "eV");

impl ElectronVolts {
    /// Clamp negative energies to zero.
    #[inline]
    #[must_use]
    pub fn non_negative(self) -> Self {
        ElectronVolts(self.0.max(0.0))
    }
}

impl Div for ElectronVolts {
    type Output = f64;
    fn div(self, rhs: ElectronVolts) -> f64 {
        self.0 / rhs.0
    }
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Absolute temperature in Kelvin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kelvin(f64);

scalar_unit!(Kelvin, "K");

impl Kelvin {
    /// Thermal energy `k_B·T` for a Boltzmann constant given in eV/K.
    #[inline]
    #[must_use]
    pub fn thermal_energy(self, boltzmann_ev_per_k: f64) -> ElectronVolts {
        ElectronVolts(self.0 * boltzmann_ev_per_k)
    }
}

// ============================================================================
// MASS AND MASS FLOW
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilograms(f64);

scalar_unit!(Kilograms, "kg");

impl Sub for Kilograms {
    type Output = Kilograms;
    fn sub(self, rhs: Kilograms) -> Kilograms {
        Kilograms(self.0 - rhs.0)
    }
}

/// Mass ratio
impl Div for Kilograms {
    type Output = f64;
    fn div(self, rhs: Kilograms) -> f64 {
        self.0 / rhs.0
    }
}

/// Mass flow in kilograms per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilogramsPerSecond(f64);

scalar_unit!(KilogramsPerSecond, "kg/s");

/// Mass lost at a constant rate over a duration
impl Mul<Seconds> for KilogramsPerSecond {
    type Output = Kilograms;
    fn mul(self, rhs: Seconds) -> Kilograms {
        Kilograms(self.0 * rhs.0)
    }
}

/// Mass flow in gigatonnes per second (the lifetime simulator's input unit)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct GigatonnesPerSecond(f64);

scalar_unit!(GigatonnesPerSecond, "Gt/s");

impl GigatonnesPerSecond {
    /// Convert to kilograms per second
    #[inline]
    #[must_use]
    pub fn to_kg_per_second(self) -> KilogramsPerSecond {
        KilogramsPerSecond(self.0 * KG_PER_GIGATONNE)
    }
}

impl From<GigatonnesPerSecond> for KilogramsPerSecond {
    fn from(r: GigatonnesPerSecond) -> KilogramsPerSecond {
        r.to_kg_per_second()
    }
}

/// Mass flow in metric tons per second (the escape model's reporting unit)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TonsPerSecond(f64);

scalar_unit!(TonsPerSecond, "tons/s");

impl Mul<f64> for TonsPerSecond {
    type Output = TonsPerSecond;
    fn mul(self, rhs: f64) -> TonsPerSecond {
        TonsPerSecond(self.0 * rhs)
    }
}

impl Div<f64> for TonsPerSecond {
    type Output = TonsPerSecond;
    fn div(self, rhs: f64) -> TonsPerSecond {
        TonsPerSecond(self.0 / rhs)
    }
}

// ============================================================================
// TIME
// ============================================================================

/// Duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Seconds(f64);

scalar_unit!(Seconds, "s");

impl Seconds {
    /// Convert to Julian years
    #[inline]
    #[must_use]
    pub fn to_years(self) -> Years {
        Years(self.0 / SECONDS_PER_YEAR)
    }

    /// Convert to billions of years, the unit every plotted value uses.
    #[inline]
    #[must_use]
    pub fn to_gigayears(self) -> f64 {
        self.0 / SECONDS_PER_YEAR / YEARS_PER_GYR
    }
}

impl Sub for Seconds {
    type Output = Seconds;
    fn sub(self, rhs: Seconds) -> Seconds {
        Seconds(self.0 - rhs.0)
    }
}

impl Mul<f64> for Seconds {
    type Output = Seconds;
    fn mul(self, rhs: f64) -> Seconds {
        Seconds(self.0 * rhs)
    }
}

/// Duration in Julian years
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Years(f64);

scalar_unit!(Years, "yr");

impl Years {
    /// Convert to seconds
    #[inline]
    #[must_use]
    pub fn to_seconds(self) -> Seconds {
        Seconds(self.0 * SECONDS_PER_YEAR)
    }
}

impl From<Years> for Seconds {
    fn from(y: Years) -> Seconds {
        y.to_seconds()
    }
}

impl Div for Years {
    type Output = f64;
    fn div(self, rhs: Years) -> f64 {
        self.0 / rhs.0
    }
}
