//! Adaptive Gauss-Kronrod Quadrature
//!
//! Globally adaptive 7-point Gauss / 15-point Kronrod integration. Every
//! iteration bisects the segment with the largest error estimate until the
//! summed estimate falls under the requested tolerance.
//!
//! # References
//! - Piessens, R., de Doncker-Kapenga, E., Überhuber, C.W., Kahaner, D.K. (1983).
//!   "QUADPACK: A Subroutine Package for Automatic Integration." Springer.
//! - Laurie, D.P. (1997). "Calculation of Gauss-Kronrod quadrature rules."
//!   Mathematics of Computation, 66(219), 1133-1145.

use crate::error::{ensure_finite, ensure_positive, SolarError, SolarResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kronrod abscissae on [0, 1], descending. Odd indices are the Gauss nodes.
#[allow(clippy::excessive_precision)]
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

/// Kronrod weights matching `XGK`
#[allow(clippy::excessive_precision)]
const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

/// 7-point Gauss weights for `XGK[1]`, `XGK[3]`, `XGK[5]` and the center
#[allow(clippy::excessive_precision)]
const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Once the error estimate is this close to double-precision noise,
/// further bisection cannot improve it.
const ROUNDOFF_FLOOR: f64 = 50.0 * f64::EPSILON;

/// Tolerances and limits for adaptive integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureConfig {
    /// Absolute error target
    pub abs_tolerance: f64,
    /// Relative error target (fraction of |result|)
    pub rel_tolerance: f64,
    /// Maximum number of segments before giving up
    pub max_subdivisions: usize,
    /// Truncation point for semi-infinite ranges, in multiples of the
    /// integrand's decay scale
    pub tail_cutoff: f64,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            // Tails near 1e-7 make any fixed absolute target meaningless
            abs_tolerance: 0.0,
            rel_tolerance: 1e-10,
            max_subdivisions: 500,
            // e^-60 ≈ 9e-27
            tail_cutoff: 60.0,
        }
    }
}

/// Result of an adaptive integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrature {
    pub value: f64,
    pub error_estimate: f64,
    pub subdivisions: usize,
    pub evaluations: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    lower: f64,
    upper: f64,
    value: f64,
    error: f64,
}

/// Apply the 15-point Kronrod rule on [lower, upper].
///
/// Returns the Kronrod estimate and |Kronrod - Gauss| as its error.
fn gauss_kronrod_15<F: Fn(f64) -> f64>(f: &F, lower: f64, upper: f64) -> Segment {
    let center = 0.5 * (lower + upper);
    let half_length = 0.5 * (upper - lower);

    let f_center = f(center);
    let mut kronrod = f_center * WGK[7];
    let mut gauss = f_center * WG[3];

    for (j, (&node, &weight)) in XGK.iter().zip(WGK.iter()).take(7).enumerate() {
        let dx = half_length * node;
        let pair = f(center - dx) + f(center + dx);
        kronrod += weight * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    Segment {
        lower,
        upper,
        value: kronrod * half_length,
        error: ((kronrod - gauss) * half_length).abs(),
    }
}

/// Integrate `f` over [lower, upper].
///
/// Reversed bounds give the negated integral. Errors when the integrand
/// produces a non-finite value or the error estimate is still above
/// tolerance after `max_subdivisions` segments.
///
/// # Example
/// ```
/// use solar_offload_core::numerics::{integrate, QuadratureConfig};
///
/// let q = integrate(f64::sin, 0.0, std::f64::consts::PI, &QuadratureConfig::default()).unwrap();
/// assert!((q.value - 2.0).abs() < 1e-12);
/// ```
pub fn integrate<F: Fn(f64) -> f64>(
    f: F,
    lower: f64,
    upper: f64,
    config: &QuadratureConfig,
) -> SolarResult<Quadrature> {
    ensure_finite("lower integration bound", lower)?;
    ensure_finite("upper integration bound", upper)?;

    if lower == upper {
        return Ok(Quadrature {
            value: 0.0,
            error_estimate: 0.0,
            subdivisions: 0,
            evaluations: 0,
        });
    }

    let mut segments = vec![gauss_kronrod_15(&f, lower, upper)];
    let mut evaluations = 15;

    loop {
        let value: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        ensure_finite("integrand", value)?;

        let tolerance = config.abs_tolerance.max(config.rel_tolerance * value.abs());
        if error <= tolerance || error <= ROUNDOFF_FLOOR * value.abs() {
            debug!(
                "Quadrature converged on [{:.4e}, {:.4e}]: value={:.6e}, error={:.2e}, segments={}",
                lower,
                upper,
                value,
                error,
                segments.len()
            );
            return Ok(Quadrature {
                value,
                error_estimate: error,
                subdivisions: segments.len(),
                evaluations,
            });
        }

        if segments.len() >= config.max_subdivisions {
            return Err(SolarError::QuadratureNotConverged {
                value,
                error_estimate: error,
                subdivisions: segments.len(),
            });
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.error.total_cmp(&b.error))
            .map_or(0, |(i, _)| i);
        let Segment {
            lower: a, upper: b, ..
        } = segments.swap_remove(worst);
        let mid = 0.5 * (a + b);

        segments.push(gauss_kronrod_15(&f, a, mid));
        segments.push(gauss_kronrod_15(&f, mid, b));
        evaluations += 30;
    }
}

/// Integrate `f` over [lower, ∞).
///
/// `scale` is the distance over which the integrand decays by a factor of e.
/// The range is truncated at `lower + tail_cutoff * scale`, which is only
/// valid for integrands with at least exponential decay.
pub fn integrate_to_infinity<F: Fn(f64) -> f64>(
    f: F,
    lower: f64,
    scale: f64,
    config: &QuadratureConfig,
) -> SolarResult<Quadrature> {
    let scale = ensure_positive("decay scale", scale)?;
    let upper = lower + config.tail_cutoff * scale;
    integrate(f, lower, upper, config)
}
