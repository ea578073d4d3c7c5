use thiserror::Error;

/// Errors produced by the escape model and the lifetime simulator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolarError {
    #[error("{quantity} must be finite, got {value}")]
    NonFinite { quantity: &'static str, value: f64 },

    #[error("{quantity} must be positive, got {value}")]
    NonPositive { quantity: &'static str, value: f64 },

    #[error(
        "Quadrature did not converge after {subdivisions} subdivisions: \
         value={value:e}, error estimate={error_estimate:e}"
    )]
    QuadratureNotConverged {
        value: f64,
        error_estimate: f64,
        subdivisions: usize,
    },

    #[error("{quantity} needs {count:e} points, more than the limit of {limit}")]
    TooManyPoints {
        quantity: &'static str,
        count: f64,
        limit: usize,
    },

    #[error("Baseline escaping fraction underflowed to {0:e}; barrier is too high for the temperature")]
    VanishingBaseline(f64),
}

pub type SolarResult<T> = Result<T, SolarError>;

/// Reject NaN and infinities before they reach the models.
pub(crate) fn ensure_finite(quantity: &'static str, value: f64) -> SolarResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolarError::NonFinite { quantity, value })
    }
}

pub(crate) fn ensure_positive(quantity: &'static str, value: f64) -> SolarResult<f64> {
    let value = ensure_finite(quantity, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SolarError::NonPositive { quantity, value })
    }
}
