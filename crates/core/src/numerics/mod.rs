//! Numerical routines shared by the physics models

pub mod quadrature;

pub use quadrature::{integrate, integrate_to_infinity, Quadrature, QuadratureConfig};
