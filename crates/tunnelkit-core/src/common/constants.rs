//! Shared numeric constants.
//!
//! Energies are expressed in units where hbar^2 / (2 mu) = 1, so a momentum k
//! and an energy E are related by E = k^2.

pub const PI: f64 = 3.141_592_653_589_793_238_462_643_383_279_5_f64;
pub const PI2: f64 = 2.0 * PI;
pub const HALF_PI: f64 = 0.5 * PI;
pub const QUARTER_PI: f64 = 0.25 * PI;

/// Multiplier in Gamma = -4 Re(k) Im(k), the width of a pole at k.
pub const WIDTH_FACTOR: f64 = 4.0;
