//! Cylinder functions of real order and complex argument.
//!
//! H1 is evaluated from Watson's integral
//!
//! ```text
//! H1_nu(z) = sqrt(2/(pi z)) exp(i(z - nu pi/2 - pi/4)) / Gamma(nu + 1/2)
//!            * int_0^inf exp(-u) u^(nu - 1/2) (1 + i u / (2z))^(nu - 1/2) du
//! ```
//!
//! which holds for Re(z) > 0 and on the positive imaginary axis. The left half
//! plane is reached through the analytic continuation formulas
//! H1(w e^{+i pi}) = -e^{-i nu pi} H2(w) and
//! H1(w e^{-i pi}) = 2 cos(nu pi) H1(w) + e^{-i nu pi} H2(w), with
//! H2(w) = conj(H1(conj(w))) for real order. The negative imaginary axis is
//! where the integrand's branch point meets the path and is rejected.

use super::gamma::ln_gamma;
use super::integration::{ExpSinhConfig, QuadratureError, integrate_exp_sinh};
use crate::common::constants::{HALF_PI, PI, QUARTER_PI};
use num_complex::Complex64;

const I: Complex64 = Complex64::new(0.0, 1.0);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BesselError {
    #[error("cylinder function order must be finite and >= 0, got {order}")]
    InvalidOrder { order: f64 },
    #[error("cylinder function argument must be finite, got ({re}, {im})")]
    NonFiniteArgument { re: f64, im: f64 },
    #[error("cylinder function argument must be non-zero")]
    ZeroArgument,
    #[error("argument ({re}, {im}) lies on the negative imaginary axis")]
    BranchLine { re: f64, im: f64 },
    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
}

/// Hankel function of the first kind, principal branch.
pub fn hankel1(order: f64, argument: Complex64) -> Result<Complex64, BesselError> {
    validate_input(order, argument)?;

    if in_watson_domain(argument) {
        return watson_hankel1(order, argument);
    }
    if argument.re == 0.0 {
        return Err(BesselError::BranchLine {
            re: argument.re,
            im: argument.im,
        });
    }

    let reflected = -argument;
    let hankel2_reflected = watson_hankel1(order, reflected.conj())?.conj();
    let phase = Complex64::from_polar(1.0, -order * PI);

    if argument.im >= 0.0 {
        Ok(-phase * hankel2_reflected)
    } else {
        let hankel1_reflected = watson_hankel1(order, reflected)?;
        Ok(2.0 * (order * PI).cos() * hankel1_reflected + phase * hankel2_reflected)
    }
}

/// Hankel function of the second kind, H2(z) = conj(H1(conj(z))).
pub fn hankel2(order: f64, argument: Complex64) -> Result<Complex64, BesselError> {
    Ok(hankel1(order, argument.conj())?.conj())
}

/// Bessel function of the first kind, J = (H1 + H2) / 2.
pub fn bessel_j(order: f64, argument: Complex64) -> Result<Complex64, BesselError> {
    let first = hankel1(order, argument)?;
    let second = hankel2(order, argument)?;
    Ok(0.5 * (first + second))
}

fn validate_input(order: f64, argument: Complex64) -> Result<(), BesselError> {
    if !order.is_finite() || order < 0.0 {
        return Err(BesselError::InvalidOrder { order });
    }
    if !argument.re.is_finite() || !argument.im.is_finite() {
        return Err(BesselError::NonFiniteArgument {
            re: argument.re,
            im: argument.im,
        });
    }
    if argument.re == 0.0 && argument.im == 0.0 {
        return Err(BesselError::ZeroArgument);
    }
    Ok(())
}

fn in_watson_domain(argument: Complex64) -> bool {
    argument.re > 0.0 || (argument.re == 0.0 && argument.im > 0.0)
}

fn watson_hankel1(order: f64, argument: Complex64) -> Result<Complex64, BesselError> {
    let exponent = order - 0.5;
    let log_normalization = ln_gamma(order + 0.5);
    let scale = I / (2.0 * argument);

    let estimate = integrate_exp_sinh(
        |u| {
            if u == 0.0 {
                return Complex64::new(0.0, 0.0);
            }
            let log_term = exponent * (1.0 + u * scale).ln();
            (log_term + (-u + exponent * u.ln() - log_normalization)).exp()
        },
        ExpSinhConfig::default(),
    )?;
    if !estimate.converged {
        tracing::debug!(
            order,
            re = argument.re,
            im = argument.im,
            levels = estimate.levels,
            "watson integral stopped at the refinement limit"
        );
    }

    let prefactor = (2.0 / (PI * argument)).sqrt()
        * (I * (argument - order * HALF_PI - QUARTER_PI)).exp();
    Ok(prefactor * estimate.value)
}
