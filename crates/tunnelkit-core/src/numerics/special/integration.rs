use crate::common::constants::HALF_PI;
use crate::numerics::{StableAccumulator, linear_grid};
use num_complex::Complex64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadratureError {
    #[error("quadrature requires at least 2 points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("quadrature input length mismatch: grid={grid}, values={values}")]
    LengthMismatch { grid: usize, values: usize },
    #[error("quadrature bound '{field}' must be finite, got {value}")]
    NonFiniteBound { field: &'static str, value: f64 },
    #[error("quadrature produced a non-finite result")]
    NonFiniteResult,
}

/// Composite trapezoid rule over a (possibly non-uniform) sampled grid.
pub fn integrate_trapezoid(grid: &[f64], values: &[f64]) -> Result<f64, QuadratureError> {
    if grid.len() != values.len() {
        return Err(QuadratureError::LengthMismatch {
            grid: grid.len(),
            values: values.len(),
        });
    }
    if grid.len() < 2 {
        return Err(QuadratureError::InsufficientPoints { actual: grid.len() });
    }

    let mut accumulator = StableAccumulator::default();
    for index in 1..grid.len() {
        let step = grid[index] - grid[index - 1];
        accumulator.add(0.5 * step * (values[index] + values[index - 1]));
    }

    let integral = accumulator.total();
    if !integral.is_finite() {
        return Err(QuadratureError::NonFiniteResult);
    }
    Ok(integral)
}

/// Samples `integrand` on `samples` uniform points of `[start, end]` and applies
/// the trapezoid rule.
pub fn integrate_uniform_trapezoid<F>(
    integrand: F,
    start: f64,
    end: f64,
    samples: usize,
) -> Result<f64, QuadratureError>
where
    F: Fn(f64) -> f64,
{
    if !start.is_finite() {
        return Err(QuadratureError::NonFiniteBound {
            field: "start",
            value: start,
        });
    }
    if !end.is_finite() {
        return Err(QuadratureError::NonFiniteBound {
            field: "end",
            value: end,
        });
    }

    let grid = linear_grid(start, end, samples)
        .ok_or(QuadratureError::InsufficientPoints { actual: samples })?;
    let values: Vec<f64> = grid.iter().map(|&x| integrand(x)).collect();
    integrate_trapezoid(&grid, &values)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpSinhConfig {
    /// Truncation of the transformed variable t to `[-half_width, half_width]`.
    pub half_width: f64,
    pub initial_step: f64,
    pub max_levels: usize,
    pub rel_tol: f64,
    /// Nodes with (pi/2) sinh(t) above this are dropped (u = exp of it overflows).
    pub max_exponent: f64,
}

impl Default for ExpSinhConfig {
    fn default() -> Self {
        Self {
            half_width: 5.0,
            initial_step: 0.5,
            max_levels: 8,
            rel_tol: 1.0e-14,
            max_exponent: 700.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpSinhEstimate {
    pub value: Complex64,
    pub levels: usize,
    pub converged: bool,
}

/// Integral of `integrand` over `(0, inf)` with the exp-sinh substitution
/// u = exp((pi/2) sinh t), refined by step halving until successive estimates
/// agree to `rel_tol`.
///
/// When `max_levels` is exhausted the last estimate is returned with
/// `converged = false`.
pub fn integrate_exp_sinh<F>(
    integrand: F,
    config: ExpSinhConfig,
) -> Result<ExpSinhEstimate, QuadratureError>
where
    F: Fn(f64) -> Complex64,
{
    let node = |t: f64| -> Complex64 {
        let exponent = HALF_PI * t.sinh();
        if exponent > config.max_exponent {
            return Complex64::new(0.0, 0.0);
        }
        let u = exponent.exp();
        let weight = u * HALF_PI * t.cosh();
        integrand(u) * weight
    };

    let mut step = config.initial_step;
    let mut total = node(0.0);
    let node_count = (config.half_width / step).floor() as usize;
    for index in 1..=node_count {
        let t = index as f64 * step;
        total += node(t) + node(-t);
    }
    let mut estimate = total * step;

    let mut levels = 0;
    let mut converged = false;
    while levels < config.max_levels {
        step *= 0.5;
        levels += 1;
        let node_count = (config.half_width / step).floor() as usize;
        for index in (1..=node_count).step_by(2) {
            let t = index as f64 * step;
            total += node(t) + node(-t);
        }
        let refined = total * step;
        let change = (refined - estimate).norm();
        estimate = refined;
        if change <= config.rel_tol * refined.norm() {
            converged = true;
            break;
        }
    }

    if !estimate.re.is_finite() || !estimate.im.is_finite() {
        return Err(QuadratureError::NonFiniteResult);
    }

    Ok(ExpSinhEstimate {
        value: estimate,
        levels,
        converged,
    })
}
