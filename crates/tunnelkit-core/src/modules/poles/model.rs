use crate::common::constants::{PI, WIDTH_FACTOR};
use crate::domain::{ComputeResult, TunnelError};
use crate::modules::serialization::TableRow;
use num_complex::Complex64;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoleSearchRequest {
    pub order: f64,
    pub n_roots: usize,
    pub max_attempts: usize,
}

impl PoleSearchRequest {
    pub fn new(order: f64, n_roots: usize, max_attempts: usize) -> ComputeResult<Self> {
        if !order.is_finite() || order < 0.0 {
            return Err(TunnelError::input_validation(
                "INPUT.POLE_ORDER",
                format!("pole search order must be finite and >= 0, got {order}"),
            ));
        }
        if max_attempts == 0 {
            return Err(TunnelError::input_validation(
                "INPUT.POLE_ATTEMPTS",
                "pole search needs at least one attempt",
            ));
        }
        Ok(Self {
            order,
            n_roots,
            max_attempts,
        })
    }

    /// nu = |m + alpha|
    pub fn from_flux(
        angular_momentum: i64,
        flux_fraction: f64,
        n_roots: usize,
        max_attempts: usize,
    ) -> ComputeResult<Self> {
        Self::new(
            (angular_momentum as f64 + flux_fraction).abs(),
            n_roots,
            max_attempts,
        )
    }

    /// Real part of the k-th starting guess, (k + nu/2 - 1/4) pi.
    pub fn anchor(&self, index: usize) -> f64 {
        (index as f64 + 0.5 * self.order - 0.25) * PI
    }
}

/// A pair of secant starting points derived from the anchor x0 at search index k.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessStrategy {
    pub name: &'static str,
    pub first_scale: f64,
    pub first_depth: f64,
    pub first_depth_slope: f64,
    pub second_scale: f64,
    pub second_shift: f64,
    pub second_depth: f64,
    pub second_depth_slope: f64,
}

impl GuessStrategy {
    pub fn guesses(&self, anchor: f64, index: usize) -> (Complex64, Complex64) {
        let k = index as f64;
        (
            Complex64::new(
                self.first_scale * anchor,
                -(self.first_depth + self.first_depth_slope * k),
            ),
            Complex64::new(
                self.second_scale * anchor + self.second_shift,
                -(self.second_depth + self.second_depth_slope * k),
            ),
        )
    }
}

/// Tried in order at every search index until one converges.
pub const GUESS_STRATEGIES: [GuessStrategy; 2] = [
    GuessStrategy {
        name: "primary",
        first_scale: 1.0,
        first_depth: 0.25,
        first_depth_slope: 0.10,
        second_scale: 1.0,
        second_shift: 0.25,
        second_depth: 0.55,
        second_depth_slope: 0.12,
    },
    GuessStrategy {
        name: "perturbed",
        first_scale: 1.01,
        first_depth: 0.20,
        first_depth_slope: 0.08,
        second_scale: 0.99,
        second_shift: 0.20,
        second_depth: 0.45,
        second_depth_slope: 0.10,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexPole {
    pub value: Complex64,
    pub search_index: usize,
}

impl ComplexPole {
    /// Gamma = -4 Re(z) Im(z)
    pub fn width(&self) -> f64 {
        -WIDTH_FACTOR * self.value.re * self.value.im
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoleSearchOutcome {
    pub poles: Vec<ComplexPole>,
    pub attempts: usize,
    /// Search indices abandoned because no strategy converged.
    pub skipped: Vec<usize>,
    /// Converged roots that failed the acceptance policy.
    pub rejected: Vec<Complex64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoleRow {
    pub m: i64,
    pub alpha: f64,
    pub nu: f64,
    #[serde(rename = "Re(kR)")]
    pub re_k: f64,
    #[serde(rename = "Im(kR)")]
    pub im_k: f64,
    #[serde(rename = "Gamma")]
    pub gamma: f64,
    #[serde(skip)]
    pub root_index: usize,
}

impl PoleRow {
    pub fn new(m: i64, alpha: f64, nu: f64, pole: &ComplexPole, root_index: usize) -> Self {
        Self {
            m,
            alpha,
            nu,
            re_k: pole.value.re,
            im_k: pole.value.im,
            gamma: pole.width(),
            root_index,
        }
    }
}

impl TableRow for PoleRow {
    const COLUMNS: &'static [&'static str] = &["m", "alpha", "nu", "Re(kR)", "Im(kR)", "Gamma"];
    type Key = (i64, u64, usize);

    fn key(&self) -> Self::Key {
        (self.m, self.alpha.to_bits(), self.root_index)
    }

    fn check_invariants(&self) -> Result<(), String> {
        if !(self.im_k < 0.0) {
            return Err(format!("Im(kR) must be negative, got {}", self.im_k));
        }
        if !self.gamma.is_finite() {
            return Err(format!("Gamma must be finite, got {}", self.gamma));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ComplexPole, GUESS_STRATEGIES, PoleRow, PoleSearchRequest};
    use crate::modules::serialization::TableRow;
    use num_complex::Complex64;

    #[test]
    fn request_derives_order_from_flux() {
        let request = PoleSearchRequest::from_flux(-1, 0.25, 2, 80).expect("request");
        assert_eq!(request.order, 0.75);

        let error = PoleSearchRequest::new(-0.1, 2, 80).expect_err("negative order");
        assert_eq!(error.placeholder(), "INPUT.POLE_ORDER");
        let error = PoleSearchRequest::new(f64::NAN, 2, 80).expect_err("nan order");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn primary_guesses_follow_anchor_formula() {
        let request = PoleSearchRequest::new(0.5, 2, 80).expect("request");
        let anchor = request.anchor(1);
        assert!((anchor - std::f64::consts::PI).abs() <= 1.0e-15);

        let (first, second) = GUESS_STRATEGIES[0].guesses(anchor, 1);
        assert_eq!(first, Complex64::new(anchor, -0.35));
        assert!((second - Complex64::new(anchor + 0.25, -0.67)).norm() <= 1.0e-15);
    }

    #[test]
    fn width_is_minus_four_re_im() {
        let pole = ComplexPole {
            value: Complex64::new(2.5, -0.1),
            search_index: 1,
        };
        assert_eq!(pole.width(), -4.0 * 2.5 * -0.1);
    }

    #[test]
    fn row_rejects_upper_half_plane_values() {
        let pole = ComplexPole {
            value: Complex64::new(2.5, 0.1),
            search_index: 1,
        };
        let row = PoleRow::new(0, 0.0, 0.0, &pole, 0);
        assert!(row.check_invariants().is_err());
    }
}
