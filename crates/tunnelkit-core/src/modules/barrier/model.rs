use crate::domain::{ComputeResult, TunnelError};
use crate::modules::serialization::TableRow;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierShape {
    Rectangular,
}

impl BarrierShape {
    pub fn parse(token: &str) -> ComputeResult<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "rectangular" => Ok(Self::Rectangular),
            other => Err(TunnelError::input_validation(
                "INPUT.POTENTIAL_SHAPE",
                format!("unsupported potential shape '{other}'; only 'rectangular' is implemented"),
            )),
        }
    }
}

/// How the Agmon action of the barrier is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionMode {
    #[default]
    ClosedForm,
    Quadrature,
}

impl ActionMode {
    pub fn parse(token: &str) -> ComputeResult<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "closed-form" | "closed" => Ok(Self::ClosedForm),
            "quadrature" => Ok(Self::Quadrature),
            other => Err(TunnelError::input_validation(
                "INPUT.ACTION_MODE",
                format!("unsupported action mode '{other}'; expected 'closed-form' or 'quadrature'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarrierRequest {
    pub shape: BarrierShape,
    pub height: f64,
    pub width: f64,
    pub energy: f64,
    pub action_mode: ActionMode,
    pub output_path: PathBuf,
}

impl BarrierRequest {
    pub fn validate(&self) -> ComputeResult<()> {
        for (name, value) in [("V0", self.height), ("L", self.width), ("E", self.energy)] {
            if !value.is_finite() {
                return Err(TunnelError::input_validation(
                    "INPUT.BARRIER_PARAMETER",
                    format!("barrier parameter {name} must be finite, got {value}"),
                ));
            }
        }
        if self.width < 0.0 {
            return Err(TunnelError::input_validation(
                "INPUT.BARRIER_PARAMETER",
                format!("barrier width L must be >= 0, got {}", self.width),
            ));
        }
        if self.energy <= 0.0 {
            return Err(TunnelError::input_validation(
                "INPUT.BARRIER_PARAMETER",
                format!("incident energy E must be > 0, got {}", self.energy),
            ));
        }
        Ok(())
    }
}

/// Exact transmission through a rectangular barrier (hbar^2/2m = 1):
/// 1 for E >= V0, otherwise 1 / (1 + V0^2 sinh^2(kappa L) / (4 E (V0 - E))).
pub fn rectangular_transmission(height: f64, width: f64, energy: f64) -> f64 {
    if energy >= height {
        return 1.0;
    }
    let kappa = (height - energy).sqrt();
    let sinh = (kappa * width).sinh();
    1.0 / (1.0 + height * height * sinh * sinh / (4.0 * energy * (height - energy)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarrierRow {
    #[serde(rename = "E")]
    pub energy: f64,
    #[serde(rename = "S_Agmon")]
    pub action: f64,
    #[serde(rename = "T_exact")]
    pub exact_transmission: f64,
    #[serde(rename = "T_WKB")]
    pub wkb_transmission: f64,
    pub rel_error: f64,
}

impl TableRow for BarrierRow {
    const COLUMNS: &'static [&'static str] = &["E", "S_Agmon", "T_exact", "T_WKB", "rel_error"];
    type Key = u64;

    fn key(&self) -> Self::Key {
        self.energy.to_bits()
    }

    fn check_invariants(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.exact_transmission) {
            return Err(format!(
                "T_exact must lie in [0, 1], got {}",
                self.exact_transmission
            ));
        }
        if !self.rel_error.is_finite() || self.rel_error < 0.0 {
            return Err(format!(
                "rel_error must be finite and >= 0, got {}",
                self.rel_error
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionMode, BarrierShape, rectangular_transmission};

    #[test]
    fn transmission_is_unity_at_and_above_barrier_top() {
        assert_eq!(rectangular_transmission(5.0, 1.0, 5.0), 1.0);
        assert_eq!(rectangular_transmission(5.0, 1.0, 7.5), 1.0);
    }

    #[test]
    fn transmission_below_barrier_is_strictly_between_zero_and_one() {
        for energy in [0.1, 1.0, 2.0, 4.9] {
            let t = rectangular_transmission(5.0, 1.0, energy);
            assert!(t > 0.0 && t < 1.0, "E={energy} T={t}");
        }
        let t = rectangular_transmission(5.0, 1.0, 2.0);
        assert!((t - 0.113_545_483_503_603_27).abs() <= 1.0e-15);
    }

    #[test]
    fn shape_and_mode_tokens_parse() {
        assert_eq!(
            BarrierShape::parse("Rectangular").expect("shape"),
            BarrierShape::Rectangular
        );
        let error = BarrierShape::parse("gaussian").expect_err("unsupported shape");
        assert_eq!(error.placeholder(), "INPUT.POTENTIAL_SHAPE");
        assert_eq!(error.exit_code(), 2);

        assert_eq!(
            ActionMode::parse("quadrature").expect("mode"),
            ActionMode::Quadrature
        );
        assert_eq!(ActionMode::default(), ActionMode::ClosedForm);
        assert!(ActionMode::parse("montecarlo").is_err());
    }
}
