use crate::common::constants::{HALF_PI, PI};
use crate::domain::{ComputeResult, TunnelError};
use crate::numerics::special::{BesselError, hankel1, hankel2};
use num_complex::Complex64;

pub const DEFAULT_SHELL_STRENGTH: f64 = 10.0;

/// Complex analytic function whose lower-half-plane zeros are resonance poles.
pub trait ResonanceCondition {
    fn label(&self) -> &'static str;

    fn evaluate(&self, order: f64, argument: Complex64) -> Result<Complex64, BesselError>;
}

/// Thin ring of dimensionless strength lambda = g R:
/// F(z) = 1 + i (pi/2) lambda J_nu(z) H1_nu(z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaShell {
    pub strength: f64,
}

impl Default for DeltaShell {
    fn default() -> Self {
        Self {
            strength: DEFAULT_SHELL_STRENGTH,
        }
    }
}

impl ResonanceCondition for DeltaShell {
    fn label(&self) -> &'static str {
        "delta-shell"
    }

    fn evaluate(&self, order: f64, argument: Complex64) -> Result<Complex64, BesselError> {
        let outgoing = hankel1(order, argument)?;
        let regular = 0.5 * (outgoing + hankel2(order, argument)?);
        Ok(1.0 + Complex64::new(0.0, HALF_PI * self.strength) * regular * outgoing)
    }
}

/// Impenetrable disk: G(z) = e^{i nu pi} H1_nu(z) + 2 cos(nu pi) H2_nu(z), which
/// equals conj(H1_nu(-conj z)) and so carries the H1 zeros of the second
/// quadrant into the fourth.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HardDisk;

impl ResonanceCondition for HardDisk {
    fn label(&self) -> &'static str {
        "hard-disk"
    }

    fn evaluate(&self, order: f64, argument: Complex64) -> Result<Complex64, BesselError> {
        let outgoing = hankel1(order, argument)?;
        let incoming = hankel2(order, argument)?;
        Ok(Complex64::from_polar(1.0, order * PI) * outgoing + 2.0 * (order * PI).cos() * incoming)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionKind {
    DeltaShell { strength: f64 },
    HardDisk,
}

impl ConditionKind {
    /// Accepts `delta-shell` (alias `shell`) and `hard-disk` (alias `disk`).
    pub fn parse(token: &str, shell_strength: f64) -> ComputeResult<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "delta-shell" | "shell" => {
                if !shell_strength.is_finite() || shell_strength <= 0.0 {
                    return Err(TunnelError::input_validation(
                        "INPUT.SHELL_STRENGTH",
                        format!("shell strength must be finite and > 0, got {shell_strength}"),
                    ));
                }
                Ok(Self::DeltaShell {
                    strength: shell_strength,
                })
            }
            "hard-disk" | "disk" => Ok(Self::HardDisk),
            other => Err(TunnelError::input_validation(
                "INPUT.RESONANCE_CONDITION",
                format!(
                    "unsupported resonance condition '{}'; expected 'delta-shell' or 'hard-disk'",
                    other
                ),
            )),
        }
    }

    pub fn into_condition(self) -> Box<dyn ResonanceCondition> {
        match self {
            Self::DeltaShell { strength } => Box::new(DeltaShell { strength }),
            Self::HardDisk => Box::new(HardDisk),
        }
    }
}
