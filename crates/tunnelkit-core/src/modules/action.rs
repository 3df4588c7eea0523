//! Forbidden-region (Agmon) action and the rates derived from it.

use crate::common::constants::PI2;
use crate::numerics::special::{QuadratureError, integrate_uniform_trapezoid};

pub trait PotentialProfile {
    fn potential(&self, x: f64) -> f64;
}

/// U(x) = height on [0, width], zero elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangularBarrier {
    pub height: f64,
    pub width: f64,
}

impl RectangularBarrier {
    pub fn new(height: f64, width: f64) -> Self {
        Self { height, width }
    }

    /// sqrt(max(V0 - E, 0)) * L
    pub fn closed_form_action(&self, energy: f64) -> f64 {
        (self.height - energy).max(0.0).sqrt() * self.width
    }
}

impl PotentialProfile for RectangularBarrier {
    fn potential(&self, x: f64) -> f64 {
        if (0.0..=self.width).contains(&x) {
            self.height
        } else {
            0.0
        }
    }
}

/// Tilted washboard U(phi) = -E_J (cos(phi) + eta * phi).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WashboardPotential {
    pub josephson_energy: f64,
    pub tilt: f64,
}

impl WashboardPotential {
    pub fn new(josephson_energy: f64, tilt: f64) -> Self {
        Self {
            josephson_energy,
            tilt,
        }
    }

    /// U''(phi) = E_J cos(phi)
    pub fn curvature(&self, phase: f64) -> f64 {
        self.josephson_energy * phase.cos()
    }
}

impl PotentialProfile for WashboardPotential {
    fn potential(&self, phase: f64) -> f64 {
        -self.josephson_energy * (phase.cos() + self.tilt * phase)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActionInput<'a, P: PotentialProfile + ?Sized> {
    pub profile: &'a P,
    pub energy: f64,
    /// Divisor under the square root (4 E_C for the washboard, 1 for hbar^2/2m = 1).
    pub normalization: f64,
    pub start: f64,
    pub end: f64,
    pub samples: usize,
}

impl<'a, P: PotentialProfile + ?Sized> ActionInput<'a, P> {
    pub fn new(profile: &'a P, energy: f64, start: f64, end: f64, samples: usize) -> Self {
        Self {
            profile,
            energy,
            normalization: 1.0,
            start,
            end,
            samples,
        }
    }

    pub fn with_normalization(mut self, normalization: f64) -> Self {
        self.normalization = normalization;
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("action normalization must be finite and > 0, got {value}")]
    InvalidNormalization { value: f64 },
    #[error("action energy must be finite, got {value}")]
    NonFiniteEnergy { value: f64 },
    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
}

/// S = int_start^end sqrt(max(U(x) - E, 0) / normalization) dx, composite trapezoid.
pub fn agmon_action<P: PotentialProfile + ?Sized>(
    input: ActionInput<'_, P>,
) -> Result<f64, ActionError> {
    if !input.normalization.is_finite() || input.normalization <= 0.0 {
        return Err(ActionError::InvalidNormalization {
            value: input.normalization,
        });
    }
    if !input.energy.is_finite() {
        return Err(ActionError::NonFiniteEnergy {
            value: input.energy,
        });
    }

    let action = integrate_uniform_trapezoid(
        |x| ((input.profile.potential(x) - input.energy).max(0.0) / input.normalization).sqrt(),
        input.start,
        input.end,
        input.samples,
    )?;
    Ok(action)
}

/// T ~ exp(-2S)
pub fn wkb_transmission(action: f64) -> f64 {
    (-2.0 * action).exp()
}

/// Gamma ~ (omega / 2 pi) exp(-2S)
pub fn escape_rate(attempt_frequency: f64, action: f64) -> f64 {
    attempt_frequency / PI2 * wkb_transmission(action)
}
