use crate::common::WashboardPolicy;
use crate::domain::{ComputeResult, TunnelError};
use crate::modules::action::{PotentialProfile, WashboardPotential};
use crate::modules::serialization::TableRow;
use crate::numerics::{argmin_first, linear_grid};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct WashboardRequest {
    pub josephson_energy: f64,
    pub charging_energy: f64,
    pub tilts: Vec<f64>,
    pub output_path: PathBuf,
}

impl WashboardRequest {
    pub fn validate(&self) -> ComputeResult<()> {
        for (name, value) in [("EJ", self.josephson_energy), ("EC", self.charging_energy)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TunnelError::input_validation(
                    "INPUT.WASHBOARD_PARAMETER",
                    format!("washboard parameter {name} must be finite and > 0, got {value}"),
                ));
            }
        }
        if self.tilts.is_empty() {
            return Err(TunnelError::input_validation(
                "INPUT.WASHBOARD_PARAMETER",
                "washboard needs at least one tilt value",
            ));
        }
        if let Some(tilt) = self.tilts.iter().find(|tilt| !tilt.is_finite()) {
            return Err(TunnelError::input_validation(
                "INPUT.WASHBOARD_PARAMETER",
                format!("washboard tilt must be finite, got {tilt}"),
            ));
        }
        Ok(())
    }
}

/// Well and barrier located on the sampled window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WashboardWell {
    pub min_index: usize,
    pub barrier_index: usize,
    pub phi_min: f64,
    pub phi_barrier: f64,
    pub u_min: f64,
    pub u_barrier: f64,
    /// No strict local maximum right of the well; the barrier index is a fixed
    /// offset from the well and carries no accuracy guarantee.
    pub used_fallback: bool,
}

impl WashboardWell {
    pub fn barrier_height(&self) -> f64 {
        self.u_barrier - self.u_min
    }
}

/// Global minimum (first occurrence) of the sampled potential, then the first
/// strict local maximum to its right.
pub fn locate_well(
    profile: &WashboardPotential,
    policy: &WashboardPolicy,
) -> ComputeResult<WashboardWell> {
    let phases = linear_grid(policy.window_start, policy.window_end, policy.samples).ok_or_else(
        || {
            TunnelError::input_validation(
                "INPUT.WASHBOARD_GRID",
                format!("washboard grid needs at least 2 samples, got {}", policy.samples),
            )
        },
    )?;
    let values: Vec<f64> = phases.iter().map(|&phase| profile.potential(phase)).collect();
    let sample_count = values.len();

    let min_index = argmin_first(&values).ok_or_else(|| {
        TunnelError::computation(
            "RUN.WASHBOARD_WELL",
            "sampled washboard potential has no finite values",
        )
    })?;

    let local_max = ((min_index + 1)..sample_count.saturating_sub(1))
        .find(|&j| values[j - 1] < values[j] && values[j] > values[j + 1]);
    let (barrier_index, used_fallback) = match local_max {
        Some(index) => (index, false),
        None => (
            min_index
                .saturating_add(policy.fallback_offset)
                .min(sample_count - 1),
            true,
        ),
    };

    Ok(WashboardWell {
        min_index,
        barrier_index,
        phi_min: phases[min_index],
        phi_barrier: phases[barrier_index],
        u_min: values[min_index],
        u_barrier: values[barrier_index],
        used_fallback,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WashboardRow {
    pub eta: f64,
    pub phi_min: f64,
    pub phi_barrier: f64,
    #[serde(rename = "U_min")]
    pub u_min: f64,
    #[serde(rename = "U_barrier")]
    pub u_barrier: f64,
    #[serde(rename = "dU")]
    pub barrier_height: f64,
    pub omega_p: f64,
    #[serde(rename = "E_level")]
    pub energy_level: f64,
    #[serde(rename = "S")]
    pub action: f64,
    #[serde(rename = "Gamma_est")]
    pub escape_rate: f64,
}

impl TableRow for WashboardRow {
    const COLUMNS: &'static [&'static str] = &[
        "eta",
        "phi_min",
        "phi_barrier",
        "U_min",
        "U_barrier",
        "dU",
        "omega_p",
        "E_level",
        "S",
        "Gamma_est",
    ];
    type Key = u64;

    fn key(&self) -> Self::Key {
        self.eta.to_bits()
    }

    fn check_invariants(&self) -> Result<(), String> {
        if !self.escape_rate.is_finite() || self.escape_rate < 0.0 {
            return Err(format!(
                "Gamma_est must be finite and >= 0, got {}",
                self.escape_rate
            ));
        }
        Ok(())
    }
}
