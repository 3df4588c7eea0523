//! Numeric policy shared by the calculators.
//!
//! Every field has a default, so an empty JSON object is a valid policy file.
//! Keys are camelCase, e.g. `{"poleSearch": {"maxAttempts": 40}}`.

use crate::common::constants::PI;
use crate::domain::TunnelError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoleSearchPolicy {
    /// Accepted poles must satisfy Im(z) < imag_threshold.
    pub imag_threshold: f64,
    pub min_separation: f64,
    pub step_tolerance: f64,
    pub residual_tolerance: f64,
    pub max_steps: usize,
    pub max_attempts: usize,
}

impl Default for PoleSearchPolicy {
    fn default() -> Self {
        Self {
            imag_threshold: -1.0e-8,
            min_separation: 1.0e-2,
            step_tolerance: 1.0e-13,
            residual_tolerance: 1.0e-10,
            max_steps: 100,
            max_attempts: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WashboardPolicy {
    pub window_start: f64,
    pub window_end: f64,
    pub samples: usize,
    /// Index offset used when no barrier maximum is found right of the well.
    pub fallback_offset: usize,
    pub action_samples: usize,
    /// Fraction of the barrier height at which the metastable level sits.
    pub metastable_fraction: f64,
}

impl Default for WashboardPolicy {
    fn default() -> Self {
        Self {
            window_start: -6.0 * PI,
            window_end: 6.0 * PI,
            samples: 20_000,
            fallback_offset: 2_000,
            action_samples: 4_000,
            metastable_fraction: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarrierPolicy {
    pub transmission_floor: f64,
    pub action_samples: usize,
}

impl Default for BarrierPolicy {
    fn default() -> Self {
        Self {
            transmission_floor: 1.0e-16,
            action_samples: 2_001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumericPolicy {
    pub pole_search: PoleSearchPolicy,
    pub washboard: WashboardPolicy,
    pub barrier: BarrierPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum NumericPolicyError {
    #[error("failed to read numeric policy '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse numeric policy '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("numeric policy field '{field}' {requirement}, got {value}")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

impl From<NumericPolicyError> for TunnelError {
    fn from(error: NumericPolicyError) -> Self {
        match error {
            NumericPolicyError::Read { .. } => {
                TunnelError::io_system("IO.POLICY_READ", error.to_string())
            }
            NumericPolicyError::Parse { .. } => {
                TunnelError::input_validation("INPUT.POLICY_PARSE", error.to_string())
            }
            NumericPolicyError::Invalid { .. } => {
                TunnelError::input_validation("INPUT.POLICY_VALUE", error.to_string())
            }
        }
    }
}

/// Upper bound on any sampled grid, keeps allocations bounded.
pub const MAX_GRID_SAMPLES: usize = 10_000_000;

impl NumericPolicy {
    pub fn validate(&self) -> Result<(), NumericPolicyError> {
        let pole = &self.pole_search;
        check(
            "poleSearch.imagThreshold",
            pole.imag_threshold,
            pole.imag_threshold.is_finite() && pole.imag_threshold <= 0.0,
            "must be finite and <= 0",
        )?;
        check_positive("poleSearch.minSeparation", pole.min_separation)?;
        check_positive("poleSearch.stepTolerance", pole.step_tolerance)?;
        check_positive("poleSearch.residualTolerance", pole.residual_tolerance)?;
        check_count("poleSearch.maxSteps", pole.max_steps, 1, "must be >= 1")?;
        check_count("poleSearch.maxAttempts", pole.max_attempts, 1, "must be >= 1")?;

        let washboard = &self.washboard;
        check(
            "washboard.windowStart",
            washboard.window_start,
            washboard.window_start.is_finite(),
            "must be finite",
        )?;
        check(
            "washboard.windowEnd",
            washboard.window_end,
            washboard.window_end.is_finite() && washboard.window_end > washboard.window_start,
            "must be finite and greater than windowStart",
        )?;
        check(
            "washboard.samples",
            washboard.samples as f64,
            (3..=MAX_GRID_SAMPLES).contains(&washboard.samples),
            "must lie between 3 and 10000000",
        )?;
        check_count(
            "washboard.fallbackOffset",
            washboard.fallback_offset,
            1,
            "must be >= 1",
        )?;
        check(
            "washboard.actionSamples",
            washboard.action_samples as f64,
            (2..=MAX_GRID_SAMPLES).contains(&washboard.action_samples),
            "must lie between 2 and 10000000",
        )?;
        check(
            "washboard.metastableFraction",
            washboard.metastable_fraction,
            washboard.metastable_fraction > 0.0 && washboard.metastable_fraction < 1.0,
            "must lie strictly between 0 and 1",
        )?;

        check_positive(
            "barrier.transmissionFloor",
            self.barrier.transmission_floor,
        )?;
        check(
            "barrier.actionSamples",
            self.barrier.action_samples as f64,
            (2..=MAX_GRID_SAMPLES).contains(&self.barrier.action_samples),
            "must lie between 2 and 10000000",
        )?;
        Ok(())
    }
}

fn check(
    field: &'static str,
    value: f64,
    valid: bool,
    requirement: &'static str,
) -> Result<(), NumericPolicyError> {
    if valid {
        Ok(())
    } else {
        Err(NumericPolicyError::Invalid {
            field,
            requirement,
            value,
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), NumericPolicyError> {
    check(
        field,
        value,
        value.is_finite() && value > 0.0,
        "must be finite and > 0",
    )
}

fn check_count(
    field: &'static str,
    value: usize,
    minimum: usize,
    requirement: &'static str,
) -> Result<(), NumericPolicyError> {
    check(field, value as f64, value >= minimum, requirement)
}

/// Loads and validates a policy file.
pub fn load_numeric_policy(
    policy_path: impl AsRef<Path>,
) -> Result<NumericPolicy, NumericPolicyError> {
    let policy_path = policy_path.as_ref();
    let source = fs::read_to_string(policy_path).map_err(|source| NumericPolicyError::Read {
        path: policy_path.to_path_buf(),
        source,
    })?;
    let policy: NumericPolicy =
        serde_json::from_str(&source).map_err(|source| NumericPolicyError::Parse {
            path: policy_path.to_path_buf(),
            source,
        })?;
    policy.validate()?;
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::{NumericPolicy, NumericPolicyError, load_numeric_policy};
    use crate::domain::{TunnelError, TunnelErrorCategory};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_object_yields_default_policy() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("policy.json");
        fs::write(&path, "{}").expect("policy should be written");

        let policy = load_numeric_policy(&path).expect("policy should load");
        assert_eq!(policy, NumericPolicy::default());
        assert_eq!(policy.pole_search.max_attempts, 80);
        assert_eq!(policy.washboard.samples, 20_000);
        assert_eq!(policy.washboard.metastable_fraction, 0.25);
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("policy.json");
        fs::write(
            &path,
            r#"{ "poleSearch": { "maxAttempts": 12 }, "washboard": { "metastableFraction": 0.5 } }"#,
        )
        .expect("policy should be written");

        let policy = load_numeric_policy(&path).expect("policy should load");
        assert_eq!(policy.pole_search.max_attempts, 12);
        assert_eq!(policy.pole_search.max_steps, 100);
        assert_eq!(policy.washboard.metastable_fraction, 0.5);
        assert_eq!(policy.washboard.fallback_offset, 2_000);
    }

    #[test]
    fn out_of_range_fraction_is_rejected_as_input_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("policy.json");
        fs::write(&path, r#"{ "washboard": { "metastableFraction": 1.5 } }"#)
            .expect("policy should be written");

        let error = load_numeric_policy(&path).expect_err("fraction should be rejected");
        assert!(matches!(
            error,
            NumericPolicyError::Invalid {
                field: "washboard.metastableFraction",
                ..
            }
        ));
        let error = TunnelError::from(error);
        assert_eq!(error.category(), TunnelErrorCategory::InputValidationError);
        assert_eq!(error.placeholder(), "INPUT.POLICY_VALUE");
    }

    #[test]
    fn oversized_sample_counts_are_rejected() {
        let mut policy = NumericPolicy::default();
        policy.washboard.samples = usize::MAX;
        assert!(matches!(
            policy.validate(),
            Err(NumericPolicyError::Invalid {
                field: "washboard.samples",
                ..
            })
        ));

        let mut policy = NumericPolicy::default();
        policy.barrier.action_samples = usize::MAX;
        assert!(matches!(
            policy.validate(),
            Err(NumericPolicyError::Invalid {
                field: "barrier.actionSamples",
                ..
            })
        ));

        let mut policy = NumericPolicy::default();
        policy.washboard.fallback_offset = usize::MAX;
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn missing_file_maps_to_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = load_numeric_policy(temp.path().join("absent.json"))
            .expect_err("missing policy should fail");
        let error = TunnelError::from(error);
        assert_eq!(error.category(), TunnelErrorCategory::IoSystemError);
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn malformed_json_maps_to_parse_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("policy.json");
        fs::write(&path, "{ not json").expect("policy should be written");

        let error = TunnelError::from(load_numeric_policy(&path).expect_err("parse should fail"));
        assert_eq!(error.placeholder(), "INPUT.POLICY_PARSE");
    }
}
