mod condition;
mod model;

pub use condition::{
    ConditionKind, DEFAULT_SHELL_STRENGTH, DeltaShell, HardDisk, ResonanceCondition,
};
pub use model::{
    ComplexPole, GUESS_STRATEGIES, GuessStrategy, PoleRow, PoleSearchOutcome, PoleSearchRequest,
};

use super::ModuleExecutor;
use super::serialization::{ResultTable, write_csv_table};
use crate::common::PoleSearchPolicy;
use crate::domain::{ComputeArtifact, ComputeModule, ComputeResult, TunnelError};
use crate::numerics::{RefineOutcome, SecantInput, refine_secant};
use std::path::PathBuf;

/// Finds up to `request.n_roots` lower-half-plane zeros of `condition`.
///
/// Each search index k is tried with every entry of [`GUESS_STRATEGIES`] until
/// one converges; a converged root is then accepted or rejected and the search
/// moves on to k + 1 either way. Failures never abort the search.
pub fn search_poles(
    condition: &dyn ResonanceCondition,
    request: &PoleSearchRequest,
    policy: &PoleSearchPolicy,
) -> PoleSearchOutcome {
    let mut outcome = PoleSearchOutcome::default();
    let mut index = 1;

    while outcome.poles.len() < request.n_roots && outcome.attempts < request.max_attempts {
        outcome.attempts += 1;
        let anchor = request.anchor(index);

        let mut converged = None;
        for strategy in &GUESS_STRATEGIES {
            let (first, second) = strategy.guesses(anchor, index);
            let input = SecantInput::new(first, second).with_tolerances(
                policy.step_tolerance,
                policy.residual_tolerance,
                policy.max_steps,
            );
            match refine_secant(|z| condition.evaluate(request.order, z), input) {
                RefineOutcome::Converged { root, .. } => {
                    converged = Some(root);
                    break;
                }
                RefineOutcome::Failed(reason) => {
                    tracing::debug!(
                        condition = condition.label(),
                        order = request.order,
                        index,
                        strategy = strategy.name,
                        %reason,
                        "pole refinement did not converge"
                    );
                }
            }
        }

        match converged {
            Some(root) => {
                let separated = outcome
                    .poles
                    .iter()
                    .all(|pole| (root - pole.value).norm() > policy.min_separation);
                if root.im < policy.imag_threshold && separated {
                    outcome.poles.push(ComplexPole {
                        value: root,
                        search_index: index,
                    });
                } else {
                    tracing::debug!(
                        order = request.order,
                        index,
                        re = root.re,
                        im = root.im,
                        "converged root rejected by acceptance policy"
                    );
                    outcome.rejected.push(root);
                }
            }
            None => outcome.skipped.push(index),
        }

        index += 1;
    }

    outcome
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoleTableRequest {
    pub angular_momenta: Vec<i64>,
    pub flux_fractions: Vec<f64>,
    pub n_roots: usize,
    /// Overrides the policy attempt budget when set.
    pub max_attempts: Option<usize>,
    pub condition: ConditionKind,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoleSearchModule {
    policy: PoleSearchPolicy,
}

impl PoleSearchModule {
    pub fn new(policy: PoleSearchPolicy) -> Self {
        Self { policy }
    }

    /// One row per accepted pole, grouped by (m, alpha) in argument order.
    pub fn build_table(&self, request: &PoleTableRequest) -> ComputeResult<ResultTable<PoleRow>> {
        if request.angular_momenta.is_empty() || request.flux_fractions.is_empty() {
            return Err(TunnelError::input_validation(
                "INPUT.POLE_PARAMETERS",
                "pole search needs at least one m and one alpha value",
            ));
        }
        if let Some(alpha) = request.flux_fractions.iter().find(|alpha| !alpha.is_finite()) {
            return Err(TunnelError::input_validation(
                "INPUT.POLE_PARAMETERS",
                format!("flux fraction must be finite, got {alpha}"),
            ));
        }

        let condition = request.condition.into_condition();
        let max_attempts = request.max_attempts.unwrap_or(self.policy.max_attempts);
        let mut table = ResultTable::new();

        for &m in &request.angular_momenta {
            for &alpha in &request.flux_fractions {
                let search =
                    PoleSearchRequest::from_flux(m, alpha, request.n_roots, max_attempts)?;
                let outcome = search_poles(condition.as_ref(), &search, &self.policy);
                tracing::info!(
                    condition = condition.label(),
                    m,
                    alpha,
                    nu = search.order,
                    found = outcome.poles.len(),
                    attempts = outcome.attempts,
                    "pole search finished"
                );
                for (root_index, pole) in outcome.poles.iter().enumerate() {
                    table.push(PoleRow::new(m, alpha, search.order, pole, root_index))?;
                }
            }
        }

        Ok(table)
    }
}

impl ModuleExecutor for PoleSearchModule {
    type Request = PoleTableRequest;

    fn module(&self) -> ComputeModule {
        ComputeModule::PoleSearch
    }

    fn execute(&self, request: &PoleTableRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        let table = self.build_table(request)?;
        let artifact = write_csv_table(&request.output_path, &table)?;
        Ok(vec![artifact])
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConditionKind, DeltaShell, HardDisk, PoleSearchModule, PoleSearchRequest,
        PoleTableRequest, ResonanceCondition, search_poles,
    };
    use crate::common::PoleSearchPolicy;
    use crate::numerics::special::BesselError;
    use num_complex::Complex64;
    use std::cell::Cell;

    /// Zeros at (k - 1/4) pi + 0.05 - 0.3i for k = 1, 2, 3 only.
    struct CubicCondition;

    impl ResonanceCondition for CubicCondition {
        fn label(&self) -> &'static str {
            "cubic"
        }

        fn evaluate(&self, _order: f64, z: Complex64) -> Result<Complex64, BesselError> {
            Ok((1..=3)
                .map(|k| z - cubic_zero(k))
                .fold(Complex64::new(1.0, 0.0), |product, factor| product * factor))
        }
    }

    fn cubic_zero(k: usize) -> Complex64 {
        Complex64::new((k as f64 - 0.25) * std::f64::consts::PI + 0.05, -0.3)
    }

    /// Always evaluates to a constant, so every refinement fails.
    struct FlatCondition {
        calls: Cell<usize>,
    }

    impl ResonanceCondition for FlatCondition {
        fn label(&self) -> &'static str {
            "flat"
        }

        fn evaluate(&self, _order: f64, _z: Complex64) -> Result<Complex64, BesselError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Complex64::new(1.0, 0.0))
        }
    }

    #[test]
    fn accepted_poles_are_distinct_and_below_axis() {
        let request = PoleSearchRequest::new(0.0, 3, 20).expect("request");
        let outcome = search_poles(&CubicCondition, &request, &PoleSearchPolicy::default());

        assert_eq!(outcome.poles.len(), 3);
        for (index, pole) in outcome.poles.iter().enumerate() {
            assert!((pole.value - cubic_zero(index + 1)).norm() <= 1.0e-10);
            assert!(pole.value.im < 0.0);
            for other in &outcome.poles[index + 1..] {
                assert!((pole.value - other.value).norm() > 1.0e-2);
            }
        }
    }

    #[test]
    fn search_stops_at_attempt_budget_when_roots_run_out() {
        let request = PoleSearchRequest::new(0.0, 10, 7).expect("request");
        let outcome = search_poles(&CubicCondition, &request, &PoleSearchPolicy::default());

        assert_eq!(outcome.attempts, 7);
        assert_eq!(outcome.poles.len(), 3);
        assert_eq!(outcome.rejected.len() + outcome.skipped.len(), 4);
    }

    #[test]
    fn failing_strategies_are_all_tried_then_skipped() {
        let condition = FlatCondition {
            calls: Cell::new(0),
        };
        let request = PoleSearchRequest::new(1.0, 2, 3).expect("request");
        let outcome = search_poles(&condition, &request, &PoleSearchPolicy::default());

        assert!(outcome.poles.is_empty());
        assert_eq!(outcome.skipped, vec![1, 2, 3]);
        // two starting evaluations per strategy, two strategies, three indices
        assert_eq!(condition.calls.get(), 12);
    }

    #[test]
    fn shell_poles_match_reference_values() {
        let policy = PoleSearchPolicy::default();
        let cases = [
            (
                0.0,
                [
                    Complex64::new(2.196_506_917_993_805_3, -0.041_543_072_885_465_63),
                    Complex64::new(5.113_661_124_162_643, -0.171_069_877_188_389_5),
                ],
            ),
            (
                0.5,
                [
                    Complex64::new(2.877_577_458_457_587, -0.066_510_672_489_968_89),
                    Complex64::new(5.841_379_586_076_052, -0.206_480_096_302_156_88),
                ],
            ),
            (
                1.0,
                [
                    Complex64::new(3.519_240_417_493_938_5, -0.092_141_844_141_385_83),
                    Complex64::new(6.542_920_151_615_141, -0.239_859_214_093_840_7),
                ],
            ),
        ];

        for (order, expected) in cases {
            let request = PoleSearchRequest::new(order, 2, 80).expect("request");
            let outcome = search_poles(&DeltaShell::default(), &request, &policy);
            assert_eq!(outcome.poles.len(), 2, "order={order}");
            for (pole, expected) in outcome.poles.iter().zip(expected) {
                assert!(
                    (pole.value - expected).norm() <= 1.0e-9,
                    "order={order} expected={expected} actual={}",
                    pole.value
                );
            }
        }
    }

    #[test]
    fn hard_disk_poles_match_mirrored_hankel_zeros() {
        let request = PoleSearchRequest::new(0.0, 2, 80).expect("request");
        let outcome = search_poles(&HardDisk, &request, &PoleSearchPolicy::default());

        assert_eq!(outcome.poles.len(), 2);
        let expected = [
            Complex64::new(2.404_091_177_155_344_4, -0.340_502_152_956_140_84),
            Complex64::new(5.519_997_520_841_833, -0.345_225_028_545_679_5),
        ];
        for (pole, expected) in outcome.poles.iter().zip(expected) {
            assert!((pole.value - expected).norm() <= 1.0e-9, "actual={}", pole.value);
        }
    }

    #[test]
    fn hard_disk_half_order_has_no_poles() {
        let request = PoleSearchRequest::new(0.5, 2, 6).expect("request");
        let outcome = search_poles(&HardDisk, &request, &PoleSearchPolicy::default());
        assert!(outcome.poles.is_empty());
        assert_eq!(outcome.attempts, 6);
    }

    #[test]
    fn table_rows_follow_parameter_order() {
        let module = PoleSearchModule::default();
        let request = PoleTableRequest {
            angular_momenta: vec![0, 1],
            flux_fractions: vec![0.0, 0.25],
            n_roots: 2,
            max_attempts: None,
            condition: ConditionKind::DeltaShell { strength: 10.0 },
            output_path: "unused.csv".into(),
        };
        let table = module.build_table(&request).expect("table");

        assert_eq!(table.len(), 8);
        let combos: Vec<(i64, f64)> = table.rows().iter().map(|row| (row.m, row.alpha)).collect();
        assert_eq!(
            combos,
            vec![
                (0, 0.0),
                (0, 0.0),
                (0, 0.25),
                (0, 0.25),
                (1, 0.0),
                (1, 0.0),
                (1, 0.25),
                (1, 0.25)
            ]
        );
        for row in table.rows() {
            assert!(row.im_k < 0.0);
            assert_eq!(row.gamma, -4.0 * row.re_k * row.im_k);
            assert_eq!(row.nu, (row.m as f64 + row.alpha).abs());
        }
    }

    #[test]
    fn empty_parameter_lists_are_rejected() {
        let request = PoleTableRequest {
            angular_momenta: Vec::new(),
            flux_fractions: vec![0.0],
            n_roots: 2,
            max_attempts: None,
            condition: ConditionKind::HardDisk,
            output_path: "unused.csv".into(),
        };
        let error = PoleSearchModule::default()
            .build_table(&request)
            .expect_err("empty m list");
        assert_eq!(error.placeholder(), "INPUT.POLE_PARAMETERS");
    }
}
