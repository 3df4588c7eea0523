use num_complex::Complex64;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecantInput {
    pub first_guess: Complex64,
    pub second_guess: Complex64,
    /// Converged once |dz| <= step_tolerance * max(1, |z|).
    pub step_tolerance: f64,
    pub residual_tolerance: f64,
    pub max_steps: usize,
}

impl SecantInput {
    pub fn new(first_guess: Complex64, second_guess: Complex64) -> Self {
        Self {
            first_guess,
            second_guess,
            step_tolerance: 1.0e-13,
            residual_tolerance: 1.0e-10,
            max_steps: 100,
        }
    }

    pub fn with_tolerances(
        mut self,
        step_tolerance: f64,
        residual_tolerance: f64,
        max_steps: usize,
    ) -> Self {
        self.step_tolerance = step_tolerance;
        self.residual_tolerance = residual_tolerance;
        self.max_steps = max_steps;
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NonConvergence {
    #[error("no convergence after {steps} secant steps")]
    MaxSteps { steps: usize },
    #[error("secant slope vanished at step {step}")]
    FlatSecant { step: usize },
    #[error("secant iterate became non-finite at step {step}")]
    NonFiniteIterate { step: usize },
    #[error("step converged but residual {residual:e} exceeds tolerance")]
    ResidualTooLarge { residual: f64 },
    #[error("target evaluation failed: {message}")]
    Evaluation { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefineOutcome {
    Converged {
        root: Complex64,
        residual: f64,
        steps: usize,
    },
    Failed(NonConvergence),
}

/// Complex secant iteration from two starting points.
pub fn refine_secant<F, E>(mut target: F, input: SecantInput) -> RefineOutcome
where
    F: FnMut(Complex64) -> Result<Complex64, E>,
    E: Display,
{
    let mut evaluate = |z: Complex64| {
        target(z).map_err(|error| NonConvergence::Evaluation {
            message: error.to_string(),
        })
    };

    let mut previous = input.first_guess;
    let mut current = input.second_guess;
    let (mut f_previous, mut f_current) = match (evaluate(previous), evaluate(current)) {
        (Ok(first), Ok(second)) => (first, second),
        (Err(reason), _) | (_, Err(reason)) => return RefineOutcome::Failed(reason),
    };

    for step in 1..=input.max_steps {
        let slope_denominator = f_current - f_previous;
        if slope_denominator == Complex64::new(0.0, 0.0) {
            return RefineOutcome::Failed(NonConvergence::FlatSecant { step });
        }

        let next = current - f_current * (current - previous) / slope_denominator;
        if !next.re.is_finite() || !next.im.is_finite() {
            return RefineOutcome::Failed(NonConvergence::NonFiniteIterate { step });
        }

        previous = current;
        f_previous = f_current;
        current = next;
        f_current = match evaluate(current) {
            Ok(value) => value,
            Err(reason) => return RefineOutcome::Failed(reason),
        };

        if (current - previous).norm() <= input.step_tolerance * current.norm().max(1.0) {
            let residual = f_current.norm();
            if residual <= input.residual_tolerance {
                return RefineOutcome::Converged {
                    root: current,
                    residual,
                    steps: step,
                };
            }
            return RefineOutcome::Failed(NonConvergence::ResidualTooLarge { residual });
        }
    }

    RefineOutcome::Failed(NonConvergence::MaxSteps {
        steps: input.max_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::{NonConvergence, RefineOutcome, SecantInput, refine_secant};
    use num_complex::Complex64;
    use std::convert::Infallible;

    #[test]
    fn secant_finds_lower_half_plane_root_of_quadratic() {
        let input = SecantInput::new(Complex64::new(0.3, -0.8), Complex64::new(-0.2, -1.3));
        let outcome = refine_secant(|z: Complex64| Ok::<_, Infallible>(z * z + 1.0), input);

        match outcome {
            RefineOutcome::Converged { root, residual, .. } => {
                assert!((root - Complex64::new(0.0, -1.0)).norm() <= 1.0e-12);
                assert!(residual <= 1.0e-10);
            }
            RefineOutcome::Failed(reason) => panic!("expected convergence, got {reason}"),
        }
    }

    #[test]
    fn constant_target_reports_flat_secant() {
        let input = SecantInput::new(Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0));
        let outcome = refine_secant(|_| Ok::<_, Infallible>(Complex64::new(3.0, 0.0)), input);
        assert_eq!(
            outcome,
            RefineOutcome::Failed(NonConvergence::FlatSecant { step: 1 })
        );
    }

    #[test]
    fn step_budget_exhaustion_is_reported() {
        let input = SecantInput::new(Complex64::new(3.0, 1.0), Complex64::new(2.5, 0.5))
            .with_tolerances(1.0e-13, 1.0e-10, 2);
        let outcome = refine_secant(|z: Complex64| Ok::<_, Infallible>(z * z * z - 1.0), input);
        assert_eq!(
            outcome,
            RefineOutcome::Failed(NonConvergence::MaxSteps { steps: 2 })
        );
    }

    #[test]
    fn converged_step_with_large_residual_is_rejected() {
        let input = SecantInput::new(Complex64::new(0.3, -0.8), Complex64::new(-0.2, -1.3))
            .with_tolerances(10.0, 1.0e-10, 100);
        let outcome = refine_secant(|z: Complex64| Ok::<_, Infallible>(z * z + 1.0), input);
        assert!(matches!(
            outcome,
            RefineOutcome::Failed(NonConvergence::ResidualTooLarge { residual }) if residual > 0.1
        ));
    }

    #[test]
    fn evaluation_errors_stop_refinement() {
        let input = SecantInput::new(Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0));
        let outcome = refine_secant(
            |z: Complex64| {
                if z.re > 1.5 {
                    Err("outside domain")
                } else {
                    Ok(z)
                }
            },
            input,
        );
        assert_eq!(
            outcome,
            RefineOutcome::Failed(NonConvergence::Evaluation {
                message: "outside domain".to_string()
            })
        );
    }
}
