mod model;

pub use model::{
    ActionMode, BarrierRequest, BarrierRow, BarrierShape, rectangular_transmission,
};

use super::ModuleExecutor;
use super::action::{ActionInput, RectangularBarrier, agmon_action, wkb_transmission};
use super::serialization::{ResultTable, write_csv_table};
use crate::common::BarrierPolicy;
use crate::domain::{ComputeArtifact, ComputeModule, ComputeResult, TunnelError};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BarrierModule {
    policy: BarrierPolicy,
}

impl BarrierModule {
    pub fn new(policy: BarrierPolicy) -> Self {
        Self { policy }
    }

    pub fn compute_row(&self, request: &BarrierRequest) -> ComputeResult<BarrierRow> {
        request.validate()?;
        let barrier = match request.shape {
            BarrierShape::Rectangular => RectangularBarrier::new(request.height, request.width),
        };

        let action = match request.action_mode {
            ActionMode::ClosedForm => barrier.closed_form_action(request.energy),
            ActionMode::Quadrature => agmon_action(ActionInput::new(
                &barrier,
                request.energy,
                0.0,
                request.width,
                self.policy.action_samples,
            ))
            .map_err(|error| TunnelError::computation("RUN.BARRIER_ACTION", error.to_string()))?,
        };

        let exact_transmission =
            rectangular_transmission(request.height, request.width, request.energy);
        let wkb = wkb_transmission(action);
        let rel_error = (wkb - exact_transmission).abs()
            / exact_transmission.max(self.policy.transmission_floor);

        tracing::info!(
            energy = request.energy,
            action,
            exact_transmission,
            wkb,
            "barrier transmission evaluated"
        );

        Ok(BarrierRow {
            energy: request.energy,
            action,
            exact_transmission,
            wkb_transmission: wkb,
            rel_error,
        })
    }
}

impl ModuleExecutor for BarrierModule {
    type Request = BarrierRequest;

    fn module(&self) -> ComputeModule {
        ComputeModule::Barrier
    }

    fn execute(&self, request: &BarrierRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        let mut table = ResultTable::new();
        table.push(self.compute_row(request)?)?;
        let artifact = write_csv_table(&request.output_path, &table)?;
        Ok(vec![artifact])
    }
}
