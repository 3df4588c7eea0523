mod model;

pub use model::{WashboardRequest, WashboardRow, WashboardWell, locate_well};

use super::ModuleExecutor;
use super::action::{ActionInput, WashboardPotential, agmon_action, escape_rate};
use super::serialization::{ResultTable, write_csv_table};
use crate::common::WashboardPolicy;
use crate::domain::{ComputeArtifact, ComputeModule, ComputeResult, TunnelError};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WashboardModule {
    policy: WashboardPolicy,
}

impl WashboardModule {
    pub fn new(policy: WashboardPolicy) -> Self {
        Self { policy }
    }

    /// Quasi-classical escape-rate estimate for one tilt.
    pub fn compute_row(
        &self,
        josephson_energy: f64,
        charging_energy: f64,
        tilt: f64,
    ) -> ComputeResult<WashboardRow> {
        let profile = WashboardPotential::new(josephson_energy, tilt);
        let well = locate_well(&profile, &self.policy)?;
        if well.used_fallback {
            tracing::debug!(
                tilt,
                min_index = well.min_index,
                barrier_index = well.barrier_index,
                "no barrier maximum right of the well; using fallback offset"
            );
        }

        let omega_p = (8.0 * charging_energy * profile.curvature(well.phi_min))
            .max(0.0)
            .sqrt();
        let energy_level = well.u_min + self.policy.metastable_fraction * well.barrier_height();

        let action = agmon_action(
            ActionInput::new(
                &profile,
                energy_level,
                well.phi_min.min(well.phi_barrier),
                well.phi_min.max(well.phi_barrier),
                self.policy.action_samples,
            )
            .with_normalization(4.0 * charging_energy),
        )
        .map_err(|error| TunnelError::computation("RUN.WASHBOARD_ACTION", error.to_string()))?;

        Ok(WashboardRow {
            eta: tilt,
            phi_min: well.phi_min,
            phi_barrier: well.phi_barrier,
            u_min: well.u_min,
            u_barrier: well.u_barrier,
            barrier_height: well.barrier_height(),
            omega_p,
            energy_level,
            action,
            escape_rate: escape_rate(omega_p, action),
        })
    }

    pub fn build_table(
        &self,
        request: &WashboardRequest,
    ) -> ComputeResult<ResultTable<WashboardRow>> {
        request.validate()?;
        let mut table = ResultTable::new();
        for &tilt in &request.tilts {
            let row =
                self.compute_row(request.josephson_energy, request.charging_energy, tilt)?;
            tracing::info!(
                tilt,
                action = row.action,
                escape_rate = row.escape_rate,
                "washboard escape rate evaluated"
            );
            table.push(row)?;
        }
        Ok(table)
    }
}

impl ModuleExecutor for WashboardModule {
    type Request = WashboardRequest;

    fn module(&self) -> ComputeModule {
        ComputeModule::Washboard
    }

    fn execute(&self, request: &WashboardRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        let table = self.build_table(request)?;
        let artifact = write_csv_table(&request.output_path, &table)?;
        Ok(vec![artifact])
    }
}
