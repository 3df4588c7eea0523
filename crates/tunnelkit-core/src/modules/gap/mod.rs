mod model;

pub use model::{
    DEFAULT_DISCRETIZATION_ERROR, DEFAULT_DOMAIN_ERROR, DEFAULT_ROWS_PER_SECTOR,
    GapCertificateParams, GapRow, GradientProfile, SU2_SECTOR, SU3_SECTOR, SectorSpec,
};

use super::ModuleExecutor;
use super::serialization::{ResultTable, write_csv_table};
use crate::domain::{ComputeArtifact, ComputeModule, ComputeResult};
use std::path::PathBuf;

pub fn build_sector_table(
    sector: &SectorSpec,
    params: &GapCertificateParams,
) -> ComputeResult<ResultTable<GapRow>> {
    params.validate(sector)?;
    let mut table = ResultTable::new();
    for index in 0..params.rows {
        table.push(GapRow::new(sector, params, index))?;
    }
    Ok(table)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapCertificateRequest {
    pub su2: GapCertificateParams,
    pub su3: GapCertificateParams,
    pub su2_path: PathBuf,
    pub su3_path: PathBuf,
}

impl GapCertificateRequest {
    pub fn with_defaults(su2_path: impl Into<PathBuf>, su3_path: impl Into<PathBuf>) -> Self {
        Self {
            su2: GapCertificateParams::defaults_for(&SU2_SECTOR),
            su3: GapCertificateParams::defaults_for(&SU3_SECTOR),
            su2_path: su2_path.into(),
            su3_path: su3_path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapCertificateModule;

impl ModuleExecutor for GapCertificateModule {
    type Request = GapCertificateRequest;

    fn module(&self) -> ComputeModule {
        ComputeModule::GapCertificates
    }

    fn execute(&self, request: &GapCertificateRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        let su2 = build_sector_table(&SU2_SECTOR, &request.su2)?;
        let su3 = build_sector_table(&SU3_SECTOR, &request.su3)?;
        Ok(vec![
            write_csv_table(&request.su2_path, &su2)?,
            write_csv_table(&request.su3_path, &su3)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GapCertificateModule, GapCertificateParams, GapCertificateRequest, SU2_SECTOR,
        SU3_SECTOR, build_sector_table,
    };
    use crate::modules::ModuleExecutor;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sector_tables_rotate_profiles_in_sector_order() {
        let su2 = build_sector_table(&SU2_SECTOR, &GapCertificateParams::defaults_for(&SU2_SECTOR))
            .expect("su2");
        let su3 = build_sector_table(&SU3_SECTOR, &GapCertificateParams::defaults_for(&SU3_SECTOR))
            .expect("su3");

        let names = |rows: &[super::GapRow]| -> Vec<&'static str> {
            rows.iter().map(|row| row.profile_name).collect()
        };
        assert_eq!(names(su2.rows()), vec!["gaussian", "cosine", "tophat"]);
        assert_eq!(names(su3.rows()), vec!["cosine", "gaussian", "tophat"]);
        assert!(su3.rows().iter().all(|row| row.kstar_int == 0.60 && row.cd_int == 0.80));
    }

    #[test]
    fn margin_decreases_with_amplitude_for_each_profile() {
        let params = GapCertificateParams {
            rows: 9,
            ..GapCertificateParams::defaults_for(&SU2_SECTOR)
        };
        let table = build_sector_table(&SU2_SECTOR, &params).expect("table");

        let mut by_profile: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
        for row in table.rows() {
            by_profile
                .entry(row.profile_name)
                .or_default()
                .push((row.a_param, row.certificate_margin));
        }
        assert_eq!(by_profile.len(), 3);
        for (name, points) in by_profile {
            assert_eq!(points.len(), 3);
            for pair in points.windows(2) {
                assert!(pair[1].0 > pair[0].0);
                assert!(pair[1].1 < pair[0].1, "{name} margin should decrease: {pair:?}");
            }
        }
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let params = GapCertificateParams::defaults_for(&SU3_SECTOR);
        let first = build_sector_table(&SU3_SECTOR, &params).expect("first");
        let second = build_sector_table(&SU3_SECTOR, &params).expect("second");
        for (lhs, rhs) in first.rows().iter().zip(second.rows()) {
            assert_eq!(lhs.certificate_margin.to_bits(), rhs.certificate_margin.to_bits());
        }
    }

    #[test]
    fn execute_writes_both_sector_tables() {
        let temp = TempDir::new().expect("tempdir should be created");
        let request = GapCertificateRequest::with_defaults(
            temp.path().join("su2.csv"),
            temp.path().join("tables/su3.csv"),
        );
        let artifacts = GapCertificateModule
            .execute(&request)
            .expect("module should run");

        assert_eq!(artifacts.len(), 2);
        let su2 = fs::read_to_string(&request.su2_path).expect("su2 csv");
        let mut lines = su2.lines();
        assert_eq!(
            lines.next(),
            Some(
                "sector,profile_id,profile_name,a_param,Kstar_int,C_d_int,grad_phi_sup,lambda1_lower_bound,disc_error,domain_error,certificate_margin"
            )
        );
        assert!(lines.next().is_some_and(|line| line.starts_with("SU(2),1,gaussian,0.5,0.5,0.75,")));
        assert_eq!(su2.lines().count(), 4);
        assert!(request.su3_path.exists());
    }
}
