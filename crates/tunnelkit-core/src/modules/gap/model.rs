use crate::common::constants::PI;
use crate::domain::{ComputeResult, TunnelError};
use crate::modules::serialization::TableRow;
use serde::Serialize;

const GAUSSIAN_WIDTH: f64 = 0.2;
const TOPHAT_REGULARIZATION: f64 = 1.0e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientProfile {
    Gaussian,
    Cosine,
    Tophat,
}

impl GradientProfile {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Cosine => "cosine",
            Self::Tophat => "tophat",
        }
    }

    /// sup |grad phi| for amplitude `a`.
    pub fn gradient_bound(self, amplitude: f64) -> f64 {
        match self {
            // a exp(-x^2 / (2 sigma^2)) peaks in slope at x = sigma
            Self::Gaussian => amplitude.abs() / GAUSSIAN_WIDTH * (-0.5_f64).exp(),
            // a cos(pi x)
            Self::Cosine => amplitude.abs() * PI,
            // regularized jump
            Self::Tophat => TOPHAT_REGULARIZATION * amplitude.abs(),
        }
    }
}

/// Gauge sector with its profile rotation and default integral constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorSpec {
    pub label: &'static str,
    pub profile_order: [GradientProfile; 3],
    pub default_kstar: f64,
    pub default_cd: f64,
}

pub const SU2_SECTOR: SectorSpec = SectorSpec {
    label: "SU(2)",
    profile_order: [
        GradientProfile::Gaussian,
        GradientProfile::Cosine,
        GradientProfile::Tophat,
    ],
    default_kstar: 0.50,
    default_cd: 0.75,
};

pub const SU3_SECTOR: SectorSpec = SectorSpec {
    label: "SU(3)",
    profile_order: [
        GradientProfile::Cosine,
        GradientProfile::Gaussian,
        GradientProfile::Tophat,
    ],
    default_kstar: 0.60,
    default_cd: 0.80,
};

pub const DEFAULT_DISCRETIZATION_ERROR: f64 = 0.01;
pub const DEFAULT_DOMAIN_ERROR: f64 = 0.01;
pub const DEFAULT_ROWS_PER_SECTOR: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapCertificateParams {
    pub kstar: f64,
    pub c_d: f64,
    pub disc_error: f64,
    pub domain_error: f64,
    pub rows: usize,
}

impl GapCertificateParams {
    pub fn defaults_for(sector: &SectorSpec) -> Self {
        Self {
            kstar: sector.default_kstar,
            c_d: sector.default_cd,
            disc_error: DEFAULT_DISCRETIZATION_ERROR,
            domain_error: DEFAULT_DOMAIN_ERROR,
            rows: DEFAULT_ROWS_PER_SECTOR,
        }
    }

    pub fn validate(&self, sector: &SectorSpec) -> ComputeResult<()> {
        let fields = [
            ("Kstar", self.kstar),
            ("C_d", self.c_d),
            ("disc_err", self.disc_error),
            ("domain_err", self.domain_error),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(TunnelError::input_validation(
                    "INPUT.GAP_PARAMETER",
                    format!("{} parameter {name} must be finite, got {value}", sector.label),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapRow {
    pub sector: &'static str,
    pub profile_id: usize,
    pub profile_name: &'static str,
    pub a_param: f64,
    #[serde(rename = "Kstar_int")]
    pub kstar_int: f64,
    #[serde(rename = "C_d_int")]
    pub cd_int: f64,
    pub grad_phi_sup: f64,
    pub lambda1_lower_bound: f64,
    pub disc_error: f64,
    pub domain_error: f64,
    pub certificate_margin: f64,
}

impl GapRow {
    /// Row `index` (0-based) of `sector`: profile order[index mod 3], a = 0.5 + 0.5 index.
    pub fn new(sector: &SectorSpec, params: &GapCertificateParams, index: usize) -> Self {
        let profile = sector.profile_order[index % sector.profile_order.len()];
        let amplitude = 0.5 + 0.5 * index as f64;
        let gradient = profile.gradient_bound(amplitude);
        let lower_bound = params.kstar - params.c_d * gradient * gradient;

        Self {
            sector: sector.label,
            profile_id: index + 1,
            profile_name: profile.name(),
            a_param: amplitude,
            kstar_int: params.kstar,
            cd_int: params.c_d,
            grad_phi_sup: gradient,
            lambda1_lower_bound: lower_bound,
            disc_error: params.disc_error,
            domain_error: params.domain_error,
            certificate_margin: lower_bound - (params.disc_error + params.domain_error),
        }
    }
}

impl TableRow for GapRow {
    const COLUMNS: &'static [&'static str] = &[
        "sector",
        "profile_id",
        "profile_name",
        "a_param",
        "Kstar_int",
        "C_d_int",
        "grad_phi_sup",
        "lambda1_lower_bound",
        "disc_error",
        "domain_error",
        "certificate_margin",
    ];
    type Key = (&'static str, usize);

    fn key(&self) -> Self::Key {
        (self.sector, self.profile_id)
    }
}
