use super::CliError;
use super::dispatch::SERIAL_CHAIN_ORDER;
use super::helpers::{PolicyFlag, prepare_artifacts_dir, run_module};
use std::path::{Path, PathBuf};
use tunnelkit_core::common::NumericPolicy;
use tunnelkit_core::domain::{ComputeModule, ComputeResult};
use tunnelkit_core::modules::barrier::{ActionMode, BarrierModule, BarrierRequest, BarrierShape};
use tunnelkit_core::modules::checksums::{ChecksumModule, ChecksumRequest, DEFAULT_CHECKSUM_OUTPUT};
use tunnelkit_core::modules::gap::{
    DEFAULT_DISCRETIZATION_ERROR, DEFAULT_DOMAIN_ERROR, DEFAULT_ROWS_PER_SECTOR,
    GapCertificateModule, GapCertificateParams, GapCertificateRequest, SU2_SECTOR, SU3_SECTOR,
};
use tunnelkit_core::modules::poles::{
    ConditionKind, DEFAULT_SHELL_STRENGTH, PoleSearchModule, PoleTableRequest,
};
use tunnelkit_core::modules::washboard::{WashboardModule, WashboardRequest};

const POLES_TABLE: &str = "data/ab_shape_resonance_poles.csv";
const BARRIER_TABLE: &str = "data/barrier_1d_wkb.csv";
const WASHBOARD_TABLE: &str = "data/washboard_escape_rates.csv";
const GAP_SU2_TABLE: &str = "data/gap_certificates_su2.csv";
const GAP_SU3_TABLE: &str = "data/gap_certificates_su3.csv";
const CHECKSUM_MANIFEST: &str = "CHECKSUMS.txt";

#[derive(clap::Args)]
pub(super) struct PolesArgs {
    /// Angular quantum numbers m
    #[arg(long, num_args = 1.., default_values_t = [0_i64, 1], allow_negative_numbers = true)]
    m: Vec<i64>,

    /// Aharonov-Bohm flux fractions alpha
    #[arg(long, num_args = 1.., default_values_t = [0.0_f64, 0.25], allow_negative_numbers = true)]
    alpha: Vec<f64>,

    /// Resonances requested per (m, alpha)
    #[arg(long, default_value_t = 2)]
    n_roots: usize,

    /// Search attempts per (m, alpha); the policy budget when omitted
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Resonance condition: delta-shell or hard-disk
    #[arg(long, default_value = "delta-shell")]
    condition: String,

    /// Delta-shell coupling strength
    #[arg(long, default_value_t = DEFAULT_SHELL_STRENGTH)]
    shell_strength: f64,

    /// Output CSV path
    #[arg(long)]
    csv: PathBuf,

    #[command(flatten)]
    policy: PolicyFlag,
}

#[derive(clap::Args)]
pub(super) struct BarrierArgs {
    /// Potential shape
    #[arg(long, default_value = "rectangular")]
    potential: String,

    /// Barrier height V0
    #[arg(long = "V0", allow_negative_numbers = true)]
    v0: f64,

    /// Barrier width L
    #[arg(long = "L", allow_negative_numbers = true)]
    l: f64,

    /// Incident energy E
    #[arg(long = "E", allow_negative_numbers = true)]
    e: f64,

    /// Output CSV path
    #[arg(long)]
    out: PathBuf,

    /// Agmon action evaluation: closed-form or quadrature
    #[arg(long, default_value = "closed-form")]
    action: String,

    #[command(flatten)]
    policy: PolicyFlag,
}

#[derive(clap::Args)]
pub(super) struct WashboardArgs {
    /// Josephson energy EJ
    #[arg(long = "EJ")]
    ej: f64,

    /// Charging energy EC
    #[arg(long = "EC")]
    ec: f64,

    /// Bias tilts eta
    #[arg(long, required = true, num_args = 1.., allow_negative_numbers = true)]
    etas: Vec<f64>,

    /// Output CSV path
    #[arg(long)]
    csv: PathBuf,

    #[command(flatten)]
    policy: PolicyFlag,
}

#[derive(clap::Args)]
pub(super) struct GapCertificateArgs {
    /// SU(2) output CSV path
    #[arg(long = "su2-csv", alias = "su2_csv")]
    su2_csv: PathBuf,

    /// SU(3) output CSV path
    #[arg(long = "su3-csv", alias = "su3_csv")]
    su3_csv: PathBuf,

    /// SU(2) coercivity constant K*
    #[arg(long = "kstar-su2", alias = "Kstar_su2", default_value_t = SU2_SECTOR.default_kstar)]
    kstar_su2: f64,

    /// SU(3) coercivity constant K*
    #[arg(long = "kstar-su3", alias = "Kstar_su3", default_value_t = SU3_SECTOR.default_kstar)]
    kstar_su3: f64,

    /// SU(2) gradient penalty C_d
    #[arg(long = "cd-su2", alias = "Cd_su2", default_value_t = SU2_SECTOR.default_cd)]
    cd_su2: f64,

    /// SU(3) gradient penalty C_d
    #[arg(long = "cd-su3", alias = "Cd_su3", default_value_t = SU3_SECTOR.default_cd)]
    cd_su3: f64,

    /// Discretization error allowance
    #[arg(long = "disc-err", alias = "disc_err", default_value_t = DEFAULT_DISCRETIZATION_ERROR)]
    disc_err: f64,

    /// Finite-domain error allowance
    #[arg(long = "domain-err", alias = "domain_err", default_value_t = DEFAULT_DOMAIN_ERROR)]
    domain_err: f64,

    /// Certificate rows per sector
    #[arg(long, default_value_t = DEFAULT_ROWS_PER_SECTOR)]
    rows_per_sector: usize,
}

#[derive(clap::Args)]
pub(super) struct ChecksumArgs {
    /// Manifest output path
    #[arg(long, default_value = DEFAULT_CHECKSUM_OUTPUT)]
    out: PathBuf,

    /// Files to hash (the primary tables when omitted)
    #[arg(long, num_args = 1..)]
    files: Option<Vec<PathBuf>>,
}

#[derive(clap::Args)]
pub(super) struct AllArgs {
    /// Root directory for every generated artifact
    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    /// Angular quantum numbers m for the pole search
    #[arg(long, num_args = 1.., default_values_t = [0_i64, 1], allow_negative_numbers = true)]
    m: Vec<i64>,

    /// Flux fractions alpha for the pole search
    #[arg(long, num_args = 1.., default_values_t = [0.0_f64, 0.25], allow_negative_numbers = true)]
    alpha: Vec<f64>,

    /// Resonances requested per (m, alpha)
    #[arg(long, default_value_t = 2)]
    n_roots: usize,

    /// Barrier height V0
    #[arg(long = "V0", default_value_t = 5.0)]
    v0: f64,

    /// Barrier width L
    #[arg(long = "L", default_value_t = 1.0)]
    l: f64,

    /// Incident energy E
    #[arg(long = "E", default_value_t = 2.0)]
    e: f64,

    /// Josephson energy EJ
    #[arg(long = "EJ", default_value_t = 1.0)]
    ej: f64,

    /// Charging energy EC
    #[arg(long = "EC", default_value_t = 0.1)]
    ec: f64,

    /// Bias tilts eta
    #[arg(
        long,
        num_args = 1..,
        default_values_t = [-0.2_f64, -0.05, 0.0],
        allow_negative_numbers = true
    )]
    etas: Vec<f64>,

    #[command(flatten)]
    policy: PolicyFlag,
}

impl PolesArgs {
    fn into_request(self) -> ComputeResult<PoleTableRequest> {
        Ok(PoleTableRequest {
            angular_momenta: self.m,
            flux_fractions: self.alpha,
            n_roots: self.n_roots,
            max_attempts: self.max_attempts,
            condition: ConditionKind::parse(&self.condition, self.shell_strength)?,
            output_path: self.csv,
        })
    }
}

impl BarrierArgs {
    fn into_request(self) -> ComputeResult<BarrierRequest> {
        Ok(BarrierRequest {
            shape: BarrierShape::parse(&self.potential)?,
            height: self.v0,
            width: self.l,
            energy: self.e,
            action_mode: ActionMode::parse(&self.action)?,
            output_path: self.out,
        })
    }
}

impl WashboardArgs {
    fn into_request(self) -> WashboardRequest {
        WashboardRequest {
            josephson_energy: self.ej,
            charging_energy: self.ec,
            tilts: self.etas,
            output_path: self.csv,
        }
    }
}

impl GapCertificateArgs {
    fn into_request(self) -> GapCertificateRequest {
        let shared = |kstar, c_d| GapCertificateParams {
            kstar,
            c_d,
            disc_error: self.disc_err,
            domain_error: self.domain_err,
            rows: self.rows_per_sector,
        };
        GapCertificateRequest {
            su2: shared(self.kstar_su2, self.cd_su2),
            su3: shared(self.kstar_su3, self.cd_su3),
            su2_path: self.su2_csv,
            su3_path: self.su3_csv,
        }
    }
}

impl ChecksumArgs {
    fn into_request(self) -> ChecksumRequest {
        let defaults = ChecksumRequest::default();
        ChecksumRequest {
            files: self.files.unwrap_or(defaults.files),
            output_path: self.out,
        }
    }
}

pub(super) fn run_poles_command(args: PolesArgs) -> Result<i32, CliError> {
    let policy = args.policy.load()?;
    let request = args.into_request().map_err(CliError::Compute)?;
    run_module(&PoleSearchModule::new(policy.pole_search), &request)?;
    Ok(0)
}

pub(super) fn run_barrier_command(args: BarrierArgs) -> Result<i32, CliError> {
    let policy = args.policy.load()?;
    let request = args.into_request().map_err(CliError::Compute)?;
    run_module(&BarrierModule::new(policy.barrier), &request)?;
    Ok(0)
}

pub(super) fn run_washboard_command(args: WashboardArgs) -> Result<i32, CliError> {
    let policy = args.policy.load()?;
    let request = args.into_request();
    run_module(&WashboardModule::new(policy.washboard), &request)?;
    Ok(0)
}

pub(super) fn run_gap_certificates_command(args: GapCertificateArgs) -> Result<i32, CliError> {
    run_module(&GapCertificateModule, &args.into_request())?;
    Ok(0)
}

pub(super) fn run_checksums_command(args: ChecksumArgs) -> Result<i32, CliError> {
    run_module(&ChecksumModule, &args.into_request())?;
    Ok(0)
}

/// Runs every calculator into `--artifacts-dir`, then hashes the primary tables.
pub(super) fn run_all_command(args: AllArgs) -> Result<i32, CliError> {
    let policy = args.policy.load()?;
    prepare_artifacts_dir(&args.artifacts_dir)?;

    for module in SERIAL_CHAIN_ORDER {
        run_chain_step(module, &args, &policy)?;
    }
    println!(
        "Completed serial workflow in '{}'.",
        args.artifacts_dir.display()
    );
    Ok(0)
}

fn run_chain_step(
    module: ComputeModule,
    args: &AllArgs,
    policy: &NumericPolicy,
) -> Result<(), CliError> {
    tracing::debug!(module = %module, "starting chain step");
    let root: &Path = &args.artifacts_dir;
    match module {
        ComputeModule::GapCertificates => {
            let request = GapCertificateRequest::with_defaults(
                root.join(GAP_SU2_TABLE),
                root.join(GAP_SU3_TABLE),
            );
            run_module(&GapCertificateModule, &request)?;
        }
        ComputeModule::PoleSearch => {
            let request = PoleTableRequest {
                angular_momenta: args.m.clone(),
                flux_fractions: args.alpha.clone(),
                n_roots: args.n_roots,
                max_attempts: None,
                condition: ConditionKind::DeltaShell {
                    strength: DEFAULT_SHELL_STRENGTH,
                },
                output_path: root.join(POLES_TABLE),
            };
            run_module(&PoleSearchModule::new(policy.pole_search), &request)?;
        }
        ComputeModule::Barrier => {
            let request = BarrierRequest {
                shape: BarrierShape::Rectangular,
                height: args.v0,
                width: args.l,
                energy: args.e,
                action_mode: ActionMode::ClosedForm,
                output_path: root.join(BARRIER_TABLE),
            };
            run_module(&BarrierModule::new(policy.barrier), &request)?;
        }
        ComputeModule::Washboard => {
            let request = WashboardRequest {
                josephson_energy: args.ej,
                charging_energy: args.ec,
                tilts: args.etas.clone(),
                output_path: root.join(WASHBOARD_TABLE),
            };
            run_module(&WashboardModule::new(policy.washboard), &request)?;
        }
        ComputeModule::Checksums => {
            let request = ChecksumRequest {
                files: vec![root.join(WASHBOARD_TABLE), root.join(POLES_TABLE)],
                output_path: root.join(CHECKSUM_MANIFEST),
            };
            run_module(&ChecksumModule, &request)?;
        }
    }
    Ok(())
}
