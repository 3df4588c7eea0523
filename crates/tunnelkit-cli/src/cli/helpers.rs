use super::CliError;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tunnelkit_core::common::{NumericPolicy, load_numeric_policy};
use tunnelkit_core::domain::ComputeArtifact;
use tunnelkit_core::modules::ModuleExecutor;

#[derive(clap::Args, Default)]
pub(super) struct PolicyFlag {
    /// Numeric policy JSON path (built-in defaults when omitted)
    #[arg(long)]
    policy: Option<PathBuf>,
}

impl PolicyFlag {
    pub(super) fn load(&self) -> Result<NumericPolicy, CliError> {
        match &self.policy {
            Some(path) => {
                let policy = load_numeric_policy(path)
                    .map_err(|error| CliError::Compute(error.into()))?;
                tracing::debug!(path = %path.display(), "loaded numeric policy");
                Ok(policy)
            }
            None => Ok(NumericPolicy::default()),
        }
    }
}

/// Runs `executor` and reports every written file on stdout.
pub(super) fn run_module<E: ModuleExecutor>(
    executor: &E,
    request: &E::Request,
) -> Result<Vec<ComputeArtifact>, CliError> {
    println!("Running {}...", executor.module());
    let artifacts = executor.execute(request).map_err(CliError::Compute)?;
    for artifact in &artifacts {
        println!("Wrote {}", artifact.path.display());
    }
    Ok(artifacts)
}

pub(super) fn prepare_artifacts_dir(artifacts_dir: &Path) -> Result<(), CliError> {
    fs::create_dir_all(artifacts_dir).with_context(|| {
        format!(
            "failed to create artifacts directory '{}'",
            artifacts_dir.display()
        )
    })?;
    Ok(())
}
