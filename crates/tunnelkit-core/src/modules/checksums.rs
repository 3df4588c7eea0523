use super::ModuleExecutor;
use super::serialization::write_text_artifact;
use crate::domain::{ComputeArtifact, ComputeModule, ComputeResult, TunnelError};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

pub const DEFAULT_CHECKSUM_TARGETS: &[&str] = &[
    "artifacts/data/washboard_escape_rates.csv",
    "artifacts/data/ab_shape_resonance_poles.csv",
];
pub const DEFAULT_CHECKSUM_OUTPUT: &str = "artifacts/CHECKSUMS.txt";
pub const PENDING_MARKER: &str = "<pending>";

const READ_CHUNK_BYTES: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRequest {
    pub files: Vec<PathBuf>,
    pub output_path: PathBuf,
}

impl Default for ChecksumRequest {
    fn default() -> Self {
        Self {
            files: DEFAULT_CHECKSUM_TARGETS.iter().map(PathBuf::from).collect(),
            output_path: PathBuf::from(DEFAULT_CHECKSUM_OUTPUT),
        }
    }
}

/// Streams `path` through SHA-256. `Ok(None)` when the file does not exist.
pub fn sha256_file(path: &Path) -> ComputeResult<Option<String>> {
    let read_error = |source: std::io::Error| {
        TunnelError::io_system(
            "IO.CHECKSUM_READ",
            format!("failed to read '{}': {}", path.display(), source),
        )
    };

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(read_error(source)),
    };

    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; READ_CHUNK_BYTES];
    loop {
        let read = file.read(&mut buffer).map_err(read_error)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(Some(hex::encode(hasher.finalize())))
}

/// Forward-slash rendering of `path`, independent of the host separator.
pub fn posix_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub fn manifest_line(path: &Path) -> ComputeResult<String> {
    let digest = sha256_file(path)?;
    let label = digest.as_deref().unwrap_or(PENDING_MARKER);
    Ok(format!("{label}  {}", posix_path(path)))
}

pub fn build_manifest(files: &[PathBuf]) -> ComputeResult<String> {
    let lines = files
        .iter()
        .map(|path| manifest_line(path))
        .collect::<ComputeResult<Vec<_>>>()?;
    let mut manifest = lines.join("\n");
    manifest.push('\n');
    Ok(manifest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChecksumModule;

impl ModuleExecutor for ChecksumModule {
    type Request = ChecksumRequest;

    fn module(&self) -> ComputeModule {
        ComputeModule::Checksums
    }

    fn execute(&self, request: &ChecksumRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        let manifest = build_manifest(&request.files)?;
        write_text_artifact(&request.output_path, &manifest)?;
        tracing::info!(
            output = %request.output_path.display(),
            entries = request.files.len(),
            "wrote checksum manifest"
        );
        Ok(vec![ComputeArtifact::new(
            &request.output_path,
            request.files.len(),
        )])
    }
}
