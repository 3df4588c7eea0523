pub mod errors;

pub use errors::{ComputeResult, TunnelError, TunnelErrorCategory, TunnelResult};

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputeModule {
    PoleSearch,
    Barrier,
    Washboard,
    GapCertificates,
    Checksums,
}

impl ComputeModule {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PoleSearch => "POLES",
            Self::Barrier => "BARRIER",
            Self::Washboard => "WASHBOARD",
            Self::GapCertificates => "GAP",
            Self::Checksums => "CHECKSUMS",
        }
    }
}

impl Display for ComputeModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// A file produced by a module run, with the number of data rows it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeArtifact {
    pub path: PathBuf,
    pub rows: usize,
}

impl ComputeArtifact {
    pub fn new(path: impl Into<PathBuf>, rows: usize) -> Self {
        Self {
            path: path.into(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ComputeModule;

    #[test]
    fn module_labels_are_uppercase_tokens() {
        let modules = [
            ComputeModule::PoleSearch,
            ComputeModule::Barrier,
            ComputeModule::Washboard,
            ComputeModule::GapCertificates,
            ComputeModule::Checksums,
        ];
        for module in modules {
            let label = module.to_string();
            assert_eq!(label, label.to_ascii_uppercase());
            assert_eq!(label, module.as_str());
        }
    }
}
