use crate::domain::{ComputeArtifact, ComputeModule, ComputeResult};

pub trait ModuleExecutor {
    type Request;

    fn module(&self) -> ComputeModule;

    fn execute(&self, request: &Self::Request) -> ComputeResult<Vec<ComputeArtifact>>;
}
