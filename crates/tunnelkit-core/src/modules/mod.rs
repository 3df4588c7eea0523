pub mod action;
pub mod barrier;
pub mod checksums;
pub mod gap;
pub mod poles;
pub mod serialization;
pub mod washboard;

mod traits;

pub use traits::ModuleExecutor;
