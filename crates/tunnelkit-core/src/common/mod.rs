pub mod constants;
pub mod policy;

pub use policy::{
    BarrierPolicy, NumericPolicy, NumericPolicyError, PoleSearchPolicy, WashboardPolicy,
    load_numeric_policy,
};
