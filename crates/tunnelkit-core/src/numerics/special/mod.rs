pub mod gamma;
pub mod hankel;
pub mod integration;

pub use gamma::ln_gamma;
pub use hankel::{BesselError, bessel_j, hankel1, hankel2};
pub use integration::{
    ExpSinhConfig, ExpSinhEstimate, QuadratureError, integrate_exp_sinh, integrate_trapezoid,
    integrate_uniform_trapezoid,
};
