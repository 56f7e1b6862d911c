//! Bounded non-linear least-squares fitting of the seasonal curve.

mod double_logistic;
mod simplex;

pub use double_logistic::{
    fit_double_logistic, initial_guess, parameter_bounds, DoubleLogisticFit, FitConfig,
    FitParameters,
};
pub use simplex::{minimize_bounded, Bounds, SimplexConfig, SimplexResult};
