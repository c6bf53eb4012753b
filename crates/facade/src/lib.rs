//! Facade crate re-exporting the privacy parameter APIs for private clustering.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod coreset;
pub mod test_utils;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use dp_clustering_accounting as accounting;
pub use dp_clustering_core as core;

pub use dp_clustering_accounting::{
    advanced_composition_epsilon, max_per_level_epsilon, private_average, private_count,
    AveragePrivacyParam, CalculatorConfig, CompositionRule, CountPrivacyParam, LevelBudget,
    PrivacyCalculator,
};
pub use coreset::CoresetParam;
pub use dp_clustering_core::{
    analytic_gaussian_sigma, classical_gaussian_sigma, laplace_scale, DifferentialPrivacyParam,
    DpError, GaussianCalibration, PrivacyBudgetSplit, Result, TreeParam,
};

/// Convenience prelude covering the whole parameter pipeline.
pub mod prelude {
    pub use crate::coreset::CoresetParam;
    pub use dp_clustering_accounting::prelude::*;
    pub use dp_clustering_core::prelude::*;
}
