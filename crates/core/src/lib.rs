//! Core building blocks for differentially private clustering.
//!
//! This crate provides the global budget and tree-shape value types, the
//! Gaussian and Laplace calibration formulas, and noise sampling primitives.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod calibrate;
pub mod error;
pub mod noise;
pub mod params;

pub use calibrate::{
    analytic_gaussian_sigma, classical_gaussian_sigma, gaussian_delta_for_sigma, laplace_scale,
    normal_ln_cdf, GaussianCalibration,
};
pub use error::{DpError, Result};
pub use noise::{add_gaussian_noise, sample_laplace};
pub use params::{DifferentialPrivacyParam, PrivacyBudgetSplit, TreeParam};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::{
        add_gaussian_noise, analytic_gaussian_sigma, classical_gaussian_sigma, laplace_scale,
        sample_laplace, DifferentialPrivacyParam, DpError, GaussianCalibration,
        PrivacyBudgetSplit, Result, TreeParam,
    };
}
