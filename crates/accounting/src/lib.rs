//! Privacy budget accounting for private coreset trees.
//!
//! A global `(epsilon, delta)` budget is split between the noisy sums and the
//! noisy group counts of the tree, divided across tree levels by a
//! [`CompositionRule`], and calibrated into a Gaussian std-dev and a Laplace
//! scale held by a [`PrivacyCalculator`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod calculator;
pub mod composition;

pub use aggregate::{private_average, private_count};
pub use calculator::{
    AveragePrivacyParam, CalculatorConfig, CountPrivacyParam, PrivacyCalculator,
    COUNT_SENSITIVITY,
};
pub use composition::{
    advanced_composition_epsilon, max_per_level_epsilon, CompositionRule, LevelBudget,
};

/// Common imports for privacy accounting.
pub mod prelude {
    pub use crate::{
        advanced_composition_epsilon, max_per_level_epsilon, private_average, private_count,
        AveragePrivacyParam, CalculatorConfig, CompositionRule, CountPrivacyParam, LevelBudget,
        PrivacyCalculator,
    };
}
