//! Test fixtures with defaults for parameters a test does not depend on.
//!
//! Override only the fields the test relies on:
//!
//! ```
//! use dp_clustering::test_utils::{test_coreset_param, TestCoresetConfig};
//!
//! let param = test_coreset_param(&TestCoresetConfig::default().with_radius(3.0)).unwrap();
//! assert_eq!(param.radius(), 3.0);
//! ```

use dp_clustering_accounting::{AveragePrivacyParam, CountPrivacyParam, PrivacyCalculator};
use dp_clustering_core::{DifferentialPrivacyParam, PrivacyBudgetSplit, Result, TreeParam};

use crate::coreset::CoresetParam;

/// Label attached to fixture coreset parameters.
pub const TEST_CORESET_DESCRIPTION: &str = "TestCoresetParam";

/// Inputs for [`test_coreset_param`].
#[derive(Clone, Debug, PartialEq)]
pub struct TestCoresetConfig {
    /// Total epsilon. Default `1.0`.
    pub epsilon: f64,
    /// Total delta. Default `1e-2`.
    pub delta: f64,
    /// Budget fraction for sums. Default `0.2`.
    pub frac_sum: f64,
    /// Budget fraction for group counts. Default `0.8`.
    pub frac_group_count: f64,
    /// Default `4`.
    pub min_num_points_in_branching_node: usize,
    /// Default `2`.
    pub min_num_points_in_node: usize,
    /// Default `4`.
    pub max_depth: usize,
    /// Default `1.0`.
    pub radius: f64,
}

impl Default for TestCoresetConfig {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            delta: 1e-2,
            frac_sum: 0.2,
            frac_group_count: 0.8,
            min_num_points_in_branching_node: 4,
            min_num_points_in_node: 2,
            max_depth: 4,
            radius: 1.0,
        }
    }
}

impl TestCoresetConfig {
    /// Set the total budget.
    pub fn with_budget(mut self, epsilon: f64, delta: f64) -> Self {
        self.epsilon = epsilon;
        self.delta = delta;
        self
    }

    /// Set the budget split.
    pub fn with_split(mut self, frac_sum: f64, frac_group_count: f64) -> Self {
        self.frac_sum = frac_sum;
        self.frac_group_count = frac_group_count;
        self
    }

    /// Set the node size thresholds.
    pub fn with_node_sizes(
        mut self,
        min_num_points_in_branching_node: usize,
        min_num_points_in_node: usize,
    ) -> Self {
        self.min_num_points_in_branching_node = min_num_points_in_branching_node;
        self.min_num_points_in_node = min_num_points_in_node;
        self
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

/// Build a [`CoresetParam`] from fixture inputs.
pub fn test_coreset_param(config: &TestCoresetConfig) -> Result<CoresetParam> {
    let privacy_param = DifferentialPrivacyParam::new(config.epsilon, config.delta)?;
    let budget_split = PrivacyBudgetSplit::new(config.frac_sum, config.frac_group_count)?;
    let tree_param = TreeParam::new(
        config.min_num_points_in_branching_node,
        config.min_num_points_in_node,
        config.max_depth,
    )?;
    let pcalc = PrivacyCalculator::from_budget_split(
        &privacy_param,
        &budget_split,
        config.radius,
        config.max_depth,
    )?;
    CoresetParam::new(pcalc, tree_param, config.radius, TEST_CORESET_DESCRIPTION)
}

/// Inputs for [`test_privacy_calculator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestPrivacyCalculatorConfig {
    /// Default `32.6`.
    pub gaussian_std_dev: f64,
    /// Default `6.4`.
    pub sensitivity: f64,
    /// Default `0.8`.
    pub laplace_param: f64,
}

impl Default for TestPrivacyCalculatorConfig {
    fn default() -> Self {
        Self {
            gaussian_std_dev: 32.6,
            sensitivity: 6.4,
            laplace_param: 0.8,
        }
    }
}

impl TestPrivacyCalculatorConfig {
    /// Set the Gaussian std-dev.
    pub fn with_gaussian_std_dev(mut self, gaussian_std_dev: f64) -> Self {
        self.gaussian_std_dev = gaussian_std_dev;
        self
    }

    /// Set the sum sensitivity.
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Set the Laplace scale.
    pub fn with_laplace_param(mut self, laplace_param: f64) -> Self {
        self.laplace_param = laplace_param;
        self
    }
}

/// Build a [`PrivacyCalculator`] directly from fixture noise parameters.
pub fn test_privacy_calculator(config: &TestPrivacyCalculatorConfig) -> Result<PrivacyCalculator> {
    Ok(PrivacyCalculator::new(
        AveragePrivacyParam::new(config.gaussian_std_dev, config.sensitivity)?,
        CountPrivacyParam::new(config.laplace_param)?,
    ))
}
