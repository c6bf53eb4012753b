//! Global privacy budget, budget split and tree shape parameters.

use crate::{DpError, Result};

/// Slack tolerated when checking that the split fractions sum to at most one.
const FRACTION_SUM_TOLERANCE: f64 = 1e-12;

/// Global `(epsilon, delta)` differential privacy budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifferentialPrivacyParam {
    epsilon: f64,
    delta: f64,
}

impl DifferentialPrivacyParam {
    /// Create a budget. `epsilon` must be positive and finite, `delta` in `[0, 1)`.
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        let param = Self { epsilon, delta };
        param.validate()?;
        Ok(param)
    }

    /// Total epsilon.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Total delta.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Validate parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(DpError::invalid("epsilon must be positive and finite"));
        }
        if !self.delta.is_finite() || self.delta < 0.0 || self.delta >= 1.0 {
            return Err(DpError::invalid("delta must be in [0, 1)"));
        }
        Ok(())
    }
}

/// Fractional allocation of the budget between the sum and count statistics.
///
/// Whatever the two fractions leave over is reserved for other uses and is
/// never spent by the calculator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrivacyBudgetSplit {
    frac_sum: f64,
    frac_group_count: f64,
}

impl PrivacyBudgetSplit {
    /// Create a split. Both fractions must lie in `(0, 1)` and sum to at most one.
    pub fn new(frac_sum: f64, frac_group_count: f64) -> Result<Self> {
        let split = Self {
            frac_sum,
            frac_group_count,
        };
        split.validate()?;
        Ok(split)
    }

    /// Fraction of the budget spent on the noisy sum of points.
    pub fn frac_sum(&self) -> f64 {
        self.frac_sum
    }

    /// Fraction of the budget spent on noisy group counts.
    pub fn frac_group_count(&self) -> f64 {
        self.frac_group_count
    }

    /// Fraction left unallocated.
    pub fn frac_reserved(&self) -> f64 {
        (1.0 - self.frac_sum - self.frac_group_count).max(0.0)
    }

    /// Validate parameters.
    pub fn validate(&self) -> Result<()> {
        for (name, frac) in [
            ("frac_sum", self.frac_sum),
            ("frac_group_count", self.frac_group_count),
        ] {
            if !frac.is_finite() || frac <= 0.0 || frac >= 1.0 {
                return Err(DpError::invalid(format!("{name} must be in (0, 1)")));
            }
        }
        if self.frac_sum + self.frac_group_count > 1.0 + FRACTION_SUM_TOLERANCE {
            return Err(DpError::invalid("frac_sum + frac_group_count must not exceed 1"));
        }
        Ok(())
    }
}

/// Structural bounds of the coreset tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeParam {
    min_num_points_in_branching_node: usize,
    min_num_points_in_node: usize,
    max_depth: usize,
}

impl TreeParam {
    /// Create tree bounds.
    ///
    /// A node branches only when it holds at least
    /// `min_num_points_in_branching_node` points; children with fewer than
    /// `min_num_points_in_node` points are pruned.
    pub fn new(
        min_num_points_in_branching_node: usize,
        min_num_points_in_node: usize,
        max_depth: usize,
    ) -> Result<Self> {
        let param = Self {
            min_num_points_in_branching_node,
            min_num_points_in_node,
            max_depth,
        };
        param.validate()?;
        Ok(param)
    }

    /// Minimum number of points for a node to branch.
    pub fn min_num_points_in_branching_node(&self) -> usize {
        self.min_num_points_in_branching_node
    }

    /// Minimum number of points for a node to be kept.
    pub fn min_num_points_in_node(&self) -> usize {
        self.min_num_points_in_node
    }

    /// Maximum tree depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Validate parameters.
    pub fn validate(&self) -> Result<()> {
        if self.min_num_points_in_node == 0 {
            return Err(DpError::invalid("min_num_points_in_node must be positive"));
        }
        if self.min_num_points_in_branching_node < self.min_num_points_in_node {
            return Err(DpError::invalid(
                "min_num_points_in_branching_node must be >= min_num_points_in_node",
            ));
        }
        if self.max_depth == 0 {
            return Err(DpError::invalid("max_depth must be at least 1"));
        }
        Ok(())
    }
}
