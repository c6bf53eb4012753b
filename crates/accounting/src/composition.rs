//! Composition of the privacy budget across tree levels.
//!
//! Every level of the coreset tree releases one noisy count per node and the
//! leaves release noisy sums, so each statistic kind is charged once per level
//! along any root-to-leaf path. The rules here decide how a statistic kind's
//! share of the budget is divided between `max_depth` levels.

use dp_clustering_core::{DifferentialPrivacyParam, DpError, PrivacyBudgetSplit, Result};

const MAX_BRACKET_EXPANSIONS: usize = 200;
const MAX_BISECTION_ITERS: usize = 200;
const RELATIVE_TOLERANCE: f64 = 1e-12;

/// How per-level budgets compose into the total budget.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CompositionRule {
    /// Basic sequential composition: every level gets `1 / max_depth` of the
    /// epsilon and delta of its statistic kind.
    #[default]
    Sequential,
    /// Advanced composition (Dwork, Rothblum & Vadhan, 2010).
    ///
    /// `slack_frac` of the global delta is reserved as the failure
    /// probability of the composition theorem, shared evenly between the sum
    /// and count statistics. Each level still gets at least its sequential
    /// share of epsilon. A kind whose advanced solution does not beat the
    /// sequential share charges no slack, and its unspent slack goes back to
    /// the sum's Gaussian delta.
    Advanced {
        /// Fraction of the global delta spent as composition slack, in `(0, 1)`.
        slack_frac: f64,
    },
}

/// Budget available to a single tree level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelBudget {
    /// Epsilon for the Gaussian sum release at one level.
    pub sum_epsilon: f64,
    /// Delta for the Gaussian sum release at one level.
    pub sum_delta: f64,
    /// Epsilon for the Laplace count release at one level.
    pub count_epsilon: f64,
}

impl CompositionRule {
    /// Validate the rule's parameters.
    pub fn validate(&self) -> Result<()> {
        match self {
            CompositionRule::Sequential => Ok(()),
            CompositionRule::Advanced { slack_frac } => {
                if !slack_frac.is_finite() || *slack_frac <= 0.0 || *slack_frac >= 1.0 {
                    return Err(DpError::invalid("slack_frac must be in (0, 1)"));
                }
                Ok(())
            }
        }
    }

    /// Divide the split budget between `max_depth` levels.
    pub fn allocate(
        &self,
        privacy_param: &DifferentialPrivacyParam,
        budget_split: &PrivacyBudgetSplit,
        max_depth: usize,
    ) -> Result<LevelBudget> {
        self.validate()?;
        if max_depth == 0 {
            return Err(DpError::invalid("max_depth must be at least 1"));
        }

        let levels = max_depth as f64;
        let epsilon_sum = privacy_param.epsilon() * budget_split.frac_sum();
        let epsilon_count = privacy_param.epsilon() * budget_split.frac_group_count();
        let delta = privacy_param.delta();

        match self {
            CompositionRule::Sequential => Ok(LevelBudget {
                sum_epsilon: epsilon_sum / levels,
                sum_delta: delta / levels,
                count_epsilon: epsilon_count / levels,
            }),
            CompositionRule::Advanced { slack_frac } => {
                if delta <= 0.0 {
                    return Err(DpError::unsupported(
                        "advanced composition requires a positive delta",
                    ));
                }
                let slack_per_kind = 0.5 * delta * slack_frac;
                let (sum_epsilon, sum_slack) =
                    advanced_share(epsilon_sum, max_depth, slack_per_kind)?;
                let (count_epsilon, count_slack) =
                    advanced_share(epsilon_count, max_depth, slack_per_kind)?;
                Ok(LevelBudget {
                    sum_epsilon,
                    sum_delta: (delta - sum_slack - count_slack) / levels,
                    count_epsilon,
                })
            }
        }
    }
}

/// Per-level epsilon for one statistic kind and the slack it spends.
fn advanced_share(total_epsilon: f64, max_depth: usize, slack: f64) -> Result<(f64, f64)> {
    let sequential = total_epsilon / max_depth as f64;
    let advanced = max_per_level_epsilon(total_epsilon, max_depth, slack)?;
    if advanced > sequential {
        Ok((advanced, slack))
    } else {
        Ok((sequential, 0.0))
    }
}

/// Total epsilon of `k` adaptive `epsilon`-DP releases under advanced
/// composition with slack `delta_slack`.
pub fn advanced_composition_epsilon(k: usize, epsilon: f64, delta_slack: f64) -> f64 {
    let kf = k as f64;
    let term1 = (2.0 * kf * (1.0 / delta_slack).ln()).sqrt() * epsilon;
    let term2 = kf * epsilon * epsilon.exp_m1();
    term1 + term2
}

/// Largest per-release epsilon whose `k`-fold advanced composition stays
/// within `total_epsilon`.
pub fn max_per_level_epsilon(total_epsilon: f64, k: usize, delta_slack: f64) -> Result<f64> {
    if !total_epsilon.is_finite() || total_epsilon <= 0.0 {
        return Err(DpError::invalid("total_epsilon must be positive and finite"));
    }
    if k == 0 {
        return Err(DpError::invalid("k must be at least 1"));
    }
    if !delta_slack.is_finite() || delta_slack <= 0.0 || delta_slack >= 1.0 {
        return Err(DpError::invalid("delta_slack must be in (0, 1)"));
    }

    let composed = |eps: f64| advanced_composition_epsilon(k, eps, delta_slack);

    let mut lo = 0.0;
    let mut hi = total_epsilon;
    let mut expansions = 0usize;
    while composed(hi) <= total_epsilon {
        if expansions >= MAX_BRACKET_EXPANSIONS {
            return Err(DpError::numerical("failed to bracket the per-level epsilon"));
        }
        lo = hi;
        hi *= 2.0;
        expansions += 1;
    }

    for _ in 0..MAX_BISECTION_ITERS {
        if hi - lo <= RELATIVE_TOLERANCE * hi {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if composed(mid) <= total_epsilon {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(lo)
}
