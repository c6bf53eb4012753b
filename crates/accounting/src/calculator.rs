//! Derivation of per-statistic noise parameters from a global budget.

use dp_clustering_core::{
    laplace_scale, DifferentialPrivacyParam, DpError, GaussianCalibration, PrivacyBudgetSplit,
    Result,
};

use crate::composition::{CompositionRule, LevelBudget};

/// Each point changes a group count by at most one.
pub const COUNT_SENSITIVITY: f64 = 1.0;

/// Noise parameters for the Gaussian release of a sum of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AveragePrivacyParam {
    gaussian_std_dev: f64,
    sensitivity: f64,
}

impl AveragePrivacyParam {
    /// Wrap a pre-computed standard deviation and its L2 sensitivity.
    ///
    /// `gaussian_std_dev` may be `+inf`, meaning the sum cannot be released.
    pub fn new(gaussian_std_dev: f64, sensitivity: f64) -> Result<Self> {
        if gaussian_std_dev.is_nan() || gaussian_std_dev <= 0.0 {
            return Err(DpError::invalid("gaussian_std_dev must be positive"));
        }
        if !sensitivity.is_finite() || sensitivity <= 0.0 {
            return Err(DpError::invalid("sensitivity must be positive and finite"));
        }
        Ok(Self {
            gaussian_std_dev,
            sensitivity,
        })
    }

    /// Calibrate the Gaussian mechanism for one level's sum budget.
    ///
    /// Points lie in a ball of radius `radius`, so the sum has L2 sensitivity
    /// `radius`.
    pub fn from_level_budget(
        epsilon: f64,
        delta: f64,
        radius: f64,
        calibration: GaussianCalibration,
    ) -> Result<Self> {
        let sensitivity = radius;
        let gaussian_std_dev = calibration.std_dev(epsilon, delta, sensitivity)?;
        Self::new(gaussian_std_dev, sensitivity)
    }

    /// Standard deviation of the Gaussian noise added to the sum.
    pub fn gaussian_std_dev(&self) -> f64 {
        self.gaussian_std_dev
    }

    /// L2 sensitivity of the sum.
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }
}

/// Noise parameters for the Laplace release of a group count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CountPrivacyParam {
    laplace_param: f64,
}

impl CountPrivacyParam {
    /// Wrap a pre-computed Laplace scale.
    pub fn new(laplace_param: f64) -> Result<Self> {
        if !laplace_param.is_finite() || laplace_param <= 0.0 {
            return Err(DpError::invalid("laplace_param must be positive and finite"));
        }
        Ok(Self { laplace_param })
    }

    /// Calibrate the Laplace mechanism for one level's count budget.
    pub fn from_level_budget(epsilon: f64) -> Result<Self> {
        Self::new(laplace_scale(COUNT_SENSITIVITY, epsilon)?)
    }

    /// Scale of the Laplace noise added to counts.
    pub fn laplace_param(&self) -> f64 {
        self.laplace_param
    }
}

/// Configuration of the budget derivation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalculatorConfig {
    /// How the per-statistic budget is divided across tree levels.
    pub composition: CompositionRule,
    /// How the Gaussian std-dev is derived from `(epsilon, delta)`.
    pub calibration: GaussianCalibration,
}

impl CalculatorConfig {
    /// Set the composition rule.
    pub fn with_composition(mut self, composition: CompositionRule) -> Self {
        self.composition = composition;
        self
    }

    /// Set the Gaussian calibration.
    pub fn with_calibration(mut self, calibration: GaussianCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Validate parameters.
    pub fn validate(&self) -> Result<()> {
        self.composition.validate()
    }
}

/// Noise parameters for the two statistics released by a private coreset tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrivacyCalculator {
    average_privacy_param: AveragePrivacyParam,
    count_privacy_param: CountPrivacyParam,
}

impl PrivacyCalculator {
    /// Store pre-computed parameters verbatim.
    pub fn new(
        average_privacy_param: AveragePrivacyParam,
        count_privacy_param: CountPrivacyParam,
    ) -> Self {
        Self {
            average_privacy_param,
            count_privacy_param,
        }
    }

    /// Derive noise parameters with the default configuration
    /// (sequential composition, analytic Gaussian calibration).
    pub fn from_budget_split(
        privacy_param: &DifferentialPrivacyParam,
        budget_split: &PrivacyBudgetSplit,
        radius: f64,
        max_depth: usize,
    ) -> Result<Self> {
        Self::from_budget_split_with_config(
            privacy_param,
            budget_split,
            radius,
            max_depth,
            &CalculatorConfig::default(),
        )
    }

    /// Derive noise parameters under an explicit configuration.
    pub fn from_budget_split_with_config(
        privacy_param: &DifferentialPrivacyParam,
        budget_split: &PrivacyBudgetSplit,
        radius: f64,
        max_depth: usize,
        config: &CalculatorConfig,
    ) -> Result<Self> {
        privacy_param.validate()?;
        budget_split.validate()?;
        config.validate()?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(DpError::invalid("radius must be positive and finite"));
        }
        if max_depth == 0 {
            return Err(DpError::invalid("max_depth must be at least 1"));
        }

        let LevelBudget {
            sum_epsilon,
            sum_delta,
            count_epsilon,
        } = config
            .composition
            .allocate(privacy_param, budget_split, max_depth)?;
        tracing::debug!(
            epsilon = privacy_param.epsilon(),
            delta = privacy_param.delta(),
            max_depth,
            sum_epsilon,
            sum_delta,
            count_epsilon,
            "allocated per-level privacy budget"
        );

        if sum_delta == 0.0 {
            tracing::warn!("no delta left for the Gaussian sum; its std-dev is infinite");
        }

        let average_privacy_param = AveragePrivacyParam::from_level_budget(
            sum_epsilon,
            sum_delta,
            radius,
            config.calibration,
        )?;
        let count_privacy_param = CountPrivacyParam::from_level_budget(count_epsilon)?;
        tracing::debug!(
            gaussian_std_dev = average_privacy_param.gaussian_std_dev(),
            sensitivity = average_privacy_param.sensitivity(),
            laplace_param = count_privacy_param.laplace_param(),
            "calibrated noise parameters"
        );

        Ok(Self::new(average_privacy_param, count_privacy_param))
    }

    /// Parameters for the noisy sum.
    pub fn average_privacy_param(&self) -> &AveragePrivacyParam {
        &self.average_privacy_param
    }

    /// Parameters for the noisy counts.
    pub fn count_privacy_param(&self) -> &CountPrivacyParam {
        &self.count_privacy_param
    }

    /// Standard deviation of the Gaussian noise added to sums.
    pub fn gaussian_std_dev(&self) -> f64 {
        self.average_privacy_param.gaussian_std_dev()
    }

    /// L2 sensitivity of the sum.
    pub fn sensitivity(&self) -> f64 {
        self.average_privacy_param.sensitivity()
    }

    /// Scale of the Laplace noise added to counts.
    pub fn laplace_param(&self) -> f64 {
        self.count_privacy_param.laplace_param()
    }
}
