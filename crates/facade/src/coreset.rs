//! Configuration bundle consumed by the private coreset builder.

use dp_clustering_accounting::PrivacyCalculator;
use dp_clustering_core::{DpError, Result, TreeParam};

/// Noise parameters, tree shape and radius for one coreset construction.
///
/// The builder reads `pcalc` when it noises sums and counts at each node and
/// `tree_param` when it decides whether to branch or stop.
#[derive(Clone, Debug, PartialEq)]
pub struct CoresetParam {
    pcalc: PrivacyCalculator,
    tree_param: TreeParam,
    radius: f64,
    short_description: String,
}

impl CoresetParam {
    /// Bundle the parameters. `radius` must be positive and finite.
    pub fn new<S: Into<String>>(
        pcalc: PrivacyCalculator,
        tree_param: TreeParam,
        radius: f64,
        short_description: S,
    ) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(DpError::invalid("radius must be positive and finite"));
        }
        Ok(Self {
            pcalc,
            tree_param,
            radius,
            short_description: short_description.into(),
        })
    }

    /// Noise parameters.
    pub fn pcalc(&self) -> &PrivacyCalculator {
        &self.pcalc
    }

    /// Tree shape.
    pub fn tree_param(&self) -> &TreeParam {
        &self.tree_param
    }

    /// Radius of the ball containing every point.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Human-readable label.
    pub fn short_description(&self) -> &str {
        &self.short_description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_clustering_accounting::{AveragePrivacyParam, CountPrivacyParam};

    fn pcalc() -> PrivacyCalculator {
        PrivacyCalculator::new(
            AveragePrivacyParam::new(32.6, 6.4).expect("average"),
            CountPrivacyParam::new(0.8).expect("count"),
        )
    }

    #[test]
    fn test_fields_are_stored() {
        let tree = TreeParam::new(4, 2, 4).expect("tree");
        let param = CoresetParam::new(pcalc(), tree, 2.5, "label").expect("coreset param");
        assert_eq!(param.radius(), 2.5);
        assert_eq!(param.short_description(), "label");
        assert_eq!(param.tree_param().max_depth(), 4);
        assert_eq!(param.pcalc().laplace_param(), 0.8);
    }

    #[test]
    fn test_radius_must_be_positive() {
        let tree = TreeParam::new(4, 2, 4).expect("tree");
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = CoresetParam::new(pcalc(), tree, radius, "bad").unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }
}
