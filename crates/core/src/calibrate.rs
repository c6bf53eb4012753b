//! Noise calibration for the Gaussian and Laplace mechanisms.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::{DpError, Result};

const MAX_BRACKET_EXPANSIONS: usize = 200;
const MAX_BISECTION_ITERS: usize = 200;
const RELATIVE_TOLERANCE: f64 = 1e-12;
/// Below this point the standard normal CDF is evaluated by its asymptotic series.
const LN_CDF_ASYMPTOTIC_CUTOFF: f64 = -30.0;

/// Rule used to turn `(epsilon, delta)` into a Gaussian noise multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GaussianCalibration {
    /// Exact analytic Gaussian mechanism (Balle & Wang, 2018).
    #[default]
    Analytic,
    /// Classical bound `sqrt(2 ln(1.25 / delta)) / epsilon`, valid for `epsilon <= 1`.
    Classical,
}

impl GaussianCalibration {
    /// Noise multiplier for a unit-sensitivity query.
    pub fn noise_multiplier(&self, epsilon: f64, delta: f64) -> Result<f64> {
        match self {
            GaussianCalibration::Analytic => analytic_gaussian_sigma(epsilon, delta),
            GaussianCalibration::Classical => classical_gaussian_sigma(epsilon, delta),
        }
    }

    /// Standard deviation for a query with the given L2 sensitivity.
    pub fn std_dev(&self, epsilon: f64, delta: f64, sensitivity: f64) -> Result<f64> {
        if !sensitivity.is_finite() || sensitivity <= 0.0 {
            return Err(DpError::invalid("sensitivity must be positive and finite"));
        }
        let multiplier = self.noise_multiplier(epsilon, delta)?;
        let std_dev = multiplier * sensitivity;
        if multiplier.is_finite() && !std_dev.is_finite() {
            return Err(DpError::numerical(format!(
                "Gaussian std-dev overflows for sensitivity {sensitivity:e}"
            )));
        }
        Ok(std_dev)
    }
}

fn check_budget(epsilon: f64, delta: f64) -> Result<()> {
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(DpError::invalid("epsilon must be positive and finite"));
    }
    if !delta.is_finite() || !(0.0..1.0).contains(&delta) {
        return Err(DpError::invalid("delta must be in [0, 1)"));
    }
    Ok(())
}

/// Tight delta of a unit-sensitivity Gaussian mechanism with std-dev `sigma`.
pub fn gaussian_delta_for_sigma(sigma: f64, epsilon: f64, normal: &Normal) -> f64 {
    if !sigma.is_finite() || sigma <= 0.0 || !epsilon.is_finite() {
        return 1.0;
    }
    let term1 = normal.cdf(-epsilon * sigma + 1.0 / (2.0 * sigma));
    // e^eps * Phi(x) in log space: e^eps overflows past eps ~ 709.78 while
    // Phi(x) is still a nonzero subnormal.
    let ln_tail = normal_ln_cdf(-epsilon * sigma - 1.0 / (2.0 * sigma), normal);
    let term2 = (epsilon + ln_tail).exp();
    (term1 - term2).clamp(0.0, 1.0)
}

/// `ln Phi(x)` for the standard normal, accurate deep into the lower tail.
pub fn normal_ln_cdf(x: f64, normal: &Normal) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x > LN_CDF_ASYMPTOTIC_CUTOFF {
        return normal.cdf(x).ln();
    }
    if x == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    // Mills ratio series: Phi(x) ~ phi(x) / -x * (1 - 1/x^2 + 3/x^4 - 15/x^6 + 105/x^8).
    let z = 1.0 / (x * x);
    let series = 1.0 - z * (1.0 - 3.0 * z * (1.0 - 5.0 * z * (1.0 - 7.0 * z)));
    -0.5 * x * x - (-x).ln() - 0.5 * (2.0 * std::f64::consts::PI).ln() + series.ln()
}

/// Smallest sigma such that the Gaussian mechanism with unit sensitivity is
/// `(epsilon, delta)`-DP.
///
/// Returns `+inf` for `delta == 0`, since no finite Gaussian noise achieves
/// pure DP.
pub fn analytic_gaussian_sigma(epsilon: f64, delta: f64) -> Result<f64> {
    check_budget(epsilon, delta)?;
    if delta == 0.0 {
        return Ok(f64::INFINITY);
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| DpError::numerical(format!("standard normal: {e}")))?;

    let mut lo = 0.0;
    let mut hi = 1.0;
    let mut expansions = 0usize;
    while gaussian_delta_for_sigma(hi, epsilon, &normal) > delta {
        if expansions >= MAX_BRACKET_EXPANSIONS {
            return Err(DpError::numerical(
                "failed to bracket a Gaussian sigma achieving the target delta",
            ));
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
        if gaussian_delta_for_sigma(mid, epsilon, &normal) > delta {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(hi)
}

/// Classical Gaussian mechanism bound (Dwork & Roth, Theorem A.1).
pub fn classical_gaussian_sigma(epsilon: f64, delta: f64) -> Result<f64> {
    check_budget(epsilon, delta)?;
    if epsilon > 1.0 {
        return Err(DpError::unsupported("classical Gaussian bound requires epsilon <= 1"));
    }
    if delta == 0.0 {
        return Ok(f64::INFINITY);
    }
    let sigma = (2.0 * (1.25 / delta).ln()).sqrt() / epsilon;
    if !sigma.is_finite() {
        return Err(DpError::numerical(format!(
            "Gaussian sigma overflows for epsilon {epsilon:e}"
        )));
    }
    Ok(sigma)
}

/// Laplace scale `sensitivity / epsilon`.
pub fn laplace_scale(sensitivity: f64, epsilon: f64) -> Result<f64> {
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(DpError::invalid("epsilon must be positive and finite"));
    }
    if !sensitivity.is_finite() || sensitivity <= 0.0 {
        return Err(DpError::invalid("sensitivity must be positive and finite"));
    }
    let scale = sensitivity / epsilon;
    if !scale.is_finite() {
        return Err(DpError::numerical(format!(
            "Laplace scale overflows for epsilon {epsilon:e}"
        )));
    }
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rel_err(a: f64, b: f64) -> f64 {
        (a - b).abs() / b.abs()
    }

    #[test]
    fn analytic_matches_reference_values() {
        let cases = [
            (0.05, 0.0025, 23.706564926179478),
            (1.0, 1e-5, 3.730631634815938),
            (0.5, 1e-3, 4.610127950728139),
            (0.1, 0.005, 11.938441574154476),
        ];
        for (eps, delta, expected) in cases {
            let sigma = analytic_gaussian_sigma(eps, delta).expect("sigma");
            assert!(
                rel_err(sigma, expected) < 1e-8,
                "eps={eps} delta={delta}: got {sigma}, expected {expected}"
            );
        }
    }

    #[test]
    fn analytic_achieves_target_delta() {
        let normal = Normal::new(0.0, 1.0).expect("normal");
        let sigma = analytic_gaussian_sigma(0.3, 1e-6).expect("sigma");
        assert!(gaussian_delta_for_sigma(sigma, 0.3, &normal) <= 1e-6);
        assert!(gaussian_delta_for_sigma(sigma * 0.999, 0.3, &normal) > 1e-6);
    }

    #[test]
    fn analytic_is_tighter_than_classical() {
        let analytic = analytic_gaussian_sigma(0.5, 1e-5).expect("analytic");
        let classical = classical_gaussian_sigma(0.5, 1e-5).expect("classical");
        assert!(analytic < classical);
    }

    #[test]
    fn classical_closed_form() {
        let sigma = classical_gaussian_sigma(1.0, 1e-5).expect("sigma");
        let expected = (2.0 * (1.25_f64 / 1e-5).ln()).sqrt();
        assert!((sigma - expected).abs() < 1e-12);

        let err = classical_gaussian_sigma(2.0, 1e-5).unwrap_err();
        assert!(matches!(err, DpError::UnsupportedFeature { .. }));
    }

    #[test]
    fn zero_delta_gives_infinite_sigma() {
        assert_eq!(analytic_gaussian_sigma(1.0, 0.0), Ok(f64::INFINITY));
        assert_eq!(classical_gaussian_sigma(1.0, 0.0), Ok(f64::INFINITY));
    }

    #[test]
    fn large_epsilon_does_not_overflow() {
        let sigma = analytic_gaussian_sigma(800.0, 1e-5).expect("sigma");
        assert!(rel_err(sigma, 0.027789114082250792) < 1e-8);
    }

    #[test]
    fn analytic_stays_exact_past_exp_overflow() {
        // Reference values from a 50-digit bisection.
        let cases = [
            (709.0, 0.029711476552702901),
            (710.0, 0.029688223194158745),
            (720.0, 0.029458544092218331),
            (740.0, 0.029014181449599846),
        ];
        let normal = Normal::new(0.0, 1.0).expect("normal");
        let mut prev = f64::INFINITY;
        for (eps, expected) in cases {
            let sigma = analytic_gaussian_sigma(eps, 1e-5).expect("sigma");
            assert!(
                rel_err(sigma, expected) < 1e-8,
                "eps={eps}: got {sigma}, expected {expected}"
            );
            assert!(gaussian_delta_for_sigma(sigma * 0.999, eps, &normal) > 1e-5);
            assert!(sigma < prev);
            prev = sigma;
        }
    }

    #[test]
    fn ln_cdf_matches_direct_evaluation() {
        let normal = Normal::new(0.0, 1.0).expect("normal");
        for x in [-29.9, -10.0, -1.0, 0.0, 2.0] {
            assert!((normal_ln_cdf(x, &normal) - normal.cdf(x).ln()).abs() < 1e-12);
        }
        // ln Phi(-38) and ln Phi(-50) from a 50-digit evaluation.
        assert!(rel_err(normal_ln_cdf(-38.0, &normal), -726.5572160188201) < 1e-13);
        assert!(rel_err(normal_ln_cdf(-50.0, &normal), -1254.8313611394199) < 1e-13);
        let below = normal_ln_cdf(-30.0 - 1e-9, &normal);
        let above = normal_ln_cdf(-30.0 + 1e-9, &normal);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(analytic_gaussian_sigma(0.0, 1e-5).unwrap_err().is_invalid_argument());
        assert!(analytic_gaussian_sigma(1.0, -1e-5).unwrap_err().is_invalid_argument());
        assert!(laplace_scale(1.0, 0.0).unwrap_err().is_invalid_argument());
        assert!(GaussianCalibration::Analytic
            .std_dev(1.0, 1e-5, 0.0)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn laplace_scale_is_sensitivity_over_epsilon() {
        assert_eq!(laplace_scale(1.0, 0.2), Ok(5.0));
        assert_eq!(laplace_scale(3.0, 0.5), Ok(6.0));
    }

    #[test]
    fn laplace_scale_overflow_is_numerical() {
        let err = laplace_scale(1.0, 1e-310).unwrap_err();
        assert!(matches!(err, DpError::NumericalError { .. }));
    }

    #[test]
    fn std_dev_overflow_is_numerical() {
        let err = GaussianCalibration::Analytic.std_dev(0.05, 0.0025, 1e308).unwrap_err();
        assert!(matches!(err, DpError::NumericalError { .. }));
        let std_dev = GaussianCalibration::Analytic.std_dev(0.05, 0.0, 1.0).expect("std-dev");
        assert_eq!(std_dev, f64::INFINITY);
    }

    #[test]
    fn sigma_overflow_is_numerical() {
        let err = analytic_gaussian_sigma(1e-310, 1e-5).unwrap_err();
        assert!(matches!(err, DpError::NumericalError { .. }));
        let err = classical_gaussian_sigma(1e-310, 1e-5).unwrap_err();
        assert!(matches!(err, DpError::NumericalError { .. }));
    }

    proptest! {
        #[test]
        fn sigma_decreases_with_epsilon(
            eps_a in 0.01f64..5.0,
            eps_b in 0.01f64..5.0,
            delta in 1e-9f64..0.1,
        ) {
            prop_assume!((eps_a - eps_b).abs() > 1e-3);
            let low = eps_a.min(eps_b);
            let high = eps_a.max(eps_b);
            let s_low = analytic_gaussian_sigma(low, delta).expect("sigma");
            let s_high = analytic_gaussian_sigma(high, delta).expect("sigma");
            prop_assert!(s_high < s_low);
        }

        #[test]
        fn sigma_decreases_with_large_epsilon(
            eps_a in 600.0f64..2_000.0,
            eps_b in 600.0f64..2_000.0,
        ) {
            prop_assume!((eps_a - eps_b).abs() > 1.0);
            let s_low = analytic_gaussian_sigma(eps_a.min(eps_b), 1e-5).expect("sigma");
            let s_high = analytic_gaussian_sigma(eps_a.max(eps_b), 1e-5).expect("sigma");
            prop_assert!(s_high < s_low);
        }

        #[test]
        fn std_dev_scales_with_sensitivity(
            eps in 0.01f64..5.0,
            delta in 1e-9f64..0.1,
            sensitivity in 0.1f64..100.0,
        ) {
            let unit = GaussianCalibration::Analytic.std_dev(eps, delta, 1.0).expect("unit");
            let scaled = GaussianCalibration::Analytic
                .std_dev(eps, delta, sensitivity)
                .expect("scaled");
            prop_assert!(rel_err(scaled, unit * sensitivity) < 1e-12);
        }
    }
}
