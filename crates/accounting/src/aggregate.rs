//! Noisy aggregates released at the nodes of a private coreset tree.

use ndarray::{Array1, ArrayView2, Axis};
use rand::Rng;

use dp_clustering_core::{add_gaussian_noise, sample_laplace, DpError, Result};

use crate::calculator::{AveragePrivacyParam, CountPrivacyParam};

/// Laplace-noised count, rounded to the nearest integer.
///
/// The result may be negative; callers decide how to treat such nodes.
pub fn private_count<R: Rng + ?Sized>(
    nonprivate_count: u64,
    count_privacy_param: &CountPrivacyParam,
    rng: &mut R,
) -> i64 {
    let noise = sample_laplace(count_privacy_param.laplace_param(), rng);
    (nonprivate_count as f64 + noise).round() as i64
}

/// Gaussian-noised sum of `points` (one point per row) divided by a
/// previously released `private_count`.
pub fn private_average<R: Rng + ?Sized>(
    points: ArrayView2<'_, f64>,
    private_count: i64,
    average_privacy_param: &AveragePrivacyParam,
    rng: &mut R,
) -> Result<Array1<f64>> {
    if private_count <= 0 {
        return Err(DpError::invalid("private_count must be positive"));
    }
    let std_dev = average_privacy_param.gaussian_std_dev();
    if !std_dev.is_finite() {
        return Err(DpError::numerical("cannot release a sum with infinite Gaussian noise"));
    }

    let mut sum = points.sum_axis(Axis(0));
    add_gaussian_noise(&mut sum, std_dev, rng);
    Ok(sum / private_count as f64)
}
