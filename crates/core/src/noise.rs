//! Noise sampling for the Gaussian and Laplace mechanisms.

use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal};

/// Add i.i.d. Gaussian noise to a vector in-place.
///
/// A non-finite or non-positive `sigma` leaves the vector untouched.
pub fn add_gaussian_noise<R: Rng + ?Sized>(values: &mut Array1<f64>, sigma: f64, rng: &mut R) {
    if !sigma.is_finite() || sigma <= 0.0 || values.is_empty() {
        return;
    }

    let dist = match Normal::new(0.0, sigma) {
        Ok(d) => d,
        Err(_) => return,
    };

    values.mapv_inplace(|x| x + dist.sample(rng));
}

/// Draw one sample from a zero-mean Laplace distribution.
///
/// Returns `0.0` for a non-finite or non-positive `scale`.
pub fn sample_laplace<R: Rng + ?Sized>(scale: f64, rng: &mut R) -> f64 {
    if !scale.is_finite() || scale <= 0.0 {
        return 0.0;
    }

    // Laplace noise can be sampled as the difference of two exponentials.
    let dist = match Exp::new(1.0 / scale) {
        Ok(d) => d,
        Err(_) => return 0.0,
    };
    dist.sample(rng) - dist.sample(rng)
}
