//! closed-form marginal derivation and Monte Carlo correlation estimation
//! for a set of sampler parameters.

use crate::rng::NormalGenerator;
use crate::sampler::{generate_attributes, SamplerParams};

/// production sample count for correlation estimation, order 10^7 per the
/// reference's Monte Carlo magnitude.
pub const CORRELATION_SAMPLES_PRODUCTION: usize = 10_000_000;
/// small sample count for tests, fast enough to run in milliseconds.
pub const CORRELATION_SAMPLES_TEST: usize = 20_000;

/// `P(attribute i = 1)`, derived analytically: `s_i` is zero-mean normal with
/// variance `sigma^2 = sum_j A[i][j]^2`, so
/// `P(s_i > t_i) = 0.5 * (1 - erf(t_i / sqrt(2 sigma^2)))`.
pub fn marginals(params: &SamplerParams) -> Vec<f64> {
    (0..params.n)
        .map(|i| {
            let row = &params.a[i * params.n..(i + 1) * params.n];
            let sigma_sq: f64 = row.iter().map(|aij| aij * aij).sum();
            let z = params.t[i] / (2.0 * sigma_sq).sqrt();
            0.5 * (1.0 - libm::erf(z))
        })
        .collect()
}

/// row-major `n x n` Pearson correlation matrix, estimated by drawing
/// `samples` attribute masks and computing the sample covariance.
pub fn correlations(params: &SamplerParams, rng: &NormalGenerator, samples: usize) -> Vec<f64> {
    let n = params.n;
    let mut mean = vec![0.0f64; n];
    let mut draws = Vec::with_capacity(samples);

    for _ in 0..samples {
        let mask = generate_attributes(rng, params);
        draws.push(mask);
        for j in 0..n {
            if mask & (1 << j) != 0 {
                mean[j] += 1.0;
            }
        }
    }
    for m in mean.iter_mut() {
        *m /= samples as f64;
    }

    let mut q = vec![0.0f64; n * n];
    let mut vec = vec![0.0f64; n];
    for &mask in &draws {
        for j in 0..n {
            vec[j] = if mask & (1 << j) != 0 { 1.0 } else { 0.0 } - mean[j];
        }
        for j in 0..n {
            for k in 0..n {
                q[n * j + k] += vec[j] * vec[k];
            }
        }
    }
    let denom = (samples - 1) as f64;
    for v in q.iter_mut() {
        *v /= denom;
    }

    let mut corr = vec![0.0f64; n * n];
    for j in 0..n {
        for k in 0..n {
            corr[n * j + k] = q[n * j + k] / (q[n * j + j] * q[n * k + k]).sqrt();
        }
    }
    corr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Well1024a;

    fn params() -> SamplerParams {
        SamplerParams::new(2, vec![0.5, 0.2], vec![1.0, 0.0, -1.0, 1.0]).unwrap()
    }

    #[test]
    fn marginals_are_between_zero_and_one() {
        for p in marginals(&params()) {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn correlation_diagonal_is_one() {
        let rng = NormalGenerator::new(Well1024a::seeded([11u32; 32]));
        let corr = correlations(&params(), &rng, CORRELATION_SAMPLES_TEST);
        assert!((corr[0] - 1.0).abs() < 1e-9);
        assert!((corr[3] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn correlation_matrix_is_symmetric() {
        let rng = NormalGenerator::new(Well1024a::seeded([13u32; 32]));
        let corr = correlations(&params(), &rng, CORRELATION_SAMPLES_TEST);
        assert!((corr[1] - corr[2]).abs() < 1e-9);
    }

    #[test]
    fn empirical_marginal_converges_to_analytic() {
        let rng = NormalGenerator::new(Well1024a::seeded([17u32; 32]));
        let params = params();
        let analytic = marginals(&params);

        let n = params.n;
        let samples = 100_000;
        let mut counts = vec![0u32; n];
        for _ in 0..samples {
            let mask = generate_attributes(&rng, &params);
            for i in 0..n {
                if mask & (1 << i) != 0 {
                    counts[i] += 1;
                }
            }
        }
        for i in 0..n {
            let empirical = counts[i] as f64 / samples as f64;
            assert!(
                (empirical - analytic[i]).abs() < 0.01,
                "attr {}: empirical {} vs analytic {}",
                i,
                empirical,
                analytic[i]
            );
        }
    }
}
