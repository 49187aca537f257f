//! draws correlated binary attribute bitmasks from a linear-threshold model
//! over standard normals.

use crate::error::GameError;
use crate::rng::NormalGenerator;
use crate::{Attrs, MAX_ATTRS};

/// `(n, t, A)`: number of attributes, per-attribute thresholds, and the
/// `n x n` row-major linear-combination matrix.
#[derive(Debug, Clone)]
pub struct SamplerParams {
    pub n: usize,
    pub t: Vec<f64>,
    pub a: Vec<f64>,
}

impl SamplerParams {
    pub fn new(n: usize, t: Vec<f64>, a: Vec<f64>) -> Result<Self, GameError> {
        if n == 0 || n % 2 != 0 || n > MAX_ATTRS {
            return Err(GameError::InvalidArity(n));
        }
        if t.len() != n || a.len() != n * n {
            return Err(GameError::InvalidArity(n));
        }
        Ok(Self { n, t, a })
    }

    fn row(&self, i: usize) -> &[f64] {
        &self.a[i * self.n..(i + 1) * self.n]
    }
}

/// draw `n` standard normals via `n/2` Box-Muller calls, form the linear
/// combinations `s_i = sum_j A[i][j] x_j`, and set bit `i` iff `s_i > t_i`.
pub fn generate_attributes(rng: &NormalGenerator, params: &SamplerParams) -> Attrs {
    let mut x = vec![0.0f64; params.n];
    for pair in 0..params.n / 2 {
        let (a, b) = rng.get_normals();
        x[2 * pair] = a;
        x[2 * pair + 1] = b;
    }

    let mut mask: Attrs = 0;
    for i in 0..params.n {
        let row = params.row(i);
        let s: f64 = row.iter().zip(x.iter()).map(|(aij, xj)| aij * xj).sum();
        if s > params.t[i] {
            mask |= 1 << i;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Well1024a;

    fn params() -> SamplerParams {
        SamplerParams::new(2, vec![0.5, 0.2], vec![1.0, 0.0, -1.0, 1.0]).unwrap()
    }

    #[test]
    fn rejects_odd_n() {
        assert!(SamplerParams::new(3, vec![0.0; 3], vec![0.0; 9]).is_err());
    }

    #[test]
    fn rejects_zero_n() {
        assert!(SamplerParams::new(0, vec![], vec![]).is_err());
    }

    #[test]
    fn rejects_oversized_n() {
        assert!(SamplerParams::new(34, vec![0.0; 34], vec![0.0; 34 * 34]).is_err());
    }

    #[test]
    fn is_deterministic_given_same_seed() {
        let rng = NormalGenerator::new(Well1024a::seeded([7u32; 32]));
        let rng2 = NormalGenerator::new(Well1024a::seeded([7u32; 32]));
        let params = params();
        for _ in 0..32 {
            assert_eq!(
                generate_attributes(&rng, &params),
                generate_attributes(&rng2, &params)
            );
        }
    }

    #[test]
    fn bitmask_stays_within_n_bits() {
        let rng = NormalGenerator::new(Well1024a::seeded([42u32; 32]));
        let params = params();
        for _ in 0..1000 {
            let mask = generate_attributes(&rng, &params);
            assert_eq!(mask & !0b11, 0);
        }
    }
}
