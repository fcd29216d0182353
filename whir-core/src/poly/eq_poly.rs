use ark_ff::PrimeField;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::utils::math::Math;

/// `eq(r, x) = Π_i (r_i x_i + (1 - r_i)(1 - x_i))`.
///
/// Hypercube tables are indexed least-significant-bit first: bit `i` of the
/// index is the value of `x_i`.
pub struct EqPolynomial<F> {
    r: Vec<F>,
}

#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 16;

impl<F: PrimeField> EqPolynomial<F> {
    pub fn new(r: Vec<F>) -> Self {
        EqPolynomial { r }
    }

    pub fn evaluate(&self, x: &[F]) -> F {
        assert_eq!(self.r.len(), x.len());
        self.r
            .iter()
            .zip(x)
            .map(|(r_i, x_i)| *r_i * x_i + (F::one() - r_i) * (F::one() - x_i))
            .product()
    }

    /// `eq(r, b)` for every `b` in the hypercube.
    #[tracing::instrument(skip_all, name = "EqPolynomial::evals")]
    pub fn evals(&self) -> Vec<F> {
        let mut evals = vec![F::zero(); self.r.len().pow2()];
        evals[0] = F::one();
        for (j, r_j) in self.r.iter().enumerate() {
            let half = j.pow2();
            let (lo, hi) = evals.split_at_mut(half);
            Self::double(&mut lo[..], &mut hi[..half], *r_j);
        }
        evals
    }

    // Entries with bit `j` set take the `r_j` branch; the rest keep `1 - r_j`.
    #[cfg(feature = "parallel")]
    fn double(lo: &mut [F], hi: &mut [F], r_j: F) {
        if lo.len() >= PARALLEL_THRESHOLD.pow2() {
            lo.par_iter_mut().zip(hi.par_iter_mut()).for_each(|(x0, x1)| {
                *x1 = *x0 * r_j;
                *x0 -= *x1;
            });
        } else {
            Self::double_serial(lo, hi, r_j);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn double(lo: &mut [F], hi: &mut [F], r_j: F) {
        Self::double_serial(lo, hi, r_j);
    }

    fn double_serial(lo: &mut [F], hi: &mut [F], r_j: F) {
        for (x0, x1) in lo.iter_mut().zip(hi.iter_mut()) {
            *x1 = *x0 * r_j;
            *x0 -= *x1;
        }
    }
}
