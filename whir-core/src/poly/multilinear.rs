//! Coefficient-form multilinear polynomials and the STIR leaf layout.
//!
//! Coefficient `c_j` multiplies `Π_{i ∈ bits(j)} X_i`, so evaluating the
//! polynomial at a point folds adjacent coefficient pairs one variable at a
//! time, starting with `X_0`.

use ark_ff::PrimeField;

use crate::utils::math::Math;

/// Evaluates `Σ_j c_j Π_{i ∈ bits(j)} x_i`.
pub fn evaluate_coefficients<F: PrimeField>(coeffs: &[F], point: &[F]) -> F {
    assert_eq!(coeffs.len(), point.len().pow2());
    let mut current = coeffs.to_vec();
    for x in point {
        current = current
            .chunks_exact(2)
            .map(|pair| pair[0] + *x * pair[1])
            .collect();
    }
    current[0]
}

/// `(z, z^2, z^4, ..., z^(2^(num_vars - 1)))`: the point at which a
/// multilinear polynomial agrees with its univariate reading `Σ_j c_j z^j`.
pub fn expand_point<F: PrimeField>(z: F, num_vars: usize) -> Vec<F> {
    let mut point = Vec::with_capacity(num_vars);
    let mut power = z;
    for _ in 0..num_vars {
        point.push(power);
        power.square_in_place();
    }
    point
}

/// Hypercube evaluations to coefficients (Möbius inversion).
pub fn evals_to_coeffs<F: PrimeField>(evals: &[F]) -> Vec<F> {
    let mut coeffs = evals.to_vec();
    let num_vars = coeffs.len().log_2();
    for i in 0..num_vars {
        let bit = i.pow2();
        for index in 0..coeffs.len() {
            if index & bit != 0 {
                let lower = coeffs[index ^ bit];
                coeffs[index] -= lower;
            }
        }
    }
    coeffs
}

/// Coefficients to hypercube evaluations.
pub fn coeffs_to_evals<F: PrimeField>(coeffs: &[F]) -> Vec<F> {
    let mut evals = coeffs.to_vec();
    let num_vars = evals.len().log_2();
    for i in 0..num_vars {
        let bit = i.pow2();
        for index in 0..evals.len() {
            if index & bit != 0 {
                let lower = evals[index ^ bit];
                evals[index] += lower;
            }
        }
    }
    evals
}

/// The leaf committed for folded-domain point `y`:
/// `leaf[lo] = Σ_hi c_{hi * 2^k + lo} y^hi` for `lo < 2^k`.
pub fn stir_leaf<F: PrimeField>(coeffs: &[F], folding_factor: usize, y: F) -> Vec<F> {
    let width = folding_factor.pow2();
    let mut leaf = vec![F::zero(); width];
    let mut y_power = F::one();
    for block in coeffs.chunks_exact(width) {
        for (slot, c) in leaf.iter_mut().zip(block) {
            *slot += *c * y_power;
        }
        y_power *= y;
    }
    leaf
}

/// Folds a leaf with the sumcheck randomness of its folding step. The result
/// is the folded polynomial's value at the leaf's domain point.
pub fn fold_leaf<F: PrimeField>(leaf: &[F], folding_randomness: &[F]) -> F {
    evaluate_coefficients(leaf, folding_randomness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::unipoly::evaluate_univariate;
    use ark_bn254::Fr;
    use ark_std::{test_rng, UniformRand};

    fn random_vec(len: usize) -> Vec<Fr> {
        let mut rng = test_rng();
        (0..len).map(|_| Fr::rand(&mut rng)).collect()
    }

    #[test]
    fn mobius_inverts() {
        let evals = random_vec(16);
        assert_eq!(coeffs_to_evals(&evals_to_coeffs(&evals)), evals);
    }

    #[test]
    fn coefficients_evaluate_like_evaluations_on_the_cube() {
        let coeffs = random_vec(8);
        let evals = coeffs_to_evals(&coeffs);
        for (index, eval) in evals.iter().enumerate() {
            let point: Vec<Fr> = (0..3).map(|i| Fr::from(((index >> i) & 1) as u64)).collect();
            assert_eq!(evaluate_coefficients(&coeffs, &point), *eval);
        }
    }

    #[test]
    fn expanded_point_matches_univariate_reading() {
        let coeffs = random_vec(16);
        let z = Fr::from(9u64);
        assert_eq!(
            evaluate_coefficients(&coeffs, &expand_point(z, 4)),
            evaluate_univariate(&coeffs, &z)
        );
    }

    #[test]
    fn fold_of_leaf_is_folded_polynomial_at_domain_point() {
        let coeffs = random_vec(16);
        let randomness = random_vec(2);
        let y = Fr::from(13u64);
        let leaf = stir_leaf(&coeffs, 2, y);

        // bind the two low variables, then read the rest as a univariate in y
        let folded: Vec<Fr> = coeffs
            .chunks_exact(4)
            .map(|block| evaluate_coefficients(block, &randomness))
            .collect();
        assert_eq!(fold_leaf(&leaf, &randomness), evaluate_univariate(&folded, &y));
    }

    #[test]
    fn fold_of_four_leaf_values() {
        // 1 + 5*2 + 7*3 + 35*4
        let leaf = [1u64, 2, 3, 4].map(Fr::from);
        let randomness = [Fr::from(5u64), Fr::from(7u64)];
        assert_eq!(fold_leaf(&leaf, &randomness), Fr::from(172u64));
    }
}
