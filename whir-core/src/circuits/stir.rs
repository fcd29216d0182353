//! STIR query gadgets: domain points of the queried leaves, leaf folding and
//! the final consistency check against the plain final polynomial.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;

use super::poly::{evaluate_coefficients, evaluate_univariate, pow_constant_base};
use crate::protocol::TreeSchedule;

/// `g^index` on the folded domain of `tree` for every query.
pub fn stir_points<F: PrimeField>(tree: &TreeSchedule<F>, index_bits: &[Vec<Boolean<F>>]) -> Vec<FpVar<F>> {
    index_bits
        .iter()
        .map(|bits| pow_constant_base(tree.folded_generator, bits))
        .collect()
}

/// Folds every opened leaf with the randomness of its folding step.
pub fn compute_folds<F: PrimeField>(
    leaves: &[Vec<FpVar<F>>],
    folding_randomness: &[FpVar<F>],
) -> Result<Vec<FpVar<F>>, SynthesisError> {
    leaves
        .iter()
        .map(|leaf| evaluate_coefficients(leaf, folding_randomness))
        .collect()
}

/// Every final fold must agree with the final polynomial at its point.
pub fn enforce_final_folds<F: PrimeField>(
    folds: &[FpVar<F>],
    final_coefficients: &[FpVar<F>],
    points: &[FpVar<F>],
) -> Result<(), SynthesisError> {
    if folds.len() != points.len() {
        return Err(SynthesisError::Unsatisfiable);
    }
    for (fold, point) in folds.iter().zip(points) {
        fold.enforce_equal(&evaluate_univariate(final_coefficients, point))?;
    }
    Ok(())
}
