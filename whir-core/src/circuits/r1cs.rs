//! The weight polynomial and the two closing identities of the verifier.
//!
//! `w(R)` combines the batched OOD/STIR equality terms with the linear R1CS
//! statement `Σ_k ρ_k Σ_{(row, col, v) ∈ M_k} v eq(α, row) eq(R, col)`. Matrix
//! coefficients are constants, so each row costs one multiplication.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;

use super::poly::{eq_polynomial, eq_table, evaluate_coefficients, expand_point};
use crate::r1cs::{Interner, R1cs, SparseMatrix};

#[derive(Clone)]
pub struct EqTermVar<F: PrimeField> {
    pub coefficient: FpVar<F>,
    pub point: FpVar<F>,
    pub offset: usize,
}

#[derive(Clone)]
pub struct WeightPolynomialVar<F: PrimeField> {
    pub eq_terms: Vec<EqTermVar<F>>,
    pub linear_coefficients: Vec<FpVar<F>>,
}

impl<F: PrimeField> WeightPolynomialVar<F> {
    pub fn new(linear_coefficients: Vec<FpVar<F>>) -> Self {
        Self {
            eq_terms: Vec::new(),
            linear_coefficients,
        }
    }

    pub fn add_points(&mut self, coefficients: &[FpVar<F>], points: &[FpVar<F>], offset: usize) {
        self.eq_terms.extend(
            coefficients
                .iter()
                .zip(points)
                .map(|(coefficient, point)| EqTermVar {
                    coefficient: coefficient.clone(),
                    point: point.clone(),
                    offset,
                }),
        );
    }

    /// `w(R)` for the full folding randomness `R` and the R1CS sumcheck
    /// randomness `α`.
    #[tracing::instrument(skip_all, name = "WeightPolynomialVar::evaluate")]
    pub fn evaluate(
        &self,
        randomness: &[FpVar<F>],
        alpha: &[FpVar<F>],
        r1cs: &R1cs<F>,
    ) -> Result<FpVar<F>, SynthesisError> {
        let n_vars = randomness.len();
        let mut acc = FpVar::zero();
        for term in &self.eq_terms {
            let point = expand_point(&term.point, n_vars - term.offset)?;
            acc += &term.coefficient * eq_polynomial(&point, &randomness[term.offset..]);
        }

        let row_weights = eq_table(alpha);
        let col_weights = eq_table(randomness);
        for (rho, matrix) in self.linear_coefficients.iter().zip([&r1cs.a, &r1cs.b, &r1cs.c]) {
            acc += rho * bilinear_form(matrix, &r1cs.interner, &row_weights, &col_weights)?;
        }
        Ok(acc)
    }
}

/// `Σ_{(row, col, v)} v · row_weights[row] · col_weights[col]`.
pub fn bilinear_form<F: PrimeField>(
    matrix: &SparseMatrix,
    interner: &Interner<F>,
    row_weights: &[FpVar<F>],
    col_weights: &[FpVar<F>],
) -> Result<FpVar<F>, SynthesisError> {
    let mut acc = FpVar::zero();
    for row in 0..matrix.num_rows {
        let mut inner = FpVar::zero();
        for (col, value) in matrix.row(row) {
            let (Some(v), Some(weight)) = (interner.get(value), col_weights.get(col)) else {
                return Err(SynthesisError::Unsatisfiable);
            };
            inner += weight * v;
        }
        let row_weight = row_weights.get(row).ok_or(SynthesisError::Unsatisfiable)?;
        acc += inner * row_weight;
    }
    Ok(acc)
}

/// `claim == w(R) · f_final(R_final)`.
pub fn enforce_final_identity<F: PrimeField>(
    claim: &FpVar<F>,
    weight: &FpVar<F>,
    final_coefficients: &[FpVar<F>],
    final_randomness: &[FpVar<F>],
) -> Result<(), SynthesisError> {
    let final_value = evaluate_coefficients(final_coefficients, final_randomness)?;
    claim.enforce_equal(&(weight * final_value))
}

/// `(L0 L1 - L2) eq(α, t) == claim`, closing the R1CS sumcheck.
pub fn enforce_statement_identity<F: PrimeField>(
    statement: &[FpVar<F>],
    alpha: &[FpVar<F>],
    t: &[FpVar<F>],
    claim: &FpVar<F>,
) -> Result<(), SynthesisError> {
    let [l0, l1, l2] = statement else {
        return Err(SynthesisError::Unsatisfiable);
    };
    let lhs = (l0 * l1 - l2) * eq_polynomial(alpha, t);
    lhs.enforce_equal(claim)
}
