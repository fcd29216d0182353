use ark_ff::PrimeField;

use crate::{
    poly::{eq_poly::EqPolynomial, multilinear::expand_point},
    r1cs::R1cs,
};

/// `coefficient · eq(expand(point), R[offset..])`: one batched OOD or STIR
/// constraint on the polynomial left after folding `offset` variables.
#[derive(Clone, Debug, PartialEq)]
pub struct EqTerm<F> {
    pub coefficient: F,
    pub point: F,
    pub offset: usize,
}

/// The weight polynomial `w` whose product with the committed polynomial the
/// WHIR sumchecks reduce. Besides the evaluation constraints it carries the
/// linear R1CS statement `Σ_k ρ_k Σ_{(row, col, v) ∈ M_k} v eq(α, row) eq(X, col)`.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightPolynomial<F> {
    pub eq_terms: Vec<EqTerm<F>>,
    /// Batching coefficients of `A`, `B` and `C`.
    pub linear_coefficients: Vec<F>,
}

impl<F: PrimeField> WeightPolynomial<F> {
    pub fn new(linear_coefficients: Vec<F>) -> Self {
        Self {
            eq_terms: Vec::new(),
            linear_coefficients,
        }
    }

    pub fn add_points(&mut self, coefficients: &[F], points: &[F], offset: usize) {
        self.eq_terms.extend(
            coefficients
                .iter()
                .zip(points)
                .map(|(coefficient, point)| EqTerm {
                    coefficient: *coefficient,
                    point: *point,
                    offset,
                }),
        );
    }

    /// `w(R)` for the full folding randomness `R` and the R1CS sumcheck
    /// randomness `α`.
    #[tracing::instrument(skip_all, name = "WeightPolynomial::evaluate")]
    pub fn evaluate(&self, randomness: &[F], alpha: &[F], r1cs: &R1cs<F>) -> F {
        let n_vars = randomness.len();
        let eq_terms: F = self
            .eq_terms
            .iter()
            .map(|term| {
                let point = expand_point(term.point, n_vars - term.offset);
                term.coefficient * EqPolynomial::new(point).evaluate(&randomness[term.offset..])
            })
            .sum();

        let row_weights = EqPolynomial::new(alpha.to_vec()).evals();
        let col_weights = EqPolynomial::new(randomness.to_vec()).evals();
        let linear: F = self
            .linear_coefficients
            .iter()
            .zip([&r1cs.a, &r1cs.b, &r1cs.c])
            .map(|(rho, matrix)| *rho * matrix.bilinear_form(&r1cs.interner, &row_weights, &col_weights))
            .sum();

        eq_terms + linear
    }
}
