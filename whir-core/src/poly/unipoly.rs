use ark_ff::{Field, PrimeField};

/// Horner evaluation of `Σ_i c_i x^i`.
pub fn evaluate_univariate<F: PrimeField>(coeffs: &[F], x: &F) -> F {
    coeffs
        .iter()
        .rev()
        .fold(F::zero(), |acc, c| acc * x + c)
}

/// How a sumcheck round polynomial is written to the transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPolynomial {
    /// Four coefficients of a cubic, used by the R1CS sumcheck.
    CubicCoefficients,
    /// Values at 0, 1 and 2 of a quadratic, used by the folding sumchecks.
    QuadraticEvaluations,
}

impl RoundPolynomial {
    pub fn num_values(&self) -> usize {
        match self {
            RoundPolynomial::CubicCoefficients => 4,
            RoundPolynomial::QuadraticEvaluations => 3,
        }
    }

    /// `p(0) + p(1)`.
    pub fn sum_over_boolean<F: PrimeField>(&self, values: &[F]) -> F {
        match self {
            RoundPolynomial::CubicCoefficients => values[0].double() + values[1] + values[2] + values[3],
            RoundPolynomial::QuadraticEvaluations => values[0] + values[1],
        }
    }

    pub fn evaluate<F: PrimeField>(&self, values: &[F], x: &F) -> F {
        match self {
            RoundPolynomial::CubicCoefficients => evaluate_univariate(values, x),
            RoundPolynomial::QuadraticEvaluations => {
                let [l0, l1, l2] = quadratic_lagrange_basis(x);
                values[0] * l0 + values[1] * l1 + values[2] * l2
            }
        }
    }
}

/// Lagrange basis over the nodes `0, 1, 2` evaluated at `x`.
pub fn quadratic_lagrange_basis<F: PrimeField>(x: &F) -> [F; 3] {
    let one = F::one();
    let two = one.double();
    let half = two.inverse().unwrap_or_default();
    [
        (*x - one) * (*x - two) * half,
        -(*x * (*x - two)),
        *x * (*x - one) * half,
    ]
}

/// Interpolates the cubic through `(0, e0), (1, e1), (2, e2), (3, e3)` and
/// returns its coefficients.
pub fn cubic_from_evals<F: PrimeField>(evals: &[F; 4]) -> [F; 4] {
    // Newton forward differences
    let d1 = [evals[1] - evals[0], evals[2] - evals[1], evals[3] - evals[2]];
    let d2 = [d1[1] - d1[0], d1[2] - d1[1]];
    let d3 = d2[1] - d2[0];

    let two_inv = F::from(2u64).inverse().unwrap_or_default();
    let six_inv = F::from(6u64).inverse().unwrap_or_default();
    let a = d3 * six_inv;
    let b = d2[0] * two_inv;

    // f(x) = e0 + d1 x + b x(x-1) + a x(x-1)(x-2)
    [
        evals[0],
        d1[0] - b + a.double(),
        b - a * F::from(3u64),
        a,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    #[test]
    fn horner() {
        // 1 + 2x + 3x^2 at 2
        let coeffs = [1u64, 2, 3].map(Fr::from);
        assert_eq!(evaluate_univariate(&coeffs, &Fr::from(2u64)), Fr::from(17u64));
    }

    #[test]
    fn quadratic_through_three_points() {
        // p(x) = x^2 + 1
        let values = [1u64, 2, 5].map(Fr::from);
        let form = RoundPolynomial::QuadraticEvaluations;
        assert_eq!(form.sum_over_boolean(&values), Fr::from(3u64));
        assert_eq!(form.evaluate(&values, &Fr::from(7u64)), Fr::from(50u64));
    }

    #[test]
    fn cubic_interpolation() {
        let coeffs = [4u64, 3, 2, 1].map(Fr::from);
        let evals = [0u64, 1, 2, 3].map(|x| evaluate_univariate(&coeffs, &Fr::from(x)));
        assert_eq!(cubic_from_evals(&evals), coeffs);
        let form = RoundPolynomial::CubicCoefficients;
        assert_eq!(form.sum_over_boolean(&coeffs), evals[0] + evals[1]);
    }
}
