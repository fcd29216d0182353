//! Polynomial gadgets mirroring [`crate::poly`].

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;

/// Evaluate univariate polynomial: Σ c_i * x^i
pub fn evaluate_univariate<F: PrimeField>(coeffs: &[FpVar<F>], x: &FpVar<F>) -> FpVar<F> {
    coeffs
        .iter()
        .rev()
        .fold(FpVar::zero(), |acc, c| acc * x + c)
}

/// Coefficient-form multilinear evaluation, folding `X_0` first.
pub fn evaluate_coefficients<F: PrimeField>(
    coeffs: &[FpVar<F>],
    point: &[FpVar<F>],
) -> Result<FpVar<F>, SynthesisError> {
    if coeffs.len() != 1 << point.len() {
        return Err(SynthesisError::Unsatisfiable);
    }
    let mut current = coeffs.to_vec();
    for x in point {
        current = current
            .chunks(2)
            .map(|pair| &pair[0] + x * &pair[1])
            .collect();
    }
    Ok(current.swap_remove(0))
}

/// `(z, z^2, ..., z^(2^(num_vars - 1)))`.
pub fn expand_point<F: PrimeField>(
    z: &FpVar<F>,
    num_vars: usize,
) -> Result<Vec<FpVar<F>>, SynthesisError> {
    let mut point = Vec::with_capacity(num_vars);
    let mut power = z.clone();
    for _ in 0..num_vars {
        let next = power.square()?;
        point.push(power);
        power = next;
    }
    Ok(point)
}

/// eq(x, y) = Π_i (x_i y_i + (1 - x_i)(1 - y_i)) = Π_i (2 x_i y_i - x_i - y_i + 1)
pub fn eq_polynomial<F: PrimeField>(x: &[FpVar<F>], y: &[FpVar<F>]) -> FpVar<F> {
    x.iter()
        .zip(y)
        .fold(FpVar::one(), |acc, (x_i, y_i)| {
            let xy = x_i * y_i;
            acc * (&xy + &xy - x_i - y_i + F::one())
        })
}

/// `eq(r, b)` for every `b` in the hypercube, least significant bit first.
pub fn eq_table<F: PrimeField>(r: &[FpVar<F>]) -> Vec<FpVar<F>> {
    let mut table = vec![FpVar::one()];
    for r_j in r {
        let hi: Vec<FpVar<F>> = table.iter().map(|x| x * r_j).collect();
        for (lo, hi) in table.iter_mut().zip(&hi) {
            *lo -= hi;
        }
        table.extend(hi);
    }
    table
}

/// `g^n` for a constant `g`, with `n` given by its little-endian bits:
/// `Π_i (1 + bit_i (g^(2^i) - 1))`.
pub fn pow_constant_base<F: PrimeField>(base: F, bits: &[Boolean<F>]) -> FpVar<F> {
    let mut acc = FpVar::one();
    let mut power = base;
    for bit in bits {
        acc *= FpVar::from(bit.clone()) * (power - F::one()) + F::one();
        power.square_in_place();
    }
    acc
}

/// `1, γ, γ^2, ...`.
pub fn powers<F: PrimeField>(gamma: &FpVar<F>, count: usize) -> Vec<FpVar<F>> {
    std::iter::successors(Some(FpVar::one()), |power| Some(power * gamma))
        .take(count)
        .collect()
}

pub fn dot<F: PrimeField>(a: &[FpVar<F>], b: &[FpVar<F>]) -> FpVar<F> {
    a.iter()
        .zip(b)
        .fold(FpVar::zero(), |acc, (x, y)| acc + x * y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::{eq_poly::EqPolynomial, multilinear, unipoly};
    use ark_bn254::Fr;
    use ark_ff::{FftField, Field, UniformRand};
    use ark_relations::r1cs::{ConstraintSystem, ConstraintSystemRef};
    use ark_std::test_rng;

    fn witnesses(cs: &ConstraintSystemRef<Fr>, values: &[Fr]) -> Vec<FpVar<Fr>> {
        values
            .iter()
            .map(|v| FpVar::new_witness(cs.clone(), || Ok(*v)).unwrap())
            .collect()
    }

    #[test]
    fn evaluations_match_native() {
        let mut rng = test_rng();
        let cs = ConstraintSystem::<Fr>::new_ref();
        let coeffs: Vec<Fr> = (0..8).map(|_| Fr::rand(&mut rng)).collect();
        let point: Vec<Fr> = (0..3).map(|_| Fr::rand(&mut rng)).collect();
        let z = Fr::rand(&mut rng);
        let (coeffs_var, point_var) = (witnesses(&cs, &coeffs), witnesses(&cs, &point));
        let z_var = witnesses(&cs, &[z]).remove(0);

        assert_eq!(
            evaluate_univariate(&coeffs_var, &z_var).value().unwrap(),
            unipoly::evaluate_univariate(&coeffs, &z)
        );
        assert_eq!(
            evaluate_coefficients(&coeffs_var, &point_var).unwrap().value().unwrap(),
            multilinear::evaluate_coefficients(&coeffs, &point)
        );
        let expanded: Vec<Fr> = expand_point(&z_var, 3)
            .unwrap()
            .iter()
            .map(|x| x.value().unwrap())
            .collect();
        assert_eq!(expanded, multilinear::expand_point(z, 3));
        assert!(evaluate_coefficients(&coeffs_var, &point_var[..2]).is_err());
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn eq_gadgets_match_native() {
        let mut rng = test_rng();
        let cs = ConstraintSystem::<Fr>::new_ref();
        let r: Vec<Fr> = (0..4).map(|_| Fr::rand(&mut rng)).collect();
        let x: Vec<Fr> = (0..4).map(|_| Fr::rand(&mut rng)).collect();
        let (r_var, x_var) = (witnesses(&cs, &r), witnesses(&cs, &x));

        let eq = EqPolynomial::new(r.clone());
        assert_eq!(eq_polynomial(&r_var, &x_var).value().unwrap(), eq.evaluate(&x));
        let table: Vec<Fr> = eq_table(&r_var).iter().map(|e| e.value().unwrap()).collect();
        assert_eq!(table, eq.evals());
    }

    #[test]
    fn constant_base_power_selects_bits() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let g = Fr::get_root_of_unity(1 << 10).unwrap();
        let bits: Vec<Boolean<Fr>> = (0..10)
            .map(|i| Boolean::new_witness(cs.clone(), || Ok((613 >> i) & 1 == 1)).unwrap())
            .collect();
        assert_eq!(pow_constant_base(g, &bits).value().unwrap(), g.pow([613u64]));
        assert!(cs.is_satisfied().unwrap());
    }
}
