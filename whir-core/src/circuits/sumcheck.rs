//! Sumcheck verification in the circuit.
//!
//! Each round reads a round polynomial from the transcript, enforces
//! `p(0) + p(1)` against the running claim, squeezes the round challenge
//! and moves the claim to `p(r)`.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;

use super::{poly::evaluate_univariate, transcript::TranscriptVar};
use crate::poly::unipoly::RoundPolynomial;

pub struct SumcheckOutcomeVar<F: PrimeField> {
    pub randomness: Vec<FpVar<F>>,
    pub claim: FpVar<F>,
}

/// `p(0) + p(1)` for a round polynomial in the given form.
pub fn sum_over_boolean<F: PrimeField>(form: RoundPolynomial, values: &[FpVar<F>]) -> FpVar<F> {
    match form {
        RoundPolynomial::CubicCoefficients => {
            &values[0] + &values[0] + &values[1] + &values[2] + &values[3]
        }
        RoundPolynomial::QuadraticEvaluations => &values[0] + &values[1],
    }
}

pub fn evaluate_round<F: PrimeField>(
    form: RoundPolynomial,
    values: &[FpVar<F>],
    x: &FpVar<F>,
) -> FpVar<F> {
    match form {
        RoundPolynomial::CubicCoefficients => evaluate_univariate(values, x),
        RoundPolynomial::QuadraticEvaluations => {
            // Lagrange basis over 0, 1, 2
            let half = F::from(2u64).inverse().unwrap_or_default();
            let x_minus_one = x - F::one();
            let x_minus_two = x - F::from(2u64);
            let l0 = &x_minus_one * &x_minus_two * half;
            let l1 = (x * &x_minus_two) * -F::one();
            let l2 = x * &x_minus_one * half;
            l0 * &values[0] + l1 * &values[1] + l2 * &values[2]
        }
    }
}

/// Runs `rounds` sumcheck rounds from `claim`.
pub fn verify_sumcheck<F: PrimeField>(
    transcript: &mut TranscriptVar<F>,
    form: RoundPolynomial,
    rounds: usize,
    claim: FpVar<F>,
) -> Result<SumcheckOutcomeVar<F>, SynthesisError> {
    let mut claim = claim;
    let mut randomness = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let values = transcript.next_scalars(form.num_values())?;
        sum_over_boolean(form, &values).enforce_equal(&claim)?;
        let r = transcript.challenge_scalars(1).remove(0);
        claim = evaluate_round(form, &values, &r);
        randomness.push(r);
    }
    Ok(SumcheckOutcomeVar { randomness, claim })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        circuits::bytes::input_bytes,
        poly::unipoly::cubic_from_evals,
        protocol::verifier::verify_sumcheck as native_verify_sumcheck,
        transcript::{ProverTranscript, VerifierTranscript},
    };
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem;

    // Proves Σ_b f(b) for f = x0 * x1 * x2 with cubic rounds; the table is
    // bound one variable at a time.
    fn prove_cubic(claim_offset: u64) -> (Vec<u8>, Fr) {
        let mut table: Vec<Fr> = (0..8u64).map(|b| Fr::from(u64::from(b == 7))).collect();
        let claim: Fr = table.iter().sum();
        let mut ts = ProverTranscript::<Fr>::new(b"sumcheck");
        for _ in 0..3 {
            let half = table.len() / 2;
            let evals: [Fr; 4] = core::array::from_fn(|x| {
                let x = Fr::from(x as u64);
                (0..half)
                    .map(|j| table[2 * j] + x * (table[2 * j + 1] - table[2 * j]))
                    .sum()
            });
            let mut coeffs = cubic_from_evals(&evals);
            coeffs[0] += Fr::from(claim_offset);
            ts.add_scalars(&coeffs);
            let r = ts.challenge_scalars(1)[0];
            table = (0..half)
                .map(|j| table[2 * j] + r * (table[2 * j + 1] - table[2 * j]))
                .collect();
        }
        (ts.finish(), claim)
    }

    fn run(narg: &[u8], claim: Fr) -> (bool, Fr, Vec<Fr>) {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let bytes = input_bytes(cs.clone(), narg).unwrap();
        let mut ts = TranscriptVar::new(b"sumcheck", bytes);
        let claim_var = FpVar::new_witness(cs.clone(), || Ok(claim)).unwrap();
        let outcome =
            verify_sumcheck(&mut ts, RoundPolynomial::CubicCoefficients, 3, claim_var).unwrap();
        ts.finish().unwrap();
        (
            cs.is_satisfied().unwrap(),
            outcome.claim.value().unwrap(),
            outcome.randomness.iter().map(|r| r.value().unwrap()).collect(),
        )
    }

    #[test]
    fn honest_rounds_match_native_verifier() {
        let (narg, claim) = prove_cubic(0);
        let (satisfied, final_claim, randomness) = run(&narg, claim);
        assert!(satisfied);

        let mut native = VerifierTranscript::<Fr>::new(b"sumcheck", &narg);
        let outcome =
            native_verify_sumcheck(&mut native, RoundPolynomial::CubicCoefficients, 3, claim)
                .unwrap();
        assert_eq!(final_claim, outcome.claim);
        assert_eq!(randomness, outcome.randomness);
    }

    #[test]
    fn wrong_round_polynomial_is_unsatisfiable() {
        let (narg, claim) = prove_cubic(1);
        let (satisfied, _, _) = run(&narg, claim);
        assert!(!satisfied);
    }

    #[test]
    fn quadratic_form_interpolates() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        // p(x) = x^2 + 1 takes 1, 2, 5 on 0, 1, 2
        let values: Vec<FpVar<Fr>> = [1u64, 2, 5]
            .iter()
            .map(|v| FpVar::new_witness(cs.clone(), || Ok(Fr::from(*v))).unwrap())
            .collect();
        let x = FpVar::new_witness(cs.clone(), || Ok(Fr::from(7u64))).unwrap();
        let form = RoundPolynomial::QuadraticEvaluations;
        assert_eq!(evaluate_round(form, &values, &x).value().unwrap(), Fr::from(50u64));
        assert_eq!(sum_over_boolean(form, &values).value().unwrap(), Fr::from(3u64));
    }
}
