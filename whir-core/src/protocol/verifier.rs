//! Native WHIR/R1CS verifier. It reads the transcript in exactly the order
//! the circuit does and serves as the reference the gadgets are tested
//! against.

use ark_ff::PrimeField;
use common::proof::KeccakDigest;

use super::{ProtocolSchedule, TreeSchedule, WeightPolynomial, NUM_STATEMENT_EVALUATIONS};
use crate::{
    merkle::{compute_root, hash_leaf, QueryOpening},
    poly::{
        eq_poly::EqPolynomial,
        multilinear::{evaluate_coefficients, fold_leaf},
        unipoly::{evaluate_univariate, RoundPolynomial},
    },
    r1cs::R1cs,
    transcript::{powers, VerifierTranscript},
    utils::errors::ProofVerifyError,
};

/// Randomness drawn by a sumcheck and the claim it reduces to.
pub struct SumcheckOutcome<F> {
    pub randomness: Vec<F>,
    pub claim: F,
}

pub fn verify_sumcheck<F: PrimeField>(
    transcript: &mut VerifierTranscript<F>,
    form: RoundPolynomial,
    num_rounds: usize,
    initial_claim: F,
) -> Result<SumcheckOutcome<F>, ProofVerifyError> {
    let mut claim = initial_claim;
    let mut randomness = Vec::with_capacity(num_rounds);
    for round in 0..num_rounds {
        let values = transcript.next_scalars(form.num_values())?;
        if form.sum_over_boolean(&values) != claim {
            return Err(ProofVerifyError::SumcheckVerificationError(round));
        }
        let r = transcript.challenge_scalars(1)[0];
        claim = form.evaluate(&values, &r);
        randomness.push(r);
    }
    Ok(SumcheckOutcome { randomness, claim })
}

/// Checks the openings of tree `tree_index` at the transcript-derived
/// `indices` and folds every opened leaf.
fn open_and_fold<F: PrimeField>(
    tree_index: usize,
    tree: &TreeSchedule<F>,
    root: &KeccakDigest,
    opening: &QueryOpening<F>,
    indices: &[usize],
    folding_randomness: &[F],
) -> Result<Vec<F>, ProofVerifyError> {
    let mut folds = Vec::with_capacity(indices.len());
    for (query, index) in indices.iter().enumerate() {
        let (Some(claimed), Some(leaf), Some(chain)) = (
            opening.leaf_indexes.get(query),
            opening.leaves.get(query),
            opening.sibling_chains.get(query),
        ) else {
            return Err(ProofVerifyError::QueryIndexMismatch {
                tree: tree_index,
                query,
            });
        };
        if claimed != index {
            return Err(ProofVerifyError::QueryIndexMismatch {
                tree: tree_index,
                query,
            });
        }
        if leaf.len() != tree.leaf_size() || compute_root(hash_leaf(leaf), *index, chain) != *root {
            return Err(ProofVerifyError::MerkleRootMismatch {
                tree: tree_index,
                query,
            });
        }
        folds.push(fold_leaf(leaf, folding_randomness));
    }
    Ok(folds)
}

fn stir_points<F: PrimeField>(tree: &TreeSchedule<F>, indices: &[usize]) -> Vec<F> {
    indices
        .iter()
        .map(|index| tree.folded_generator.pow([*index as u64]))
        .collect()
}

fn dot<F: PrimeField>(a: &[F], b: &[F]) -> F {
    a.iter().zip(b).map(|(x, y)| *x * y).sum()
}

/// Verifies a WHIR proof of the R1CS statement `(L0, L1, L2)` natively.
#[tracing::instrument(skip_all, name = "verify_native")]
pub fn verify_native<F: PrimeField>(
    schedule: &ProtocolSchedule<F>,
    r1cs: &R1cs<F>,
    transcript: &[u8],
    statement: &[F; NUM_STATEMENT_EVALUATIONS],
    openings: &[QueryOpening<F>],
) -> Result<(), ProofVerifyError> {
    let mut ts = VerifierTranscript::<F>::new(&schedule.io_pattern, transcript);
    let mut roots = vec![ts.next_digest()?];
    let ood_points = ts.challenge_scalars(schedule.commitment_ood_samples);
    let ood_answers = ts.next_scalars(schedule.commitment_ood_samples)?;

    // R1CS sumcheck of eq(t, x) (Az(x) Bz(x) - Cz(x)) over the constraints
    let t = ts.challenge_scalars(schedule.log_num_constraints);
    let r1cs_sumcheck = verify_sumcheck(
        &mut ts,
        RoundPolynomial::CubicCoefficients,
        schedule.log_num_constraints,
        F::zero(),
    )?;
    let alpha = r1cs_sumcheck.randomness;

    let gamma = ts.challenge_scalars(1)[0];
    let rho = powers(gamma, ood_answers.len() + NUM_STATEMENT_EVALUATIONS);
    let (ood_rho, linear_rho) = rho.split_at(ood_answers.len());
    let mut weights = WeightPolynomial::new(linear_rho.to_vec());
    weights.add_points(ood_rho, &ood_points, 0);
    let claim = dot(ood_rho, &ood_answers) + dot(linear_rho, statement);

    let mut sumcheck = verify_sumcheck(
        &mut ts,
        RoundPolynomial::QuadraticEvaluations,
        schedule.folding_factors[0],
        claim,
    )?;
    let mut total_randomness = sumcheck.randomness.clone();

    for (r, round) in schedule.rounds.iter().enumerate() {
        let tree = &schedule.trees[r];
        roots.push(ts.next_digest()?);
        let ood_points = ts.challenge_scalars(round.ood_samples);
        let ood_answers = ts.next_scalars(round.ood_samples)?;
        let indices = ts.challenge_indices(round.num_queries, tree.height);
        let opening = openings.get(r).ok_or(ProofVerifyError::MissingOpening(r))?;
        let folds = open_and_fold(r, tree, &roots[r], opening, &indices, &sumcheck.randomness)?;
        ts.check_pow(round.pow_bits)?;

        let gamma = ts.challenge_scalars(1)[0];
        let rho = powers(gamma, round.ood_samples + round.num_queries);
        let points: Vec<F> = ood_points.into_iter().chain(stir_points(tree, &indices)).collect();
        let values: Vec<F> = ood_answers.into_iter().chain(folds).collect();
        weights.add_points(&rho, &points, schedule.folded_vars_at_round(r));

        sumcheck = verify_sumcheck(
            &mut ts,
            RoundPolynomial::QuadraticEvaluations,
            schedule.folding_factors[r + 1],
            sumcheck.claim + dot(&rho, &values),
        )?;
        total_randomness.extend_from_slice(&sumcheck.randomness);
    }

    let n_rounds = schedule.n_rounds();
    let final_tree = &schedule.trees[n_rounds];
    let final_coefficients = ts.next_scalars(schedule.num_final_coefficients())?;
    let indices = ts.challenge_indices(schedule.final_queries, final_tree.height);
    let opening = openings
        .get(n_rounds)
        .ok_or(ProofVerifyError::MissingOpening(n_rounds))?;
    let folds = open_and_fold(
        n_rounds,
        final_tree,
        &roots[n_rounds],
        opening,
        &indices,
        &sumcheck.randomness,
    )?;
    ts.check_pow(schedule.final_pow_bits)?;
    for (query, (fold, point)) in folds.iter().zip(stir_points(final_tree, &indices)).enumerate() {
        if *fold != evaluate_univariate(&final_coefficients, &point) {
            return Err(ProofVerifyError::FinalFoldMismatch(query));
        }
    }

    let final_sumcheck = verify_sumcheck(
        &mut ts,
        RoundPolynomial::QuadraticEvaluations,
        schedule.final_sumcheck_rounds,
        sumcheck.claim,
    )?;
    ts.check_pow(schedule.final_folding_pow_bits)?;
    total_randomness.extend_from_slice(&final_sumcheck.randomness);

    let weight = weights.evaluate(&total_randomness, &alpha, r1cs);
    let final_value = evaluate_coefficients(&final_coefficients, &final_sumcheck.randomness);
    if final_sumcheck.claim != weight * final_value {
        return Err(ProofVerifyError::FinalIdentityMismatch);
    }

    let [l0, l1, l2] = *statement;
    if (l0 * l1 - l2) * EqPolynomial::new(alpha).evaluate(&t) != r1cs_sumcheck.claim {
        return Err(ProofVerifyError::StatementIdentityMismatch);
    }

    match ts.remaining() {
        0 => Ok(()),
        n => Err(ProofVerifyError::TrailingTranscriptBytes(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocol::schedule::parse_statement,
        testing::{prove, toy_r1cs, ToyParameters},
    };
    use ark_bn254::Fr;
    use common::{config::Config, proof::ProofMaterial};

    struct Decoded {
        schedule: ProtocolSchedule<Fr>,
        statement: [Fr; 3],
        openings: Vec<QueryOpening<Fr>>,
    }

    fn decode(config: &Config, material: &ProofMaterial) -> Decoded {
        let schedule = ProtocolSchedule::<Fr>::from_config(config).unwrap();
        let statement = parse_statement(config).unwrap();
        let openings = material
            .openings
            .iter()
            .zip(&schedule.trees)
            .map(|(opening, tree)| QueryOpening::decode(opening, tree.height).unwrap())
            .collect();
        Decoded {
            schedule,
            statement,
            openings,
        }
    }

    fn run(params: &ToyParameters, tamper: impl FnOnce(&mut Config, &mut Decoded)) -> Result<(), ProofVerifyError> {
        let (r1cs, z) = toy_r1cs::<Fr>();
        let (mut config, material) = prove(params.config::<Fr>(), &r1cs, &z);
        let mut decoded = decode(&config, &material);
        tamper(&mut config, &mut decoded);
        verify_native(
            &decoded.schedule,
            &r1cs,
            &config.transcript,
            &decoded.statement,
            &decoded.openings,
        )
    }

    #[test]
    fn honest_proofs_verify() {
        run(&ToyParameters::minimal(), |_, _| {}).unwrap();
        run(&ToyParameters::one_round(), |_, _| {}).unwrap();
    }

    #[test]
    fn wrong_statement_is_rejected() {
        let result = run(&ToyParameters::minimal(), |_, decoded| {
            decoded.statement[2] += Fr::from(1u64);
        });
        assert!(result.is_err());
    }

    #[test]
    fn tampered_first_round_polynomial_fails_sumcheck() {
        let params = ToyParameters::minimal();
        // Digest and commitment OOD answer precede the first cubic round.
        let offset = 32 + 32;
        let result = run(&params, |config, _| config.transcript[offset] ^= 1);
        assert_eq!(result, Err(ProofVerifyError::SumcheckVerificationError(0)));
    }

    #[test]
    fn tampered_final_coefficient_is_rejected() {
        let params = ToyParameters::minimal();
        let result = run(&params, |config, _| {
            // The single final coefficient is the last scalar of the transcript.
            let len = config.transcript.len();
            config.transcript[len - 32] ^= 1;
        });
        assert!(matches!(
            result,
            Err(ProofVerifyError::FinalFoldMismatch(_)) | Err(ProofVerifyError::FinalIdentityMismatch)
        ));
    }

    #[test]
    fn tampered_leaf_breaks_the_merkle_check() {
        let result = run(&ToyParameters::one_round(), |_, decoded| {
            decoded.openings[0].leaves[0][0] += Fr::from(1u64);
        });
        assert_eq!(result, Err(ProofVerifyError::MerkleRootMismatch { tree: 0, query: 0 }));
    }

    #[test]
    fn missing_opening_is_reported() {
        let result = run(&ToyParameters::one_round(), |_, decoded| {
            decoded.openings.pop();
        });
        assert_eq!(result, Err(ProofVerifyError::MissingOpening(1)));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let params = ToyParameters::minimal();
        let (r1cs, z) = toy_r1cs::<Fr>();
        let (config, material) = prove(params.config::<Fr>(), &r1cs, &z);
        let decoded = decode(&config, &material);
        let mut transcript = config.transcript.clone();
        transcript.push(0);
        assert_eq!(
            verify_native(&decoded.schedule, &r1cs, &transcript, &decoded.statement, &decoded.openings),
            Err(ProofVerifyError::TrailingTranscriptBytes(1))
        );
    }
}
