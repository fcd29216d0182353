//! WHIR verifier circuit for Groth16
//!
//! Implements the ConstraintSynthesizer trait for the full verifier. The
//! driver walks the schedule of [`ProtocolSchedule`] in the order of
//! [`crate::protocol::verify_native`], threading a [`RoundContext`] from one
//! WHIR round to the next.

use std::sync::Arc;

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::{
    circuits::{
        bytes::{input_bytes, ByteVar},
        merkle::OpeningVar,
        poly::{dot, powers},
        r1cs::{enforce_final_identity, enforce_statement_identity, WeightPolynomialVar},
        stir::{compute_folds, enforce_final_folds, stir_points},
        sumcheck::verify_sumcheck,
        transcript::TranscriptVar,
    },
    field::pack_bytes,
    merkle::QueryOpening,
    poly::unipoly::RoundPolynomial,
    protocol::{ProtocolSchedule, RoundSchedule, NUM_STATEMENT_EVALUATIONS},
    r1cs::R1cs,
};

/// WHIR/R1CS verification circuit
///
/// ## Public Inputs
///
/// - Transcript bytes, packed into field elements
/// - Statement evaluations `L0, L1, L2`
///
/// ## Witnesses
///
/// - Claimed leaf indices, opened leaves and sibling chains of every tree
#[derive(Clone)]
pub struct WhirVerifierCircuit<F: PrimeField> {
    pub schedule: Arc<ProtocolSchedule<F>>,
    pub r1cs: Arc<R1cs<F>>,
    pub transcript: Vec<u8>,
    pub statement: [F; NUM_STATEMENT_EVALUATIONS],
    /// One opening per tree, the last one for the final queries.
    pub openings: Vec<QueryOpening<F>>,
}

impl<F: PrimeField> WhirVerifierCircuit<F> {
    /// Get public inputs for verification
    pub fn public_inputs(&self) -> Vec<F> {
        let mut inputs = pack_bytes(&self.transcript);
        inputs.extend_from_slice(&self.statement);
        inputs
    }
}

/// The R1CS sumcheck's challenges and the claim it reduced to.
struct R1csReduction<F: PrimeField> {
    t: Vec<FpVar<F>>,
    alpha: Vec<FpVar<F>>,
    claim: FpVar<F>,
}

/// State carried across WHIR rounds.
struct RoundContext<F: PrimeField> {
    /// Root of the tree opened next.
    root: Vec<ByteVar<F>>,
    last_eval: FpVar<F>,
    total_randomness: Vec<FpVar<F>>,
    /// Folds of the next tree's opened leaves.
    computed_folds: Vec<FpVar<F>>,
    weights: WeightPolynomialVar<F>,
}

impl<F: PrimeField> WhirVerifierCircuit<F> {
    fn r1cs_phase(&self, ts: &mut TranscriptVar<F>) -> Result<R1csReduction<F>, SynthesisError> {
        let rounds = self.schedule.log_num_constraints;
        let t = ts.challenge_scalars(rounds);
        let sumcheck = verify_sumcheck(ts, RoundPolynomial::CubicCoefficients, rounds, FpVar::zero())?;
        Ok(R1csReduction {
            t,
            alpha: sumcheck.randomness,
            claim: sumcheck.claim,
        })
    }

    fn initial_round(
        &self,
        ts: &mut TranscriptVar<F>,
        root: Vec<ByteVar<F>>,
        ood_points: Vec<FpVar<F>>,
        ood_answers: Vec<FpVar<F>>,
        statement: &[FpVar<F>],
        openings: &[OpeningVar<F>],
    ) -> Result<RoundContext<F>, SynthesisError> {
        let gamma = ts.challenge_scalars(1).remove(0);
        let rho = powers(&gamma, ood_answers.len() + statement.len());
        let (ood_rho, linear_rho) = rho.split_at(ood_answers.len());
        let mut weights = WeightPolynomialVar::new(linear_rho.to_vec());
        weights.add_points(ood_rho, &ood_points, 0);
        let claim = dot(ood_rho, &ood_answers) + dot(linear_rho, statement);

        let sumcheck = verify_sumcheck(
            ts,
            RoundPolynomial::QuadraticEvaluations,
            self.schedule.folding_factors[0],
            claim,
        )?;
        Ok(RoundContext {
            root,
            last_eval: sumcheck.claim,
            computed_folds: compute_folds(&openings[0].leaves, &sumcheck.randomness)?,
            total_randomness: sumcheck.randomness,
            weights,
        })
    }

    #[tracing::instrument(skip_all, name = "WhirVerifierCircuit::main_round", fields(round = r))]
    fn main_round(
        &self,
        mut ctx: RoundContext<F>,
        ts: &mut TranscriptVar<F>,
        r: usize,
        round: &RoundSchedule,
        openings: &[OpeningVar<F>],
    ) -> Result<RoundContext<F>, SynthesisError> {
        let tree = &self.schedule.trees[r];
        let next_root = ts.next_digest()?;
        let ood_points = ts.challenge_scalars(round.ood_samples);
        let ood_answers = ts.next_scalars(round.ood_samples)?;
        let index_bits = ts.challenge_index_bits(round.num_queries, tree.height);
        openings[r].verify(&ctx.root, &index_bits)?;
        ts.verify_pow(round.pow_bits)?;

        let gamma = ts.challenge_scalars(1).remove(0);
        let rho = powers(&gamma, round.ood_samples + round.num_queries);
        let points: Vec<FpVar<F>> = ood_points
            .into_iter()
            .chain(stir_points(tree, &index_bits))
            .collect();
        let values: Vec<FpVar<F>> = ood_answers.into_iter().chain(ctx.computed_folds).collect();
        ctx.weights
            .add_points(&rho, &points, self.schedule.folded_vars_at_round(r));

        let sumcheck = verify_sumcheck(
            ts,
            RoundPolynomial::QuadraticEvaluations,
            self.schedule.folding_factors[r + 1],
            ctx.last_eval + dot(&rho, &values),
        )?;
        let computed_folds = compute_folds(&openings[r + 1].leaves, &sumcheck.randomness)?;
        ctx.total_randomness.extend(sumcheck.randomness);
        Ok(RoundContext {
            root: next_root,
            last_eval: sumcheck.claim,
            total_randomness: ctx.total_randomness,
            computed_folds,
            weights: ctx.weights,
        })
    }

    #[tracing::instrument(skip_all, name = "WhirVerifierCircuit::final_round")]
    fn final_round(
        &self,
        mut ctx: RoundContext<F>,
        ts: &mut TranscriptVar<F>,
        openings: &[OpeningVar<F>],
        statement: &[FpVar<F>],
        r1cs_reduction: R1csReduction<F>,
    ) -> Result<(), SynthesisError> {
        let schedule = &self.schedule;
        let n_rounds = schedule.n_rounds();
        let tree = &schedule.trees[n_rounds];

        let final_coefficients = ts.next_scalars(schedule.num_final_coefficients())?;
        let index_bits = ts.challenge_index_bits(schedule.final_queries, tree.height);
        openings[n_rounds].verify(&ctx.root, &index_bits)?;
        ts.verify_pow(schedule.final_pow_bits)?;
        enforce_final_folds(&ctx.computed_folds, &final_coefficients, &stir_points(tree, &index_bits))?;

        let final_sumcheck = verify_sumcheck(
            ts,
            RoundPolynomial::QuadraticEvaluations,
            schedule.final_sumcheck_rounds,
            ctx.last_eval,
        )?;
        ts.verify_pow(schedule.final_folding_pow_bits)?;
        ctx.total_randomness
            .extend_from_slice(&final_sumcheck.randomness);

        let weight = ctx
            .weights
            .evaluate(&ctx.total_randomness, &r1cs_reduction.alpha, &self.r1cs)?;
        enforce_final_identity(
            &final_sumcheck.claim,
            &weight,
            &final_coefficients,
            &final_sumcheck.randomness,
        )?;
        enforce_statement_identity(
            statement,
            &r1cs_reduction.alpha,
            &r1cs_reduction.t,
            &r1cs_reduction.claim,
        )
    }
}

impl<F: PrimeField> ConstraintSynthesizer<F> for WhirVerifierCircuit<F> {
    #[tracing::instrument(skip_all, name = "WhirVerifierCircuit::generate_constraints")]
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        // Public inputs: transcript first, then the statement
        let narg = input_bytes(cs.clone(), &self.transcript)?;
        let statement: Vec<FpVar<F>> = self
            .statement
            .iter()
            .map(|l| FpVar::new_input(cs.clone(), || Ok(*l)))
            .collect::<Result<Vec<_>, _>>()?;

        if self.openings.len() != self.schedule.trees.len() {
            tracing::error!(
                openings = self.openings.len(),
                trees = self.schedule.trees.len(),
                "one opening per tree expected"
            );
            return Err(SynthesisError::Unsatisfiable);
        }
        let openings: Vec<OpeningVar<F>> = self
            .openings
            .iter()
            .map(|opening| OpeningVar::new_witness(cs.clone(), opening))
            .collect::<Result<Vec<_>, _>>()?;

        let mut ts = TranscriptVar::new(&self.schedule.io_pattern, narg);
        let root = ts.next_digest()?;
        let ood_points = ts.challenge_scalars(self.schedule.commitment_ood_samples);
        let ood_answers = ts.next_scalars(self.schedule.commitment_ood_samples)?;

        let r1cs_reduction = self.r1cs_phase(&mut ts)?;
        let mut ctx = self.initial_round(&mut ts, root, ood_points, ood_answers, &statement, &openings)?;
        for (r, round) in self.schedule.rounds.iter().enumerate() {
            ctx = self.main_round(ctx, &mut ts, r, round, &openings)?;
        }
        self.final_round(ctx, &mut ts, &openings, &statement, r1cs_reduction)?;
        ts.finish()?;

        tracing::info!(
            num_constraints = cs.num_constraints(),
            num_instance_variables = cs.num_instance_variables(),
            "WHIR verifier synthesized"
        );
        Ok(())
    }
}
