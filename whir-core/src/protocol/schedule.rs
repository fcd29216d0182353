use ark_ff::PrimeField;
use common::{
    config::Config,
    constants::{DIGEST_BYTES, MAX_POW_BITS, POW_NONCE_BYTES},
};

use crate::{
    field::{parse_decimal, scalar_bytes},
    r1cs::R1cs,
    utils::{errors::WhirCircuitError, math::Math},
};

/// `(Az)(α)`, `(Bz)(α)` and `(Cz)(α)`.
pub const NUM_STATEMENT_EVALUATIONS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSchedule {
    pub ood_samples: usize,
    pub num_queries: usize,
    pub pow_bits: usize,
}

/// Shape of one committed Merkle tree. Tree `j` is opened in round `j`, the
/// last one after all rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeSchedule<F> {
    /// Variables of the polynomial committed in this tree.
    pub num_vars: usize,
    /// Variables folded away when the tree is opened; each leaf holds
    /// `2^folding_factor` field elements.
    pub folding_factor: usize,
    pub height: usize,
    pub num_queries: usize,
    /// Generator of the folded domain indexing the leaves.
    pub folded_generator: F,
}

impl<F> TreeSchedule<F> {
    pub fn leaf_size(&self) -> usize {
        self.folding_factor.pow2()
    }
}

/// Every loop bound of the verifier. Two circuits built from the same schedule
/// have the same shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolSchedule<F> {
    pub io_pattern: Vec<u8>,
    pub transcript_len: usize,
    pub n_vars: usize,
    pub log_num_constraints: usize,
    pub rate: usize,
    pub domain_generator: F,
    pub commitment_ood_samples: usize,
    /// One entry for the initial sumcheck and one per round.
    pub folding_factors: Vec<usize>,
    pub rounds: Vec<RoundSchedule>,
    pub trees: Vec<TreeSchedule<F>>,
    pub final_sumcheck_rounds: usize,
    pub final_queries: usize,
    pub final_pow_bits: usize,
    pub final_folding_pow_bits: usize,
}

fn malformed<T>(msg: impl Into<String>) -> Result<T, WhirCircuitError> {
    Err(WhirCircuitError::MalformedConfig(msg.into()))
}

impl<F: PrimeField> ProtocolSchedule<F> {
    /// Derives the schedule from `config` and checks the transcript against it.
    pub fn from_config(config: &Config) -> Result<Self, WhirCircuitError> {
        let schedule = Self::from_parameters(config)?;
        if config.transcript.len() != config.transcript_len {
            return Err(WhirCircuitError::TranscriptLength(
                config.transcript_len,
                config.transcript.len(),
            ));
        }
        let expected = schedule.expected_transcript_len();
        if expected != config.transcript_len {
            return Err(WhirCircuitError::TranscriptLength(expected, config.transcript_len));
        }
        Ok(schedule)
    }

    /// Derives the schedule from the protocol parameters of `config`, ignoring
    /// its transcript.
    pub fn from_parameters(config: &Config) -> Result<Self, WhirCircuitError> {
        let n_rounds = config.n_rounds;
        for (name, len) in [
            ("ood_samples", config.ood_samples.len()),
            ("num_queries", config.num_queries.len()),
            ("pow_bits", config.pow_bits.len()),
        ] {
            if len != n_rounds {
                return malformed(format!("{name} has {len} entries for {n_rounds} rounds"));
            }
        }
        if config
            .pow_bits
            .iter()
            .chain([&config.final_pow_bits, &config.final_folding_pow_bits])
            .any(|bits| *bits > MAX_POW_BITS)
        {
            return malformed(format!("proof of work above {MAX_POW_BITS} bits"));
        }

        if config.log_num_constraints >= usize::BITS as usize {
            return malformed(format!("2^{} constraints", config.log_num_constraints));
        }

        let folding_factors = Self::folding_schedule(&config.folding_factor, n_rounds)?;
        let folded: usize = folding_factors.iter().sum();
        if folded > config.n_vars {
            return Err(WhirCircuitError::FoldingScheduleTooLong {
                schedule: folding_factors,
                n_vars: config.n_vars,
            });
        }

        let log_domain = config.n_vars + config.rate;
        if log_domain > F::TWO_ADICITY as usize {
            return malformed(format!("no domain of size 2^{log_domain}"));
        }
        let domain_generator: F = parse_decimal(&config.domain_generator)?;
        let order = log_domain.pow2() as u64;
        if domain_generator.pow([order]) != F::one()
            || (order > 1 && domain_generator.pow([order / 2]) == F::one())
        {
            return malformed(format!("domain generator does not have order 2^{log_domain}"));
        }

        let rounds: Vec<RoundSchedule> = (0..n_rounds)
            .map(|r| RoundSchedule {
                ood_samples: config.ood_samples[r],
                num_queries: config.num_queries[r],
                pow_bits: config.pow_bits[r],
            })
            .collect();

        let mut trees = Vec::with_capacity(n_rounds + 1);
        let mut num_vars = config.n_vars;
        for (j, folding_factor) in folding_factors.iter().copied().enumerate() {
            let height = (log_domain - j)
                .checked_sub(folding_factor)
                .filter(|h| *h >= 1)
                .ok_or_else(|| WhirCircuitError::MalformedConfig(format!("tree {j} has fewer than two leaves")))?;
            trees.push(TreeSchedule {
                num_vars,
                folding_factor,
                height,
                num_queries: if j < n_rounds {
                    rounds[j].num_queries
                } else {
                    config.final_queries
                },
                folded_generator: domain_generator.pow([(j + folding_factor).pow2() as u64]),
            });
            num_vars -= folding_factor;
        }

        Ok(Self {
            io_pattern: config.io_pattern.as_bytes().to_vec(),
            transcript_len: config.transcript_len,
            n_vars: config.n_vars,
            log_num_constraints: config.log_num_constraints,
            rate: config.rate,
            domain_generator,
            commitment_ood_samples: config.commitment_ood_samples,
            final_sumcheck_rounds: config.n_vars - folded,
            folding_factors,
            rounds,
            trees,
            final_queries: config.final_queries,
            final_pow_bits: config.final_pow_bits,
            final_folding_pow_bits: config.final_folding_pow_bits,
        })
    }

    fn folding_schedule(configured: &[usize], n_rounds: usize) -> Result<Vec<usize>, WhirCircuitError> {
        let Some(last) = configured.last().copied() else {
            return malformed("empty folding factor schedule");
        };
        if configured.len() > n_rounds + 1 {
            return malformed(format!(
                "{} folding factors for {n_rounds} rounds",
                configured.len()
            ));
        }
        if configured.contains(&0) {
            return malformed("zero folding factor");
        }
        let mut factors = configured.to_vec();
        factors.resize(n_rounds + 1, last);
        Ok(factors)
    }

    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Variables folded away before round `round` adds its constraints.
    pub fn folded_vars_at_round(&self, round: usize) -> usize {
        self.folding_factors[..=round].iter().sum()
    }

    pub fn num_final_coefficients(&self) -> usize {
        self.final_sumcheck_rounds.pow2()
    }

    pub fn expected_transcript_len(&self) -> usize {
        let scalar = scalar_bytes::<F>();
        let pow = |bits: usize| if bits > 0 { POW_NONCE_BYTES } else { 0 };

        let mut len = DIGEST_BYTES
            + self.commitment_ood_samples * scalar
            + self.log_num_constraints * 4 * scalar
            + self.folding_factors[0] * 3 * scalar;
        for (r, round) in self.rounds.iter().enumerate() {
            len += DIGEST_BYTES
                + round.ood_samples * scalar
                + pow(round.pow_bits)
                + self.folding_factors[r + 1] * 3 * scalar;
        }
        len + self.num_final_coefficients() * scalar
            + pow(self.final_pow_bits)
            + self.final_sumcheck_rounds * 3 * scalar
            + pow(self.final_folding_pow_bits)
    }

    /// The R1CS must pad to exactly `2^log_num_constraints` rows and fit in
    /// `2^n_vars` witnesses.
    pub fn check_r1cs(&self, r1cs: &R1cs<F>) -> Result<(), WhirCircuitError> {
        let padded_rows = r1cs.num_constraints.next_power_of_two();
        if padded_rows.log_2() != self.log_num_constraints {
            return Err(WhirCircuitError::ShapeMismatch(
                "R1CS constraints",
                self.log_num_constraints.pow2(),
                padded_rows,
            ));
        }
        if r1cs.num_witnesses > self.n_vars.pow2() {
            return Err(WhirCircuitError::ShapeMismatch(
                "R1CS witnesses",
                self.n_vars.pow2(),
                r1cs.num_witnesses,
            ));
        }
        Ok(())
    }
}

pub fn parse_statement<F: PrimeField>(config: &Config) -> Result<[F; NUM_STATEMENT_EVALUATIONS], WhirCircuitError> {
    if config.statement_evaluations.len() != NUM_STATEMENT_EVALUATIONS {
        return Err(WhirCircuitError::ShapeMismatch(
            "statement evaluations",
            NUM_STATEMENT_EVALUATIONS,
            config.statement_evaluations.len(),
        ));
    }
    let mut evaluations = [F::zero(); NUM_STATEMENT_EVALUATIONS];
    for (slot, s) in evaluations.iter_mut().zip(&config.statement_evaluations) {
        *slot = parse_decimal(s)?;
    }
    Ok(evaluations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::to_decimal;
    use ark_bn254::Fr;
    use ark_ff::FftField;

    fn config(n_vars: usize, folding_factor: Vec<usize>, n_rounds: usize) -> Config {
        let rate = 1;
        let generator = Fr::get_root_of_unity(1 << (n_vars + rate)).unwrap();
        Config {
            io_pattern: "whir".into(),
            transcript: vec![],
            transcript_len: 0,
            domain_generator: to_decimal(&generator),
            n_vars,
            log_num_constraints: 2,
            folding_factor,
            rate,
            n_rounds,
            commitment_ood_samples: 1,
            ood_samples: vec![1; n_rounds],
            num_queries: vec![3; n_rounds],
            pow_bits: vec![0; n_rounds],
            final_queries: 2,
            final_pow_bits: 5,
            final_folding_pow_bits: 0,
            statement_evaluations: vec!["1".into(), "2".into(), "2".into()],
        }
    }

    #[test]
    fn single_factor_is_repeated() {
        let schedule = ProtocolSchedule::<Fr>::from_parameters(&config(10, vec![4], 1)).unwrap();
        assert_eq!(schedule.folding_factors, vec![4, 4]);
        assert_eq!(schedule.final_sumcheck_rounds, 2);
        assert_eq!(schedule.trees[0].height, 7);
        assert_eq!(schedule.trees[1].height, 6);
        assert_eq!(schedule.trees[1].num_vars, 6);
        assert_eq!(schedule.trees[1].num_queries, 2);
        assert_eq!(schedule.folded_vars_at_round(0), 4);
    }

    #[test]
    fn short_schedule_is_padded_with_its_last_factor() {
        let schedule = ProtocolSchedule::<Fr>::from_parameters(&config(12, vec![3, 2], 3)).unwrap();
        assert_eq!(schedule.folding_factors, vec![3, 2, 2, 2]);
        assert_eq!(schedule.final_sumcheck_rounds, 3);
    }

    #[test]
    fn overlong_schedule_is_rejected() {
        assert!(matches!(
            ProtocolSchedule::<Fr>::from_parameters(&config(6, vec![4], 1)),
            Err(WhirCircuitError::FoldingScheduleTooLong { .. })
        ));
    }

    #[test]
    fn generator_of_wrong_order_is_rejected() {
        let mut config = config(4, vec![2], 0);
        config.domain_generator = "1".into();
        assert!(matches!(
            ProtocolSchedule::<Fr>::from_parameters(&config),
            Err(WhirCircuitError::MalformedConfig(_))
        ));
    }

    #[test]
    fn oversized_constraint_count_is_rejected() {
        let mut config = config(4, vec![2], 0);
        config.log_num_constraints = usize::BITS as usize;
        assert!(matches!(
            ProtocolSchedule::<Fr>::from_parameters(&config),
            Err(WhirCircuitError::MalformedConfig(_))
        ));
    }

    #[test]
    fn constraint_count_must_match_the_r1cs() {
        let (r1cs, _) = crate::testing::toy_r1cs::<Fr>();
        let mut config = config(4, vec![2], 0);
        config.log_num_constraints = 1;
        let schedule = ProtocolSchedule::<Fr>::from_parameters(&config).unwrap();
        assert!(schedule.check_r1cs(&r1cs).is_ok());

        config.log_num_constraints = 40;
        let schedule = ProtocolSchedule::<Fr>::from_parameters(&config).unwrap();
        assert!(matches!(
            schedule.check_r1cs(&r1cs),
            Err(WhirCircuitError::ShapeMismatch("R1CS constraints", _, 2))
        ));
    }

    #[test]
    fn transcript_length_counts_every_message() {
        let schedule = ProtocolSchedule::<Fr>::from_parameters(&config(4, vec![2], 1)).unwrap();
        // root, ood answer, 2 cubic rounds, 2 quadratic rounds
        let initial = 32 + 32 + 2 * 128 + 2 * 96;
        // root, ood answer, 2 quadratic rounds
        let round = 32 + 32 + 2 * 96;
        // 1 final coefficient, final pow nonce
        let last = 32 + 8;
        assert_eq!(schedule.expected_transcript_len(), initial + round + last);
    }

    #[test]
    fn statement_needs_three_evaluations() {
        let mut config = config(4, vec![2], 0);
        assert_eq!(
            parse_statement::<Fr>(&config).unwrap(),
            [Fr::from(1u64), Fr::from(2u64), Fr::from(2u64)]
        );
        config.statement_evaluations.pop();
        assert!(parse_statement::<Fr>(&config).is_err());
    }
}
