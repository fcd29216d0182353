//! Honest WHIR/R1CS prover for small instances. Produces configs,
//! transcripts and openings that the native verifier and the circuit accept.

use ark_ff::{FftField, PrimeField};
use common::{
    config::Config,
    proof::{ProofMaterial, TreeOpening},
};

use crate::{
    field::{field_to_fp256, to_decimal},
    merkle::MerkleTree,
    poly::{
        eq_poly::EqPolynomial,
        multilinear::{evals_to_coeffs, expand_point, stir_leaf},
        unipoly::{cubic_from_evals, evaluate_univariate},
    },
    protocol::{ProtocolSchedule, TreeSchedule},
    r1cs::{Interner, R1cs, SparseMatrix},
    transcript::{powers, ProverTranscript},
    utils::math::Math,
};

/// Shape knobs of a test instance.
#[derive(Clone, Debug)]
pub struct ToyParameters {
    pub n_vars: usize,
    pub log_num_constraints: usize,
    pub folding_factor: Vec<usize>,
    pub rate: usize,
    pub n_rounds: usize,
    pub commitment_ood_samples: usize,
    pub ood_samples: usize,
    pub num_queries: usize,
    pub pow_bits: usize,
    pub final_queries: usize,
    pub final_pow_bits: usize,
    pub final_folding_pow_bits: usize,
}

impl ToyParameters {
    /// Two variables, one folding step straight into the final polynomial.
    pub fn minimal() -> Self {
        Self {
            n_vars: 2,
            log_num_constraints: 1,
            folding_factor: vec![2],
            rate: 1,
            n_rounds: 0,
            commitment_ood_samples: 1,
            ood_samples: 1,
            num_queries: 2,
            pow_bits: 0,
            final_queries: 2,
            final_pow_bits: 0,
            final_folding_pow_bits: 0,
        }
    }

    /// Four variables folded two at a time over one full round, with a few
    /// bits of proof of work at every grinding step.
    pub fn one_round() -> Self {
        Self {
            n_vars: 4,
            n_rounds: 1,
            pow_bits: 2,
            final_pow_bits: 1,
            final_folding_pow_bits: 1,
            ..Self::minimal()
        }
    }

    pub fn config<F: PrimeField>(&self) -> Config {
        let generator = F::get_root_of_unity((self.n_vars + self.rate).pow2() as u64).unwrap_or_default();
        Config {
            io_pattern: "🌪️ whir-r1cs".into(),
            transcript: Vec::new(),
            transcript_len: 0,
            domain_generator: to_decimal(&generator),
            n_vars: self.n_vars,
            log_num_constraints: self.log_num_constraints,
            folding_factor: self.folding_factor.clone(),
            rate: self.rate,
            n_rounds: self.n_rounds,
            commitment_ood_samples: self.commitment_ood_samples,
            ood_samples: vec![self.ood_samples; self.n_rounds],
            num_queries: vec![self.num_queries; self.n_rounds],
            pow_bits: vec![self.pow_bits; self.n_rounds],
            final_queries: self.final_queries,
            final_pow_bits: self.final_pow_bits,
            final_folding_pow_bits: self.final_folding_pow_bits,
            statement_evaluations: Vec::new(),
        }
    }
}

/// `z1 * z2 = z3` and `1 * z1 = z1` over `z = (1, 3, 5, 15)`.
pub fn toy_r1cs<F: PrimeField>() -> (R1cs<F>, Vec<F>) {
    let one = F::one();
    let mut interner = Interner::default();
    let mut matrix = |name, entries: &[(usize, usize, F)]| {
        SparseMatrix::from_entries(name, 2, 4, entries, &mut interner).unwrap_or_default()
    };
    let a = matrix("A", &[(0, 1, one), (1, 0, one)]);
    let b = matrix("B", &[(0, 2, one), (1, 1, one)]);
    let c = matrix("C", &[(0, 3, one), (1, 1, one)]);
    let r1cs = R1cs {
        num_constraints: 2,
        num_witnesses: 4,
        interner,
        a,
        b,
        c,
    };
    (r1cs, [1u64, 3, 5, 15].map(F::from).to_vec())
}

/// Binds the lowest variable of a hypercube table to `r`.
fn bind<F: PrimeField>(table: &[F], r: F) -> Vec<F> {
    table
        .chunks_exact(2)
        .map(|pair| pair[0] + r * (pair[1] - pair[0]))
        .collect()
}

fn add_eq_weights<F: PrimeField>(weights: &mut [F], coefficients: &[F], points: &[F]) {
    let num_vars = weights.len().log_2();
    for (coefficient, point) in coefficients.iter().zip(points) {
        let table = EqPolynomial::new(expand_point(*point, num_vars)).evals();
        for (w, e) in weights.iter_mut().zip(table) {
            *w += *coefficient * e;
        }
    }
}

/// Sumcheck of `Σ_b f(b) w(b)` in the quadratic-evaluations form, folding both
/// tables in place.
fn whir_sumcheck<F: PrimeField>(ts: &mut ProverTranscript<F>, f: &mut Vec<F>, w: &mut Vec<F>, rounds: usize) {
    for _ in 0..rounds {
        let mut evals = [F::zero(); 3];
        for (fs, ws) in f.chunks_exact(2).zip(w.chunks_exact(2)) {
            evals[0] += fs[0] * ws[0];
            evals[1] += fs[1] * ws[1];
            evals[2] += (fs[1].double() - fs[0]) * (ws[1].double() - ws[0]);
        }
        ts.add_scalars(&evals);
        let r = ts.challenge_scalars(1)[0];
        *f = bind(f, r);
        *w = bind(w, r);
    }
}

struct Committed<F> {
    tree: MerkleTree,
    leaves: Vec<Vec<F>>,
}

fn commit<F: PrimeField>(tree: &TreeSchedule<F>, coeffs: &[F]) -> Committed<F> {
    let leaves: Vec<Vec<F>> = (0..tree.height.pow2())
        .map(|i| stir_leaf(coeffs, tree.folding_factor, tree.folded_generator.pow([i as u64])))
        .collect();
    Committed {
        tree: MerkleTree::new(&leaves),
        leaves,
    }
}

fn open<F: PrimeField>(committed: &Committed<F>, indices: &[usize]) -> TreeOpening {
    TreeOpening {
        path: committed.tree.multi_path(indices),
        leaves: indices
            .iter()
            .map(|i| committed.leaves[*i].iter().map(field_to_fp256).collect())
            .collect(),
    }
}

/// Proves that `z` satisfies `r1cs` under `config`'s parameters. Returns the
/// config completed with transcript and statement, and the tree openings.
pub fn prove<F: PrimeField>(mut config: Config, r1cs: &R1cs<F>, z: &[F]) -> (Config, ProofMaterial) {
    let schedule = match ProtocolSchedule::<F>::from_parameters(&config) {
        Ok(schedule) => schedule,
        Err(err) => panic!("invalid toy parameters: {err}"),
    };
    let n_vars = schedule.n_vars;
    let m0 = schedule.log_num_constraints;
    let mut ts = ProverTranscript::<F>::new(&schedule.io_pattern);

    let mut f = z.to_vec();
    f.resize(n_vars.pow2(), F::zero());
    let coeffs = evals_to_coeffs(&f);
    let mut trees = vec![commit(&schedule.trees[0], &coeffs)];
    ts.add_digest(&trees[0].tree.root());
    let ood_points = ts.challenge_scalars(schedule.commitment_ood_samples);
    let ood_answers: Vec<F> = ood_points.iter().map(|p| evaluate_univariate(&coeffs, p)).collect();
    ts.add_scalars(&ood_answers);

    let t = ts.challenge_scalars(m0);
    let [mut a, mut b, mut c] = r1cs.multiply(z, m0.pow2());
    let mut eq = EqPolynomial::new(t).evals();
    let mut alpha = Vec::with_capacity(m0);
    for _ in 0..m0 {
        let mut evals = [F::zero(); 4];
        for k in 0..a.len() / 2 {
            for (x, slot) in evals.iter_mut().enumerate() {
                let x = F::from(x as u64);
                let at = |table: &[F]| table[2 * k] + x * (table[2 * k + 1] - table[2 * k]);
                *slot += at(&eq) * (at(&a) * at(&b) - at(&c));
            }
        }
        ts.add_scalars(&cubic_from_evals(&evals));
        let r = ts.challenge_scalars(1)[0];
        for table in [&mut a, &mut b, &mut c, &mut eq] {
            *table = bind(table, r);
        }
        alpha.push(r);
    }
    let statement = [a[0], b[0], c[0]];

    let gamma = ts.challenge_scalars(1)[0];
    let rho = powers(gamma, ood_points.len() + statement.len());
    let (ood_rho, linear_rho) = rho.split_at(ood_points.len());
    let mut w = vec![F::zero(); n_vars.pow2()];
    add_eq_weights(&mut w, ood_rho, &ood_points);
    let row_weights = EqPolynomial::new(alpha).evals();
    for (rho_k, matrix) in linear_rho.iter().zip([&r1cs.a, &r1cs.b, &r1cs.c]) {
        let columns = matrix.weighted_column_sums(&r1cs.interner, &row_weights, n_vars.pow2());
        for (w_col, column) in w.iter_mut().zip(columns) {
            *w_col += *rho_k * column;
        }
    }
    whir_sumcheck(&mut ts, &mut f, &mut w, schedule.folding_factors[0]);

    let mut openings = Vec::with_capacity(schedule.n_rounds() + 1);
    for (r, round) in schedule.rounds.iter().enumerate() {
        let coeffs = evals_to_coeffs(&f);
        let next = commit(&schedule.trees[r + 1], &coeffs);
        ts.add_digest(&next.tree.root());
        let ood_points = ts.challenge_scalars(round.ood_samples);
        let ood_answers: Vec<F> = ood_points.iter().map(|p| evaluate_univariate(&coeffs, p)).collect();
        ts.add_scalars(&ood_answers);

        let tree = &schedule.trees[r];
        let indices = ts.challenge_indices(round.num_queries, tree.height);
        openings.push(open(&trees[r], &indices));
        ts.grind(round.pow_bits);

        let gamma = ts.challenge_scalars(1)[0];
        let rho = powers(gamma, round.ood_samples + round.num_queries);
        let points: Vec<F> = ood_points
            .into_iter()
            .chain(indices.iter().map(|i| tree.folded_generator.pow([*i as u64])))
            .collect();
        add_eq_weights(&mut w, &rho, &points);
        trees.push(next);
        whir_sumcheck(&mut ts, &mut f, &mut w, schedule.folding_factors[r + 1]);
    }

    let n_rounds = schedule.n_rounds();
    ts.add_scalars(&evals_to_coeffs(&f));
    let indices = ts.challenge_indices(schedule.final_queries, schedule.trees[n_rounds].height);
    openings.push(open(&trees[n_rounds], &indices));
    ts.grind(schedule.final_pow_bits);
    whir_sumcheck(&mut ts, &mut f, &mut w, schedule.final_sumcheck_rounds);
    ts.grind(schedule.final_folding_pow_bits);

    let narg = ts.finish();
    config.transcript_len = narg.len();
    config.transcript = narg;
    config.statement_evaluations = statement.iter().map(to_decimal).collect();
    (config, ProofMaterial { openings })
}
