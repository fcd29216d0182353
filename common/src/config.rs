//! Protocol parameters and prover transcript handed over by the WHIR prover.
//!
//! Field elements travel as decimal strings so that the file stays readable
//! and independent of any particular big-integer encoding.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMMITMENT_OOD_SAMPLES, DEFAULT_FOLDING_FACTOR};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Domain separator the sponge capacity is seeded with.
    pub io_pattern: String,
    /// Prover messages, in the order the verifier reads them.
    pub transcript: Vec<u8>,
    /// Declared length of `transcript`.
    pub transcript_len: usize,
    /// Generator of the initial evaluation domain (order `2^(n_vars + rate)`).
    pub domain_generator: String,
    /// Number of variables of the committed witness polynomial.
    pub n_vars: usize,
    /// `log2` of the number of R1CS constraints.
    pub log_num_constraints: usize,
    /// Folding factor per step. A single entry is used for every step, a
    /// shorter list is padded with its last entry.
    #[serde(default = "default_folding_factor")]
    pub folding_factor: Vec<usize>,
    /// `log2` of the inverse code rate.
    pub rate: usize,
    pub n_rounds: usize,
    #[serde(default = "default_commitment_ood_samples")]
    pub commitment_ood_samples: usize,
    pub ood_samples: Vec<usize>,
    pub num_queries: Vec<usize>,
    pub pow_bits: Vec<usize>,
    pub final_queries: usize,
    pub final_pow_bits: usize,
    pub final_folding_pow_bits: usize,
    /// Claimed evaluations `(Az)(α), (Bz)(α), (Cz)(α)`, decimal.
    pub statement_evaluations: Vec<String>,
}

fn default_folding_factor() -> Vec<usize> {
    vec![DEFAULT_FOLDING_FACTOR]
}

fn default_commitment_ood_samples() -> usize {
    DEFAULT_COMMITMENT_OOD_SAMPLES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let json = r#"{
            "io_pattern": "whir",
            "transcript": [1, 2, 3],
            "transcript_len": 3,
            "domain_generator": "7",
            "n_vars": 8,
            "log_num_constraints": 3,
            "rate": 1,
            "n_rounds": 1,
            "ood_samples": [1],
            "num_queries": [4],
            "pow_bits": [0],
            "final_queries": 4,
            "final_pow_bits": 0,
            "final_folding_pow_bits": 0,
            "statement_evaluations": ["1", "2", "2"]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.folding_factor, vec![DEFAULT_FOLDING_FACTOR]);
        assert_eq!(config.commitment_ood_samples, 1);
        assert_eq!(config.transcript_len, config.transcript.len());
    }
}
