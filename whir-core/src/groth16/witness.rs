//! Witness shaping from proof material
//!
//! The real circuit is built from the decoded multi-paths and the config's
//! transcript; the placeholder circuit used for key generation has the same
//! shape with every value zero. Both must agree on [`CircuitShape`], or the
//! keys would not fit the proof.

use std::sync::Arc;

use ark_ff::PrimeField;
use common::{config::Config, proof::ProofMaterial};

use super::WhirVerifierCircuit;
use crate::{
    merkle::QueryOpening,
    protocol::{schedule::parse_statement, ProtocolSchedule, NUM_STATEMENT_EVALUATIONS},
    r1cs::R1cs,
    utils::errors::WhirCircuitError,
};

/// Per-tree opening shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpeningShape {
    pub num_queries: usize,
    pub leaf_sizes: Vec<usize>,
    pub chain_lengths: Vec<usize>,
}

/// Everything that determines the constraint system besides the schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitShape {
    pub transcript_len: usize,
    pub openings: Vec<OpeningShape>,
}

impl<F: PrimeField> WhirVerifierCircuit<F> {
    /// Decodes `material` against `schedule` and checks the resulting shape.
    #[tracing::instrument(skip_all, name = "WhirVerifierCircuit::from_material")]
    pub fn from_material(
        schedule: Arc<ProtocolSchedule<F>>,
        r1cs: Arc<R1cs<F>>,
        config: &Config,
        material: &ProofMaterial,
    ) -> Result<Self, WhirCircuitError> {
        if material.openings.len() != schedule.trees.len() {
            return Err(WhirCircuitError::ShapeMismatch(
                "tree openings",
                schedule.trees.len(),
                material.openings.len(),
            ));
        }
        let openings = material
            .openings
            .iter()
            .zip(&schedule.trees)
            .map(|(opening, tree)| QueryOpening::decode(opening, tree.height))
            .collect::<Result<Vec<_>, _>>()?;

        let circuit = Self {
            statement: parse_statement(config)?,
            transcript: config.transcript.clone(),
            openings,
            schedule,
            r1cs,
        };
        circuit.check_shape()?;
        Ok(circuit)
    }

    /// All-zero circuit of the shape `schedule` prescribes.
    pub fn placeholder(schedule: Arc<ProtocolSchedule<F>>, r1cs: Arc<R1cs<F>>) -> Self {
        let openings = schedule
            .trees
            .iter()
            .map(|tree| QueryOpening::placeholder(tree.num_queries, tree.leaf_size(), tree.height))
            .collect();
        Self {
            transcript: vec![0u8; schedule.transcript_len],
            statement: [F::zero(); NUM_STATEMENT_EVALUATIONS],
            openings,
            schedule,
            r1cs,
        }
    }

    pub fn shape(&self) -> CircuitShape {
        CircuitShape {
            transcript_len: self.transcript.len(),
            openings: self
                .openings
                .iter()
                .map(|opening| OpeningShape {
                    num_queries: opening.leaf_indexes.len(),
                    leaf_sizes: opening.leaves.iter().map(Vec::len).collect(),
                    chain_lengths: opening.sibling_chains.iter().map(Vec::len).collect(),
                })
                .collect(),
        }
    }

    /// Compares this circuit's shape with the placeholder's.
    pub fn check_shape(&self) -> Result<(), WhirCircuitError> {
        let expected = Self::placeholder(self.schedule.clone(), self.r1cs.clone()).shape();
        let actual = self.shape();
        if actual.transcript_len != expected.transcript_len {
            return Err(WhirCircuitError::TranscriptLength(
                expected.transcript_len,
                actual.transcript_len,
            ));
        }
        if actual.openings.len() != expected.openings.len() {
            return Err(WhirCircuitError::ShapeMismatch(
                "tree openings",
                expected.openings.len(),
                actual.openings.len(),
            ));
        }
        for (want, got) in expected.openings.iter().zip(&actual.openings) {
            if got.num_queries != want.num_queries || got.leaf_sizes.len() != want.num_queries {
                return Err(WhirCircuitError::ShapeMismatch(
                    "queries",
                    want.num_queries,
                    got.num_queries,
                ));
            }
            if let Some((w, g)) = want.leaf_sizes.iter().zip(&got.leaf_sizes).find(|(w, g)| w != g) {
                return Err(WhirCircuitError::ShapeMismatch("leaf size", *w, *g));
            }
            if let Some((w, g)) = want
                .chain_lengths
                .iter()
                .zip(&got.chain_lengths)
                .find(|(w, g)| w != g)
            {
                return Err(WhirCircuitError::ShapeMismatch("sibling chain", *w, *g));
            }
        }
        Ok(())
    }
}
