//! Merkle inclusion gadgets mirroring [`crate::merkle`].

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use itertools::izip;

use super::{
    bytes::{fp_to_le_bytes, le_bits_to_fp, witness_bytes, ByteVar},
    keccak::keccak256,
};
use crate::merkle::QueryOpening;

pub fn hash_leaf<F: PrimeField>(values: &[FpVar<F>]) -> Result<Vec<ByteVar<F>>, SynthesisError> {
    let mut message = Vec::new();
    for value in values {
        message.extend(fp_to_le_bytes(value)?);
    }
    Ok(keccak256(&message))
}

pub fn hash_nodes<F: PrimeField>(left: &[ByteVar<F>], right: &[ByteVar<F>]) -> Vec<ByteVar<F>> {
    let message: Vec<ByteVar<F>> = left.iter().chain(right).cloned().collect();
    keccak256(&message)
}

fn select_digest<F: PrimeField>(
    cond: &Boolean<F>,
    if_true: &[ByteVar<F>],
    if_false: &[ByteVar<F>],
) -> Result<Vec<ByteVar<F>>, SynthesisError> {
    if_true
        .iter()
        .zip(if_false)
        .map(|(t, f)| {
            t.iter()
                .zip(f)
                .map(|(t, f)| Boolean::conditionally_select(cond, t, f))
                .collect::<Result<ByteVar<F>, _>>()
        })
        .collect()
}

/// Walks from `leaf` to the root; `index_bits[i]` puts the node on the right
/// of `chain[i]` when set.
pub fn compute_root<F: PrimeField>(
    leaf: Vec<ByteVar<F>>,
    index_bits: &[Boolean<F>],
    chain: &[Vec<ByteVar<F>>],
) -> Result<Vec<ByteVar<F>>, SynthesisError> {
    if index_bits.len() != chain.len() {
        return Err(SynthesisError::Unsatisfiable);
    }
    let mut node = leaf;
    for (bit, sibling) in index_bits.iter().zip(chain) {
        let left = select_digest(bit, sibling, &node)?;
        let right = select_digest(bit, &node, sibling)?;
        node = hash_nodes(&left, &right);
    }
    Ok(node)
}

pub fn enforce_digest_equal<F: PrimeField>(a: &[ByteVar<F>], b: &[ByteVar<F>]) -> Result<(), SynthesisError> {
    if a.len() != b.len() || a.iter().zip(b).any(|(x, y)| x.len() != y.len()) {
        return Err(SynthesisError::Unsatisfiable);
    }
    for (x, y) in a.iter().flatten().zip(b.iter().flatten()) {
        x.enforce_equal(y)?;
    }
    Ok(())
}

/// Witness side of a [`QueryOpening`].
pub struct OpeningVar<F: PrimeField> {
    pub leaf_indexes: Vec<FpVar<F>>,
    pub leaves: Vec<Vec<FpVar<F>>>,
    pub sibling_chains: Vec<Vec<Vec<ByteVar<F>>>>,
}

impl<F: PrimeField> OpeningVar<F> {
    pub fn new_witness(cs: ConstraintSystemRef<F>, opening: &QueryOpening<F>) -> Result<Self, SynthesisError> {
        let leaf_indexes: Vec<FpVar<F>> = opening
            .leaf_indexes
            .iter()
            .map(|index| FpVar::new_witness(cs.clone(), || Ok(F::from(*index as u64))))
            .collect::<Result<_, _>>()?;
        let leaves: Vec<Vec<FpVar<F>>> = opening
            .leaves
            .iter()
            .map(|leaf| {
                leaf.iter()
                    .map(|value| FpVar::new_witness(cs.clone(), || Ok(*value)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<_, _>>()?;
        let sibling_chains: Vec<Vec<Vec<ByteVar<F>>>> = opening
            .sibling_chains
            .iter()
            .map(|chain| {
                chain
                    .iter()
                    .map(|digest| witness_bytes(cs.clone(), &digest.0))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            leaf_indexes,
            leaves,
            sibling_chains,
        })
    }

    pub fn num_queries(&self) -> usize {
        self.leaves.len()
    }

    /// Enforces that every claimed index equals the transcript-derived one
    /// and that every leaf hashes up to `root`.
    #[tracing::instrument(skip_all, name = "OpeningVar::verify")]
    pub fn verify(&self, root: &[ByteVar<F>], index_bits: &[Vec<Boolean<F>>]) -> Result<(), SynthesisError> {
        if index_bits.len() != self.num_queries() {
            tracing::error!(
                derived = index_bits.len(),
                opened = self.num_queries(),
                "query count mismatch"
            );
            return Err(SynthesisError::Unsatisfiable);
        }
        for (bits, claimed, leaf, chain) in izip!(
            index_bits,
            &self.leaf_indexes,
            &self.leaves,
            &self.sibling_chains
        ) {
            claimed.enforce_equal(&le_bits_to_fp(bits))?;
            let computed = compute_root(hash_leaf(leaf)?, bits, chain)?;
            enforce_digest_equal(&computed, root)?;
        }
        Ok(())
    }
}
