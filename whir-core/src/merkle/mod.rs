//! Keccak-256 Merkle trees over field-element leaves.
//!
//! Leaves hash the concatenated canonical little-endian encodings of their
//! field elements; inner nodes hash `left || right`. Paths are decoded into
//! full sibling chains ([`decode`]) before any hashing happens, so that the
//! delta encoding of [`common::proof::MultiPath`] and the inclusion check can
//! be tested separately.

pub mod decode;
pub mod tree;

use ark_ff::PrimeField;
use common::proof::KeccakDigest;
use sha3::{Digest, Keccak256};

use crate::field::scalar_to_bytes;

pub use decode::{expand_auth_paths, QueryOpening};
pub use tree::MerkleTree;

pub fn hash_leaf<F: PrimeField>(values: &[F]) -> KeccakDigest {
    let mut hasher = Keccak256::new();
    for value in values {
        hasher.update(scalar_to_bytes(value));
    }
    KeccakDigest(hasher.finalize().into())
}

pub fn hash_nodes(left: &KeccakDigest, right: &KeccakDigest) -> KeccakDigest {
    KeccakDigest(
        Keccak256::new()
            .chain_update(left.0)
            .chain_update(right.0)
            .finalize()
            .into(),
    )
}

/// Walks from `leaf` to the root. `chain[i]` is the sibling at height `i`.
pub fn compute_root(leaf: KeccakDigest, index: usize, chain: &[KeccakDigest]) -> KeccakDigest {
    chain.iter().enumerate().fold(leaf, |node, (level, sibling)| {
        if (index >> level) & 1 == 0 {
            hash_nodes(&node, sibling)
        } else {
            hash_nodes(sibling, &node)
        }
    })
}
