//! Merkle openings produced alongside a WHIR transcript.

use serde::{Deserialize, Serialize};

use crate::constants::DIGEST_BYTES;

/// A field element as four little-endian 64-bit limbs. The integer is reduced
/// modulo the field's modulus when it is read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fp256 {
    pub limbs: [u64; 4],
}

impl Fp256 {
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(self.limbs) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
        }
        Self { limbs }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeccakDigest(pub [u8; DIGEST_BYTES]);

impl AsRef<[u8]> for KeccakDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Authentication data for a batch of leaves of one tree.
///
/// Each leaf's path is split into the sibling of the leaf itself and the
/// remaining siblings ordered from the root down. Consecutive paths are
/// delta-encoded: path `j` keeps the first `auth_paths_prefix_lengths[j]`
/// nodes of path `j - 1` and appends `auth_paths_suffixes[j]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPath {
    pub leaf_indexes: Vec<u64>,
    pub leaf_siblings_hashes: Vec<KeccakDigest>,
    pub auth_paths_prefix_lengths: Vec<usize>,
    pub auth_paths_suffixes: Vec<Vec<KeccakDigest>>,
}

/// Opened leaves of one committed tree together with their multi-path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeOpening {
    pub path: MultiPath,
    /// `leaves[q]` holds the field elements of the leaf at `path.leaf_indexes[q]`.
    pub leaves: Vec<Vec<Fp256>>,
}

/// All openings of one proof: the initial commitment first, then one tree per
/// folding round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMaterial {
    pub openings: Vec<TreeOpening>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limbs_are_little_endian() {
        let x = Fp256 {
            limbs: [0x0102030405060708, 0, 0, 0x8000000000000000],
        };
        let bytes = x.to_le_bytes();
        assert_eq!(bytes[0], 0x08);
        assert_eq!(bytes[7], 0x01);
        assert_eq!(bytes[31], 0x80);
        assert_eq!(Fp256::from_le_bytes(&bytes), x);
    }
}
