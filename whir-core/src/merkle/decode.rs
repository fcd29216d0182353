use ark_ff::PrimeField;
use common::proof::{KeccakDigest, TreeOpening};

use crate::{field::fp256_to_field, utils::errors::WhirCircuitError};

/// Undoes the prefix compression of a multi-path. Returns one root-to-leaf
/// authentication path per opened leaf.
pub fn expand_auth_paths(
    prefix_lengths: &[usize],
    suffixes: &[Vec<KeccakDigest>],
) -> Result<Vec<Vec<KeccakDigest>>, WhirCircuitError> {
    if prefix_lengths.len() != suffixes.len() {
        return Err(WhirCircuitError::MerkleDecode(format!(
            "{} prefix lengths for {} suffixes",
            prefix_lengths.len(),
            suffixes.len()
        )));
    }
    let mut paths: Vec<Vec<KeccakDigest>> = Vec::with_capacity(suffixes.len());
    for (j, (prefix_len, suffix)) in prefix_lengths.iter().zip(suffixes).enumerate() {
        let previous: &[KeccakDigest] = paths.last().map(Vec::as_slice).unwrap_or(&[]);
        if *prefix_len > previous.len() {
            return Err(WhirCircuitError::MerkleDecode(format!(
                "path {j} reuses {prefix_len} nodes of a {}-node path",
                previous.len()
            )));
        }
        let mut path = previous[..*prefix_len].to_vec();
        path.extend_from_slice(suffix);
        paths.push(path);
    }
    Ok(paths)
}

/// Opened leaves of one tree with fully materialized sibling chains, ready
/// to be hashed natively or allocated in the circuit.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryOpening<F> {
    pub leaf_indexes: Vec<usize>,
    pub leaves: Vec<Vec<F>>,
    /// `sibling_chains[q][i]` is the sibling at height `i` on the path of query `q`.
    pub sibling_chains: Vec<Vec<KeccakDigest>>,
}

impl<F: PrimeField> QueryOpening<F> {
    #[tracing::instrument(skip_all, name = "QueryOpening::decode")]
    pub fn decode(opening: &TreeOpening, height: usize) -> Result<Self, WhirCircuitError> {
        let path = &opening.path;
        let num_queries = path.leaf_indexes.len();
        if path.leaf_siblings_hashes.len() != num_queries {
            return Err(WhirCircuitError::MerkleDecode(format!(
                "{} leaf siblings for {num_queries} leaves",
                path.leaf_siblings_hashes.len()
            )));
        }
        if opening.leaves.len() != num_queries {
            return Err(WhirCircuitError::MerkleDecode(format!(
                "{} opened leaves for {num_queries} indices",
                opening.leaves.len()
            )));
        }

        let auth_paths = expand_auth_paths(&path.auth_paths_prefix_lengths, &path.auth_paths_suffixes)?;
        let mut sibling_chains = Vec::with_capacity(num_queries);
        for (q, (leaf_sibling, auth_path)) in path.leaf_siblings_hashes.iter().zip(auth_paths).enumerate() {
            if auth_path.len() + 1 != height {
                return Err(WhirCircuitError::MerkleDecode(format!(
                    "path {q} has {} nodes in a tree of height {height}",
                    auth_path.len() + 1
                )));
            }
            let mut chain = Vec::with_capacity(height);
            chain.push(*leaf_sibling);
            chain.extend(auth_path.into_iter().rev());
            sibling_chains.push(chain);
        }

        let mut leaf_indexes = Vec::with_capacity(num_queries);
        for index in &path.leaf_indexes {
            if height < 64 && *index >> height != 0 {
                return Err(WhirCircuitError::MerkleDecode(format!(
                    "leaf index {index} outside a tree of height {height}"
                )));
            }
            leaf_indexes.push(*index as usize);
        }

        Ok(Self {
            leaf_indexes,
            leaves: opening
                .leaves
                .iter()
                .map(|leaf| leaf.iter().map(fp256_to_field).collect())
                .collect(),
            sibling_chains,
        })
    }

    /// All-zero opening with the given shape, used to build the circuit for
    /// key generation.
    pub fn placeholder(num_queries: usize, leaf_size: usize, height: usize) -> Self {
        Self {
            leaf_indexes: vec![0; num_queries],
            leaves: vec![vec![F::zero(); leaf_size]; num_queries],
            sibling_chains: vec![vec![KeccakDigest::default(); height]; num_queries],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::{compute_root, hash_leaf, MerkleTree};
    use ark_bn254::Fr;
    use common::proof::{Fp256, MultiPath};

    fn d(byte: u8) -> KeccakDigest {
        KeccakDigest([byte; 32])
    }

    #[test]
    fn prefix_expansion_matches_flat_paths() {
        // height 4: three auth nodes per path below the root
        let flat = vec![
            vec![d(0xa0), d(0xb0), d(0xc0)],
            vec![d(0xa0), d(0xb1), d(0xc1)],
            vec![d(0xa0), d(0xb1), d(0xc2)],
        ];
        let prefix_lengths = vec![0, 1, 2];
        let suffixes = vec![
            vec![d(0xa0), d(0xb0), d(0xc0)],
            vec![d(0xb1), d(0xc1)],
            vec![d(0xc2)],
        ];
        assert_eq!(expand_auth_paths(&prefix_lengths, &suffixes).unwrap(), flat);
    }

    #[test]
    fn prefix_longer_than_previous_path_is_rejected() {
        let suffixes = vec![vec![d(1)], vec![d(2)]];
        assert!(matches!(
            expand_auth_paths(&[0, 2], &suffixes),
            Err(WhirCircuitError::MerkleDecode(_))
        ));
    }

    #[test]
    fn decoded_chains_verify_against_the_tree() {
        let leaves: Vec<Vec<Fr>> = (0..16u64).map(|i| vec![Fr::from(i + 100)]).collect();
        let tree = MerkleTree::new(&leaves);
        let indices = [3usize, 2, 9];
        let opening = TreeOpening {
            path: tree.multi_path(&indices),
            leaves: indices
                .iter()
                .map(|i| vec![crate::field::field_to_fp256(&leaves[*i][0])])
                .collect(),
        };
        let decoded = QueryOpening::<Fr>::decode(&opening, 4).unwrap();
        for (q, index) in decoded.leaf_indexes.iter().enumerate() {
            assert_eq!(decoded.sibling_chains[q], tree.sibling_chain(*index));
            let root = compute_root(hash_leaf(&decoded.leaves[q]), *index, &decoded.sibling_chains[q]);
            assert_eq!(root, tree.root());
        }
    }

    #[test]
    fn wrong_height_is_a_decode_error() {
        let opening = TreeOpening {
            path: MultiPath {
                leaf_indexes: vec![1],
                leaf_siblings_hashes: vec![d(1)],
                auth_paths_prefix_lengths: vec![0],
                auth_paths_suffixes: vec![vec![d(2)]],
            },
            leaves: vec![vec![Fp256::default()]],
        };
        assert!(QueryOpening::<Fr>::decode(&opening, 2).is_ok());
        assert!(QueryOpening::<Fr>::decode(&opening, 3).is_err());
    }
}
