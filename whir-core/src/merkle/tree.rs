use ark_ff::PrimeField;
use common::proof::{KeccakDigest, MultiPath};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{hash_leaf, hash_nodes};

/// A complete binary tree; `levels[0]` are the leaf digests and the last
/// level holds the root.
pub struct MerkleTree {
    levels: Vec<Vec<KeccakDigest>>,
}

impl MerkleTree {
    #[tracing::instrument(skip_all, name = "MerkleTree::new")]
    pub fn new<F: PrimeField>(leaves: &[Vec<F>]) -> Self {
        assert!(leaves.len().is_power_of_two() && leaves.len() > 1);

        #[cfg(feature = "parallel")]
        let leaf_digests: Vec<KeccakDigest> = leaves.par_iter().map(|leaf| hash_leaf(leaf)).collect();
        #[cfg(not(feature = "parallel"))]
        let leaf_digests: Vec<KeccakDigest> = leaves.iter().map(|leaf| hash_leaf(leaf)).collect();

        let mut levels = vec![leaf_digests];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next = level
                .chunks_exact(2)
                .map(|pair| hash_nodes(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    pub fn root(&self) -> KeccakDigest {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Siblings of leaf `index`, from the leaf level up.
    pub fn sibling_chain(&self, index: usize) -> Vec<KeccakDigest> {
        (0..self.height())
            .map(|level| self.levels[level][(index >> level) ^ 1])
            .collect()
    }

    /// Opens `indices` in the given order, delta-encoding each path against the
    /// previous one.
    pub fn multi_path(&self, indices: &[usize]) -> MultiPath {
        let mut path = MultiPath::default();
        let mut previous: Vec<KeccakDigest> = Vec::new();
        for &index in indices {
            let chain = self.sibling_chain(index);
            // root-to-leaf, without the leaf's own sibling
            let auth_path: Vec<KeccakDigest> = chain[1..].iter().rev().copied().collect();
            let shared = previous
                .iter()
                .zip(&auth_path)
                .take_while(|(a, b)| a == b)
                .count();

            path.leaf_indexes.push(index as u64);
            path.leaf_siblings_hashes.push(chain[0]);
            path.auth_paths_prefix_lengths.push(shared);
            path.auth_paths_suffixes.push(auth_path[shared..].to_vec());
            previous = auth_path;
        }
        path
    }
}
