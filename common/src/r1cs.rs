//! Interned R1CS instance in compressed-sparse-row form.

use serde::{Deserialize, Serialize};

use crate::proof::Fp256;

/// CSR matrix whose `values` are indices into [`InternedR1cs::interner`].
///
/// Row `i` spans `row_indices[i]..row_indices[i + 1]`, the last row runs to the
/// end of `values`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternedMatrix {
    pub num_rows: usize,
    pub num_cols: usize,
    pub row_indices: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternedR1cs {
    pub num_constraints: usize,
    pub num_witnesses: usize,
    /// Shared pool of matrix coefficients.
    pub interner: Vec<Fp256>,
    pub a: InternedMatrix,
    pub b: InternedMatrix,
    pub c: InternedMatrix,
}
