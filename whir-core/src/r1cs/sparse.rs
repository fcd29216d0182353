use ark_ff::PrimeField;

use super::Interner;
use crate::utils::errors::WhirCircuitError;

/// Handle into an [`Interner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InternedValue(pub usize);

/// Compressed-sparse-row matrix over interned coefficients.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseMatrix {
    pub num_rows: usize,
    pub num_cols: usize,
    row_indices: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<InternedValue>,
}

impl SparseMatrix {
    pub fn new(
        name: &'static str,
        num_rows: usize,
        num_cols: usize,
        row_indices: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<InternedValue>,
    ) -> Result<Self, WhirCircuitError> {
        let malformed = |msg: String| Err(WhirCircuitError::MalformedMatrix(name, msg));
        if row_indices.len() != num_rows {
            return malformed(format!("{} row pointers for {num_rows} rows", row_indices.len()));
        }
        if col_indices.len() != values.len() {
            return malformed(format!(
                "{} column indices for {} values",
                col_indices.len(),
                values.len()
            ));
        }
        if row_indices.windows(2).any(|w| w[0] > w[1]) {
            return malformed("row pointers decrease".to_string());
        }
        if row_indices.last().is_some_and(|last| *last > values.len()) {
            return malformed("row pointer past the end of the values".to_string());
        }
        if let Some(col) = col_indices.iter().find(|col| **col >= num_cols) {
            return malformed(format!("column {col} out of {num_cols}"));
        }
        Ok(Self {
            num_rows,
            num_cols,
            row_indices,
            col_indices,
            values,
        })
    }

    /// Builds a matrix from `(row, col, value)` entries sorted by row.
    pub fn from_entries<F: PrimeField>(
        name: &'static str,
        num_rows: usize,
        num_cols: usize,
        entries: &[(usize, usize, F)],
        interner: &mut Interner<F>,
    ) -> Result<Self, WhirCircuitError> {
        let mut row_indices = Vec::with_capacity(num_rows);
        let mut next = 0;
        for row in 0..num_rows {
            while next < entries.len() && entries[next].0 < row {
                next += 1;
            }
            row_indices.push(next);
        }
        Self::new(
            name,
            num_rows,
            num_cols,
            row_indices,
            entries.iter().map(|(_, col, _)| *col).collect(),
            entries.iter().map(|(_, _, value)| interner.intern(*value)).collect(),
        )
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    pub fn values(&self) -> &[InternedValue] {
        &self.values
    }

    /// Entries of row `row`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, InternedValue)> + '_ {
        let start = self.row_indices[row];
        let end = self
            .row_indices
            .get(row + 1)
            .copied()
            .unwrap_or(self.values.len());
        self.col_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// All `(row, col, value)` entries in row order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, InternedValue)> + '_ {
        (0..self.num_rows).flat_map(move |row| self.row(row).map(move |(col, value)| (row, col, value)))
    }

    pub fn mul_vector<F: PrimeField>(&self, interner: &Interner<F>, z: &[F], num_rows: usize) -> Vec<F> {
        let mut out = vec![F::zero(); num_rows.max(self.num_rows)];
        for (row, col, value) in self.iter() {
            if let (Some(v), Some(z_col)) = (interner.get(value), z.get(col)) {
                out[row] += v * z_col;
            }
        }
        out
    }

    /// `Σ_row weights[row] M[row][col]` for every column, `num_cols` entries padded.
    pub fn weighted_column_sums<F: PrimeField>(
        &self,
        interner: &Interner<F>,
        row_weights: &[F],
        num_cols: usize,
    ) -> Vec<F> {
        let mut out = vec![F::zero(); num_cols.max(self.num_cols)];
        for (row, col, value) in self.iter() {
            if let Some(v) = interner.get(value) {
                out[col] += v * row_weights[row];
            }
        }
        out
    }

    /// `Σ_{(row, col, v)} v · row_weights[row] · col_weights[col]`.
    pub fn bilinear_form<F: PrimeField>(&self, interner: &Interner<F>, row_weights: &[F], col_weights: &[F]) -> F {
        (0..self.num_rows)
            .map(|row| {
                let inner: F = self
                    .row(row)
                    .filter_map(|(col, value)| interner.get(value).map(|v| v * col_weights[col]))
                    .sum();
                inner * row_weights[row]
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    #[test]
    fn csr_rows_and_products() {
        let mut interner = Interner::default();
        let entries = [
            (0, 1, Fr::from(2u64)),
            (0, 2, Fr::from(3u64)),
            (2, 0, Fr::from(2u64)),
        ];
        let m = SparseMatrix::from_entries("A", 3, 3, &entries, &mut interner).unwrap();
        assert_eq!(m.row_indices(), &[0, 2, 2]);
        assert_eq!(interner.len(), 2);
        assert_eq!(m.row(1).count(), 0);
        assert_eq!(m.row(2).collect::<Vec<_>>(), vec![(0, InternedValue(0))]);

        let z = [1u64, 10, 100].map(Fr::from);
        assert_eq!(
            m.mul_vector(&interner, &z, 4),
            vec![Fr::from(320u64), Fr::from(0u64), Fr::from(2u64), Fr::from(0u64)]
        );

        let rows = [1u64, 5, 7].map(Fr::from);
        let cols = [1u64, 2, 3].map(Fr::from);
        // 2*2 + 3*3 from row 0, 2*1*7 from row 2
        assert_eq!(m.bilinear_form(&interner, &rows, &cols), Fr::from(27u64));
        let sums = m.weighted_column_sums(&interner, &rows, 3);
        let dot: Fr = sums.iter().zip(cols).map(|(s, c)| *s * c).sum();
        assert_eq!(dot, Fr::from(27u64));
    }

    #[test]
    fn decreasing_row_pointers_are_rejected() {
        let err = SparseMatrix::new("B", 2, 2, vec![1, 0], vec![0], vec![InternedValue(0)]);
        assert!(matches!(err, Err(WhirCircuitError::MalformedMatrix("B", _))));
    }
}
