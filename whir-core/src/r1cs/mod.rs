//! Interned sparse R1CS instances.
//!
//! Matrix coefficients live once in an [`Interner`] arena; matrices only hold
//! [`InternedValue`] handles into it.

pub mod sparse;

use ark_ff::PrimeField;
use common::r1cs::InternedR1cs;

use crate::{
    field::{field_to_fp256, fp256_to_field},
    utils::errors::WhirCircuitError,
};
pub use sparse::{InternedValue, SparseMatrix};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interner<F> {
    values: Vec<F>,
}

impl<F: PrimeField> Interner<F> {
    pub fn new(values: Vec<F>) -> Self {
        Self { values }
    }

    /// Returns the handle of `value`, adding it to the pool if needed.
    pub fn intern(&mut self, value: F) -> InternedValue {
        match self.values.iter().position(|v| *v == value) {
            Some(index) => InternedValue(index),
            None => {
                self.values.push(value);
                InternedValue(self.values.len() - 1)
            }
        }
    }

    pub fn get(&self, value: InternedValue) -> Option<F> {
        self.values.get(value.0).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct R1cs<F> {
    pub num_constraints: usize,
    pub num_witnesses: usize,
    pub interner: Interner<F>,
    pub a: SparseMatrix,
    pub b: SparseMatrix,
    pub c: SparseMatrix,
}

impl<F: PrimeField> R1cs<F> {
    pub fn from_interned(r1cs: &InternedR1cs) -> Result<Self, WhirCircuitError> {
        let interner = Interner::new(r1cs.interner.iter().map(fp256_to_field).collect());
        let convert = |name: &'static str, m: &common::r1cs::InternedMatrix| {
            SparseMatrix::new(
                name,
                m.num_rows,
                m.num_cols,
                m.row_indices.clone(),
                m.col_indices.clone(),
                m.values.iter().copied().map(InternedValue).collect(),
            )
        };
        let instance = Self {
            num_constraints: r1cs.num_constraints,
            num_witnesses: r1cs.num_witnesses,
            a: convert("A", &r1cs.a)?,
            b: convert("B", &r1cs.b)?,
            c: convert("C", &r1cs.c)?,
            interner,
        };
        instance.validate()?;
        Ok(instance)
    }

    pub fn to_interned(&self) -> InternedR1cs {
        let convert = |m: &SparseMatrix| common::r1cs::InternedMatrix {
            num_rows: m.num_rows,
            num_cols: m.num_cols,
            row_indices: m.row_indices().to_vec(),
            col_indices: m.col_indices().to_vec(),
            values: m.values().iter().map(|v| v.0).collect(),
        };
        InternedR1cs {
            num_constraints: self.num_constraints,
            num_witnesses: self.num_witnesses,
            interner: self.interner.values.iter().map(field_to_fp256).collect(),
            a: convert(&self.a),
            b: convert(&self.b),
            c: convert(&self.c),
        }
    }

    pub fn validate(&self) -> Result<(), WhirCircuitError> {
        for (name, matrix) in self.matrices() {
            if matrix.num_rows != self.num_constraints || matrix.num_cols != self.num_witnesses {
                return Err(WhirCircuitError::MalformedMatrix(
                    name,
                    format!(
                        "{}x{} matrix for {} constraints over {} witnesses",
                        matrix.num_rows, matrix.num_cols, self.num_constraints, self.num_witnesses
                    ),
                ));
            }
            for (_, _, value) in matrix.iter() {
                if value.0 >= self.interner.len() {
                    return Err(WhirCircuitError::InternerIndexOutOfRange(value.0, self.interner.len()));
                }
            }
        }
        Ok(())
    }

    pub fn matrices(&self) -> [(&'static str, &SparseMatrix); 3] {
        [("A", &self.a), ("B", &self.b), ("C", &self.c)]
    }

    /// `(Az, Bz, Cz)`, each padded to `num_rows` entries.
    pub fn multiply(&self, z: &[F], num_rows: usize) -> [Vec<F>; 3] {
        [&self.a, &self.b, &self.c].map(|m| m.mul_vector(&self.interner, z, num_rows))
    }

    pub fn is_satisfied(&self, z: &[F]) -> bool {
        let [az, bz, cz] = self.multiply(z, self.num_constraints);
        az.iter().zip(&bz).zip(&cz).all(|((a, b), c)| *a * b == *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use common::r1cs::InternedMatrix;

    #[test]
    fn interning_deduplicates() {
        let mut interner = Interner::<Fr>::default();
        let one = interner.intern(Fr::from(1u64));
        let two = interner.intern(Fr::from(2u64));
        assert_eq!(interner.intern(Fr::from(1u64)), one);
        assert_ne!(one, two);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn toy_instance_survives_interning() {
        let (r1cs, mut z) = crate::testing::toy_r1cs::<Fr>();
        assert!(r1cs.is_satisfied(&z));
        let reloaded = R1cs::<Fr>::from_interned(&r1cs.to_interned()).unwrap();
        assert_eq!(reloaded, r1cs);
        z[1] += Fr::from(1u64);
        assert!(!r1cs.is_satisfied(&z));
    }

    #[test]
    fn out_of_range_interned_value_is_rejected() {
        let matrix = InternedMatrix {
            num_rows: 1,
            num_cols: 2,
            row_indices: vec![0],
            col_indices: vec![0],
            values: vec![5],
        };
        let r1cs = InternedR1cs {
            num_constraints: 1,
            num_witnesses: 2,
            interner: vec![common::proof::Fp256::default()],
            a: matrix.clone(),
            b: matrix.clone(),
            c: matrix,
        };
        assert!(matches!(
            R1cs::<Fr>::from_interned(&r1cs),
            Err(WhirCircuitError::InternerIndexOutOfRange(5, 1))
        ));
    }
}
