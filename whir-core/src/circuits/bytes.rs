use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_r1cs_std::uint8::UInt8;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::field::scalar_bytes;

/// A byte as eight little-endian bits.
pub type ByteVar<F> = Vec<Boolean<F>>;

pub fn constant_bytes<F: PrimeField>(bytes: &[u8]) -> Vec<ByteVar<F>> {
    bytes
        .iter()
        .map(|byte| (0..8).map(|i| Boolean::constant((byte >> i) & 1 == 1)).collect())
        .collect()
}

pub fn witness_bytes<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    bytes: &[u8],
) -> Result<Vec<ByteVar<F>>, SynthesisError> {
    bytes
        .iter()
        .map(|byte| {
            (0..8)
                .map(|i| Boolean::new_witness(cs.clone(), || Ok((byte >> i) & 1 == 1)))
                .collect::<Result<ByteVar<F>, _>>()
        })
        .collect()
}

/// Allocates `bytes` as public input. They are packed into field elements
/// exactly as [`crate::field::pack_bytes`] does.
pub fn input_bytes<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    bytes: &[u8],
) -> Result<Vec<ByteVar<F>>, SynthesisError> {
    UInt8::new_input_vec(cs, bytes)?
        .iter()
        .map(|byte| byte.to_bits_le())
        .collect()
}

/// `Σ_i bits[i] 2^i`, reduced mod p. Linear, so free.
pub fn le_bits_to_fp<F: PrimeField>(bits: &[Boolean<F>]) -> FpVar<F> {
    let mut acc = FpVar::zero();
    let mut coeff = F::one();
    for bit in bits {
        acc += FpVar::from(bit.clone()) * coeff;
        coeff.double_in_place();
    }
    acc
}

/// Little-endian bytes to a field element, as `F::from_le_bytes_mod_order`.
pub fn le_bytes_to_fp<F: PrimeField>(bytes: &[ByteVar<F>]) -> FpVar<F> {
    let bits: Vec<Boolean<F>> = bytes.iter().flatten().cloned().collect();
    le_bits_to_fp(&bits)
}

/// Big-endian bytes to a field element, as `F::from_be_bytes_mod_order`.
pub fn be_bytes_to_fp<F: PrimeField>(bytes: &[ByteVar<F>]) -> FpVar<F> {
    let bits: Vec<Boolean<F>> = bytes.iter().rev().flatten().cloned().collect();
    le_bits_to_fp(&bits)
}

/// The low `height` bits (little-endian) of a big-endian byte string.
pub fn be_bytes_to_index_bits<F: PrimeField>(bytes: &[ByteVar<F>], height: usize) -> Vec<Boolean<F>> {
    bytes.iter().rev().flatten().take(height).cloned().collect()
}

/// Canonical little-endian encoding of `x`, `scalar_bytes::<F>()` bytes long.
pub fn fp_to_le_bytes<F: PrimeField>(x: &FpVar<F>) -> Result<Vec<ByteVar<F>>, SynthesisError> {
    let mut bits = x.to_bits_le()?;
    bits.resize(8 * scalar_bytes::<F>(), Boolean::constant(false));
    Ok(bits.chunks(8).map(|byte| byte.to_vec()).collect())
}

/// Reads bytes back out of their bit decomposition.
pub fn byte_values<F: PrimeField>(bytes: &[ByteVar<F>]) -> Result<Vec<u8>, SynthesisError> {
    bytes
        .iter()
        .map(|bits| {
            bits.iter().enumerate().try_fold(0u8, |acc, (i, bit)| {
                Ok::<u8, SynthesisError>(acc | (u8::from(bit.value()?) << i))
            })
        })
        .collect()
}
