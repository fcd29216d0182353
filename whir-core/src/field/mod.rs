//! Byte encodings of field elements shared by the sponge, the Merkle hashes
//! and their in-circuit counterparts in [`crate::circuits::bytes`].

use ark_ff::{BigInteger, PrimeField};
use common::proof::Fp256;

use crate::utils::errors::WhirCircuitError;

/// Wire width of a prover scalar.
pub fn scalar_bytes<F: PrimeField>() -> usize {
    (F::MODULUS_BIT_SIZE as usize).div_ceil(8)
}

/// Squeezed bytes per verifier challenge. The 128 extra bits make the bias of
/// the modular reduction negligible.
pub fn challenge_bytes<F: PrimeField>() -> usize {
    (F::MODULUS_BIT_SIZE as usize + 128).div_ceil(8)
}

/// Bytes per field element when packing public inputs.
pub fn packing_bytes<F: PrimeField>() -> usize {
    ((F::MODULUS_BIT_SIZE - 1) / 8) as usize
}

/// Canonical little-endian encoding, `scalar_bytes::<F>()` long.
pub fn scalar_to_bytes<F: PrimeField>(x: &F) -> Vec<u8> {
    let mut bytes = x.into_bigint().to_bytes_le();
    bytes.resize(scalar_bytes::<F>(), 0);
    bytes
}

pub fn scalar_from_bytes<F: PrimeField>(bytes: &[u8]) -> F {
    F::from_le_bytes_mod_order(bytes)
}

pub fn challenge_from_bytes<F: PrimeField>(bytes: &[u8]) -> F {
    F::from_be_bytes_mod_order(bytes)
}

/// Interprets `bytes` as a big-endian integer and keeps its low `height` bits.
pub fn index_from_bytes(bytes: &[u8], height: usize) -> usize {
    let value = bytes
        .iter()
        .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte));
    if height >= 64 {
        value as usize
    } else {
        (value & ((1u128 << height) - 1)) as usize
    }
}

/// Packs bytes into field elements, little-endian within each chunk of
/// [`packing_bytes`] bytes. This is the layout of the circuit's public
/// transcript input.
pub fn pack_bytes<F: PrimeField>(bytes: &[u8]) -> Vec<F> {
    bytes
        .chunks(packing_bytes::<F>())
        .map(F::from_le_bytes_mod_order)
        .collect()
}

pub fn fp256_to_field<F: PrimeField>(x: &Fp256) -> F {
    F::from_le_bytes_mod_order(&x.to_le_bytes())
}

pub fn field_to_fp256<F: PrimeField>(x: &F) -> Fp256 {
    let mut bytes = [0u8; 32];
    let encoded = x.into_bigint().to_bytes_le();
    let len = encoded.len().min(32);
    bytes[..len].copy_from_slice(&encoded[..len]);
    Fp256::from_le_bytes(&bytes)
}

pub fn parse_decimal<F: PrimeField>(s: &str) -> Result<F, WhirCircuitError> {
    F::from_str(s.trim()).map_err(|_| WhirCircuitError::InvalidFieldElement(s.to_string()))
}

pub fn to_decimal<F: PrimeField>(x: &F) -> String {
    x.into_bigint().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_ff::{Field, One};

    #[test]
    fn widths_for_bn254() {
        assert_eq!(scalar_bytes::<Fr>(), 32);
        assert_eq!(challenge_bytes::<Fr>(), 48);
        assert_eq!(packing_bytes::<Fr>(), 31);
    }

    #[test]
    fn scalar_encoding_is_little_endian() {
        let bytes = scalar_to_bytes(&Fr::from(0x0102u64));
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..3], &[0x02, 0x01, 0x00]);
        assert_eq!(scalar_from_bytes::<Fr>(&bytes), Fr::from(0x0102u64));
    }

    #[test]
    fn oversized_scalars_reduce() {
        let minus_one = -Fr::one();
        let mut bytes = scalar_to_bytes(&minus_one);
        // p - 1 + p wraps back to p - 1
        let p_bytes = Fr::MODULUS.to_bytes_le();
        let mut carry = 0u16;
        for (b, p) in bytes.iter_mut().zip(p_bytes) {
            let sum = u16::from(*b) + u16::from(p) + carry;
            *b = sum as u8;
            carry = sum >> 8;
        }
        assert_eq!(carry, 0);
        assert_eq!(scalar_from_bytes::<Fr>(&bytes), minus_one);
    }

    #[test]
    fn challenges_are_big_endian() {
        let mut bytes = vec![0u8; challenge_bytes::<Fr>()];
        *bytes.last_mut().unwrap() = 3;
        let idx = bytes.len() - 2;
        bytes[idx] = 1;
        assert_eq!(challenge_from_bytes::<Fr>(&bytes), Fr::from(259u64));
    }

    #[test]
    fn index_keeps_low_bits() {
        assert_eq!(index_from_bytes(&[0xff], 3), 7);
        assert_eq!(index_from_bytes(&[0x01, 0x02], 9), 0x102);
        assert_eq!(index_from_bytes(&[0x03, 0x02], 9), 0x102);
        assert_eq!(index_from_bytes(&[], 0), 0);
    }

    #[test]
    fn limb_and_decimal_conversions() {
        let x = Fr::from(5u64).pow([77u64]);
        assert_eq!(fp256_to_field::<Fr>(&field_to_fp256(&x)), x);
        assert_eq!(parse_decimal::<Fr>(&to_decimal(&x)).unwrap(), x);
        assert_eq!(parse_decimal::<Fr>("0").unwrap(), Fr::from(0u64));
        assert!(parse_decimal::<Fr>("12a").is_err());
    }

    #[test]
    fn packing_uses_31_byte_chunks() {
        let bytes: Vec<u8> = (0..40).collect();
        let packed = pack_bytes::<Fr>(&bytes);
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[1], Fr::from_le_bytes_mod_order(&bytes[31..]));
    }
}
