//! Keccak-f[1600] and Keccak-256 over boolean lanes.
//!
//! XOR and NOT against constants are free; a permutation on fully allocated
//! input costs one constraint per bit for every XOR and AND of θ and χ.

use ark_ff::PrimeField;
use ark_r1cs_std::prelude::*;
use common::constants::{DIGEST_BYTES, KECCAK_LANES, KECCAK_RATE};

use super::bytes::{constant_bytes, ByteVar};

/// A 64-bit lane, least significant bit first.
pub type LaneVar<F> = Vec<Boolean<F>>;

const ROUND_CONSTANTS: [u64; 24] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808A,
    0x8000000080008000,
    0x000000000000808B,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008A,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000A,
    0x000000008000808B,
    0x800000000000008B,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800A,
    0x800000008000000A,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Rotation offsets, indexed `[x][y]`.
const ROTATIONS: [[usize; 5]; 5] = [
    [0, 36, 3, 41, 18],
    [1, 44, 10, 45, 2],
    [62, 6, 43, 15, 61],
    [28, 55, 25, 21, 56],
    [27, 20, 39, 8, 14],
];

fn xor<F: PrimeField>(a: &[Boolean<F>], b: &[Boolean<F>]) -> LaneVar<F> {
    a.iter().zip(b).map(|(x, y)| x ^ y).collect()
}

fn rotate_left<F: PrimeField>(lane: &[Boolean<F>], n: usize) -> LaneVar<F> {
    (0..64).map(|i| lane[(i + 64 - n) % 64].clone()).collect()
}

/// Keccak-f[1600] on 25 lanes indexed `x + 5y`.
pub fn keccak_f1600<F: PrimeField>(state: &[LaneVar<F>]) -> Vec<LaneVar<F>> {
    debug_assert_eq!(state.len(), KECCAK_LANES);
    let mut a = state.to_vec();
    for rc in ROUND_CONSTANTS {
        // θ
        let c: Vec<LaneVar<F>> = (0..5)
            .map(|x| (1..5).fold(a[x].clone(), |col, y| xor(&col, &a[x + 5 * y])))
            .collect();
        let d: Vec<LaneVar<F>> = (0..5)
            .map(|x| xor(&c[(x + 4) % 5], &rotate_left(&c[(x + 1) % 5], 1)))
            .collect();
        for (i, lane) in a.iter_mut().enumerate() {
            *lane = xor(lane, &d[i % 5]);
        }

        // ρ and π
        let mut b: Vec<LaneVar<F>> = vec![Vec::new(); KECCAK_LANES];
        for x in 0..5 {
            for y in 0..5 {
                b[y + 5 * ((2 * x + 3 * y) % 5)] = rotate_left(&a[x + 5 * y], ROTATIONS[x][y]);
            }
        }

        // χ
        for x in 0..5 {
            for y in 0..5 {
                let masked: LaneVar<F> = b[(x + 1) % 5 + 5 * y]
                    .iter()
                    .zip(&b[(x + 2) % 5 + 5 * y])
                    .map(|(p, q)| &!p & q)
                    .collect();
                a[x + 5 * y] = xor(&b[x + 5 * y], &masked);
            }
        }

        // ι
        a[0] = a[0]
            .iter()
            .enumerate()
            .map(|(i, bit)| if (rc >> i) & 1 == 1 { !bit } else { bit.clone() })
            .collect();
    }
    a
}

/// Keccak-f[1600] over the little-endian byte view of the state.
pub fn permute_bytes<F: PrimeField>(state: &[ByteVar<F>]) -> Vec<ByteVar<F>> {
    let lanes: Vec<LaneVar<F>> = state
        .chunks(8)
        .map(|word| word.iter().flatten().cloned().collect())
        .collect();
    keccak_f1600(&lanes)
        .iter()
        .flat_map(|lane| lane.chunks(8).map(|byte| byte.to_vec()))
        .collect()
}

/// Keccak-256 (original padding) of a byte string.
pub fn keccak256<F: PrimeField>(message: &[ByteVar<F>]) -> Vec<ByteVar<F>> {
    let mut padded = message.to_vec();
    padded.extend(constant_bytes(&[0x01]));
    let zeros = (KECCAK_RATE - padded.len() % KECCAK_RATE) % KECCAK_RATE;
    padded.extend(constant_bytes(&vec![0u8; zeros]));
    if let Some(last) = padded.last_mut() {
        last[7] = !&last[7];
    }

    let mut state = constant_bytes(&[0u8; 8 * KECCAK_LANES]);
    for block in padded.chunks(KECCAK_RATE) {
        for (byte, input) in state.iter_mut().zip(block) {
            *byte = xor(byte, input);
        }
        state = permute_bytes(&state);
    }
    state.truncate(DIGEST_BYTES);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::bytes::{byte_values, witness_bytes};
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem;
    use sha3::{Digest, Keccak256};

    #[test]
    fn permutation_matches_native() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let mut native: [u64; 25] = core::array::from_fn(|i| (i as u64 + 1).wrapping_mul(0x9E3779B97F4A7C15));
        let bytes: Vec<u8> = native.iter().flat_map(|lane| lane.to_le_bytes()).collect();
        let state = witness_bytes(cs.clone(), &bytes).unwrap();

        let permuted = permute_bytes(&state);
        keccak::f1600(&mut native);
        let expected: Vec<u8> = native.iter().flat_map(|lane| lane.to_le_bytes()).collect();
        assert_eq!(byte_values(&permuted).unwrap(), expected);
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn keccak256_matches_sha3() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        // 135 bytes puts both padding bits in one byte; 136 forces a second block.
        for len in [0usize, 64, 135, 136] {
            let message: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let vars = witness_bytes(cs.clone(), &message).unwrap();
            let digest = keccak256(&vars);
            assert_eq!(
                byte_values(&digest).unwrap(),
                Keccak256::digest(&message).to_vec(),
                "length {len}"
            );
        }
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn constant_input_costs_nothing() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let digest = keccak256::<Fr>(&constant_bytes(b"abc"));
        assert_eq!(byte_values(&digest).unwrap(), Keccak256::digest(b"abc").to_vec());
        assert_eq!(cs.num_constraints(), 0);
    }
}
