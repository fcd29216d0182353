//! Proof-of-work grinding.
//!
//! A nonce is valid for a 32-byte challenge when Keccak-f[1600] applied to
//! the state `[challenge words, nonce, 0, ...]` yields a first lane whose
//! `bits` most significant bits are zero.

use common::constants::{KECCAK_LANES, POW_CHALLENGE_BYTES};

pub fn pow_lane(challenge: &[u8; POW_CHALLENGE_BYTES], nonce: u64) -> u64 {
    let mut lanes = [0u64; KECCAK_LANES];
    for (lane, chunk) in lanes.iter_mut().zip(challenge.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *lane = u64::from_le_bytes(word);
    }
    lanes[POW_CHALLENGE_BYTES / 8] = nonce;
    keccak::f1600(&mut lanes);
    lanes[0]
}

pub fn check_pow(challenge: &[u8; POW_CHALLENGE_BYTES], nonce: u64, bits: usize) -> bool {
    bits == 0 || pow_lane(challenge, nonce).leading_zeros() as usize >= bits
}

/// Smallest valid nonce.
#[tracing::instrument(skip_all, name = "pow::grind")]
pub fn grind(challenge: &[u8; POW_CHALLENGE_BYTES], bits: usize) -> u64 {
    (0u64..)
        .find(|nonce| check_pow(challenge, *nonce, bits))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_nonce_passes_and_predecessors_fail() {
        let challenge = [42u8; POW_CHALLENGE_BYTES];
        let nonce = grind(&challenge, 8);
        assert!(check_pow(&challenge, nonce, 8));
        for earlier in 0..nonce {
            assert!(!check_pow(&challenge, earlier, 8));
        }
    }

    #[test]
    fn zero_bits_accepts_anything() {
        assert!(check_pow(&[0u8; POW_CHALLENGE_BYTES], 12345, 0));
    }
}
