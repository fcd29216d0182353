use common::constants::{DIGEST_BYTES, KECCAK_LANES, KECCAK_RATE, KECCAK_STATE_BYTES};
use sha3::{Digest, Keccak256};

/// Byte-oriented Keccak duplex sponge in overwrite mode.
///
/// The capacity is seeded with `Keccak256(io_pattern)`. Absorbed bytes replace
/// the rate portion of the state; squeezing after an absorption permutes
/// first.
#[derive(Clone)]
pub struct KeccakDuplex {
    state: [u8; KECCAK_STATE_BYTES],
    absorb_pos: usize,
    squeeze_pos: usize,
}

impl KeccakDuplex {
    pub fn new(io_pattern: &[u8]) -> Self {
        Self {
            state: initial_state(io_pattern),
            absorb_pos: 0,
            squeeze_pos: KECCAK_RATE,
        }
    }

    pub fn absorb(&mut self, mut input: &[u8]) {
        while !input.is_empty() {
            if self.absorb_pos == KECCAK_RATE {
                permute(&mut self.state);
                self.absorb_pos = 0;
            }
            let take = (KECCAK_RATE - self.absorb_pos).min(input.len());
            self.state[self.absorb_pos..self.absorb_pos + take].copy_from_slice(&input[..take]);
            self.absorb_pos += take;
            input = &input[take..];
        }
        self.squeeze_pos = KECCAK_RATE;
    }

    pub fn squeeze(&mut self, output: &mut [u8]) {
        for byte in output.iter_mut() {
            if self.squeeze_pos == KECCAK_RATE {
                permute(&mut self.state);
                self.squeeze_pos = 0;
                self.absorb_pos = 0;
            }
            *byte = self.state[self.squeeze_pos];
            self.squeeze_pos += 1;
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &[u8; KECCAK_STATE_BYTES] {
        &self.state
    }
}

/// Sponge state before the first absorption: zero rate, capacity seeded with
/// the domain separator's digest.
pub fn initial_state(io_pattern: &[u8]) -> [u8; KECCAK_STATE_BYTES] {
    let mut state = [0u8; KECCAK_STATE_BYTES];
    let seed: [u8; DIGEST_BYTES] = Keccak256::digest(io_pattern).into();
    state[KECCAK_RATE..KECCAK_RATE + DIGEST_BYTES].copy_from_slice(&seed);
    state
}

/// Keccak-f[1600] over a little-endian byte view of the lanes.
pub fn permute(state: &mut [u8; KECCAK_STATE_BYTES]) {
    let mut lanes = bytes_to_lanes(state);
    keccak::f1600(&mut lanes);
    for (chunk, lane) in state.chunks_exact_mut(8).zip(lanes) {
        chunk.copy_from_slice(&lane.to_le_bytes());
    }
}

pub fn bytes_to_lanes(bytes: &[u8]) -> [u64; KECCAK_LANES] {
    let mut lanes = [0u64; KECCAK_LANES];
    for (lane, chunk) in lanes.iter_mut().zip(bytes.chunks(8)) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        *lane = u64::from_le_bytes(word);
    }
    lanes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squeeze_is_deterministic_and_domain_separated() {
        let mut a = KeccakDuplex::new(b"whir");
        let mut b = KeccakDuplex::new(b"whir");
        let mut c = KeccakDuplex::new(b"whir2");
        let (mut out_a, mut out_b, mut out_c) = ([0u8; 48], [0u8; 48], [0u8; 48]);
        for sponge in [&mut a, &mut b, &mut c] {
            sponge.absorb(&[7u8; 40]);
        }
        a.squeeze(&mut out_a);
        b.squeeze(&mut out_b);
        c.squeeze(&mut out_c);
        assert_eq!(out_a, out_b);
        assert_ne!(out_a, out_c);
    }

    #[test]
    fn long_absorb_permutes_between_blocks() {
        let mut once = KeccakDuplex::new(b"p");
        once.absorb(&[1u8; 300]);
        let mut split = KeccakDuplex::new(b"p");
        split.absorb(&[1u8; 100]);
        split.absorb(&[1u8; 200]);
        assert_eq!(once.state(), split.state());
    }

    #[test]
    fn squeeze_continues_where_it_stopped() {
        let mut a = KeccakDuplex::new(b"q");
        let mut b = a.clone();
        let mut whole = [0u8; 200];
        a.squeeze(&mut whole);
        let (mut first, mut second) = ([0u8; 100], [0u8; 100]);
        b.squeeze(&mut first);
        b.squeeze(&mut second);
        assert_eq!(&whole[..100], &first);
        assert_eq!(&whole[100..], &second);
    }

    #[test]
    fn permutation_matches_keccak256_of_empty_message() {
        // one padded block: 0x01 ... 0x80
        let mut state = [0u8; KECCAK_STATE_BYTES];
        state[0] = 0x01;
        state[KECCAK_RATE - 1] ^= 0x80;
        permute(&mut state);
        let expected: [u8; 32] = Keccak256::digest(b"").into();
        assert_eq!(&state[..32], &expected);
    }
}
