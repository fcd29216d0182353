//! In-circuit replay of [`crate::transcript::VerifierTranscript`].
//!
//! The transcript bytes are public input; the sponge state starts as a
//! constant and every absorption and squeeze runs through the Keccak gadget.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;
use common::constants::{DIGEST_BYTES, KECCAK_RATE, POW_CHALLENGE_BYTES, POW_NONCE_BYTES};

use super::{
    bytes::{be_bytes_to_fp, be_bytes_to_index_bits, constant_bytes, le_bytes_to_fp, ByteVar},
    keccak::permute_bytes,
};
use crate::{
    field::{challenge_bytes, scalar_bytes},
    transcript::sponge::initial_state,
    utils::math::Math,
};

pub struct DuplexSpongeVar<F: PrimeField> {
    state: Vec<ByteVar<F>>,
    absorb_pos: usize,
    squeeze_pos: usize,
}

impl<F: PrimeField> DuplexSpongeVar<F> {
    pub fn new(io_pattern: &[u8]) -> Self {
        Self {
            state: constant_bytes(&initial_state(io_pattern)),
            absorb_pos: 0,
            squeeze_pos: KECCAK_RATE,
        }
    }

    fn permute(&mut self) {
        self.state = permute_bytes(&self.state);
    }

    pub fn absorb(&mut self, input: &[ByteVar<F>]) {
        for byte in input {
            if self.absorb_pos == KECCAK_RATE {
                self.permute();
                self.absorb_pos = 0;
            }
            self.state[self.absorb_pos] = byte.clone();
            self.absorb_pos += 1;
        }
        self.squeeze_pos = KECCAK_RATE;
    }

    pub fn squeeze(&mut self, len: usize) -> Vec<ByteVar<F>> {
        (0..len)
            .map(|_| {
                if self.squeeze_pos == KECCAK_RATE {
                    self.permute();
                    self.squeeze_pos = 0;
                    self.absorb_pos = 0;
                }
                self.squeeze_pos += 1;
                self.state[self.squeeze_pos - 1].clone()
            })
            .collect()
    }
}

pub struct TranscriptVar<F: PrimeField> {
    sponge: DuplexSpongeVar<F>,
    narg: Vec<ByteVar<F>>,
    cursor: usize,
}

impl<F: PrimeField> TranscriptVar<F> {
    pub fn new(io_pattern: &[u8], narg: Vec<ByteVar<F>>) -> Self {
        Self {
            sponge: DuplexSpongeVar::new(io_pattern),
            narg,
            cursor: 0,
        }
    }

    pub fn next_bytes(&mut self, len: usize) -> Result<Vec<ByteVar<F>>, SynthesisError> {
        if self.remaining() < len {
            tracing::error!(needed = len, remaining = self.remaining(), "transcript exhausted");
            return Err(SynthesisError::Unsatisfiable);
        }
        let bytes = self.narg[self.cursor..self.cursor + len].to_vec();
        self.cursor += len;
        self.sponge.absorb(&bytes);
        Ok(bytes)
    }

    pub fn next_scalars(&mut self, count: usize) -> Result<Vec<FpVar<F>>, SynthesisError> {
        let width = scalar_bytes::<F>();
        let bytes = self.next_bytes(count * width)?;
        Ok(bytes.chunks(width).map(le_bytes_to_fp).collect())
    }

    pub fn next_digest(&mut self) -> Result<Vec<ByteVar<F>>, SynthesisError> {
        self.next_bytes(DIGEST_BYTES)
    }

    pub fn challenge_scalars(&mut self, count: usize) -> Vec<FpVar<F>> {
        (0..count)
            .map(|_| be_bytes_to_fp(&self.sponge.squeeze(challenge_bytes::<F>())))
            .collect()
    }

    /// Query indices as little-endian bits, `height` bits each.
    pub fn challenge_index_bits(&mut self, count: usize, height: usize) -> Vec<Vec<Boolean<F>>> {
        (0..count)
            .map(|_| be_bytes_to_index_bits(&self.sponge.squeeze(height.bytes_for_bits()), height))
            .collect()
    }

    /// Enforces `bits` of proof of work on the next nonce. No-op for zero
    /// bits, matching the native transcript.
    pub fn verify_pow(&mut self, bits: usize) -> Result<(), SynthesisError> {
        if bits == 0 {
            return Ok(());
        }
        let mut state = self.sponge.squeeze(POW_CHALLENGE_BYTES);
        state.extend(self.next_bytes(POW_NONCE_BYTES)?);
        let padding = 8 * common::constants::KECCAK_LANES - state.len();
        state.extend(constant_bytes(&vec![0u8; padding]));

        let permuted = permute_bytes(&state);
        let lane: Vec<&Boolean<F>> = permuted[..8].iter().flatten().collect();
        for bit in &lane[64 - bits..] {
            bit.enforce_equal(&Boolean::FALSE)?;
        }
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.narg.len() - self.cursor
    }

    /// Every transcript byte must be consumed.
    pub fn finish(self) -> Result<(), SynthesisError> {
        match self.remaining() {
            0 => Ok(()),
            trailing => {
                tracing::error!(trailing, "transcript not fully consumed");
                Err(SynthesisError::Unsatisfiable)
            }
        }
    }
}
