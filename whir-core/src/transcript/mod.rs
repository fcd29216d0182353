//! Native Fiat-Shamir transcript over the Keccak duplex sponge.
//!
//! The prover side writes messages into the transcript bytes while absorbing
//! them; the verifier side reads the same bytes back in the same order. Every
//! challenge is squeezed from the sponge, so both sides derive identical
//! challenges exactly when they agree on every byte read so far. The circuit
//! replays this schedule in [`crate::circuits::transcript`].

pub mod pow;
pub mod sponge;

use std::marker::PhantomData;

use ark_ff::PrimeField;
use common::{
    constants::{DIGEST_BYTES, POW_CHALLENGE_BYTES, POW_NONCE_BYTES},
    proof::KeccakDigest,
};

use crate::{
    field::{challenge_bytes, challenge_from_bytes, index_from_bytes, scalar_bytes, scalar_from_bytes, scalar_to_bytes},
    utils::{errors::ProofVerifyError, math::Math},
};
use sponge::KeccakDuplex;

fn squeeze_scalars<F: PrimeField>(sponge: &mut KeccakDuplex, count: usize) -> Vec<F> {
    let mut buf = vec![0u8; challenge_bytes::<F>()];
    (0..count)
        .map(|_| {
            sponge.squeeze(&mut buf);
            challenge_from_bytes(&buf)
        })
        .collect()
}

fn squeeze_indices(sponge: &mut KeccakDuplex, count: usize, height: usize) -> Vec<usize> {
    let mut buf = vec![0u8; height.bytes_for_bits()];
    (0..count)
        .map(|_| {
            sponge.squeeze(&mut buf);
            index_from_bytes(&buf, height)
        })
        .collect()
}

/// Powers `1, γ, γ^2, ...` used to batch constraints.
pub fn powers<F: PrimeField>(gamma: F, count: usize) -> Vec<F> {
    std::iter::successors(Some(F::one()), |power| Some(*power * gamma))
        .take(count)
        .collect()
}

pub struct ProverTranscript<F> {
    sponge: KeccakDuplex,
    narg: Vec<u8>,
    _marker: PhantomData<F>,
}

impl<F: PrimeField> ProverTranscript<F> {
    pub fn new(io_pattern: &[u8]) -> Self {
        Self {
            sponge: KeccakDuplex::new(io_pattern),
            narg: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.sponge.absorb(bytes);
        self.narg.extend_from_slice(bytes);
    }

    pub fn add_scalars(&mut self, scalars: &[F]) {
        for scalar in scalars {
            self.add_bytes(&scalar_to_bytes(scalar));
        }
    }

    pub fn add_digest(&mut self, digest: &KeccakDigest) {
        self.add_bytes(&digest.0);
    }

    pub fn challenge_scalars(&mut self, count: usize) -> Vec<F> {
        squeeze_scalars(&mut self.sponge, count)
    }

    pub fn challenge_indices(&mut self, count: usize, height: usize) -> Vec<usize> {
        squeeze_indices(&mut self.sponge, count, height)
    }

    /// Grinds and writes a nonce for `bits` of work. No-op for zero bits.
    pub fn grind(&mut self, bits: usize) -> Option<u64> {
        if bits == 0 {
            return None;
        }
        let mut challenge = [0u8; POW_CHALLENGE_BYTES];
        self.sponge.squeeze(&mut challenge);
        let nonce = pow::grind(&challenge, bits);
        self.add_bytes(&nonce.to_le_bytes());
        Some(nonce)
    }

    pub fn narg(&self) -> &[u8] {
        &self.narg
    }

    pub fn finish(self) -> Vec<u8> {
        self.narg
    }
}

pub struct VerifierTranscript<'a, F> {
    sponge: KeccakDuplex,
    narg: &'a [u8],
    _marker: PhantomData<F>,
}

impl<'a, F: PrimeField> VerifierTranscript<'a, F> {
    pub fn new(io_pattern: &[u8], narg: &'a [u8]) -> Self {
        Self {
            sponge: KeccakDuplex::new(io_pattern),
            narg,
            _marker: PhantomData,
        }
    }

    pub fn next_bytes(&mut self, len: usize) -> Result<&'a [u8], ProofVerifyError> {
        if self.narg.len() < len {
            return Err(ProofVerifyError::TranscriptExhausted {
                needed: len,
                remaining: self.narg.len(),
            });
        }
        let (head, tail) = self.narg.split_at(len);
        self.sponge.absorb(head);
        self.narg = tail;
        Ok(head)
    }

    pub fn next_scalars(&mut self, count: usize) -> Result<Vec<F>, ProofVerifyError> {
        let width = scalar_bytes::<F>();
        let bytes = self.next_bytes(count * width)?;
        Ok(bytes.chunks_exact(width).map(scalar_from_bytes).collect())
    }

    pub fn next_digest(&mut self) -> Result<KeccakDigest, ProofVerifyError> {
        let mut digest = [0u8; DIGEST_BYTES];
        digest.copy_from_slice(self.next_bytes(DIGEST_BYTES)?);
        Ok(KeccakDigest(digest))
    }

    pub fn challenge_scalars(&mut self, count: usize) -> Vec<F> {
        squeeze_scalars(&mut self.sponge, count)
    }

    pub fn challenge_indices(&mut self, count: usize, height: usize) -> Vec<usize> {
        squeeze_indices(&mut self.sponge, count, height)
    }

    pub fn check_pow(&mut self, bits: usize) -> Result<(), ProofVerifyError> {
        if bits == 0 {
            return Ok(());
        }
        let mut challenge = [0u8; POW_CHALLENGE_BYTES];
        self.sponge.squeeze(&mut challenge);
        let mut nonce = [0u8; POW_NONCE_BYTES];
        nonce.copy_from_slice(self.next_bytes(POW_NONCE_BYTES)?);
        if pow::check_pow(&challenge, u64::from_le_bytes(nonce), bits) {
            Ok(())
        } else {
            Err(ProofVerifyError::InvalidProofOfWork(bits))
        }
    }

    pub fn remaining(&self) -> usize {
        self.narg.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    #[test]
    fn verifier_replays_prover_challenges() {
        let mut prover = ProverTranscript::<Fr>::new(b"test");
        prover.add_digest(&KeccakDigest([9u8; 32]));
        let a = prover.challenge_scalars(2);
        prover.add_scalars(&[Fr::from(5u64), Fr::from(6u64)]);
        let idx = prover.challenge_indices(3, 11);
        prover.grind(4);
        let b = prover.challenge_scalars(1);
        let narg = prover.finish();

        let mut verifier = VerifierTranscript::<Fr>::new(b"test", &narg);
        assert_eq!(verifier.next_digest().unwrap(), KeccakDigest([9u8; 32]));
        assert_eq!(verifier.challenge_scalars(2), a);
        assert_eq!(verifier.next_scalars(2).unwrap(), vec![Fr::from(5u64), Fr::from(6u64)]);
        assert_eq!(verifier.challenge_indices(3, 11), idx);
        assert!(idx.iter().all(|i| *i < 1 << 11));
        verifier.check_pow(4).unwrap();
        assert_eq!(verifier.challenge_scalars(1), b);
        assert_eq!(verifier.remaining(), 0);
    }

    #[test]
    fn forged_nonce_is_rejected() {
        let mut prover = ProverTranscript::<Fr>::new(b"pow");
        let nonce = prover.grind(12).unwrap();
        let mut narg = prover.finish();

        let mut challenge = [0u8; POW_CHALLENGE_BYTES];
        KeccakDuplex::new(b"pow").squeeze(&mut challenge);
        let forged = (0u64..)
            .find(|n| *n != nonce && !pow::check_pow(&challenge, *n, 12))
            .unwrap();
        narg.copy_from_slice(&forged.to_le_bytes());

        let mut verifier = VerifierTranscript::<Fr>::new(b"pow", &narg);
        assert_eq!(verifier.check_pow(12), Err(ProofVerifyError::InvalidProofOfWork(12)));
    }

    #[test]
    fn reading_past_the_end_fails() {
        let narg = [0u8; 10];
        let mut verifier = VerifierTranscript::<Fr>::new(b"short", &narg);
        assert_eq!(
            verifier.next_scalars(1),
            Err(ProofVerifyError::TranscriptExhausted { needed: 32, remaining: 10 })
        );
    }
}
