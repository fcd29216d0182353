//! Groth16 verification of WHIR/R1CS proofs.
//!
//! The heavy lifting lives in [`whir_core`]; [`common`] holds the serialized
//! artifacts exchanged with the WHIR prover.

pub use common;
pub use whir_core;

pub use whir_core::groth16::{verify_circuit, KeyPair, VerificationReport, VerifyOptions};
