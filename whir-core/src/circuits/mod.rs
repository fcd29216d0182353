//! Constraint gadgets for the WHIR/R1CS verifier.
//!
//! Each gadget mirrors a native routine of this crate byte for byte; the
//! tests of every module check the gadget against its native counterpart.

pub mod bytes;
pub mod keccak;
pub mod merkle;
pub mod poly;
pub mod r1cs;
pub mod stir;
pub mod sumcheck;
pub mod transcript;
