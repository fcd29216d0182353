//! Groth16 circuit for WHIR/R1CS verification
//!
//! The circuit replays the whole WHIR verifier: the Keccak transcript, every
//! sumcheck, the Merkle openings of each round, the STIR folds and the two
//! closing identities. Only the transcript bytes and the three statement
//! evaluations are public; the openings are witnesses.
//!
//! ## Usage
//!
//! ```ignore
//! use whir_core::groth16::orchestrator::{verify_circuit, VerifyOptions};
//! use ark_bn254::Bn254;
//!
//! let report = verify_circuit::<Bn254, _>(&config, &material, &r1cs, VerifyOptions::default(), &mut rng)?;
//! assert!(report.accepted());
//! ```

pub mod circuit;
pub mod orchestrator;
pub mod witness;


pub use circuit::WhirVerifierCircuit;
pub use orchestrator::{verify_circuit, KeyPair, VerificationReport, VerifyOptions};
pub use witness::CircuitShape;
