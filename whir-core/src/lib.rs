#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod circuits;
pub mod field;
pub mod groth16;
pub mod merkle;
pub mod poly;
pub mod protocol;
pub mod r1cs;
pub mod transcript;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
