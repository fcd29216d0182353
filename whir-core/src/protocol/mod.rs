//! The verifier's static schedule and its native (out-of-circuit) reference
//! implementation.

pub mod schedule;
pub mod verifier;
pub mod weights;

pub use schedule::{ProtocolSchedule, RoundSchedule, TreeSchedule, NUM_STATEMENT_EVALUATIONS};
pub use verifier::verify_native;
pub use weights::{EqTerm, WeightPolynomial};
