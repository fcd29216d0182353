use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

/// Failures while turning external proof material into a circuit, or while
/// compiling, proving and verifying it.
#[derive(Error, Debug)]
pub enum WhirCircuitError {
    #[error("Malformed config: {0}")]
    MalformedConfig(String),
    #[error("Invalid field element {0:?}")]
    InvalidFieldElement(String),
    #[error("Folding schedule {schedule:?} folds more than {n_vars} variables")]
    FoldingScheduleTooLong { schedule: Vec<usize>, n_vars: usize },
    #[error("Invalid transcript length, expected length {0} but got {1}")]
    TranscriptLength(usize, usize),
    #[error("Shape mismatch in {0}: expected {1} but got {2}")]
    ShapeMismatch(&'static str, usize, usize),
    #[error("Malformed sparse matrix {0}: {1}")]
    MalformedMatrix(&'static str, String),
    #[error("Interner index {0} out of range for {1} values")]
    InternerIndexOutOfRange(usize, usize),
    #[error("Merkle multi-path decode failed: {0}")]
    MerkleDecode(String),
    #[error("Constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] ark_serialize::SerializationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons the native verifier rejects a transcript. Inside the circuit each of
/// these is an unsatisfied constraint instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofVerifyError {
    #[error("Transcript exhausted: needed {needed} bytes but only {remaining} remain")]
    TranscriptExhausted { needed: usize, remaining: usize },
    #[error("{0} unread transcript bytes")]
    TrailingTranscriptBytes(usize),
    #[error("Sumcheck round {0} is inconsistent with the running claim")]
    SumcheckVerificationError(usize),
    #[error("Merkle path of query {query} does not reach the root of tree {tree}")]
    MerkleRootMismatch { tree: usize, query: usize },
    #[error("Opened index of query {query} in tree {tree} differs from the transcript")]
    QueryIndexMismatch { tree: usize, query: usize },
    #[error("No opening supplied for tree {0}")]
    MissingOpening(usize),
    #[error("Proof of work below {0} bits")]
    InvalidProofOfWork(usize),
    #[error("Folded evaluation of final query {0} disagrees with the final polynomial")]
    FinalFoldMismatch(usize),
    #[error("Final sumcheck claim disagrees with the weighted final polynomial")]
    FinalIdentityMismatch,
    #[error("R1CS statement evaluations disagree with the sumcheck claim")]
    StatementIdentityMismatch,
}
