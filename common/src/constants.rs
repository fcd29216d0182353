/// Width of a Keccak-256 digest and of every Merkle node.
pub const DIGEST_BYTES: usize = 32;
/// Proof-of-work nonces are little-endian `u64`s.
pub const POW_NONCE_BYTES: usize = 8;
/// Bytes squeezed to seed a proof-of-work check.
pub const POW_CHALLENGE_BYTES: usize = 32;
/// Keccak-f[1600] state size in bytes.
pub const KECCAK_STATE_BYTES: usize = 200;
/// Rate of the duplex sponge (capacity 64 bytes).
pub const KECCAK_RATE: usize = 136;
/// Keccak-f[1600] state size in 64-bit lanes.
pub const KECCAK_LANES: usize = 25;
pub const DEFAULT_COMMITMENT_OOD_SAMPLES: usize = 1;
pub const DEFAULT_FOLDING_FACTOR: usize = 4;
/// Largest accepted proof-of-work difficulty.
pub const MAX_POW_BITS: usize = 60;
