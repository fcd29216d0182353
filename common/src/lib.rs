pub mod config;
pub mod constants;
pub mod proof;
pub mod r1cs;
pub mod serializable;
