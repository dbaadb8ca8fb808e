//! Poseidon permutation and hash over the BN254 scalar field.
//!
//! - [`params`] derives per-width parameter sets (RF = 8, alpha = 5, Grain LFSR
//!   round constants, Cauchy MDS matrix).
//! - [`registry`] publishes one immutable parameter set per width.
//! - [`permute`] runs the round schedule in row-major or column-major layout.
//! - [`hash`] packs inputs into a state and extracts the digest.
//! - [`sponge`] absorbs inputs of any length.

mod grain;
pub mod hash;
pub mod matrix;
pub mod params;
pub mod permute;
pub mod registry;
pub mod sponge;

pub use hash::{hash, hash_t3, hash_with, Padding, PoseidonHasher, StateLayout, Variant, T3_WIDTH};
pub use matrix::MdsMatrix;
pub use params::{
    partial_rounds_for, ParameterSet, FULL_ROUNDS, MAX_MDS_ATTEMPTS, MAX_WIDTH, MIN_WIDTH,
    SBOX_ALPHA,
};
pub use permute::{op_count, permute, permute_with_layout, permute_with_trace, MixLayout, OpCount};
pub use registry::{parameters, precompute, precompute_all};
pub use sponge::{sponge_hash, sponge_hash_n, SpongeState};
