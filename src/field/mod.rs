//! BN254 scalar field (Fr) operations.
//!
//! This module provides the Fr type used throughout the crate for field
//! arithmetic, parameter generation and Poseidon hashing.
//!
//! Integer-like inputs (decimal strings, hex words, big integers) are reduced
//! modulo the field order; only the canonical 32-byte little-endian encoding
//! rejects values at or above the modulus.

mod fr;

pub use fr::Fr;
pub(crate) use fr::modulus;

/// BN254 scalar field modulus as decimal string.
pub const MODULUS_DECIMAL: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// BN254 scalar field modulus as 0x-prefixed big-endian hex.
pub const MODULUS_HEX: &str =
    "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";

/// Bit length of the modulus.
pub const MODULUS_BITS: usize = 254;
