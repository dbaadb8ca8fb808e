//! Error handling for the Poseidon core.
//!
//! Every failure the core can report is a variant of [`ErrorCode`]. Each variant
//! carries a stable numeric code and name so that harnesses and the CLI can
//! compare failures across implementations without parsing messages.
//!
//! All errors are local and synchronous. Only [`ErrorCode::WeakParameters`] is
//! ever retried internally, during one-time parameter generation.

use thiserror::Error;

/// All error kinds reported by the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum ErrorCode {
    /// Malformed input representation (code 100).
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// State or parameter width disagreement (code 200).
    #[error("arity mismatch: expected {expected}, got {got}")]
    ArityMismatch {
        /// Width (or input count) the parameters require.
        expected: usize,
        /// Width (or input count) actually supplied.
        got: usize,
    },

    /// More inputs than the state capacity allows (code 201).
    #[error("input too large: {got} inputs do not fit a state of width {width}")]
    InputTooLarge {
        /// Number of inputs supplied.
        got: usize,
        /// State width of the selected parameter set.
        width: usize,
    },

    /// Hash called without inputs (code 202).
    #[error("empty input")]
    EmptyInput,

    /// No parameter set exists for this width (code 203).
    #[error("unsupported arity: {0}")]
    UnsupportedArity(usize),

    /// Generated or substituted MDS matrix fails its checks (code 300).
    #[error("weak parameters: {0}")]
    WeakParameters(String),

    /// Parameter set is structurally inconsistent (code 301).
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl ErrorCode {
    /// Get the numeric error code.
    pub fn code(&self) -> u32 {
        match self {
            ErrorCode::InvalidEncoding(_) => 100,
            ErrorCode::ArityMismatch { .. } => 200,
            ErrorCode::InputTooLarge { .. } => 201,
            ErrorCode::EmptyInput => 202,
            ErrorCode::UnsupportedArity(_) => 203,
            ErrorCode::WeakParameters(_) => 300,
            ErrorCode::InvalidParameters(_) => 301,
        }
    }

    /// Get the error name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::InvalidEncoding(_) => "InvalidEncoding",
            ErrorCode::ArityMismatch { .. } => "ArityMismatch",
            ErrorCode::InputTooLarge { .. } => "InputTooLarge",
            ErrorCode::EmptyInput => "EmptyInput",
            ErrorCode::UnsupportedArity(_) => "UnsupportedArity",
            ErrorCode::WeakParameters(_) => "WeakParameters",
            ErrorCode::InvalidParameters(_) => "InvalidParameters",
        }
    }
}

/// Result type for core operations.
pub type PoseidonResult<T> = Result<T, ErrorCode>;
