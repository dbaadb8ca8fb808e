//! Equivalence testing across hash implementations.
//!
//! This module drives several front-end configurations with identical inputs
//! and checks that they produce identical digests, compares against published
//! reference values, and submits computations to a ledger executor to record
//! execution cost.
//!
//! - [`EquivalenceHarness`] compares a reference runner with candidates
//! - [`ReproBundle`] captures a mismatch for debugging
//! - [`LedgerExecutor`] is the seam to an external execution service
//! - [`CorpusRunner`] replays a JSON corpus of vectors

pub mod corpus;
mod executor;
mod harness;
mod repro;
mod runner;

pub use corpus::{Corpus, CorpusResults, CorpusRunner, TestResult, TestVector};
pub use executor::{CommandExecutor, Computation, CostModel, Execution, LedgerExecutor, LocalExecutor};
pub use harness::{measure_costs, BatchResult, CostReport, DiffResult, EquivalenceHarness};
pub use repro::ReproBundle;
pub use runner::{ExecutorRunner, HashOutput, HashRunner, VariantRunner};

use crate::error::ErrorCode;
use thiserror::Error;

/// Result type for conformance operations.
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Errors that can occur during conformance testing.
#[derive(Debug, Error)]
pub enum ConformanceError {
    /// Executor process could not be started.
    #[error("executor not available: {0}")]
    ExecutorUnavailable(String),
    /// Executor ran but did not complete.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// Executor output could not be understood.
    #[error("failed to parse executor output: {0}")]
    OutputParseError(String),
    /// Executor reported a hash error by code and name.
    #[error("executor rejected computation: {name} ({code})")]
    Rejected {
        /// Numeric error code.
        code: u32,
        /// Error name.
        name: String,
    },
    /// Hash core error.
    #[error(transparent)]
    Hash(#[from] ErrorCode),
    /// Computation cost more than the budget allowed.
    #[error("cost budget exceeded: used {used}, budget {budget}")]
    BudgetExceeded {
        /// Budget supplied by the caller.
        budget: u64,
        /// Cost the computation needed.
        used: u64,
    },
    /// Corpus or report file problem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON input or output of the expected shape could not be handled.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConformanceError {
    /// Stable name, matching [`ErrorCode::name`] for hash errors.
    pub fn name(&self) -> &str {
        match self {
            Self::ExecutorUnavailable(_) => "ExecutorUnavailable",
            Self::ExecutionFailed(_) => "ExecutionFailed",
            Self::OutputParseError(_) => "OutputParseError",
            Self::Rejected { name, .. } => name.as_str(),
            Self::Hash(e) => e.name(),
            Self::BudgetExceeded { .. } => "BudgetExceeded",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
        }
    }
}
