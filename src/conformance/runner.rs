//! Hash runners for equivalence testing.

use super::executor::{Computation, LedgerExecutor};
use super::{ConformanceError, ConformanceResult};
use crate::config::HashConfig;
use crate::field::Fr;
use crate::poseidon::PoseidonHasher;

/// Result from a hash computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashOutput {
    /// Successful computation with decimal string digest.
    Ok(String),
    /// Error with its stable name.
    Err(String),
}

impl HashOutput {
    /// Check if this is an Ok result.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Check if this is an Err result.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Get the value as a string (either digest or error name).
    pub fn as_string(&self) -> &str {
        match self {
            Self::Ok(s) => s,
            Self::Err(s) => s,
        }
    }
}

/// Trait for runners that hash a list of field elements.
pub trait HashRunner {
    /// Hash `inputs` and return the digest or the error name.
    ///
    /// Hash errors are outputs to compare; only infrastructure failures are `Err`.
    fn hash(&self, inputs: &[Fr]) -> ConformanceResult<HashOutput>;

    /// Get the runner name for reporting.
    fn name(&self) -> &str;
}

/// In-process runner for one front-end configuration.
#[derive(Debug, Clone)]
pub struct VariantRunner {
    name: String,
    hasher: PoseidonHasher,
}

impl VariantRunner {
    /// Runner for `config`, named after its variant and width.
    pub fn new(config: HashConfig) -> ConformanceResult<Self> {
        let name = format!("{}/t={}", config.variant, config.width);
        Ok(Self {
            name,
            hasher: PoseidonHasher::new(config)?,
        })
    }

    /// Runner around an already built front-end.
    pub fn from_hasher(name: impl Into<String>, hasher: PoseidonHasher) -> Self {
        Self {
            name: name.into(),
            hasher,
        }
    }

    /// The configuration this runner hashes with.
    pub fn config(&self) -> &HashConfig {
        self.hasher.config()
    }
}

impl HashRunner for VariantRunner {
    fn hash(&self, inputs: &[Fr]) -> ConformanceResult<HashOutput> {
        Ok(match self.hasher.hash(inputs) {
            Ok(digest) => HashOutput::Ok(digest.to_decimal()),
            Err(e) => HashOutput::Err(e.name().to_string()),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Runner that submits each hash to a ledger executor.
pub struct ExecutorRunner<E> {
    executor: E,
    config: HashConfig,
    cost_budget: u64,
}

impl<E: LedgerExecutor> ExecutorRunner<E> {
    /// Runner hashing with `config` on `executor` under `cost_budget`.
    pub fn new(executor: E, config: HashConfig, cost_budget: u64) -> Self {
        Self {
            executor,
            config,
            cost_budget,
        }
    }
}

impl<E: LedgerExecutor> HashRunner for ExecutorRunner<E> {
    fn hash(&self, inputs: &[Fr]) -> ConformanceResult<HashOutput> {
        let computation = Computation::new(self.config, inputs.to_vec());
        match self.executor.execute(&computation, self.cost_budget) {
            Ok(execution) => Ok(HashOutput::Ok(execution.digest.to_decimal())),
            Err(ConformanceError::Hash(e)) => Ok(HashOutput::Err(e.name().to_string())),
            Err(ConformanceError::Rejected { name, .. }) => Ok(HashOutput::Err(name)),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        self.executor.name()
    }
}
