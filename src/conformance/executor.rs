//! Ledger execution seam.
//!
//! A [`LedgerExecutor`] runs one hash computation under a cost budget and
//! reports the digest together with the cost it consumed. The hash core never
//! depends on an executor; the harness uses one to compare digests against an
//! execution service and to record cost per variant.

use super::{ConformanceError, ConformanceResult};
use crate::config::HashConfig;
use crate::field::Fr;
use crate::poseidon::{op_count, OpCount, PoseidonHasher};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// A hash computation to submit to an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Computation {
    /// Front-end to run.
    #[serde(default)]
    pub config: HashConfig,
    /// Hash inputs.
    pub inputs: Vec<Fr>,
}

impl Computation {
    /// Computation for `inputs` under `config`.
    pub fn new(config: HashConfig, inputs: Vec<Fr>) -> Self {
        Self { config, inputs }
    }
}

/// Outcome of a computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Digest the executor produced.
    pub digest: Fr,
    /// Cost units consumed.
    pub cost_used: u64,
}

/// Executes hash computations under a cost budget.
pub trait LedgerExecutor {
    /// Run `computation`, failing if it needs more than `cost_budget` units.
    fn execute(&self, computation: &Computation, cost_budget: u64) -> ConformanceResult<Execution>;

    /// Executor name for reporting.
    fn name(&self) -> &str;
}

/// Cost units charged per field operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModel {
    /// Units per field multiplication.
    pub mul: u64,
    /// Units per field addition.
    pub add: u64,
    /// Fixed units per call.
    pub base: u64,
}

impl Default for CostModel {
    /// MULMOD and ADDMOD both cost 8 units.
    fn default() -> Self {
        Self {
            mul: 8,
            add: 8,
            base: 0,
        }
    }
}

impl CostModel {
    /// Cost of one permutation with the given operation counts.
    pub fn cost(&self, ops: &OpCount) -> u64 {
        self.base
            .saturating_add(ops.muls.saturating_mul(self.mul))
            .saturating_add(ops.adds.saturating_mul(self.add))
    }
}

/// In-process executor that prices a computation from its operation counts.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor {
    cost_model: CostModel,
}

impl LocalExecutor {
    /// Executor with the default cost model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor with an explicit cost model.
    pub fn with_cost_model(cost_model: CostModel) -> Self {
        Self { cost_model }
    }

    /// The cost model in use.
    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }
}

impl LedgerExecutor for LocalExecutor {
    fn execute(&self, computation: &Computation, cost_budget: u64) -> ConformanceResult<Execution> {
        let hasher = PoseidonHasher::new(computation.config)?;
        let ops = op_count(hasher.params(), computation.config.variant.mix_layout());
        let cost_used = self.cost_model.cost(&ops);
        if cost_used > cost_budget {
            return Err(ConformanceError::BudgetExceeded {
                budget: cost_budget,
                used: cost_used,
            });
        }
        let digest = hasher.hash(&computation.inputs)?;
        Ok(Execution { digest, cost_used })
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Executor that hands computations to an external bridge process.
///
/// The computation is written to the process's stdin as JSON and the budget is
/// passed as `--budget N`. The process answers on stdout with
/// `{"digest": "...", "cost_used": N}` or `{"err": {"code": N, "name": "..."}}`.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: PathBuf,
    args: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    err: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: u32,
    name: String,
    #[serde(default)]
    used: Option<u64>,
}

impl CommandExecutor {
    /// Executor running `program` with no extra arguments.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before `--budget`.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Check if the bridge program exists.
    pub fn is_available(&self) -> bool {
        self.program.exists()
    }

    fn parse_output(stdout: &str, budget: u64) -> ConformanceResult<Execution> {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(stdout) {
            let ErrorBody { code, name, used } = envelope.err;
            return Err(match (name.as_str(), used) {
                ("BudgetExceeded", Some(used)) => ConformanceError::BudgetExceeded { budget, used },
                _ => ConformanceError::Rejected { code, name },
            });
        }
        serde_json::from_str::<Execution>(stdout).map_err(|e| {
            ConformanceError::OutputParseError(format!("{}: {}", e, stdout.trim()))
        })
    }
}

impl LedgerExecutor for CommandExecutor {
    fn execute(&self, computation: &Computation, cost_budget: u64) -> ConformanceResult<Execution> {
        let payload = serde_json::to_vec(computation)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--budget")
            .arg(cost_budget.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ConformanceError::ExecutorUnavailable(format!("{}: {}", self.program.display(), e))
            })?;

        // the bridge may exit without reading stdin; its output decides the result
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };
        let output = child.wait_with_output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(
            program = %self.program.display(),
            status = ?output.status.code(),
            "executor finished"
        );

        match (Self::parse_output(&stdout, cost_budget), written) {
            (Err(ConformanceError::OutputParseError(_)), written) if !output.status.success() => {
                let stdin_note = match written {
                    Ok(()) => String::new(),
                    Err(e) => format!(" (stdin: {})", e),
                };
                Err(ConformanceError::ExecutionFailed(format!(
                    "exit status {:?}: {}{}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim(),
                    stdin_note
                )))
            }
            (Err(ConformanceError::OutputParseError(_)), Err(e)) => Err(ConformanceError::Io(e)),
            (result, _) => result,
        }
    }

    fn name(&self) -> &str {
        "command"
    }
}
