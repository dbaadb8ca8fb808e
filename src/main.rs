//! Poseidon CLI.
//!
//! Every command prints one JSON document on stdout. Results are wrapped as
//! `{"ok": {...}}` and failures as `{"err": {"code": N, "name": "..."}}` with
//! exit status 1. `params` prints a bare parameter set that `hash --params`
//! accepts, and `execute` prints a bare `{"digest": ..., "cost_used": N}` so
//! the binary can serve as the bridge of a `CommandExecutor`.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

use clap::{Args, Parser, Subcommand};
use poseidon_bn254::config::{ConfigError, HashConfig};
use poseidon_bn254::conformance::{
    Computation, ConformanceError, CorpusRunner, LedgerExecutor, LocalExecutor, TestResult,
};
use poseidon_bn254::error::ErrorCode;
use poseidon_bn254::field::Fr;
use poseidon_bn254::poseidon::{
    parameters, permute_with_layout, MixLayout, Padding, ParameterSet, PoseidonHasher,
    StateLayout, Variant,
};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "poseidon")]
#[command(about = "Poseidon hash over the BN254 scalar field", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash field elements (arguments, or a JSON array on stdin)
    Hash {
        #[command(flatten)]
        front_end: FrontEndArgs,

        /// Parameter set JSON to use instead of the generated one
        #[arg(long)]
        params: Option<PathBuf>,

        /// Number of state elements to output
        #[arg(long, default_value_t = 1)]
        outputs: usize,

        /// Inputs as decimal or 0x-prefixed hex
        inputs: Vec<String>,
    },

    /// Apply the permutation to a full state
    Permute {
        /// State width
        #[arg(long, default_value_t = 3)]
        width: usize,

        /// Use the column-major matrix layout
        #[arg(long)]
        column_major: bool,

        /// State elements as decimal or 0x-prefixed hex
        state: Vec<String>,
    },

    /// Print the parameter set for a width as JSON
    Params {
        /// State width
        #[arg(long, default_value_t = 3)]
        width: usize,
    },

    /// Run a computation read from stdin under a cost budget
    Execute {
        /// Cost budget in units
        #[arg(long)]
        budget: u64,
    },

    /// Run a JSON corpus of test vectors
    Corpus {
        /// Path to the corpus file
        path: PathBuf,
    },

    /// Show version information
    Version,
}

/// Front-end selection flags, applied over an optional config file.
#[derive(Args)]
struct FrontEndArgs {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Variant: v1, v2 or t3
    #[arg(long)]
    variant: Option<Variant>,

    /// State width
    #[arg(long)]
    width: Option<usize>,

    /// State layout: inputs_first or capacity_first
    #[arg(long)]
    layout: Option<StateLayout>,

    /// Padding: zero or input_length
    #[arg(long)]
    padding: Option<Padding>,
}

impl FrontEndArgs {
    fn resolve(&self, default_width: Option<usize>) -> Result<HashConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => HashConfig::load(path)?,
            None => HashConfig::default(),
        };
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(width) = self.width.or(default_width) {
            config.width = width;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(padding) = self.padding {
            config.padding = padding;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Hash(#[from] ErrorCode),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Conformance(#[from] ConformanceError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn to_json(&self) -> Value {
        let (code, name) = match self {
            CliError::Hash(e) | CliError::Config(ConfigError::Invalid(e)) => (e.code(), e.name()),
            CliError::Conformance(ConformanceError::Hash(e)) => (e.code(), e.name()),
            CliError::Conformance(ConformanceError::BudgetExceeded { budget, used }) => {
                return json!({ "err": {
                    "code": 400,
                    "name": "BudgetExceeded",
                    "budget": budget,
                    "used": used,
                }});
            }
            CliError::Conformance(e) => (410, e.name()),
            CliError::Config(ConfigError::Parse(_)) | CliError::Json(_) => (110, "MalformedJson"),
            CliError::Config(ConfigError::Io { .. }) | CliError::Io(_) => (500, "Io"),
        };
        json!({ "err": { "code": code, "name": name, "message": self.to_string() } })
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_elements(args: &[String]) -> Result<Vec<Fr>, CliError> {
    if args.is_empty() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(serde_json::from_str(&text)?);
    }
    args.iter()
        .map(|s| s.parse::<Fr>().map_err(CliError::from))
        .collect()
}

fn digest_json(fr: &Fr) -> Value {
    json!({ "digest": fr.to_decimal(), "hex": fr.to_hex() })
}

fn run_hash(
    front_end: &FrontEndArgs,
    params_path: Option<&Path>,
    outputs: usize,
    inputs: &[String],
) -> Result<Value, CliError> {
    let substituted = match params_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let params: ParameterSet = serde_json::from_str(&text)?;
            info!(width = params.width(), path = %path.display(), "loaded parameter set");
            Some(Arc::new(params))
        }
        None => None,
    };

    let config = front_end.resolve(substituted.as_ref().map(|p| p.width()))?;
    let hasher = match substituted {
        Some(params) => PoseidonHasher::with_parameters(config, params)?,
        None => PoseidonHasher::new(config)?,
    };

    let inputs = parse_elements(inputs)?;
    debug!(variant = %config.variant, width = config.width, count = inputs.len(), "hashing");

    if outputs == 1 {
        let digest = hasher.hash(&inputs)?;
        return Ok(json!({ "ok": digest_json(&digest) }));
    }
    let digests: Vec<Value> = hasher
        .hash_many(&inputs, outputs)?
        .iter()
        .map(digest_json)
        .collect();
    Ok(json!({ "ok": { "digests": digests } }))
}

fn run_permute(width: usize, column_major: bool, state: &[String]) -> Result<Value, CliError> {
    let params = parameters(width)?;
    let state = parse_elements(state)?;
    let layout = if column_major {
        MixLayout::ColumnMajor
    } else {
        MixLayout::RowMajor
    };
    let out = permute_with_layout(&params, layout, &state)?;
    let decimals: Vec<String> = out.iter().map(Fr::to_decimal).collect();
    Ok(json!({ "ok": { "state": decimals } }))
}

fn run_execute(budget: u64) -> Result<Value, CliError> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    let computation: Computation = serde_json::from_str(&text)?;
    let execution = LocalExecutor::new().execute(&computation, budget)?;
    Ok(serde_json::to_value(execution)?)
}

fn run_corpus(path: &Path) -> Result<(Value, bool), CliError> {
    let runner = CorpusRunner::load(path)?;
    let results = runner.run_all();

    for (id, result) in &results.details {
        match result {
            TestResult::Fail { expected, actual } => {
                tracing::warn!(id = %id, %expected, %actual, "vector failed")
            }
            TestResult::Error { message } => tracing::warn!(id = %id, %message, "vector error"),
            TestResult::Pass | TestResult::Skip { .. } => {}
        }
    }

    let failed: Vec<&str> = results
        .details
        .iter()
        .filter(|(_, r)| !r.is_pass() && !matches!(r, TestResult::Skip { .. }))
        .map(|(id, _)| id.as_str())
        .collect();

    let report = json!({ "ok": {
        "passed": results.passed,
        "failed": results.failed,
        "skipped": results.skipped,
        "errors": results.errors,
        "summary": results.summary(),
        "not_passing": failed,
    }});
    Ok((report, results.all_passed()))
}

fn emit(result: Result<Value, CliError>) -> ExitCode {
    match result {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", e.to_json());
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Some(Commands::Hash {
            front_end,
            params,
            outputs,
            inputs,
        }) => emit(run_hash(&front_end, params.as_deref(), outputs, &inputs)),
        Some(Commands::Permute {
            width,
            column_major,
            state,
        }) => emit(run_permute(width, column_major, &state)),
        Some(Commands::Params { width }) => emit(
            parameters(width)
                .map_err(CliError::from)
                .and_then(|p| Ok(serde_json::to_value(&*p)?)),
        ),
        Some(Commands::Execute { budget }) => emit(run_execute(budget)),
        Some(Commands::Corpus { path }) => match run_corpus(&path) {
            Ok((report, true)) => emit(Ok(report)),
            Ok((report, false)) => {
                println!("{}", report);
                ExitCode::FAILURE
            }
            Err(e) => emit(Err(e)),
        },
        Some(Commands::Version) | None => {
            println!("poseidon {}", env!("CARGO_PKG_VERSION"));
            println!("BN254 Fr, t = 2..=17, variants v1 v2 t3");
            ExitCode::SUCCESS
        }
    }
}
