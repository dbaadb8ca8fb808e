//! Corpus-based conformance testing.
//!
//! This module loads test vectors from a JSON corpus and runs them against the
//! hash core. Each vector names an operation, its input and the expected
//! outcome, either `{"ok": {...}}` or `{"err": {"code": N}}`.
//!
//! Supported operations:
//!
//! | op | input | ok fields |
//! |---|---|---|
//! | `fr_decode` | `value` (decimal or 0x hex) or `bytes_le` (64 hex chars) | `decimal`, `hex` |
//! | `poseidon_params` | `width` | `full_rounds`, `partial_rounds`, `first_constant`, `mds_00` |
//! | `poseidon_hash` | `inputs`, plus optional `width`, `variant`, `layout`, `padding` | `digest` |
//! | `poseidon_permute` | `width`, `state` | `state` |
//! | `sponge_hash` | `width`, `elements` | `digest` |

use super::ConformanceResult;
use crate::config::HashConfig;
use crate::error::{ErrorCode, PoseidonResult};
use crate::field::Fr;
use crate::poseidon::{parameters, permute, sponge_hash, PoseidonHasher};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Corpus manifest with metadata.
#[derive(Debug, Deserialize)]
pub struct CorpusManifest {
    /// Format version of the corpus file.
    pub format_version: String,
    /// Field modulus in decimal.
    pub modulus_decimal: String,
    /// Corpus version.
    pub version: String,
}

/// A corpus containing test vectors.
#[derive(Debug, Deserialize)]
pub struct Corpus {
    /// Corpus metadata.
    pub manifest: CorpusManifest,
    /// List of test vectors.
    pub vectors: Vec<TestVector>,
}

/// A single test vector.
#[derive(Debug, Deserialize)]
pub struct TestVector {
    /// Unique identifier for the test.
    pub id: String,
    /// Operation to test (e.g., "fr_decode", "poseidon_hash").
    pub op: String,
    /// Input parameters for the operation.
    pub input: Value,
    /// Expected result (success or error).
    pub expected: Value,
}

/// Result of running a single test vector.
#[derive(Debug)]
pub enum TestResult {
    /// Test passed.
    Pass,
    /// Test failed with mismatch.
    Fail {
        /// Expected result from the corpus.
        expected: String,
        /// Actual result.
        actual: String,
    },
    /// Test was skipped (operation not known).
    Skip {
        /// Reason for skipping.
        reason: String,
    },
    /// Vector was malformed.
    Error {
        /// Error message.
        message: String,
    },
}

impl TestResult {
    /// Returns true if this is a passing result.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns true if this is a failing result.
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Results from running the corpus.
#[derive(Debug, Default)]
pub struct CorpusResults {
    /// Number of tests that passed.
    pub passed: usize,
    /// Number of tests that failed.
    pub failed: usize,
    /// Number of tests that were skipped.
    pub skipped: usize,
    /// Number of tests that errored.
    pub errors: usize,
    /// Detailed results for each test.
    pub details: Vec<(String, TestResult)>,
}

impl CorpusResults {
    /// Create a new empty results container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a test result.
    pub fn record(&mut self, id: &str, result: TestResult) {
        match &result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Skip { .. } => self.skipped += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
        self.details.push((id.to_string(), result));
    }

    /// Get total number of tests run.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errors
    }

    /// Returns true if all tests passed (no failures or errors).
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Get a summary string of the results.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped, {} errors (total: {})",
            self.passed,
            self.failed,
            self.skipped,
            self.errors,
            self.total()
        )
    }

    /// Get failures only.
    pub fn failures(&self) -> Vec<&(String, TestResult)> {
        self.details
            .iter()
            .filter(|(_, r)| matches!(r, TestResult::Fail { .. }))
            .collect()
    }

    /// Get errors only.
    pub fn error_details(&self) -> Vec<&(String, TestResult)> {
        self.details
            .iter()
            .filter(|(_, r)| matches!(r, TestResult::Error { .. }))
            .collect()
    }
}

/// Corpus runner that executes test vectors.
pub struct CorpusRunner {
    corpus: Corpus,
}

impl CorpusRunner {
    /// Load corpus from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> ConformanceResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse a corpus from JSON text.
    pub fn from_json_str(json: &str) -> ConformanceResult<Self> {
        let corpus: Corpus = serde_json::from_str(json)?;
        Ok(Self { corpus })
    }

    /// Get the corpus manifest.
    pub fn manifest(&self) -> &CorpusManifest {
        &self.corpus.manifest
    }

    /// Get the number of test vectors.
    pub fn vector_count(&self) -> usize {
        self.corpus.vectors.len()
    }

    /// Run all test vectors and return results.
    pub fn run_all(&self) -> CorpusResults {
        let mut results = CorpusResults::new();

        for vector in &self.corpus.vectors {
            let result = run_vector(vector);
            results.record(&vector.id, result);
        }

        results
    }
}

/// Run a single test vector.
pub fn run_vector(vector: &TestVector) -> TestResult {
    let outcome = match vector.op.as_str() {
        "fr_decode" => run_fr_decode(&vector.input),
        "poseidon_params" => run_poseidon_params(&vector.input),
        "poseidon_hash" => run_poseidon_hash(&vector.input),
        "poseidon_permute" => run_poseidon_permute(&vector.input),
        "sponge_hash" => run_sponge_hash(&vector.input),
        _ => {
            return TestResult::Skip {
                reason: format!("Unknown operation: {}", vector.op),
            }
        }
    };
    match outcome {
        Ok(actual) => check_expected(&vector.expected, actual),
        Err(message) => TestResult::error(message),
    }
}

/// Outcome of an operation: the core's result, or a malformed-vector message.
type Outcome = Result<PoseidonResult<Value>, String>;

fn run_fr_decode(input: &Value) -> Outcome {
    let decoded = if let Some(value) = input.get("value").and_then(Value::as_str) {
        value.parse::<Fr>()
    } else if let Some(bytes_hex) = input.get("bytes_le").and_then(Value::as_str) {
        decode_le(bytes_hex)
    } else {
        return Err("Missing 'value' or 'bytes_le' in input".to_string());
    };
    Ok(decoded.map(|fr| serde_json::json!({ "decimal": fr.to_decimal(), "hex": fr.to_hex() })))
}

fn decode_le(bytes_hex: &str) -> PoseidonResult<Fr> {
    let bytes = hex::decode(bytes_hex)
        .map_err(|e| ErrorCode::InvalidEncoding(format!("bad hex: {}", e)))?;
    let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        ErrorCode::InvalidEncoding(format!("expected 32 bytes, got {}", bytes.len()))
    })?;
    Fr::from_bytes_le(&arr)
}

fn run_poseidon_params(input: &Value) -> Outcome {
    let width = get_usize(input, "width")?;
    Ok(parameters(width).map(|params| {
        serde_json::json!({
            "full_rounds": params.full_rounds(),
            "partial_rounds": params.partial_rounds(),
            "first_constant": params.round_constants().first().map(Fr::to_hex),
            "mds_00": params.mds().get(0, 0).to_hex(),
        })
    }))
}

fn run_poseidon_hash(input: &Value) -> Outcome {
    let mut config = HashConfig {
        width: get_usize(input, "width").unwrap_or(3),
        ..HashConfig::default()
    };
    if let Some(variant) = input.get("variant") {
        config.variant = serde_json::from_value(variant.clone()).map_err(|e| e.to_string())?;
    }
    if let Some(layout) = input.get("layout") {
        config.layout = serde_json::from_value(layout.clone()).map_err(|e| e.to_string())?;
    }
    if let Some(padding) = input.get("padding") {
        config.padding = serde_json::from_value(padding.clone()).map_err(|e| e.to_string())?;
    }

    let inputs = match get_elements(input, "inputs")? {
        Ok(inputs) => inputs,
        Err(e) => return Ok(Err(e)),
    };
    Ok(PoseidonHasher::new(config)
        .and_then(|hasher| hasher.hash(&inputs))
        .map(|digest| serde_json::json!({ "digest": digest.to_decimal() })))
}

fn run_poseidon_permute(input: &Value) -> Outcome {
    let width = get_usize(input, "width")?;
    let state = match get_elements(input, "state")? {
        Ok(state) => state,
        Err(e) => return Ok(Err(e)),
    };
    Ok(parameters(width)
        .and_then(|params| permute(&params, &state))
        .map(|out| {
            let decimals: Vec<String> = out.iter().map(Fr::to_decimal).collect();
            serde_json::json!({ "state": decimals })
        }))
}

fn run_sponge_hash(input: &Value) -> Outcome {
    let width = get_usize(input, "width")?;
    let elements = match get_elements(input, "elements")? {
        Ok(elements) => elements,
        Err(e) => return Ok(Err(e)),
    };
    Ok(sponge_hash(width, &elements).map(|d| serde_json::json!({ "digest": d.to_decimal() })))
}

fn get_usize(input: &Value, key: &str) -> Result<usize, String> {
    input
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .ok_or_else(|| format!("Missing '{}' in input", key))
}

/// Decode a list of element strings; a bad element is a core error, not a bad vector.
fn get_elements(input: &Value, key: &str) -> Result<PoseidonResult<Vec<Fr>>, String> {
    let items = input
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| format!("Missing '{}' in input", key))?;
    let mut strings = Vec::with_capacity(items.len());
    for item in items {
        strings.push(
            item.as_str()
                .ok_or_else(|| format!("Element of '{}' is not a string", key))?,
        );
    }
    Ok(strings.into_iter().map(str::parse::<Fr>).collect())
}

/// Compare a core result with the vector's expected outcome.
///
/// Only the fields listed under `ok` are compared.
fn check_expected(expected: &Value, actual: PoseidonResult<Value>) -> TestResult {
    match (expected.get("ok"), expected.get("err"), actual) {
        (Some(ok), _, Ok(value)) => {
            let fields = match ok.as_object() {
                Some(fields) => fields,
                None => return TestResult::error("'ok' must be an object"),
            };
            for (key, want) in fields {
                let got = value.get(key).cloned().unwrap_or(Value::Null);
                if !values_equal(want, &got) {
                    return TestResult::Fail {
                        expected: format!("{} = {}", key, want),
                        actual: format!("{} = {}", key, got),
                    };
                }
            }
            TestResult::Pass
        }
        (Some(ok), _, Err(e)) => TestResult::Fail {
            expected: format!("ok: {}", ok),
            actual: format!("err: {} ({})", e.name(), e.code()),
        },
        (None, Some(err), Ok(value)) => TestResult::Fail {
            expected: format!("err: {}", err),
            actual: format!("ok: {}", value),
        },
        (None, Some(err), Err(e)) => {
            let expected_code = err.get("code").and_then(Value::as_u64);
            if expected_code == Some(u64::from(e.code())) {
                TestResult::Pass
            } else {
                TestResult::Fail {
                    expected: format!("err: {}", err),
                    actual: format!("err: {} ({})", e.name(), e.code()),
                }
            }
        }
        (None, None, _) => TestResult::error("Invalid expected format"),
    }
}

/// Hex strings compare case-insensitively; everything else exactly.
fn values_equal(want: &Value, got: &Value) -> bool {
    match (want, got) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        _ => want == got,
    }
}
