//! Reproduction bundle for debugging digest mismatches.

use super::runner::HashOutput;
use crate::field::Fr;
use std::path::Path;

/// A bundle of information for reproducing a mismatch between two runners.
#[derive(Debug, Clone)]
pub struct ReproBundle {
    /// Test name that failed.
    pub test_name: String,
    /// Reference runner name.
    pub reference_runner: String,
    /// Candidate runner name.
    pub candidate_runner: String,
    /// Inputs as decimal strings.
    pub inputs: Vec<String>,
    /// Reference output.
    pub reference_output: HashOutput,
    /// Candidate output.
    pub candidate_output: HashOutput,
}

impl ReproBundle {
    /// Create a new repro bundle.
    pub fn new(
        test_name: &str,
        reference_runner: &str,
        candidate_runner: &str,
        inputs: &[Fr],
        reference_output: HashOutput,
        candidate_output: HashOutput,
    ) -> Self {
        Self {
            test_name: test_name.to_string(),
            reference_runner: reference_runner.to_string(),
            candidate_runner: candidate_runner.to_string(),
            inputs: inputs.iter().map(Fr::to_decimal).collect(),
            reference_output,
            candidate_output,
        }
    }

    /// Format as a human-readable report.
    pub fn to_report(&self) -> String {
        format!(
            r#"=== Digest Mismatch Report ===
Test: {}
Inputs: [{}]

{}: {:?}
{}: {:?}

To reproduce:
  poseidon hash --variant <variant> --width {} {}
"#,
            self.test_name,
            self.inputs.join(", "),
            self.reference_runner,
            self.reference_output,
            self.candidate_runner,
            self.candidate_output,
            self.inputs.len() + 1,
            self.inputs.join(" "),
        )
    }

    /// Save the human-readable report to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_report())
    }

    /// Format as JSON for machine parsing.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "test_name": self.test_name,
            "inputs": self.inputs,
            "reference": {
                "runner": self.reference_runner,
                "ok": self.reference_output.is_ok(),
                "output": self.reference_output.as_string(),
            },
            "candidate": {
                "runner": self.candidate_runner,
                "ok": self.candidate_output.is_ok(),
                "output": self.candidate_output.as_string(),
            },
        })
        .to_string()
    }
}
