//! Equivalence harness comparing hash front-ends.

use super::executor::{Computation, LedgerExecutor};
use super::repro::ReproBundle;
use super::runner::{HashOutput, HashRunner, VariantRunner};
use super::ConformanceResult;
use crate::config::HashConfig;
use crate::field::Fr;
use crate::poseidon::{Variant, T3_WIDTH};
use serde::Serialize;
use tracing::trace;

/// Result of an equivalence test.
#[derive(Debug)]
pub enum DiffResult {
    /// Every runner produced the same output.
    Match {
        /// The matching output value.
        value: String,
    },
    /// A candidate disagreed with the reference.
    Mismatch {
        /// Reference output.
        reference: HashOutput,
        /// First disagreeing candidate output.
        candidate: HashOutput,
        /// Repro bundle for debugging.
        repro: ReproBundle,
    },
    /// There was nothing to compare the reference against.
    NoCandidates,
}

impl DiffResult {
    /// Check if the result is a match.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    /// Check if the result is a mismatch.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}

/// Compares a reference runner against any number of candidate runners.
pub struct EquivalenceHarness {
    reference: Box<dyn HashRunner>,
    candidates: Vec<Box<dyn HashRunner>>,
}

impl EquivalenceHarness {
    /// Harness with a reference runner and no candidates.
    pub fn new(reference: Box<dyn HashRunner>) -> Self {
        Self {
            reference,
            candidates: Vec::new(),
        }
    }

    /// Harness comparing V1 against every other variant valid at `width`.
    ///
    /// T3 joins only at width 3, where its fixed state applies.
    pub fn for_width(width: usize) -> ConformanceResult<Self> {
        let reference = VariantRunner::new(HashConfig::new(Variant::V1, width))?;
        let mut harness = Self::new(Box::new(reference));
        harness.add_candidate(Box::new(VariantRunner::new(HashConfig::new(
            Variant::V2,
            width,
        ))?));
        if width == T3_WIDTH {
            harness.add_candidate(Box::new(VariantRunner::new(HashConfig::t3())?));
        }
        Ok(harness)
    }

    /// Add a candidate runner.
    pub fn add_candidate(&mut self, candidate: Box<dyn HashRunner>) {
        self.candidates.push(candidate);
    }

    /// Builder form of [`add_candidate`](Self::add_candidate).
    pub fn with_candidate(mut self, candidate: Box<dyn HashRunner>) -> Self {
        self.add_candidate(candidate);
        self
    }

    /// Number of candidate runners.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Run every runner on `inputs` and compare with the reference.
    pub fn compare(&self, test_name: &str, inputs: &[Fr]) -> ConformanceResult<DiffResult> {
        if self.candidates.is_empty() {
            return Ok(DiffResult::NoCandidates);
        }

        let reference = self.reference.hash(inputs)?;
        for candidate in &self.candidates {
            let output = candidate.hash(inputs)?;
            trace!(
                test = test_name,
                runner = candidate.name(),
                output = output.as_string(),
                "candidate output"
            );
            if output != reference {
                let repro = ReproBundle::new(
                    test_name,
                    self.reference.name(),
                    candidate.name(),
                    inputs,
                    reference.clone(),
                    output.clone(),
                );
                return Ok(DiffResult::Mismatch {
                    reference,
                    candidate: output,
                    repro,
                });
            }
        }

        Ok(DiffResult::Match {
            value: reference.as_string().to_string(),
        })
    }

    /// Compare the reference runner with a published decimal digest.
    pub fn check_reference(
        &self,
        test_name: &str,
        inputs: &[Fr],
        expected_decimal: &str,
    ) -> ConformanceResult<DiffResult> {
        let reference = self.reference.hash(inputs)?;
        let expected = HashOutput::Ok(expected_decimal.to_string());
        if reference == expected {
            return Ok(DiffResult::Match {
                value: expected_decimal.to_string(),
            });
        }
        let repro = ReproBundle::new(
            test_name,
            self.reference.name(),
            "published",
            inputs,
            reference.clone(),
            expected.clone(),
        );
        Ok(DiffResult::Mismatch {
            reference,
            candidate: expected,
            repro,
        })
    }

    /// Run a batch of equivalence tests.
    pub fn compare_batch<'a>(
        &self,
        tests: impl IntoIterator<Item = (&'a str, &'a [Fr])>,
    ) -> BatchResult {
        let mut results = BatchResult::new();

        for (name, inputs) in tests {
            match self.compare(name, inputs) {
                Ok(DiffResult::Match { value }) => results.record_pass(name, &value),
                Ok(DiffResult::Mismatch { repro, .. }) => results.record_fail(name, repro),
                Ok(DiffResult::NoCandidates) => results.record_skip(name, "no candidates"),
                Err(e) => results.record_error(name, e.to_string()),
            }
        }

        results
    }
}

/// Results from running a batch of equivalence tests.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Number of tests that passed.
    pub passed: usize,
    /// Number of tests that failed.
    pub failed: usize,
    /// Number of tests that were skipped.
    pub skipped: usize,
    /// Number of tests that errored.
    pub errors: usize,
    /// Repro bundles of failures.
    pub failures: Vec<ReproBundle>,
    /// Test names and messages of errors.
    pub error_details: Vec<(String, String)>,
}

impl BatchResult {
    /// Create a new empty batch result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a passing test.
    pub fn record_pass(&mut self, _name: &str, _value: &str) {
        self.passed += 1;
    }

    /// Record a failing test.
    pub fn record_fail(&mut self, _name: &str, repro: ReproBundle) {
        self.failed += 1;
        self.failures.push(repro);
    }

    /// Record a skipped test.
    pub fn record_skip(&mut self, _name: &str, _reason: &str) {
        self.skipped += 1;
    }

    /// Record a test error.
    pub fn record_error(&mut self, name: &str, message: String) {
        self.errors += 1;
        self.error_details.push((name.to_string(), message));
    }

    /// Check if all tests passed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Get total number of tests run.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errors
    }

    /// Format a summary string.
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
}

/// Digest and cost of one variant on a ledger executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostReport {
    /// Variant measured.
    pub variant: Variant,
    /// Digest the executor returned.
    pub digest: Fr,
    /// Cost units consumed.
    pub cost_used: u64,
}

/// Submit the same hash under every variant valid at `width` and record costs.
///
/// Costs are measurements for comparison only; digests must still agree, which
/// callers check on the returned reports.
pub fn measure_costs<E: LedgerExecutor + ?Sized>(
    executor: &E,
    inputs: &[Fr],
    width: usize,
    cost_budget: u64,
) -> ConformanceResult<Vec<CostReport>> {
    Variant::ALL
        .iter()
        .filter(|&&v| v != Variant::T3 || width == T3_WIDTH)
        .map(|&variant| -> ConformanceResult<CostReport> {
            let computation = Computation::new(HashConfig::new(variant, width), inputs.to_vec());
            let execution = executor.execute(&computation, cost_budget)?;
            trace!(
                executor = executor.name(),
                %variant,
                cost = execution.cost_used,
                "measured cost"
            );
            Ok(CostReport {
                variant,
                digest: execution.digest,
                cost_used: execution.cost_used,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::LocalExecutor;

    struct ConstantRunner(&'static str);

    impl HashRunner for ConstantRunner {
        fn hash(&self, _inputs: &[Fr]) -> ConformanceResult<HashOutput> {
            Ok(HashOutput::Ok(self.0.to_string()))
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    #[test]
    fn test_no_candidates() {
        let reference = VariantRunner::new(HashConfig::default()).unwrap();
        let harness = EquivalenceHarness::new(Box::new(reference));
        let result = harness.compare("solo", &[Fr::ONE]).unwrap();
        assert!(matches!(result, DiffResult::NoCandidates));
    }

    #[test]
    fn test_all_variants_match_width3() {
        let harness = EquivalenceHarness::for_width(3).unwrap();
        assert_eq!(harness.candidate_count(), 2);
        let result = harness
            .compare("pair", &[Fr::from_u64(3), Fr::from_u64(4)])
            .unwrap();
        assert!(result.is_match());
    }

    #[test]
    fn test_mismatch_produces_repro() {
        let harness = EquivalenceHarness::for_width(3)
            .unwrap()
            .with_candidate(Box::new(ConstantRunner("7")));
        match harness.compare("broken", &[Fr::ONE, Fr::ONE]).unwrap() {
            DiffResult::Mismatch { candidate, repro, .. } => {
                assert_eq!(candidate, HashOutput::Ok("7".to_string()));
                assert_eq!(repro.candidate_runner, "constant");
                assert_eq!(repro.inputs, vec!["1".to_string(), "1".to_string()]);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_compare_by_name() {
        let harness = EquivalenceHarness::for_width(3).unwrap();
        let result = harness.compare("too_many", &[Fr::ONE; 3]).unwrap();
        match result {
            DiffResult::Match { value } => assert_eq!(value, "InputTooLarge"),
            other => panic!("expected match on error name, got {:?}", other),
        }
    }

    #[test]
    fn test_check_reference() {
        let harness = EquivalenceHarness::for_width(3).unwrap();
        let inputs = [Fr::ONE, Fr::from_u64(2)];
        let good = harness
            .check_reference(
                "pair",
                &inputs,
                "19928211794257771485102269587486881376606572650317269981454285080979503847156",
            )
            .unwrap();
        assert!(good.is_match());
        let bad = harness.check_reference("pair", &inputs, "1").unwrap();
        assert!(bad.is_mismatch());
    }

    #[test]
    fn test_batch_result() {
        let harness = EquivalenceHarness::for_width(4).unwrap();
        let a = [Fr::ONE];
        let b = [Fr::ONE, Fr::from_u64(2), Fr::from_u64(3)];
        let results = harness.compare_batch([("one", &a[..]), ("three", &b[..])]);
        assert_eq!(results.passed, 2);
        assert_eq!(results.total(), 2);
        assert!(results.all_passed());
        assert_eq!(results.summary(), "2 passed, 0 failed, 0 skipped, 0 errors (total: 2)");
    }

    #[test]
    fn test_measure_costs() {
        let executor = LocalExecutor::new();
        let inputs = [Fr::from_u64(10), Fr::from_u64(20)];
        let reports = measure_costs(&executor, &inputs, 3, u64::MAX).unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.digest == reports[0].digest));
        assert!(reports.iter().all(|r| r.cost_used > 0));

        let wide = measure_costs(&executor, &inputs, 5, u64::MAX).unwrap();
        assert_eq!(wide.len(), 2);
    }
}
