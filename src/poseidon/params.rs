//! Poseidon parameter sets.
//!
//! A parameter set is derived deterministically from the state width: round
//! counts come from a fixed table, round constants and the MDS matrix come
//! from a Grain LFSR seeded with the width and round counts.

use super::grain::GrainLfsr;
use super::matrix::MdsMatrix;
use crate::error::{ErrorCode, PoseidonResult};
use crate::field::Fr;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// S-box exponent (alpha = 5).
pub const SBOX_ALPHA: u64 = 5;

/// Number of full rounds (RF = 8), split evenly around the partial rounds.
pub const FULL_ROUNDS: usize = 8;

/// Smallest supported state width.
pub const MIN_WIDTH: usize = 2;

/// Largest supported state width.
pub const MAX_WIDTH: usize = 17;

/// Upper bound on MDS regeneration attempts before generation fails.
pub const MAX_MDS_ATTEMPTS: usize = 16;

/// Partial rounds for t = 2..=17 at the 128-bit security level.
const PARTIAL_ROUNDS: [usize; MAX_WIDTH - MIN_WIDTH + 1] =
    [56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68];

/// Number of partial rounds for a state width.
pub fn partial_rounds_for(width: usize) -> PoseidonResult<usize> {
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(ErrorCode::UnsupportedArity(width));
    }
    Ok(PARTIAL_ROUNDS[width - MIN_WIDTH])
}

/// Immutable Poseidon parameters for one state width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParameterSet")]
pub struct ParameterSet {
    width: usize,
    full_rounds: usize,
    partial_rounds: usize,
    alpha: u64,
    round_constants: Vec<Fr>,
    mds: MdsMatrix,
    #[serde(skip)]
    mds_transposed: MdsMatrix,
}

/// Unvalidated wire form of a parameter set.
#[derive(Debug, Deserialize)]
struct RawParameterSet {
    width: usize,
    full_rounds: usize,
    partial_rounds: usize,
    #[serde(default = "default_alpha")]
    alpha: u64,
    round_constants: Vec<Fr>,
    mds: Vec<Vec<Fr>>,
}

fn default_alpha() -> u64 {
    SBOX_ALPHA
}

impl TryFrom<RawParameterSet> for ParameterSet {
    type Error = ErrorCode;

    fn try_from(raw: RawParameterSet) -> Result<Self, Self::Error> {
        if raw.alpha != SBOX_ALPHA {
            return Err(ErrorCode::InvalidParameters(format!(
                "unsupported S-box exponent {}, only {} is implemented",
                raw.alpha, SBOX_ALPHA
            )));
        }
        ParameterSet::from_parts(
            raw.width,
            raw.full_rounds,
            raw.partial_rounds,
            raw.round_constants,
            raw.mds,
        )
    }
}

impl ParameterSet {
    /// Derive the parameter set for a state width.
    ///
    /// The result depends only on `width`, so two generations are bit-identical.
    pub fn generate(width: usize) -> PoseidonResult<Self> {
        let partial_rounds = partial_rounds_for(width)?;
        let mut lfsr = GrainLfsr::new(width, FULL_ROUNDS, partial_rounds);

        let constant_count = width * (FULL_ROUNDS + partial_rounds);
        let round_constants: Vec<Fr> = (0..constant_count)
            .map(|_| lfsr.next_field_element())
            .collect();

        let mds = generate_mds(&mut lfsr, width)?;

        debug!(
            width,
            full_rounds = FULL_ROUNDS,
            partial_rounds,
            constants = constant_count,
            "generated Poseidon parameters"
        );

        Self::from_parts(width, FULL_ROUNDS, partial_rounds, round_constants, mds.rows())
    }

    /// Assemble a parameter set from explicit parts, validating it first.
    ///
    /// This is the entry point for substituted parameters: a set that would make
    /// the round schedule inconsistent is rejected here, before any hash call.
    pub fn from_parts(
        width: usize,
        full_rounds: usize,
        partial_rounds: usize,
        round_constants: Vec<Fr>,
        mds_rows: Vec<Vec<Fr>>,
    ) -> PoseidonResult<Self> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            return Err(ErrorCode::UnsupportedArity(width));
        }
        if full_rounds == 0 || full_rounds % 2 != 0 {
            return Err(ErrorCode::InvalidParameters(format!(
                "full rounds must be even and non-zero, got {}",
                full_rounds
            )));
        }

        let expected = full_rounds
            .checked_add(partial_rounds)
            .and_then(|rounds| width.checked_mul(rounds))
            .ok_or_else(|| {
                ErrorCode::InvalidParameters(format!(
                    "round counts overflow: {} full, {} partial",
                    full_rounds, partial_rounds
                ))
            })?;
        if round_constants.len() != expected {
            return Err(ErrorCode::InvalidParameters(format!(
                "expected {} round constants (t={} x {} rounds), got {}",
                expected,
                width,
                full_rounds + partial_rounds,
                round_constants.len()
            )));
        }

        let mds = MdsMatrix::from_rows(mds_rows)?;
        if mds.width() != width {
            return Err(ErrorCode::ArityMismatch {
                expected: width,
                got: mds.width(),
            });
        }
        mds.check_strength()?;

        let mds_transposed = mds.transpose();
        Ok(Self {
            width,
            full_rounds,
            partial_rounds,
            alpha: SBOX_ALPHA,
            round_constants,
            mds,
            mds_transposed,
        })
    }

    /// State width t.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of full rounds.
    pub fn full_rounds(&self) -> usize {
        self.full_rounds
    }

    /// Number of partial rounds.
    pub fn partial_rounds(&self) -> usize {
        self.partial_rounds
    }

    /// Total number of rounds.
    pub fn total_rounds(&self) -> usize {
        self.full_rounds + self.partial_rounds
    }

    /// S-box exponent.
    pub fn alpha(&self) -> u64 {
        self.alpha
    }

    /// All round constants, round-major.
    pub fn round_constants(&self) -> &[Fr] {
        &self.round_constants
    }

    /// The `width` constants added at the start of `round`.
    pub fn round_constants_for(&self, round: usize) -> &[Fr] {
        &self.round_constants[round * self.width..(round + 1) * self.width]
    }

    /// The MDS matrix.
    pub fn mds(&self) -> &MdsMatrix {
        &self.mds
    }

    /// The MDS matrix transposed, used by the column-major layout.
    pub fn mds_transposed(&self) -> &MdsMatrix {
        &self.mds_transposed
    }

    /// True if `round` applies the S-box to every state element.
    pub fn is_full_round(&self, round: usize) -> bool {
        let half = self.full_rounds / 2;
        round < half || round >= half + self.partial_rounds
    }
}

fn generate_mds(lfsr: &mut GrainLfsr, width: usize) -> PoseidonResult<MdsMatrix> {
    for attempt in 1..=MAX_MDS_ATTEMPTS {
        let points: Vec<Fr> = (0..2 * width)
            .map(|_| lfsr.next_field_element_reduced())
            .collect();

        let candidate = MdsMatrix::cauchy(&points[..width], &points[width..])
            .and_then(|m| m.check_strength().map(|_| m));

        match candidate {
            Ok(mds) => return Ok(mds),
            Err(e) => warn!(width, attempt, error = %e, "rejected MDS candidate"),
        }
    }

    Err(ErrorCode::WeakParameters(format!(
        "no acceptable MDS matrix for width {} after {} attempts",
        width, MAX_MDS_ATTEMPTS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width3_first_constant_and_mds() {
        let params = ParameterSet::generate(3).unwrap();
        assert_eq!(
            params.round_constants()[0].to_hex(),
            "0x0ee9a592ba9a9518d05986d656f40c2114c4993c11bb29938d21d47304cd8e6e"
        );
        assert_eq!(
            params.mds().get(0, 0).to_hex(),
            "0x109b7f411ba0e4c9b2b70caf5c36a7b194be7c11ad24378bfedb68592ba8118b"
        );
    }

    #[test]
    fn test_round_schedule() {
        let params = ParameterSet::generate(3).unwrap();
        assert_eq!(params.partial_rounds(), 57);
        assert_eq!(params.total_rounds(), 65);
        assert_eq!(params.round_constants().len(), 3 * 65);

        let full: Vec<usize> = (0..params.total_rounds())
            .filter(|&r| params.is_full_round(r))
            .collect();
        assert_eq!(full, vec![0, 1, 2, 3, 61, 62, 63, 64]);
    }

    #[test]
    fn test_unsupported_width() {
        assert_eq!(
            ParameterSet::generate(1).unwrap_err(),
            ErrorCode::UnsupportedArity(1)
        );
        assert_eq!(
            ParameterSet::generate(18).unwrap_err(),
            ErrorCode::UnsupportedArity(18)
        );
    }

    #[test]
    fn test_from_parts_rejects_short_constants() {
        let params = ParameterSet::generate(2).unwrap();
        let mut constants = params.round_constants().to_vec();
        constants.pop();
        let err = ParameterSet::from_parts(
            2,
            params.full_rounds(),
            params.partial_rounds(),
            constants,
            params.mds().rows(),
        )
        .unwrap_err();
        assert_eq!(err.name(), "InvalidParameters");
    }

    #[test]
    fn test_from_parts_rejects_odd_full_rounds() {
        let params = ParameterSet::generate(2).unwrap();
        let err = ParameterSet::from_parts(
            2,
            7,
            params.partial_rounds() + 1,
            params.round_constants().to_vec(),
            params.mds().rows(),
        )
        .unwrap_err();
        assert_eq!(err.name(), "InvalidParameters");
    }

    #[test]
    fn test_from_parts_rejects_zero_mds_entry() {
        let params = ParameterSet::generate(2).unwrap();
        let mut rows = params.mds().rows();
        rows[1][0] = Fr::ZERO;
        let err = ParameterSet::from_parts(
            2,
            params.full_rounds(),
            params.partial_rounds(),
            params.round_constants().to_vec(),
            rows,
        )
        .unwrap_err();
        assert_eq!(err.name(), "WeakParameters");
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let params = ParameterSet::generate(2).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        let back: ParameterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["partial_rounds"] = serde_json::json!(10);
        assert!(serde_json::from_value::<ParameterSet>(value).is_err());
    }

    #[test]
    fn test_from_parts_rejects_oversized_width() {
        let json = format!(
            r#"{{"width":{},"full_rounds":2,"partial_rounds":0,"round_constants":[],"mds":[["1"]]}}"#,
            usize::MAX / 2 + 1
        );
        let err = serde_json::from_str::<ParameterSet>(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported arity"), "{}", err);

        let err = ParameterSet::from_parts(MAX_WIDTH + 1, 8, 57, Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err, ErrorCode::UnsupportedArity(MAX_WIDTH + 1));
    }

    #[test]
    fn test_from_parts_rejects_round_count_overflow() {
        let err = ParameterSet::from_parts(3, 8, usize::MAX, Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err.name(), "InvalidParameters");

        let err = ParameterSet::from_parts(3, 8, usize::MAX / 2, Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err.name(), "InvalidParameters");
    }
}
