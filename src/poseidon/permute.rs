//! Poseidon permutation engine.
//!
//! Each round:
//! 1. Round constant addition
//! 2. S-box (x^5) on every element (full round) or on `state[0]` (partial round)
//! 3. MDS matrix multiplication
//!
//! Full rounds are split evenly before and after the partial rounds. Two matrix
//! layouts run the same schedule and agree bit-for-bit:
//!
//! - [`MixLayout::RowMajor`] computes one dot product per output element and
//!   adds round constants at the start of every round.
//! - [`MixLayout::ColumnMajor`] accumulates scaled columns of the matrix into an
//!   accumulator seeded with the next round's constants, so constant addition
//!   is folded into the linear layer.

use super::params::ParameterSet;
use crate::error::{ErrorCode, PoseidonResult};
use crate::field::Fr;
use serde::{Deserialize, Serialize};

/// Order in which the linear layer is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixLayout {
    /// Dot product per row, separate constant addition.
    #[default]
    RowMajor,
    /// Column accumulation with constants fused into the accumulator.
    ColumnMajor,
}

/// Field operation counts for one permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OpCount {
    /// S-box evaluations.
    pub sboxes: u64,
    /// Field multiplications, S-boxes included.
    pub muls: u64,
    /// Field additions.
    pub adds: u64,
}

fn check_width(params: &ParameterSet, state: &[Fr]) -> PoseidonResult<()> {
    if state.len() != params.width() {
        return Err(ErrorCode::ArityMismatch {
            expected: params.width(),
            got: state.len(),
        });
    }
    Ok(())
}

/// Complete Poseidon permutation with the row-major layout.
pub fn permute(params: &ParameterSet, state: &[Fr]) -> PoseidonResult<Vec<Fr>> {
    permute_with_layout(params, MixLayout::RowMajor, state)
}

/// Complete Poseidon permutation with an explicit matrix layout.
pub fn permute_with_layout(
    params: &ParameterSet,
    layout: MixLayout,
    state: &[Fr],
) -> PoseidonResult<Vec<Fr>> {
    check_width(params, state)?;
    let mut st = state.to_vec();
    permute_in_place(params, layout, &mut st);
    Ok(st)
}

/// Poseidon permutation with trace output for debugging.
///
/// Returns (final_state, round_traces) where each trace entry is the state
/// after that round's linear layer, identical for both layouts.
pub fn permute_with_trace(
    params: &ParameterSet,
    layout: MixLayout,
    state: &[Fr],
) -> PoseidonResult<(Vec<Fr>, Vec<Vec<Fr>>)> {
    check_width(params, state)?;
    let mut st = state.to_vec();
    let mut traces = Vec::with_capacity(params.total_rounds());
    match layout {
        MixLayout::RowMajor => row_major(params, &mut st, Some(&mut traces)),
        MixLayout::ColumnMajor => column_major(params, &mut st, Some(&mut traces)),
    }
    Ok((st, traces))
}

/// Permute a state whose width the caller has already checked.
pub(crate) fn permute_in_place(params: &ParameterSet, layout: MixLayout, state: &mut [Fr]) {
    debug_assert_eq!(state.len(), params.width());
    match layout {
        MixLayout::RowMajor => row_major(params, state, None),
        MixLayout::ColumnMajor => column_major(params, state, None),
    }
}

#[inline]
fn sbox_layer(params: &ParameterSet, round: usize, state: &mut [Fr]) {
    if params.is_full_round(round) {
        for x in state.iter_mut() {
            *x = x.pow5();
        }
    } else {
        state[0] = state[0].pow5();
    }
}

fn row_major(params: &ParameterSet, state: &mut [Fr], mut trace: Option<&mut Vec<Vec<Fr>>>) {
    let mut scratch = vec![Fr::ZERO; state.len()];

    for round in 0..params.total_rounds() {
        for (x, c) in state.iter_mut().zip(params.round_constants_for(round)) {
            *x += *c;
        }
        sbox_layer(params, round, state);
        params.mds().mul_vec_into(state, &mut scratch);
        state.copy_from_slice(&scratch);

        if let Some(t) = trace.as_deref_mut() {
            t.push(state.to_vec());
        }
    }
}

fn column_major(params: &ParameterSet, state: &mut [Fr], mut trace: Option<&mut Vec<Vec<Fr>>>) {
    let rounds = params.total_rounds();
    let columns = params.mds_transposed();
    let mut acc = vec![Fr::ZERO; state.len()];

    for (x, c) in state.iter_mut().zip(params.round_constants_for(0)) {
        *x += *c;
    }

    for round in 0..rounds {
        sbox_layer(params, round, state);

        let next = round + 1;
        if next < rounds {
            acc.copy_from_slice(params.round_constants_for(next));
        } else {
            acc.fill(Fr::ZERO);
        }
        for (j, x) in state.iter().enumerate() {
            for (a, m) in acc.iter_mut().zip(columns.row(j)) {
                *a += *m * *x;
            }
        }
        state.copy_from_slice(&acc);

        if let Some(t) = trace.as_deref_mut() {
            if next < rounds {
                // strip the pre-added constants so traces line up with row-major
                let unfused = state
                    .iter()
                    .zip(params.round_constants_for(next))
                    .map(|(x, c)| *x - *c)
                    .collect();
                t.push(unfused);
            } else {
                t.push(state.to_vec());
            }
        }
    }
}

/// Field operations performed by one permutation in the given layout.
pub fn op_count(params: &ParameterSet, layout: MixLayout) -> OpCount {
    let t = params.width() as u64;
    let rounds = params.total_rounds() as u64;
    let sboxes = params.full_rounds() as u64 * t + params.partial_rounds() as u64;
    let muls = 3 * sboxes + rounds * t * t;
    let adds = match layout {
        MixLayout::RowMajor => rounds * t + rounds * t * (t - 1),
        MixLayout::ColumnMajor => t + rounds * t * t,
    };
    OpCount { sboxes, muls, adds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poseidon::registry::parameters;

    #[test]
    fn test_permute_deterministic() {
        let params = parameters(3).unwrap();
        let state = [Fr::ONE, Fr::from_u64(2), Fr::ZERO];
        let result1 = permute(&params, &state).unwrap();
        let result2 = permute(&params, &state).unwrap();
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_zero_state_vector() {
        let params = parameters(3).unwrap();
        let out = permute(&params, &[Fr::ZERO; 3]).unwrap();
        assert_eq!(
            out[0].to_decimal(),
            "14744269619966411208579211824598458697587494354926760081771325075741142829156"
        );
        assert_eq!(
            out[2].to_decimal(),
            "3050072327558869074777408018454189238475956348680805044729799975289618568320"
        );
    }

    #[test]
    fn test_layouts_agree() {
        for width in [2, 3, 5, 9] {
            let params = parameters(width).unwrap();
            let state: Vec<Fr> = (0..width as u64).map(|i| Fr::from_u64(i * 7 + 1)).collect();
            let row = permute_with_layout(&params, MixLayout::RowMajor, &state).unwrap();
            let col = permute_with_layout(&params, MixLayout::ColumnMajor, &state).unwrap();
            assert_eq!(row, col, "layouts diverge at width {}", width);
        }
    }

    #[test]
    fn test_permute_with_trace_length() {
        let params = parameters(3).unwrap();
        let state = [Fr::ONE, Fr::from_u64(2), Fr::ZERO];
        let (out, traces) = permute_with_trace(&params, MixLayout::RowMajor, &state).unwrap();
        assert_eq!(traces.len(), params.total_rounds());
        assert_eq!(traces.last(), Some(&out));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let params = parameters(3).unwrap();
        let err = permute(&params, &[Fr::ONE, Fr::ONE]).unwrap_err();
        assert_eq!(err, ErrorCode::ArityMismatch { expected: 3, got: 2 });
    }

    #[test]
    fn test_op_count_width3() {
        let params = parameters(3).unwrap();
        let ops = op_count(&params, MixLayout::RowMajor);
        assert_eq!(ops.sboxes, 8 * 3 + 57);
        assert_eq!(ops.muls, 3 * ops.sboxes + 65 * 9);
        assert_eq!(ops.adds, 65 * 9);
    }
}
