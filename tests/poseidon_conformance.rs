//! Poseidon parameter, permutation and sponge conformance tests.
//!
//! Expected values match circomlib's generated constants for BN254.

use poseidon_bn254::error::ErrorCode;
use poseidon_bn254::field::Fr;
use poseidon_bn254::poseidon::{
    op_count, parameters, partial_rounds_for, permute, permute_with_layout, permute_with_trace,
    precompute, sponge_hash, sponge_hash_n, MixLayout, ParameterSet, SpongeState, FULL_ROUNDS,
    MAX_WIDTH, MIN_WIDTH, SBOX_ALPHA,
};
use std::sync::Arc;

mod expected_params {
    pub const T2_FIRST_CONSTANT: &str =
        "0x09c46e9ec68e9bd4fe1faaba294cba38a71aa177534cdd1b6c7dc0dbd0abd7a7";
    pub const T2_MDS_00: &str =
        "0x066f6f85d6f68a85ec10345351a23a3aaf07f38af8c952a7bceca70bd2af7ad5";
    pub const T3_FIRST_CONSTANT: &str =
        "0x0ee9a592ba9a9518d05986d656f40c2114c4993c11bb29938d21d47304cd8e6e";
    pub const T3_MDS_00: &str =
        "0x109b7f411ba0e4c9b2b70caf5c36a7b194be7c11ad24378bfedb68592ba8118b";
}

/// Permutation of the all-zero state at t = 3.
const ZERO_STATE_T3: [&str; 3] = [
    "14744269619966411208579211824598458697587494354926760081771325075741142829156",
    "8885954456466675435427211897928272918585230207077541337262544326002472295813",
    "3050072327558869074777408018454189238475956348680805044729799975289618568320",
];

fn frs(vals: &[u64]) -> Vec<Fr> {
    vals.iter().copied().map(Fr::from_u64).collect()
}

// =============================================================================
// Parameter generation
// =============================================================================

#[test]
fn pos_round_counts_table() {
    let expected = [56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68];
    for (width, rp) in (MIN_WIDTH..=MAX_WIDTH).zip(expected) {
        assert_eq!(partial_rounds_for(width).unwrap(), rp, "partial rounds for t={}", width);
    }
    assert_eq!(FULL_ROUNDS, 8);
    assert_eq!(SBOX_ALPHA, 5);
}

#[test]
fn pos_unsupported_widths() {
    for width in [0, 1, MAX_WIDTH + 1, 64] {
        assert_eq!(
            parameters(width).unwrap_err(),
            ErrorCode::UnsupportedArity(width),
            "width {} must be rejected",
            width
        );
    }
}

#[test]
fn pos_t2_parameters_match_circomlib() {
    let params = parameters(2).unwrap();
    assert_eq!(params.round_constants()[0].to_hex(), expected_params::T2_FIRST_CONSTANT);
    assert_eq!(params.mds().get(0, 0).to_hex(), expected_params::T2_MDS_00);
}

#[test]
fn pos_t3_parameters_match_circomlib() {
    let params = parameters(3).unwrap();
    assert_eq!(params.width(), 3);
    assert_eq!(params.full_rounds(), 8);
    assert_eq!(params.partial_rounds(), 57);
    assert_eq!(params.round_constants().len(), 3 * 65);
    assert_eq!(params.round_constants()[0].to_hex(), expected_params::T3_FIRST_CONSTANT);
    assert_eq!(params.mds().get(0, 0).to_hex(), expected_params::T3_MDS_00);
}

#[test]
fn pos_generation_is_deterministic() {
    let a = ParameterSet::generate(5).unwrap();
    let b = ParameterSet::generate(5).unwrap();
    assert_eq!(a, b, "regeneration must be bit-identical");
    assert_eq!(&a, &*parameters(5).unwrap(), "registry holds the generated set");
}

#[test]
fn pos_generated_mds_is_strong() {
    for width in MIN_WIDTH..=MAX_WIDTH {
        let params = parameters(width).unwrap();
        let mds = params.mds();
        assert_eq!(mds.width(), width);
        assert!(!mds.has_zero_entry(), "t={} MDS has a zero entry", width);
        assert!(mds.is_invertible(), "t={} MDS is singular", width);
        assert_eq!(params.mds_transposed(), &mds.transpose());
    }
}

#[test]
fn pos_round_schedule() {
    let params = parameters(3).unwrap();
    assert!(params.is_full_round(0));
    assert!(params.is_full_round(3));
    assert!(!params.is_full_round(4));
    assert!(!params.is_full_round(60));
    assert!(params.is_full_round(61));
    assert!(params.is_full_round(64));
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn pos_registry_shares_one_instance() {
    let a = parameters(6).unwrap();
    let b = parameters(6).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn pos_registry_concurrent_first_use() {
    let sets: Vec<Arc<ParameterSet>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| parameters(7).unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(sets.iter().all(|p| Arc::ptr_eq(p, &sets[0])), "every thread sees one published set");
}

#[test]
fn pos_precompute() {
    precompute([2, 3, 4]).unwrap();
    assert_eq!(precompute([3, 99]).unwrap_err(), ErrorCode::UnsupportedArity(99));
}

// =============================================================================
// Parameter substitution
// =============================================================================

fn parts(params: &ParameterSet) -> (usize, usize, usize, Vec<Fr>, Vec<Vec<Fr>>) {
    (
        params.width(),
        params.full_rounds(),
        params.partial_rounds(),
        params.round_constants().to_vec(),
        params.mds().rows(),
    )
}

#[test]
fn pos_from_parts_accepts_generated_set() {
    let params = parameters(3).unwrap();
    let (t, rf, rp, rc, mds) = parts(&params);
    let rebuilt = ParameterSet::from_parts(t, rf, rp, rc, mds).unwrap();
    assert_eq!(&rebuilt, &*params);
}

#[test]
fn pos_from_parts_rejects_short_constants() {
    let params = parameters(3).unwrap();
    let (t, rf, rp, mut rc, mds) = parts(&params);
    rc.pop();
    let err = ParameterSet::from_parts(t, rf, rp, rc, mds).unwrap_err();
    assert_eq!(err.code(), 301, "got {:?}", err);
}

#[test]
fn pos_from_parts_rejects_odd_full_rounds() {
    let params = parameters(3).unwrap();
    let (t, _, rp, _, mds) = parts(&params);
    let rc = vec![Fr::ONE; t * (7 + rp)];
    let err = ParameterSet::from_parts(t, 7, rp, rc, mds).unwrap_err();
    assert!(matches!(err, ErrorCode::InvalidParameters(_)));
}

#[test]
fn pos_from_parts_rejects_zero_mds_entry() {
    let params = parameters(3).unwrap();
    let (t, rf, rp, rc, mut mds) = parts(&params);
    mds[1][2] = Fr::ZERO;
    let err = ParameterSet::from_parts(t, rf, rp, rc, mds).unwrap_err();
    assert_eq!(err.code(), 300, "got {:?}", err);
}

#[test]
fn pos_from_parts_rejects_singular_mds() {
    let params = parameters(3).unwrap();
    let (t, rf, rp, rc, mut mds) = parts(&params);
    mds[2] = mds[0].clone();
    let err = ParameterSet::from_parts(t, rf, rp, rc, mds).unwrap_err();
    assert!(matches!(err, ErrorCode::WeakParameters(_)), "got {:?}", err);
}

#[test]
fn pos_from_parts_rejects_mds_width_mismatch() {
    let params = parameters(3).unwrap();
    let (_, rf, rp, _, mds) = parts(&params);
    let rc = vec![Fr::ONE; 4 * (rf + rp)];
    let err = ParameterSet::from_parts(4, rf, rp, rc, mds).unwrap_err();
    assert_eq!(err, ErrorCode::ArityMismatch { expected: 4, got: 3 });
}

#[test]
fn pos_serde_roundtrip_and_tamper() {
    let params = parameters(3).unwrap();
    let json = serde_json::to_value(&*params).unwrap();
    let back: ParameterSet = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(&back, &*params);

    let mut weak = json.clone();
    weak["mds"][0][0] = serde_json::Value::String("0".to_string());
    let err = serde_json::from_value::<ParameterSet>(weak).unwrap_err();
    assert!(err.to_string().contains("weak parameters"), "{}", err);

    let mut cubic = json;
    cubic["alpha"] = serde_json::json!(3);
    assert!(serde_json::from_value::<ParameterSet>(cubic).is_err());
}

#[test]
fn pos_substituted_constants_change_digest() {
    let params = parameters(3).unwrap();
    let (t, rf, rp, mut rc, mds) = parts(&params);
    rc[0] = rc[0] + Fr::ONE;
    let altered = ParameterSet::from_parts(t, rf, rp, rc, mds).unwrap();
    let state = frs(&[1, 2, 0]);
    assert_ne!(
        permute(&altered, &state).unwrap(),
        permute(&params, &state).unwrap()
    );
}

// =============================================================================
// Permutation
// =============================================================================

#[test]
fn pos_permute_zero_state() {
    let params = parameters(3).unwrap();
    let out = permute(&params, &[Fr::ZERO; 3]).unwrap();
    let decimals: Vec<String> = out.iter().map(Fr::to_decimal).collect();
    assert_eq!(decimals, ZERO_STATE_T3);
}

#[test]
fn pos_permute_wrong_width() {
    let params = parameters(3).unwrap();
    assert_eq!(
        permute(&params, &frs(&[1, 2])).unwrap_err(),
        ErrorCode::ArityMismatch { expected: 3, got: 2 }
    );
    assert_eq!(
        permute_with_layout(&params, MixLayout::ColumnMajor, &frs(&[1, 2, 3, 4])).unwrap_err(),
        ErrorCode::ArityMismatch { expected: 3, got: 4 }
    );
}

#[test]
fn pos_layouts_agree_at_every_width() {
    for width in MIN_WIDTH..=MAX_WIDTH {
        let params = parameters(width).unwrap();
        let state: Vec<Fr> = (0..width as u64).map(|i| Fr::from_u64(i * 7 + 3)).collect();
        let row = permute_with_layout(&params, MixLayout::RowMajor, &state).unwrap();
        let col = permute_with_layout(&params, MixLayout::ColumnMajor, &state).unwrap();
        assert_eq!(row, col, "layouts disagree at t={}", width);
    }
}

#[test]
fn pos_traces_agree_round_by_round() {
    let params = parameters(4).unwrap();
    let state = frs(&[11, 22, 33, 44]);
    let (row_out, row_trace) = permute_with_trace(&params, MixLayout::RowMajor, &state).unwrap();
    let (col_out, col_trace) = permute_with_trace(&params, MixLayout::ColumnMajor, &state).unwrap();
    assert_eq!(row_trace.len(), params.total_rounds());
    assert_eq!(row_out, col_out);
    for (round, (r, c)) in row_trace.iter().zip(&col_trace).enumerate() {
        assert_eq!(r, c, "trace diverges at round {}", round);
    }
    assert_eq!(row_trace.last(), Some(&row_out));
}

#[test]
fn pos_op_counts() {
    let params = parameters(3).unwrap();
    let row = op_count(&params, MixLayout::RowMajor);
    let col = op_count(&params, MixLayout::ColumnMajor);
    assert_eq!(row.sboxes, 8 * 3 + 57);
    assert_eq!(row.sboxes, col.sboxes);
    assert_eq!(row.muls, 3 * 81 + 65 * 9);
    assert_eq!(row.muls, col.muls);
    assert_eq!(row.adds, 65 * 9);
    assert_eq!(col.adds, 3 + 65 * 9);
}

// =============================================================================
// Sponge
// =============================================================================

#[test]
fn pos_sponge_vectors() {
    assert_eq!(
        sponge_hash(3, &[]).unwrap().to_decimal(),
        ZERO_STATE_T3[0],
        "empty sponge squeezes the zero-state permutation"
    );
    assert_eq!(
        sponge_hash(3, &frs(&[1, 2, 3])).unwrap().to_decimal(),
        "14078926634105747132600319391008052888402445378028469891429057792409314332820"
    );
}

#[test]
fn pos_sponge_incremental_matches_oneshot() {
    let elements = frs(&[5, 6, 7, 8, 9]);
    let mut sponge = SpongeState::new(parameters(3).unwrap());
    for x in &elements {
        sponge.absorb_one(*x);
    }
    assert_eq!(sponge.rate(), 2);
    assert_eq!(sponge.squeeze(2), sponge_hash_n(3, &elements, 2).unwrap());
}

#[test]
fn pos_sponge_unsupported_width() {
    assert_eq!(
        sponge_hash(18, &[Fr::ONE]).unwrap_err(),
        ErrorCode::UnsupportedArity(18)
    );
}
