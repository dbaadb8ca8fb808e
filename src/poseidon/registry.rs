//! Process-wide parameter registry.
//!
//! One write-once slot per supported width. The first caller for a width runs
//! generation; every later caller reads the published value without locking.
//! Generation is deterministic, so a failure is cached like a success.

use super::params::{ParameterSet, MAX_WIDTH, MIN_WIDTH};
use crate::error::{ErrorCode, PoseidonResult};
use std::sync::{Arc, OnceLock};
use tracing::debug;

const SLOTS: usize = MAX_WIDTH - MIN_WIDTH + 1;

type Slot = OnceLock<PoseidonResult<Arc<ParameterSet>>>;

static REGISTRY: [Slot; SLOTS] = [const { OnceLock::new() }; SLOTS];

/// Shared parameters for a state width, generated on first use.
pub fn parameters(width: usize) -> PoseidonResult<Arc<ParameterSet>> {
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(ErrorCode::UnsupportedArity(width));
    }
    REGISTRY[width - MIN_WIDTH]
        .get_or_init(|| {
            let generated = ParameterSet::generate(width).map(Arc::new);
            debug!(width, ok = generated.is_ok(), "published parameter set");
            generated
        })
        .clone()
}

/// Eagerly generate the parameters for the given widths.
pub fn precompute<I: IntoIterator<Item = usize>>(widths: I) -> PoseidonResult<()> {
    for width in widths {
        parameters(width)?;
    }
    Ok(())
}

/// Eagerly generate the parameters for every supported width.
pub fn precompute_all() -> PoseidonResult<()> {
    precompute(MIN_WIDTH..=MAX_WIDTH)
}

/// True if the parameters for `width` have already been published.
pub fn is_initialized(width: usize) -> bool {
    (MIN_WIDTH..=MAX_WIDTH).contains(&width) && REGISTRY[width - MIN_WIDTH].get().is_some()
}
