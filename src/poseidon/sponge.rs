//! Poseidon sponge construction.
//!
//! Variable-length hashing on top of the permutation. The rate portion is the
//! first `t - 1` state elements and the capacity is the last element.

use super::params::ParameterSet;
use super::permute::{permute_in_place, MixLayout};
use super::registry::parameters;
use crate::error::PoseidonResult;
use crate::field::Fr;
use std::sync::Arc;

/// Sponge operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Absorbing input elements
    Absorbing,
    /// Squeezing output elements
    Squeezing,
}

/// Sponge state for incremental hashing.
#[derive(Debug, Clone)]
pub struct SpongeState {
    params: Arc<ParameterSet>,
    layout: MixLayout,
    state: Vec<Fr>,
    pos: usize,
    mode: Mode,
}

impl SpongeState {
    /// Create a zeroed sponge over the given parameters.
    pub fn new(params: Arc<ParameterSet>) -> Self {
        Self::with_layout(params, MixLayout::RowMajor)
    }

    /// Create a zeroed sponge with an explicit matrix layout.
    pub fn with_layout(params: Arc<ParameterSet>, layout: MixLayout) -> Self {
        let state = vec![Fr::ZERO; params.width()];
        Self {
            params,
            layout,
            state,
            pos: 0,
            mode: Mode::Absorbing,
        }
    }

    /// Number of elements absorbed or squeezed per permutation.
    pub fn rate(&self) -> usize {
        self.params.width() - 1
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn permute(&mut self) {
        permute_in_place(&self.params, self.layout, &mut self.state);
    }

    /// Absorb a single field element.
    ///
    /// 1. if mode == SQUEEZE: permute(); mode = ABSORB; pos = 0
    /// 2. state[pos] += x; pos += 1
    /// 3. if pos == rate: permute(); pos = 0
    pub fn absorb_one(&mut self, x: Fr) {
        if self.mode == Mode::Squeezing {
            self.permute();
            self.mode = Mode::Absorbing;
            self.pos = 0;
        }

        self.state[self.pos] += x;
        self.pos += 1;

        if self.pos >= self.rate() {
            self.permute();
            self.pos = 0;
        }
    }

    /// Absorb multiple field elements.
    pub fn absorb(&mut self, elements: &[Fr]) {
        for &x in elements {
            self.absorb_one(x);
        }
    }

    fn finalize(&mut self) {
        if self.mode == Mode::Absorbing {
            self.permute();
            self.mode = Mode::Squeezing;
            self.pos = 0;
        }
    }

    /// Squeeze a single field element.
    ///
    /// 1. if mode == ABSORB: permute(); mode = SQUEEZE; pos = 0
    /// 2. y = state[pos]; pos += 1
    /// 3. if pos == rate: permute(); pos = 0
    pub fn squeeze_one(&mut self) -> Fr {
        self.finalize();

        let result = self.state[self.pos];
        self.pos += 1;

        if self.pos >= self.rate() {
            self.permute();
            self.pos = 0;
        }

        result
    }

    /// Squeeze n field elements.
    pub fn squeeze(&mut self, n: usize) -> Vec<Fr> {
        (0..n).map(|_| self.squeeze_one()).collect()
    }
}

/// Sponge hash of any number of elements to one element, at width `width`.
pub fn sponge_hash(width: usize, elements: &[Fr]) -> PoseidonResult<Fr> {
    let mut sponge = SpongeState::new(parameters(width)?);
    sponge.absorb(elements);
    Ok(sponge.squeeze_one())
}

/// Sponge hash of any number of elements to `n` elements, at width `width`.
pub fn sponge_hash_n(width: usize, elements: &[Fr], n: usize) -> PoseidonResult<Vec<Fr>> {
    let mut sponge = SpongeState::new(parameters(width)?);
    sponge.absorb(elements);
    Ok(sponge.squeeze(n))
}
