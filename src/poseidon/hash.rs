//! Hash front-ends.
//!
//! A front-end packs `k` inputs into an initial state of width `t`, runs one
//! permutation and extracts the digest from the front of the final state.
//! Every [`Variant`] drives the same engine with the same parameter set, so all
//! of them produce the same digest for the same inputs and width.

use super::params::ParameterSet;
use super::permute::{permute_in_place, MixLayout};
use super::registry::parameters;
use crate::config::HashConfig;
use crate::error::{ErrorCode, PoseidonResult};
use crate::field::Fr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Width of the fixed three-element front-end.
pub const T3_WIDTH: usize = 3;

/// Implementation variant of the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Generic front-end on the row-major engine.
    #[default]
    V1,
    /// Generic front-end on the column-major engine with fused constants.
    V2,
    /// Fixed `[Fr; 3]` state, two inputs, zero capacity at index 2.
    T3,
}

impl Variant {
    /// Every variant, in declaration order.
    pub const ALL: [Variant; 3] = [Variant::V1, Variant::V2, Variant::T3];

    /// Matrix layout this variant runs the permutation with.
    pub fn mix_layout(self) -> MixLayout {
        match self {
            Variant::V1 => MixLayout::RowMajor,
            Variant::V2 | Variant::T3 => MixLayout::ColumnMajor,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Variant::V1 => "v1",
            Variant::V2 => "v2",
            Variant::T3 => "t3",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Variant::V1),
            "v2" => Ok(Variant::V2),
            "t3" => Ok(Variant::T3),
            other => Err(ErrorCode::InvalidEncoding(format!(
                "unknown variant '{}', expected v1, v2 or t3",
                other
            ))),
        }
    }
}

/// Where inputs and the capacity element sit in the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateLayout {
    /// Inputs at `0..k`, capacity element at `t - 1`.
    #[default]
    InputsFirst,
    /// Capacity element at `0`, inputs at `1..=k` (circomlib).
    CapacityFirst,
}

impl StateLayout {
    /// Index of the capacity element in a state of `width` elements.
    pub fn capacity_index(self, width: usize) -> usize {
        match self {
            StateLayout::InputsFirst => width - 1,
            StateLayout::CapacityFirst => 0,
        }
    }

    /// Index of the first input.
    pub fn input_offset(self) -> usize {
        match self {
            StateLayout::InputsFirst => 0,
            StateLayout::CapacityFirst => 1,
        }
    }
}

impl FromStr for StateLayout {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "inputs_first" => Ok(StateLayout::InputsFirst),
            "capacity_first" => Ok(StateLayout::CapacityFirst),
            other => Err(ErrorCode::InvalidEncoding(format!(
                "unknown state layout '{}'",
                other
            ))),
        }
    }
}

/// Value placed in the capacity element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Capacity and unused slots are zero.
    #[default]
    Zero,
    /// Capacity element holds the number of inputs.
    InputLength,
}

impl FromStr for Padding {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "zero" => Ok(Padding::Zero),
            "input_length" => Ok(Padding::InputLength),
            other => Err(ErrorCode::InvalidEncoding(format!(
                "unknown padding '{}'",
                other
            ))),
        }
    }
}

/// A configured hash front-end bound to one parameter set.
#[derive(Debug, Clone)]
pub struct PoseidonHasher {
    config: HashConfig,
    params: Arc<ParameterSet>,
}

impl PoseidonHasher {
    /// Front-end using the registry's parameters for `config.width`.
    pub fn new(config: HashConfig) -> PoseidonResult<Self> {
        config.validate()?;
        let params = parameters(config.width)?;
        Ok(Self { config, params })
    }

    /// Front-end using substituted parameters.
    pub fn with_parameters(config: HashConfig, params: Arc<ParameterSet>) -> PoseidonResult<Self> {
        config.validate()?;
        if params.width() != config.width {
            return Err(ErrorCode::ArityMismatch {
                expected: config.width,
                got: params.width(),
            });
        }
        Ok(Self { config, params })
    }

    /// The configuration this front-end was built with.
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// The parameter set this front-end hashes with.
    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    /// Hash `inputs` to a single field element.
    pub fn hash(&self, inputs: &[Fr]) -> PoseidonResult<Fr> {
        match self.config.variant {
            Variant::T3 => {
                let pair = t3_inputs(inputs, self.params.width())?;
                Ok(permute_t3(&self.params, pair)[0])
            }
            Variant::V1 | Variant::V2 => Ok(self.permuted(inputs)?[0]),
        }
    }

    /// Hash `inputs` and return the first `m` elements of the final state.
    pub fn hash_many(&self, inputs: &[Fr], m: usize) -> PoseidonResult<Vec<Fr>> {
        let width = self.params.width();
        if m == 0 || m > width {
            return Err(ErrorCode::ArityMismatch {
                expected: width,
                got: m,
            });
        }
        let mut state = match self.config.variant {
            Variant::T3 => permute_t3(&self.params, t3_inputs(inputs, width)?).to_vec(),
            Variant::V1 | Variant::V2 => self.permuted(inputs)?,
        };
        state.truncate(m);
        Ok(state)
    }

    /// Initial state for `inputs` under this configuration.
    pub fn initial_state(&self, inputs: &[Fr]) -> PoseidonResult<Vec<Fr>> {
        let width = self.params.width();
        check_input_count(inputs.len(), width)?;
        if self.config.variant == Variant::T3 {
            t3_inputs(inputs, width)?;
        }

        let layout = self.config.layout;
        let mut state = vec![Fr::ZERO; width];
        let offset = layout.input_offset();
        state[offset..offset + inputs.len()].copy_from_slice(inputs);
        if self.config.padding == Padding::InputLength {
            state[layout.capacity_index(width)] = Fr::from_u64(inputs.len() as u64);
        }
        Ok(state)
    }

    fn permuted(&self, inputs: &[Fr]) -> PoseidonResult<Vec<Fr>> {
        let mut state = self.initial_state(inputs)?;
        permute_in_place(&self.params, self.config.variant.mix_layout(), &mut state);
        Ok(state)
    }
}

fn check_input_count(count: usize, width: usize) -> PoseidonResult<()> {
    if count == 0 {
        return Err(ErrorCode::EmptyInput);
    }
    if count >= width {
        return Err(ErrorCode::InputTooLarge { got: count, width });
    }
    Ok(())
}

fn t3_inputs(inputs: &[Fr], width: usize) -> PoseidonResult<[Fr; 2]> {
    check_input_count(inputs.len(), width)?;
    match inputs {
        [a, b] => Ok([*a, *b]),
        _ => Err(ErrorCode::ArityMismatch {
            expected: 2,
            got: inputs.len(),
        }),
    }
}

#[inline]
fn permute_t3(params: &ParameterSet, inputs: [Fr; 2]) -> [Fr; 3] {
    let mut state = [inputs[0], inputs[1], Fr::ZERO];
    permute_in_place(params, MixLayout::ColumnMajor, &mut state);
    state
}

/// Hash `inputs` at width `width` with the default front-end.
pub fn hash(inputs: &[Fr], width: usize) -> PoseidonResult<Fr> {
    hash_with(Variant::V1, inputs, width)
}

/// Hash `inputs` at width `width` with the given variant and default layout.
pub fn hash_with(variant: Variant, inputs: &[Fr], width: usize) -> PoseidonResult<Fr> {
    PoseidonHasher::new(HashConfig::new(variant, width))?.hash(inputs)
}

/// Fixed three-element hash of two inputs.
pub fn hash_t3(inputs: [Fr; 2]) -> PoseidonResult<Fr> {
    let params = parameters(T3_WIDTH)?;
    Ok(permute_t3(&params, inputs)[0])
}
