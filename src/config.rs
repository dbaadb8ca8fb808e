//! Hash front-end configuration.
//!
//! A [`HashConfig`] selects the variant, state width, state layout and padding
//! of a front-end. It can be built in code or loaded from JSON, where missing
//! fields take their defaults:
//!
//! ```json
//! { "variant": "v2", "width": 5, "layout": "capacity_first", "padding": "zero" }
//! ```

use crate::error::{ErrorCode, PoseidonResult};
use crate::poseidon::{partial_rounds_for, Padding, StateLayout, Variant, T3_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// File is not valid configuration JSON.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// Configuration parsed but describes an unusable front-end.
    #[error(transparent)]
    Invalid(#[from] ErrorCode),
}

/// Front-end selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashConfig {
    /// Implementation variant.
    pub variant: Variant,
    /// State width t.
    pub width: usize,
    /// Placement of inputs and capacity.
    pub layout: StateLayout,
    /// Capacity element contents.
    pub padding: Padding,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            variant: Variant::V1,
            width: T3_WIDTH,
            layout: StateLayout::InputsFirst,
            padding: Padding::Zero,
        }
    }
}

impl HashConfig {
    /// Config with the given variant and width and default layout and padding.
    pub fn new(variant: Variant, width: usize) -> Self {
        Self {
            variant,
            width,
            ..Self::default()
        }
    }

    /// The fixed three-element front-end.
    pub fn t3() -> Self {
        Self::new(Variant::T3, T3_WIDTH)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: HashConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check that the width is supported and the variant can honour the layout.
    pub fn validate(&self) -> PoseidonResult<()> {
        partial_rounds_for(self.width)?;
        if self.variant == Variant::T3 {
            if self.width != T3_WIDTH {
                return Err(ErrorCode::ArityMismatch {
                    expected: T3_WIDTH,
                    got: self.width,
                });
            }
            if self.layout != StateLayout::InputsFirst || self.padding != Padding::Zero {
                return Err(ErrorCode::InvalidParameters(
                    "t3 uses a fixed inputs-first state with a zero capacity element".to_string(),
                ));
            }
        }
        Ok(())
    }
}
