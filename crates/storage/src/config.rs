//! Merge operator configuration via TOML
//!
//! Engines embedding the merge operator keep its settings next to their own
//! configuration. Every field has a default, so an empty document is a
//! valid configuration.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_core::Limits;
use thiserror::Error;

use crate::merge::{self, MergeOperator, ROW_VALUE_MERGE_OPERATOR_NAME};

/// Errors loading or validating a [`MergeConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// File that failed to read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config document is not valid TOML or has wrong field types
    #[error("failed to parse merge config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A limit was set to a value the operator cannot work with
    #[error("invalid limit '{name}': must be between 1 and 4294967295")]
    InvalidLimit {
        /// Limit field name
        name: &'static str,
    },

    /// The configured operator name is not registered
    #[error("unknown merge operator '{0}'")]
    UnknownOperator(String),
}

/// Merge operator configuration.
///
/// # Example
///
/// ```toml
/// operator = "RowValueMergeOperator"
/// verify_fast_path = false
///
/// [limits]
/// max_cells = 1000000
/// max_name_bytes = 65536
/// max_value_bytes = 16777216
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Registered operator name
    #[serde(default = "default_operator")]
    pub operator: String,

    /// Decode the lone operand before reusing it on the fast path
    #[serde(default)]
    pub verify_fast_path: bool,

    /// Decoder limits
    #[serde(default)]
    pub limits: Limits,
}

fn default_operator() -> String {
    ROW_VALUE_MERGE_OPERATOR_NAME.to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            verify_fast_path: false,
            limits: Limits::default(),
        }
    }
}

impl MergeConfig {
    /// Select an operator by registered name
    pub fn with_operator(mut self, name: impl Into<String>) -> Self {
        self.operator = name.into();
        self
    }

    /// Enable or disable fast-path verification
    pub fn with_verify_fast_path(mut self, verify: bool) -> Self {
        self.verify_fast_path = verify;
        self
    }

    /// Set decoder limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Check limits and operator name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidLimit` for a zero limit or one too large
    /// for the 32-bit fields of the row format, and
    /// `ConfigError::UnknownOperator` if the operator is not registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("max_cells", self.limits.max_cells),
            ("max_name_bytes", self.limits.max_name_bytes),
            ("max_value_bytes", self.limits.max_value_bytes),
        ];
        for (name, value) in limits {
            if value == 0 || u32::try_from(value).is_err() {
                return Err(ConfigError::InvalidLimit { name });
            }
        }
        if !merge::is_registered(&self.operator) {
            return Err(ConfigError::UnknownOperator(self.operator.clone()));
        }
        Ok(())
    }

    /// Validate and build the configured operator
    pub fn build_operator(&self) -> Result<Arc<dyn MergeOperator>, ConfigError> {
        self.validate()?;
        merge::create_merge_operator(&self.operator, self)
            .ok_or_else(|| ConfigError::UnknownOperator(self.operator.clone()))
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MergeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns the default config document with comments.
    pub fn default_toml() -> &'static str {
        r#"# Merge operator configuration
#
# Registered operator name
operator = "RowValueMergeOperator"

# Decode the single operand before returning it unchanged (default: false)
# Costs one decode per single-operand merge; rejects corrupt operands early.
verify_fast_path = false

# Decoder limits. Inputs exceeding any limit fail to merge.
[limits]
max_cells = 1000000
max_name_bytes = 65536
max_value_bytes = 16777216
"#
    }
}
