//! Size limits for row values
//!
//! Limits bound what the decoder accepts so a merge never allocates more
//! than its input justifies. The defaults are generous; engines with tighter
//! value budgets can lower them through `MergeConfig`.

use crate::row::RowValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size limits for row values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of cells in one row (default: 1M)
    pub max_cells: usize,

    /// Maximum cell name length in bytes (default: 64KB)
    pub max_name_bytes: usize,

    /// Maximum cell payload length in bytes (default: 16MB)
    pub max_value_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_cells: 1_000_000,
            max_name_bytes: 64 * 1024,
            max_value_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_cells: 8,
            max_name_bytes: 16,
            max_value_bytes: 64,
        }
    }

    /// Validate a cell count
    pub fn validate_cell_count(&self, count: usize) -> Result<(), LimitError> {
        if count > self.max_cells {
            return Err(LimitError::TooManyCells {
                actual: count,
                max: self.max_cells,
            });
        }
        Ok(())
    }

    /// Validate a cell name length
    pub fn validate_name_len(&self, len: usize) -> Result<(), LimitError> {
        if len > self.max_name_bytes {
            return Err(LimitError::NameTooLong {
                actual: len,
                max: self.max_name_bytes,
            });
        }
        Ok(())
    }

    /// Validate a payload length
    pub fn validate_value_len(&self, len: usize) -> Result<(), LimitError> {
        if len > self.max_value_bytes {
            return Err(LimitError::ValueTooLarge {
                actual: len,
                max: self.max_value_bytes,
            });
        }
        Ok(())
    }

    /// Validate every cell of a row
    pub fn validate_row(&self, row: &RowValue) -> Result<(), LimitError> {
        self.validate_cell_count(row.len())?;
        for (name, cell) in row.iter() {
            self.validate_name_len(name.len())?;
            if let Some(value) = cell.value() {
                self.validate_value_len(value.len())?;
            }
        }
        Ok(())
    }
}

/// Limit validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Row has too many cells
    #[error("Too many cells: {actual} exceeds maximum {max}")]
    TooManyCells {
        /// Actual cell count
        actual: usize,
        /// Maximum allowed count
        max: usize,
    },

    /// Cell name exceeds maximum length
    #[error("Cell name too long: {actual} bytes exceeds maximum {max}")]
    NameTooLong {
        /// Actual name length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Cell payload exceeds maximum length
    #[error("Value too large: {actual} bytes exceeds maximum {max}")]
    ValueTooLarge {
        /// Actual payload length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}
