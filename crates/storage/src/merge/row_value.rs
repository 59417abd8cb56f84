//! Merge operator for wide-row values.
//!
//! Every input is a serialized [`RowValue`]. The operator decodes each
//! input, folds them with [`RowValue::merge`] (last-write-wins per cell) and
//! encodes the result. Because the per-cell rule depends only on cell
//! contents, merging any regrouping of the same operands converges on the
//! same bytes.
//!
//! # Fast path
//!
//! A full merge with no base value and a single operand has nothing to
//! combine. The operator answers [`MergeOutput::ExistingOperand`] instead of
//! decoding and re-encoding it.

use std::sync::Arc;

use strata_core::{Limits, RowValue};
use tracing::{debug, error, trace, warn};

use super::{InputPosition, MergeError, MergeInput, MergeOperator, MergeOutput};
use crate::config::MergeConfig;
use crate::format;

/// Registration name of [`RowValueMergeOperator`]
pub const ROW_VALUE_MERGE_OPERATOR_NAME: &str = "RowValueMergeOperator";

/// Stateless merge operator for serialized row values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowValueMergeOperator {
    limits: Limits,
    verify_fast_path: bool,
}

impl RowValueMergeOperator {
    /// Create an operator with default limits
    pub fn new() -> Self {
        RowValueMergeOperator::default()
    }

    /// Create an operator from configuration
    pub fn from_config(config: &MergeConfig) -> Self {
        RowValueMergeOperator {
            limits: config.limits,
            verify_fast_path: config.verify_fast_path,
        }
    }

    /// Shared, reference-counted instance for engine registration
    pub fn shared() -> Arc<dyn MergeOperator> {
        Arc::new(RowValueMergeOperator::new())
    }

    /// Factory used by the operator registry
    pub(crate) fn create(config: &MergeConfig) -> Arc<dyn MergeOperator> {
        Arc::new(RowValueMergeOperator::from_config(config))
    }

    /// Set decode limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Decode the lone operand before reusing it on the fast path
    pub fn with_verify_fast_path(mut self, verify: bool) -> Self {
        self.verify_fast_path = verify;
        self
    }

    /// Decode limits in effect
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn decode(&self, position: InputPosition, bytes: &[u8]) -> Result<RowValue, MergeError> {
        format::from_bytes(bytes, &self.limits).map_err(|source| {
            warn!(%position, len = bytes.len(), error = %source, "Undecodable merge input");
            MergeError::Format { position, source }
        })
    }

    fn decode_operands(
        &self,
        operands: &[&[u8]],
        rows: &mut Vec<RowValue>,
    ) -> Result<(), MergeError> {
        for (index, operand) in operands.iter().enumerate() {
            rows.push(self.decode(InputPosition::Operand(index), operand)?);
        }
        Ok(())
    }

    /// Merge decoded rows and write the encoding to `new_value`
    ///
    /// The merged row must satisfy the same limits as the inputs, or a
    /// later merge of this key could never decode it.
    fn write_merged(
        &self,
        key: &[u8],
        rows: Vec<RowValue>,
        new_value: &mut Vec<u8>,
    ) -> Result<(), MergeError> {
        let inputs = rows.len();
        let merged = RowValue::merge(rows);

        if let Err(err) = self.limits.validate_row(&merged) {
            warn!(key_len = key.len(), inputs, error = %err, "Merged row exceeds limits");
            return Err(MergeError::OutputLimitExceeded(err));
        }
        format::serialize_into(&merged, new_value).map_err(MergeError::Encode)?;

        debug!(
            key_len = key.len(),
            inputs,
            cells = merged.len(),
            bytes = new_value.len(),
            "Merged row value"
        );
        Ok(())
    }
}

impl MergeOperator for RowValueMergeOperator {
    fn name(&self) -> &'static str {
        ROW_VALUE_MERGE_OPERATOR_NAME
    }

    fn full_merge<'a>(
        &self,
        input: &MergeInput<'a>,
        new_value: &mut Vec<u8>,
    ) -> Result<MergeOutput<'a>, MergeError> {
        new_value.clear();

        if input.existing_value.is_none() {
            match input.operands {
                [] => {
                    error!(key_len = input.key.len(), "Full merge called with nothing to merge");
                    debug_assert!(false, "full merge called with nothing to merge");
                    return Err(MergeError::ContractViolation(
                        "full merge called with no base value and no operands",
                    ));
                }
                [only] => {
                    if self.verify_fast_path {
                        self.decode(InputPosition::Operand(0), only)?;
                    }
                    trace!(key_len = input.key.len(), "Reusing single operand");
                    return Ok(MergeOutput::ExistingOperand(*only));
                }
                _ => {}
            }
        }

        let mut rows = Vec::with_capacity(input.input_count());
        if let Some(base) = input.existing_value {
            rows.push(self.decode(InputPosition::ExistingValue, base)?);
        }
        self.decode_operands(input.operands, &mut rows)?;

        self.write_merged(input.key, rows, new_value)?;
        Ok(MergeOutput::NewValue)
    }

    fn partial_merge(
        &self,
        key: &[u8],
        left: &[u8],
        right: &[u8],
        new_value: &mut Vec<u8>,
    ) -> Result<bool, MergeError> {
        new_value.clear();

        let rows = vec![
            self.decode(InputPosition::Operand(0), left)?,
            self.decode(InputPosition::Operand(1), right)?,
        ];

        self.write_merged(key, rows, new_value)?;
        Ok(true)
    }

    fn partial_merge_multi(
        &self,
        key: &[u8],
        operands: &[&[u8]],
        new_value: &mut Vec<u8>,
    ) -> Result<bool, MergeError> {
        new_value.clear();

        if operands.is_empty() {
            error!(key_len = key.len(), "Partial merge called with no operands");
            debug_assert!(false, "partial merge called with no operands");
            return Err(MergeError::ContractViolation(
                "partial merge called with no operands",
            ));
        }

        let mut rows = Vec::with_capacity(operands.len());
        self.decode_operands(operands, &mut rows)?;

        self.write_merged(key, rows, new_value)?;
        Ok(true)
    }
}
