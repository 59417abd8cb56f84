//! Merge operators.
//!
//! A merge operator lets the storage engine combine partial updates to a key
//! without reading the key's full history back. The engine accumulates merge
//! operands as writes happen and calls the operator at read or compaction
//! time with whatever subset of (base value, operands) it has.
//!
//! # Call shapes
//!
//! - [`MergeOperator::full_merge`]: optional base value plus operands
//! - [`MergeOperator::partial_merge`]: two operands, no base
//! - [`MergeOperator::partial_merge_multi`]: operand run, no base
//!
//! # Operand order
//!
//! Operands are always passed **oldest first**. The base value, when
//! present, is older than every operand.
//!
//! # Adding value shapes
//!
//! Each value shape is one implementation of [`MergeOperator`], registered
//! by name in the [`registry`]. There is no base class to extend.

mod error;
pub mod registry;
mod row_value;

pub use error::{InputPosition, MergeError};
pub use registry::{
    create_merge_operator, is_registered, register_merge_operator, registered_operator_names,
    MergeOperatorFactory, RegisteredOperator,
};
pub use row_value::{RowValueMergeOperator, ROW_VALUE_MERGE_OPERATOR_NAME};

/// Inputs to a full merge.
#[derive(Debug, Clone, Copy)]
pub struct MergeInput<'a> {
    /// Key being merged
    pub key: &'a [u8],
    /// Base value from a put, or `None` if only operands exist
    pub existing_value: Option<&'a [u8]>,
    /// Operands, oldest first
    pub operands: &'a [&'a [u8]],
}

impl<'a> MergeInput<'a> {
    /// Create merge input
    pub fn new(
        key: &'a [u8],
        existing_value: Option<&'a [u8]>,
        operands: &'a [&'a [u8]],
    ) -> Self {
        MergeInput {
            key,
            existing_value,
            operands,
        }
    }

    /// Total number of inputs, base value included
    pub fn input_count(&self) -> usize {
        self.operands.len() + usize::from(self.existing_value.is_some())
    }
}

/// Successful result of a full merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutput<'a> {
    /// The merged value was written to the caller's buffer
    NewValue,

    /// Use this existing operand verbatim; the caller's buffer is empty
    ExistingOperand(&'a [u8]),
}

impl<'a> MergeOutput<'a> {
    /// Resolve the merged value bytes given the caller's buffer
    pub fn value<'b>(&self, new_value: &'b [u8]) -> &'b [u8]
    where
        'a: 'b,
    {
        match *self {
            MergeOutput::NewValue => new_value,
            MergeOutput::ExistingOperand(operand) => operand,
        }
    }
}

/// Value-combination strategy invoked by the storage engine.
///
/// # Thread Safety
///
/// Operators are called concurrently from compaction and foreground threads
/// on independent inputs. Implementations must be `Send + Sync` and should
/// hold no mutable state.
///
/// # Output buffers
///
/// `new_value` is owned by the caller. Implementations clear it on entry and
/// leave it empty when they fail, so a failed call never exposes partial
/// output.
pub trait MergeOperator: Send + Sync {
    /// Stable identifier used for registration and configuration matching.
    fn name(&self) -> &'static str;

    /// Merge an optional base value with a run of operands.
    fn full_merge<'a>(
        &self,
        input: &MergeInput<'a>,
        new_value: &mut Vec<u8>,
    ) -> Result<MergeOutput<'a>, MergeError>;

    /// Combine two operands into one, `left` being the older.
    ///
    /// Returns `Ok(false)` if this operator cannot combine operands without
    /// a base value; the engine then keeps them separate.
    fn partial_merge(
        &self,
        _key: &[u8],
        _left: &[u8],
        _right: &[u8],
        new_value: &mut Vec<u8>,
    ) -> Result<bool, MergeError> {
        new_value.clear();
        Ok(false)
    }

    /// Combine a run of operands, oldest first, into one.
    ///
    /// The default folds [`partial_merge`](MergeOperator::partial_merge)
    /// left to right and gives up as soon as one pairwise merge declines.
    fn partial_merge_multi(
        &self,
        key: &[u8],
        operands: &[&[u8]],
        new_value: &mut Vec<u8>,
    ) -> Result<bool, MergeError> {
        new_value.clear();

        let (first, rest) = match operands.split_first() {
            Some(split) => split,
            None => {
                return Err(MergeError::ContractViolation(
                    "partial merge called with no operands",
                ))
            }
        };

        let mut acc = first.to_vec();
        for operand in rest {
            if !self.partial_merge(key, &acc, operand, new_value)? {
                new_value.clear();
                return Ok(false);
            }
            std::mem::swap(&mut acc, new_value);
        }

        *new_value = acc;
        Ok(true)
    }
}
