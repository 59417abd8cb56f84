//! Merge operator errors.

use crate::format::FormatError;
use std::fmt;
use strata_core::LimitError;

/// Which input of a merge call an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPosition {
    /// The base value of a full merge
    ExistingValue,
    /// Operand at this index (oldest first)
    Operand(usize),
}

impl fmt::Display for InputPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPosition::ExistingValue => write!(f, "existing value"),
            InputPosition::Operand(index) => write!(f, "operand {}", index),
        }
    }
}

/// Merge call failures.
///
/// A failed merge produces no output; the engine decides whether to surface
/// the failure to the reader or keep the operands for a later attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// An input could not be decoded
    #[error("Malformed {position}: {source}")]
    Format {
        /// Input that failed to decode
        position: InputPosition,
        /// Decoding failure
        #[source]
        source: FormatError,
    },

    /// The engine called the operator in a way the contract forbids
    #[error("Merge contract violation: {0}")]
    ContractViolation(&'static str),

    /// The merged row is larger than the operator's own limits accept
    #[error("Merged row exceeds limits: {0}")]
    OutputLimitExceeded(#[source] LimitError),

    /// The merged row could not be encoded
    #[error("Merged row cannot be encoded: {0}")]
    Encode(#[source] FormatError),
}

impl MergeError {
    /// Input position for format errors
    pub fn position(&self) -> Option<InputPosition> {
        match self {
            MergeError::Format { position, .. } => Some(*position),
            MergeError::ContractViolation(_)
            | MergeError::OutputLimitExceeded(_)
            | MergeError::Encode(_) => None,
        }
    }
}
