//! strata-merge - Row-value merge operator for embedded key-value engines
//!
//! Wide-row values store many named cells under one key. Writers append
//! partial updates as merge operands; the engine later asks the operator to
//! fold them into a single row, cell by cell, last write wins.
//!
//! # Quick Start
//!
//! ```ignore
//! use strata_merge::{Cell, MergeInput, MergeOperator, RowValue, RowValueMergeOperator, Timestamp};
//! use strata_merge::format::to_bytes;
//!
//! let op = RowValueMergeOperator::new();
//! let mut row = RowValue::new();
//! row.insert("name", Cell::live(Timestamp::from_micros(1_700_000_000_000_000), b"Alice".to_vec()));
//! let operand = to_bytes(&row)?;
//!
//! let mut merged = Vec::new();
//! let output = op.full_merge(&MergeInput::new(b"user:1", None, &[&operand]), &mut merged)?;
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: the row model (cells, timestamps, reconciliation, limits)
//! - `strata-storage`: byte format, merge operators, registry, configuration
//!   and binding handles

pub use strata_core::{Cell, CellState, Error, LimitError, Limits, Result, RowValue, Timestamp};
pub use strata_storage::{config, format, handle, merge};
pub use strata_storage::{
    create_merge_operator, handles, register_merge_operator, ConfigError, FormatError,
    InputPosition, MergeConfig, MergeError, MergeInput, MergeOperator, MergeOutput,
    OperatorHandle, OperatorHandles, RowValueMergeOperator, ROW_VALUE_MERGE_OPERATOR_NAME,
};
