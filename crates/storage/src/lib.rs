//! Storage-side merge support for wide-row values
//!
//! This crate implements what the storage engine calls during reads and
//! compaction:
//! - `format`: versioned binary encoding of row values
//! - `merge`: the `MergeOperator` contract and the row-value operator
//! - `config`: TOML configuration for operator selection and limits
//! - `handle`: opaque operator handles for foreign-language bindings
//!
//! # Concurrency
//!
//! Operators hold no mutable state and are shared as
//! `Arc<dyn MergeOperator>` across compaction and foreground threads.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod format;
pub mod handle;
pub mod merge;

pub use config::{ConfigError, MergeConfig};
pub use format::FormatError;
pub use handle::{handles, OperatorHandle, OperatorHandles};
pub use merge::{
    create_merge_operator, register_merge_operator, InputPosition, MergeError, MergeInput,
    MergeOperator, MergeOutput, RowValueMergeOperator, ROW_VALUE_MERGE_OPERATOR_NAME,
};
