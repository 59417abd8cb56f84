//! Core types for Strata row-value merging
//!
//! This crate defines the in-memory model of a wide-row value:
//! - Timestamp: microsecond write timestamps
//! - Cell / CellState: one named field, live, expiring, or tombstoned
//! - RowValue: name-ordered cells of one key, with the last-write-wins merge
//! - Limits: size bounds enforced when decoding
//! - Error: error type hierarchy
//!
//! Encoding lives in `strata-storage`; nothing here performs I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod error;
pub mod limits;
pub mod row;
pub mod timestamp;

pub use cell::{Cell, CellState};
pub use error::{Error, Result};
pub use limits::{LimitError, Limits};
pub use row::RowValue;
pub use timestamp::Timestamp;
