//! On-disk byte formats.
//!
//! This module centralizes all serialization logic for persisted merge
//! values. Keeping serialization separate from the merge operator makes
//! format evolution easier to manage.
//!
//! # Module Structure
//!
//! - `row_value`: Wide-row value format (version tag, cells, tombstones)

pub mod row_value;

pub use row_value::{
    encoded_size, from_bytes, serialize_into, to_bytes, FormatError, ROW_HEADER_SIZE,
    ROW_VALUE_FORMAT_VERSION,
};
