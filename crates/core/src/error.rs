//! Error types for the row-value model
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for row-value operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or validating row values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A row was built with two cells of the same name
    #[error("Duplicate cell: {name}")]
    DuplicateCell {
        /// Cell name (lossy UTF-8)
        name: String,
    },
}
