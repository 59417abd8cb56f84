//! Integration tests for the row-value merge operator.
//!
//! Exercises the operator only through its public surface: serialized
//! inputs in, serialized rows (or a reused operand) out.


mod algebra;
mod format_validation;
