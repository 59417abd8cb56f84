//! Merge operator registry
//!
//! Engines select a merge operator by name in their column family
//! configuration. The registry maps those names to factories that build a
//! shared, reference-counted operator instance.
//!
//! ## Registration
//!
//! The row-value operator is always registered. New value shapes register
//! their own factory at startup:
//!
//! ```ignore
//! use strata_storage::merge::{register_merge_operator, RegisteredOperator};
//!
//! register_merge_operator(RegisteredOperator::new("CounterMergeOperator", create_counter));
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::info;

use super::row_value::{RowValueMergeOperator, ROW_VALUE_MERGE_OPERATOR_NAME};
use super::MergeOperator;
use crate::config::MergeConfig;

/// Function that builds an operator instance from configuration
pub type MergeOperatorFactory = fn(&MergeConfig) -> Arc<dyn MergeOperator>;

/// Registry entry for a merge operator
#[derive(Clone)]
pub struct RegisteredOperator {
    /// Name engines use to select the operator
    pub name: &'static str,
    /// Factory building a shared instance
    pub create: MergeOperatorFactory,
}

impl RegisteredOperator {
    /// Create a new registry entry
    pub const fn new(name: &'static str, create: MergeOperatorFactory) -> Self {
        Self { name, create }
    }
}

impl std::fmt::Debug for RegisteredOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredOperator")
            .field("name", &self.name)
            .finish()
    }
}

/// Global registry of merge operators
static OPERATOR_REGISTRY: Lazy<RwLock<Vec<RegisteredOperator>>> = Lazy::new(|| {
    RwLock::new(vec![RegisteredOperator::new(
        ROW_VALUE_MERGE_OPERATOR_NAME,
        RowValueMergeOperator::create,
    )])
});

/// Register a merge operator
///
/// Returns `false` if an operator with the same name is already registered;
/// the existing registration is kept.
pub fn register_merge_operator(operator: RegisteredOperator) -> bool {
    let mut registry = OPERATOR_REGISTRY.write();
    if registry.iter().any(|op| op.name == operator.name) {
        return false;
    }
    info!(name = operator.name, "Registered merge operator");
    registry.push(operator);
    true
}

/// Build a shared operator instance by name
///
/// Returns `None` if no operator with that name is registered.
pub fn create_merge_operator(name: &str, config: &MergeConfig) -> Option<Arc<dyn MergeOperator>> {
    let factory = OPERATOR_REGISTRY
        .read()
        .iter()
        .find(|op| op.name == name)
        .map(|op| op.create)?;
    Some(factory(config))
}

/// Check if an operator name is registered
pub fn is_registered(name: &str) -> bool {
    OPERATOR_REGISTRY.read().iter().any(|op| op.name == name)
}

/// Names of all registered operators, in registration order
pub fn registered_operator_names() -> Vec<&'static str> {
    OPERATOR_REGISTRY.read().iter().map(|op| op.name).collect()
}
