//! Opaque operator handles for foreign-language bindings
//!
//! Host runtimes that cannot hold an `Arc` directly keep a `u64` token
//! instead. The table owns one reference per token; the engine keeps its
//! own clones, so disposing a handle never invalidates an operator the
//! engine is still using.
//!
//! # Concurrency
//!
//! - `DashMap`: sharded, concurrent lookups and disposal
//! - `AtomicU64`: token allocation, tokens are never reused

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::info;

use crate::config::{ConfigError, MergeConfig};
use crate::merge::{MergeOperator, RowValueMergeOperator};

/// Opaque token naming one live operator reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorHandle(u64);

impl OperatorHandle {
    /// Raw token passed across the binding boundary
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// Rebuild a handle from a raw token
    pub fn from_raw(raw: u64) -> Self {
        OperatorHandle(raw)
    }
}

impl fmt::Display for OperatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Table of operator references held on behalf of a host runtime
pub struct OperatorHandles {
    /// Next token to hand out; zero is never issued
    next: AtomicU64,
    live: DashMap<u64, Arc<dyn MergeOperator>>,
}

impl OperatorHandles {
    /// Create an empty table
    pub fn new() -> Self {
        OperatorHandles {
            next: AtomicU64::new(1),
            live: DashMap::new(),
        }
    }

    /// Store an operator reference and return its token
    pub fn insert(&self, operator: Arc<dyn MergeOperator>) -> OperatorHandle {
        let raw = self.next.fetch_add(1, Ordering::AcqRel);
        self.live.insert(raw, operator);
        OperatorHandle(raw)
    }

    /// Create a row-value operator with default settings
    pub fn new_shared(&self) -> OperatorHandle {
        self.insert(RowValueMergeOperator::shared())
    }

    /// Build the configured operator and store it
    pub fn create(&self, config: &MergeConfig) -> Result<OperatorHandle, ConfigError> {
        Ok(self.insert(config.build_operator()?))
    }

    /// Clone the operator behind a handle
    ///
    /// Returns `None` for disposed or unknown handles.
    pub fn get(&self, handle: OperatorHandle) -> Option<Arc<dyn MergeOperator>> {
        self.live.get(&handle.0).map(|entry| Arc::clone(entry.value()))
    }

    /// Release the table's reference
    ///
    /// Returns `false` if the handle was already disposed or never issued.
    pub fn dispose(&self, handle: OperatorHandle) -> bool {
        match self.live.remove(&handle.0) {
            Some((_, operator)) => {
                info!(%handle, operator = operator.name(), "Disposed merge operator handle");
                true
            }
            None => false,
        }
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Check if no handles are live
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl Default for OperatorHandles {
    fn default() -> Self {
        Self::new()
    }
}

static HANDLES: Lazy<OperatorHandles> = Lazy::new(OperatorHandles::new);

/// Process-wide handle table used by bindings
pub fn handles() -> &'static OperatorHandles {
    &HANDLES
}
