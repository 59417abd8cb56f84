//! Cells: the named fields of a row value
//!
//! A cell is one column of a wide row. It records when it was written and
//! whether it is live, live with a time-to-live, or deleted.
//!
//! ## Reconciliation
//!
//! Two versions of the same cell are reconciled with last-write-wins on the
//! write timestamp. Ties are broken on content only, never on which input
//! arrived first:
//!
//! 1. Higher timestamp wins
//! 2. Tombstone beats expiring beats live
//! 3. Tombstones: higher deletion time wins. Expiring: higher TTL wins
//! 4. Greater payload (lexicographic) wins
//!
//! This is a total order over cell contents, so reconciling any multiset of
//! versions yields the same winner regardless of grouping or order.

use crate::timestamp::Timestamp;
use std::cmp::Ordering;
use std::time::Duration;

/// Liveness of a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Ordinary write
    Live {
        /// Cell payload
        value: Vec<u8>,
    },

    /// Write that expires `ttl_secs` after the cell timestamp
    Expiring {
        /// Cell payload
        value: Vec<u8>,
        /// Time-to-live in seconds
        ttl_secs: u32,
    },

    /// Deletion marker
    Tombstone {
        /// Local time at which the deletion was recorded
        deletion_time: Timestamp,
    },
}

impl CellState {
    /// Precedence rank used when timestamps tie
    fn rank(&self) -> u8 {
        match self {
            CellState::Live { .. } => 0,
            CellState::Expiring { .. } => 1,
            CellState::Tombstone { .. } => 2,
        }
    }
}

/// One named field within a row value
///
/// The cell name is not stored here; it is the key under which the cell
/// lives in its [`RowValue`](crate::RowValue).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Write timestamp
    pub timestamp: Timestamp,
    /// Liveness and payload
    pub state: CellState,
}

impl Cell {
    /// Create a live cell
    pub fn live(timestamp: Timestamp, value: impl Into<Vec<u8>>) -> Self {
        Cell {
            timestamp,
            state: CellState::Live {
                value: value.into(),
            },
        }
    }

    /// Create a live cell with a time-to-live
    pub fn expiring(timestamp: Timestamp, value: impl Into<Vec<u8>>, ttl_secs: u32) -> Self {
        Cell {
            timestamp,
            state: CellState::Expiring {
                value: value.into(),
                ttl_secs,
            },
        }
    }

    /// Create a tombstone
    pub fn tombstone(timestamp: Timestamp, deletion_time: Timestamp) -> Self {
        Cell {
            timestamp,
            state: CellState::Tombstone { deletion_time },
        }
    }

    /// Payload of a live or expiring cell, `None` for tombstones
    pub fn value(&self) -> Option<&[u8]> {
        match &self.state {
            CellState::Live { value } | CellState::Expiring { value, .. } => Some(value),
            CellState::Tombstone { .. } => None,
        }
    }

    /// Check if this cell is a deletion marker
    pub fn is_tombstone(&self) -> bool {
        matches!(self.state, CellState::Tombstone { .. })
    }

    /// Check if an expiring cell has outlived its TTL at `now`
    ///
    /// Live cells and tombstones never expire.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        match self.state {
            CellState::Expiring { ttl_secs, .. } => {
                let expires_at = self
                    .timestamp
                    .saturating_add(Duration::from_secs(u64::from(ttl_secs)));
                !now.is_before(expires_at)
            }
            _ => false,
        }
    }

    /// Total precedence order between two versions of the same cell
    ///
    /// `Ordering::Greater` means `self` wins over `other`.
    pub fn precedence(&self, other: &Cell) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.state.rank().cmp(&other.state.rank()))
            .then_with(|| match (&self.state, &other.state) {
                (
                    CellState::Tombstone { deletion_time: a },
                    CellState::Tombstone { deletion_time: b },
                ) => a.cmp(b),
                (
                    CellState::Expiring {
                        value: a,
                        ttl_secs: ta,
                    },
                    CellState::Expiring {
                        value: b,
                        ttl_secs: tb,
                    },
                ) => ta.cmp(tb).then_with(|| a.cmp(b)),
                (CellState::Live { value: a }, CellState::Live { value: b }) => a.cmp(b),
                // Ranks differ, already decided above
                _ => Ordering::Equal,
            })
    }

    /// Check if `self` wins over `other`
    pub fn supersedes(&self, other: &Cell) -> bool {
        self.precedence(other) == Ordering::Greater
    }

    /// Keep whichever of the two versions wins
    pub fn reconcile(self, other: Cell) -> Cell {
        if other.supersedes(&self) {
            other
        } else {
            self
        }
    }
}
