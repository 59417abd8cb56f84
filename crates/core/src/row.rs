//! Row values: one key's composite, multi-cell value
//!
//! A `RowValue` is built transiently inside a single merge call: decoded from
//! engine-provided bytes, combined with other fragments, encoded, discarded.
//!
//! Cells are kept in a `BTreeMap` keyed by name, so a row never holds two
//! entries for the same name and iteration is always in name order.

use crate::cell::Cell;
use crate::error::{Error, Result};
use std::collections::btree_map::{self, BTreeMap};

/// Composite value of a single key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowValue {
    cells: BTreeMap<Vec<u8>, Cell>,
}

impl RowValue {
    /// Create an empty row (a fully deleted or never-written row)
    pub fn new() -> Self {
        RowValue {
            cells: BTreeMap::new(),
        }
    }

    /// Build a row from cells that must have distinct names
    ///
    /// Returns `Error::DuplicateCell` if a name repeats. Use [`insert`]
    /// to reconcile conflicting versions instead.
    ///
    /// [`insert`]: RowValue::insert
    pub fn from_cells<N, I>(cells: I) -> Result<Self>
    where
        N: Into<Vec<u8>>,
        I: IntoIterator<Item = (N, Cell)>,
    {
        let mut row = RowValue::new();
        for (name, cell) in cells {
            match row.cells.entry(name.into()) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(cell);
                }
                btree_map::Entry::Occupied(slot) => {
                    return Err(Error::DuplicateCell {
                        name: String::from_utf8_lossy(slot.key()).into_owned(),
                    });
                }
            }
        }
        Ok(row)
    }

    /// Insert a cell, reconciling against any existing version of it
    ///
    /// Returns `true` if the new cell is now the stored version.
    pub fn insert(&mut self, name: impl Into<Vec<u8>>, cell: Cell) -> bool {
        match self.cells.entry(name.into()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(cell);
                true
            }
            btree_map::Entry::Occupied(mut slot) => {
                if cell.supersedes(slot.get()) {
                    slot.insert(cell);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Get a cell by name
    pub fn get(&self, name: &[u8]) -> Option<&Cell> {
        self.cells.get(name)
    }

    /// Iterate cells in name order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Cell)> {
        self.cells.iter().map(|(name, cell)| (name.as_slice(), cell))
    }

    /// Iterate cells that are not tombstones
    pub fn live_cells(&self) -> impl Iterator<Item = (&[u8], &Cell)> {
        self.iter().filter(|(_, cell)| !cell.is_tombstone())
    }

    /// Number of cells, tombstones included
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Fold another row into this one, cell by cell
    pub fn merge_from(&mut self, other: RowValue) {
        if self.cells.is_empty() {
            self.cells = other.cells;
            return;
        }
        for (name, cell) in other.cells {
            self.insert(name, cell);
        }
    }

    /// Merge a sequence of rows, oldest first
    ///
    /// For each cell name the winning version is chosen by
    /// [`Cell::precedence`]. Because that order depends only on cell
    /// contents, the result is the same for any grouping or ordering of the
    /// inputs: `merge([merge([a, b]), c]) == merge([a, merge([b, c])])`.
    pub fn merge<I>(rows: I) -> RowValue
    where
        I: IntoIterator<Item = RowValue>,
    {
        let mut merged = RowValue::new();
        for row in rows {
            merged.merge_from(row);
        }
        merged
    }
}

impl IntoIterator for RowValue {
    type Item = (Vec<u8>, Cell);
    type IntoIter = btree_map::IntoIter<Vec<u8>, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}
