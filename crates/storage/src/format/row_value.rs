//! Row-value binary format.
//!
//! This is the only persisted format the merge operator produces. Base values
//! and merge operands are both stored in it, so the output of any merge can
//! be fed back in as an input to a later merge.
//!
//! # Format (version 0x01)
//!
//! All integers are little-endian.
//!
//! ```text
//! Row Layout:
//! ┌──────────────────┬──────────────────┬─────────────────────────────┐
//! │ Version (1 byte) │ Count (4 bytes)  │ Cells (variable)            │
//! └──────────────────┴──────────────────┴─────────────────────────────┘
//!
//! Cell Layout:
//! ┌────────────┬────────┬───────────────┬──────────┬──────────────┬───────────┬─────────┐
//! │ NameLen(4) │ Name   │ Timestamp (8) │ Flag (1) │ Flag fields  │ ValLen(4) │ Value   │
//! └────────────┴────────┴───────────────┴──────────┴──────────────┴───────────┴─────────┘
//!
//! Flag fields:
//!   0x00 live       (none)
//!   0x01 tombstone  deletion time (8)
//!   0x02 expiring   ttl seconds (4)
//! ```
//!
//! Cells are written in strictly ascending name order. Tombstones carry a
//! zero-length value. The decoder rejects anything the encoder could not
//! have produced, so a buffer either round-trips exactly or fails.

use byteorder::{LittleEndian, ReadBytesExt};
use strata_core::{Cell, CellState, LimitError, Limits, RowValue, Timestamp};

/// Current row-value format version
pub const ROW_VALUE_FORMAT_VERSION: u8 = 0x01;

/// Size of the row header: version + cell count
pub const ROW_HEADER_SIZE: usize = 1 + 4;

/// Cell liveness flag bytes
const FLAG_LIVE: u8 = 0x00;
const FLAG_TOMBSTONE: u8 = 0x01;
const FLAG_EXPIRING: u8 = 0x02;

/// Smallest encoded cell: empty name, timestamp, flag, empty value
const MIN_CELL_SIZE: usize = 4 + 8 + 1 + 4;

/// Exact number of bytes [`serialize_into`] appends for `row`.
pub fn encoded_size(row: &RowValue) -> usize {
    ROW_HEADER_SIZE
        + row
            .iter()
            .map(|(name, cell)| cell_size(name, cell))
            .sum::<usize>()
}

fn cell_size(name: &[u8], cell: &Cell) -> usize {
    MIN_CELL_SIZE
        + name.len()
        + match &cell.state {
            CellState::Live { value } => value.len(),
            CellState::Expiring { value, .. } => 4 + value.len(),
            CellState::Tombstone { .. } => 8,
        }
}

/// Append the encoding of `row` to `out`.
///
/// Reserves exactly [`encoded_size`] bytes up front. Fails with
/// `FormatError::LengthOverflow` if a count or length does not fit its
/// 32-bit field; `out` is then left as it was.
pub fn serialize_into(row: &RowValue, out: &mut Vec<u8>) -> Result<(), FormatError> {
    let start = out.len();
    let result = write_row(row, out);
    if result.is_err() {
        out.truncate(start);
    }
    result
}

fn write_row(row: &RowValue, out: &mut Vec<u8>) -> Result<(), FormatError> {
    out.reserve(encoded_size(row));

    out.push(ROW_VALUE_FORMAT_VERSION);
    out.extend_from_slice(&len_u32(row.len(), "cell count")?.to_le_bytes());

    for (name, cell) in row.iter() {
        write_bytes(out, name, "name length")?;
        out.extend_from_slice(&cell.timestamp.as_micros().to_le_bytes());

        match &cell.state {
            CellState::Live { value } => {
                out.push(FLAG_LIVE);
                write_bytes(out, value, "value length")?;
            }
            CellState::Tombstone { deletion_time } => {
                out.push(FLAG_TOMBSTONE);
                out.extend_from_slice(&deletion_time.as_micros().to_le_bytes());
                write_bytes(out, &[], "value length")?;
            }
            CellState::Expiring { value, ttl_secs } => {
                out.push(FLAG_EXPIRING);
                out.extend_from_slice(&ttl_secs.to_le_bytes());
                write_bytes(out, value, "value length")?;
            }
        }
    }
    Ok(())
}

/// Serialize `row` into a fresh buffer.
pub fn to_bytes(row: &RowValue) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(encoded_size(row));
    serialize_into(row, &mut out)?;
    Ok(out)
}

/// Deserialize a row value, enforcing `limits`.
///
/// Never returns a partially decoded row.
pub fn from_bytes(bytes: &[u8], limits: &Limits) -> Result<RowValue, FormatError> {
    let mut reader = Reader { buf: bytes };

    let version = reader.u8("version")?;
    match version {
        ROW_VALUE_FORMAT_VERSION => decode_v1(reader, limits),
        other => Err(FormatError::UnsupportedVersion(other)),
    }
}

fn decode_v1(mut reader: Reader<'_>, limits: &Limits) -> Result<RowValue, FormatError> {
    let declared = reader.u32("cell count")?;
    let count = declared as usize;
    limits.validate_cell_count(count)?;

    // Reject impossible counts before doing any per-cell work
    if count.saturating_mul(MIN_CELL_SIZE) > reader.remaining() {
        return Err(FormatError::CellCountMismatch {
            declared,
            remaining: reader.remaining(),
        });
    }

    let mut row = RowValue::new();
    let mut previous: Option<&[u8]> = None;

    for _ in 0..count {
        let name_len = reader.u32("name length")? as usize;
        limits.validate_name_len(name_len)?;
        let name = reader.take(name_len, "name")?;

        if previous.map_or(false, |prev| prev >= name) {
            return Err(FormatError::UnorderedCell {
                name: String::from_utf8_lossy(name).into_owned(),
            });
        }
        previous = Some(name);

        let timestamp = Timestamp::from_micros(reader.u64("timestamp")?);
        let flag = reader.u8("liveness flag")?;

        let cell = match flag {
            FLAG_LIVE => Cell::live(timestamp, reader.value(limits)?),
            FLAG_TOMBSTONE => {
                let deletion_time = Timestamp::from_micros(reader.u64("deletion time")?);
                let payload = reader.value(limits)?;
                if !payload.is_empty() {
                    return Err(FormatError::TombstonePayload { len: payload.len() });
                }
                Cell::tombstone(timestamp, deletion_time)
            }
            FLAG_EXPIRING => {
                let ttl_secs = reader.u32("ttl")?;
                Cell::expiring(timestamp, reader.value(limits)?, ttl_secs)
            }
            other => return Err(FormatError::InvalidFlag(other)),
        };

        row.insert(name, cell);
    }

    if reader.remaining() > 0 {
        return Err(FormatError::TrailingBytes(reader.remaining()));
    }

    Ok(row)
}

/// Write a length-prefixed byte string.
fn write_bytes(out: &mut Vec<u8>, bytes: &[u8], field: &'static str) -> Result<(), FormatError> {
    out.extend_from_slice(&len_u32(bytes.len(), field)?.to_le_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// Narrow a count or length to its 32-bit on-disk field.
fn len_u32(len: usize, field: &'static str) -> Result<u32, FormatError> {
    u32::try_from(len).map_err(|_| FormatError::LengthOverflow { field, len })
}

/// Forward-only cursor over an input buffer
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, FormatError> {
        self.buf
            .read_u8()
            .map_err(|_| FormatError::Truncated { field })
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        self.buf
            .read_u32::<LittleEndian>()
            .map_err(|_| FormatError::Truncated { field })
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, FormatError> {
        self.buf
            .read_u64::<LittleEndian>()
            .map_err(|_| FormatError::Truncated { field })
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], FormatError> {
        if self.buf.len() < len {
            return Err(FormatError::Truncated { field });
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Read a length-prefixed cell payload
    fn value(&mut self, limits: &Limits) -> Result<Vec<u8>, FormatError> {
        let len = self.u32("value length")? as usize;
        limits.validate_value_len(len)?;
        Ok(self.take(len, "value")?.to_vec())
    }
}

/// Row-value encoding and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Buffer ended in the middle of a field
    #[error("Truncated row value: missing {field}")]
    Truncated {
        /// Field that could not be read
        field: &'static str,
    },

    /// Unknown format version tag
    #[error("Unsupported row value version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// Header claims more cells than the buffer can hold
    #[error("Cell count {declared} inconsistent with {remaining} remaining bytes")]
    CellCountMismatch {
        /// Cell count from the header
        declared: u32,
        /// Bytes left after the header
        remaining: usize,
    },

    /// Unknown liveness flag byte
    #[error("Invalid liveness flag: {0:#04x}")]
    InvalidFlag(u8),

    /// Tombstone carrying a payload
    #[error("Tombstone carries {len} payload bytes")]
    TombstonePayload {
        /// Payload length found
        len: usize,
    },

    /// Cell names not strictly ascending (includes duplicates)
    #[error("Cell out of order or duplicated: {name}")]
    UnorderedCell {
        /// Offending cell name (lossy UTF-8)
        name: String,
    },

    /// Bytes left over after the last cell
    #[error("{0} trailing bytes after last cell")]
    TrailingBytes(usize),

    /// Input exceeds configured limits
    #[error("Limit exceeded: {0}")]
    LimitExceeded(#[from] LimitError),

    /// Count or length too large for its 32-bit field
    #[error("{field} {len} does not fit in 32 bits")]
    LengthOverflow {
        /// Field being written
        field: &'static str,
        /// Value that overflowed
        len: usize,
    },
}
