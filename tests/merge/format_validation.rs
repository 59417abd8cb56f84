//! Malformed inputs must fail the merge without producing output.

use crate::common::*;
use strata_merge::format::{from_bytes, ROW_HEADER_SIZE, ROW_VALUE_FORMAT_VERSION};
use strata_merge::{
    Cell, FormatError, InputPosition, LimitError, Limits, MergeConfig, MergeError, MergeInput,
    MergeOperator, RowValueMergeOperator,
};

fn valid() -> Vec<u8> {
    encode(vec![
        ("a", Cell::live(ts(1), b"x".to_vec())),
        ("b", Cell::tombstone(ts(2), ts(2))),
        ("c", Cell::expiring(ts(3), b"z".to_vec(), 10)),
    ])
}

/// Run a two-input partial merge with `bad` second and return the error.
fn merge_err(op: &RowValueMergeOperator, bad: &[u8]) -> MergeError {
    let good = valid();
    let mut out = vec![0xEE; 8];
    let err = op.partial_merge(b"row", &good, bad, &mut out).unwrap_err();
    assert!(out.is_empty(), "failed merge left output behind");
    assert_eq!(err.position(), Some(InputPosition::Operand(1)));
    err
}

fn format_err(err: MergeError) -> FormatError {
    match err {
        MergeError::Format { source, .. } => source,
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn every_truncation_is_rejected() {
    let op = RowValueMergeOperator::new();
    let bytes = valid();
    for len in 0..bytes.len() {
        merge_err(&op, &bytes[..len]);
    }
}

#[test]
fn unknown_version_is_rejected() {
    let op = RowValueMergeOperator::new();
    let mut bytes = valid();
    bytes[0] = ROW_VALUE_FORMAT_VERSION + 1;
    assert_eq!(
        format_err(merge_err(&op, &bytes)),
        FormatError::UnsupportedVersion(ROW_VALUE_FORMAT_VERSION + 1)
    );
}

#[test]
fn trailing_garbage_is_rejected() {
    let op = RowValueMergeOperator::new();
    let mut bytes = valid();
    bytes.extend_from_slice(&[1, 2, 3]);
    assert_eq!(format_err(merge_err(&op, &bytes)), FormatError::TrailingBytes(3));
}

#[test]
fn bad_flag_is_rejected() {
    let op = RowValueMergeOperator::new();
    // Header, then name_len(1) + "a" + timestamp(8) puts the first flag here
    let flag_offset = ROW_HEADER_SIZE + 4 + 1 + 8;
    let mut bytes = valid();
    bytes[flag_offset] = 0x7F;
    assert_eq!(format_err(merge_err(&op, &bytes)), FormatError::InvalidFlag(0x7F));
}

#[test]
fn unordered_names_are_rejected() {
    let op = RowValueMergeOperator::new();
    let mut bytes = valid();
    // Rename "a" to "d" so it sorts after its successor
    bytes[ROW_HEADER_SIZE + 4] = b'd';
    assert!(matches!(
        format_err(merge_err(&op, &bytes)),
        FormatError::UnorderedCell { .. }
    ));
}

#[test]
fn configured_limits_reject_oversized_inputs() {
    let limits = Limits {
        max_value_bytes: 4,
        ..Limits::default()
    };
    let op = RowValueMergeOperator::from_config(&MergeConfig::default().with_limits(limits));
    let big = encode(vec![("a", Cell::live(ts(1), vec![0u8; 5]))]);

    assert!(matches!(
        format_err(merge_err(&op, &big)),
        FormatError::LimitExceeded(LimitError::ValueTooLarge { actual: 5, max: 4 })
    ));
}

#[test]
fn corrupt_base_is_attributed_to_base() {
    let op = RowValueMergeOperator::new();
    let operand = valid();
    let operands = [operand.as_slice()];
    let mut out = Vec::new();

    let err = op
        .full_merge(&MergeInput::new(b"row", Some(&[0xFFu8][..]), &operands), &mut out)
        .unwrap_err();
    assert_eq!(err.position(), Some(InputPosition::ExistingValue));
    assert!(out.is_empty());
}

#[test]
fn decoder_never_returns_partial_rows() {
    let bytes = valid();
    for len in ROW_HEADER_SIZE..bytes.len() {
        assert!(from_bytes(&bytes[..len], &Limits::default()).is_err());
    }
    assert_eq!(decode(&bytes).len(), 3);
}

fn wide(prefix: &str, count: usize) -> Vec<u8> {
    let names: Vec<String> = (0..count).map(|i| format!("{prefix}{i}")).collect();
    encode(
        names
            .iter()
            .map(|name| (name.as_str(), Cell::live(ts(1), b"v".to_vec())))
            .collect(),
    )
}

#[test]
fn merge_never_writes_a_row_it_cannot_read_back() {
    init_tracing();
    let op = RowValueMergeOperator::from_config(
        &MergeConfig::default().with_limits(Limits::with_small_limits()),
    );
    let a = wide("a", 5);
    let b = wide("b", 5);
    let c = wide("c", 5);
    let mut out = vec![0xEE; 4];

    // Two 5-cell rows with distinct names would need 10 cells; the limit is 8
    let err = op.partial_merge(b"row", &a, &b, &mut out).unwrap_err();
    assert!(matches!(
        err,
        MergeError::OutputLimitExceeded(LimitError::TooManyCells { actual: 10, max: 8 })
    ));
    assert!(out.is_empty());

    // Every grouping of the same operands fails the same way
    let operands = [a.as_slice(), b.as_slice(), c.as_slice()];
    assert!(op.partial_merge_multi(b"row", &operands, &mut out).is_err());
    assert!(op
        .full_merge(&MergeInput::new(b"row", Some(&a[..]), &operands[1..]), &mut out)
        .is_err());
    assert!(out.is_empty());
}
