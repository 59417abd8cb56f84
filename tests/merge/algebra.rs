//! Algebraic properties the engine relies on when it regroups operands
//! across compactions.

use crate::common::*;
use proptest::prelude::*;
use strata_merge::format::to_bytes;
use strata_merge::{Cell, RowValue, RowValueMergeOperator};

proptest! {
    #[test]
    fn deserialize_inverts_serialize(row in arb_row()) {
        prop_assert_eq!(decode(&to_bytes(&row).unwrap()), row);
    }

    #[test]
    fn partial_merges_associate(a in arb_row(), b in arb_row(), c in arb_row()) {
        let op = RowValueMergeOperator::new();
        let (a, b, c) = (to_bytes(&a).unwrap(), to_bytes(&b).unwrap(), to_bytes(&c).unwrap());

        let ab = partial_merge_multi(&op, &[&a[..], &b[..]]);
        let bc = partial_merge_multi(&op, &[&b[..], &c[..]]);

        let left = partial_merge_multi(&op, &[&ab[..], &c[..]]);
        let right = partial_merge_multi(&op, &[&a[..], &bc[..]]);
        prop_assert_eq!(&left, &right);
    }

    #[test]
    fn any_grouping_matches_flat_merge(
        rows in proptest::collection::vec(arb_row(), 1..8),
        split_seed in any::<u64>(),
    ) {
        let op = RowValueMergeOperator::new();
        let encoded: Vec<Vec<u8>> = rows.iter().map(|row| to_bytes(row).unwrap()).collect();
        let all: Vec<&[u8]> = encoded.iter().map(Vec::as_slice).collect();
        let flat = full_merge(&op, None, &all);

        // Cut the operand run into groups at positions chosen by the seed bits
        let mut groups: Vec<Vec<u8>> = Vec::new();
        let mut start = 0;
        for end in 1..=all.len() {
            let cut = end == all.len() || (split_seed >> end) & 1 == 1;
            if cut {
                groups.push(partial_merge_multi(&op, &all[start..end]));
                start = end;
            }
        }
        let grouped: Vec<&[u8]> = groups.iter().map(Vec::as_slice).collect();

        prop_assert_eq!(full_merge(&op, None, &grouped), flat);
    }

    #[test]
    fn operand_order_does_not_matter(a in arb_row(), b in arb_row(), c in arb_row()) {
        let op = RowValueMergeOperator::new();
        let (a, b, c) = (to_bytes(&a).unwrap(), to_bytes(&b).unwrap(), to_bytes(&c).unwrap());

        let forward = full_merge(&op, Some(&a[..]), &[&b[..], &c[..]]);
        let reversed = full_merge(&op, Some(&c[..]), &[&b[..], &a[..]]);
        prop_assert_eq!(forward, reversed);
    }

    #[test]
    fn fast_path_matches_decode_encode(row in arb_row()) {
        let op = RowValueMergeOperator::new();
        let operand = to_bytes(&row).unwrap();

        let fast = full_merge(&op, None, &[&operand[..]]);
        prop_assert_eq!(&fast, &to_bytes(&decode(&operand)).unwrap());
        prop_assert_eq!(fast, operand);
    }

    #[test]
    fn merging_with_itself_changes_nothing(row in arb_row()) {
        let op = RowValueMergeOperator::new();
        let operand = to_bytes(&row).unwrap();
        prop_assert_eq!(partial_merge_multi(&op, &[&operand[..], &operand[..]]), operand);
    }
}

#[test]
fn later_timestamp_wins_in_either_order() {
    let op = RowValueMergeOperator::new();
    let t1 = encode(vec![("a", Cell::live(ts(1), b"first".to_vec()))]);
    let t2 = encode(vec![("a", Cell::live(ts(2), b"second".to_vec()))]);

    for operands in [[&t1[..], &t2[..]], [&t2[..], &t1[..]]] {
        let merged = decode(&full_merge(&op, None, &operands));
        assert_eq!(merged.get(b"a").unwrap().value(), Some(&b"second"[..]));
    }
}

#[test]
fn tombstone_overrides_older_write_and_newer_write_revives() {
    let op = RowValueMergeOperator::new();
    let live_t1 = encode(vec![("a", Cell::live(ts(1), b"x".to_vec()))]);
    let dead_t2 = encode(vec![("a", Cell::tombstone(ts(2), ts(2)))]);
    let live_t3 = encode(vec![("a", Cell::live(ts(3), b"y".to_vec()))]);

    let deleted = decode(&full_merge(&op, Some(&live_t1[..]), &[&dead_t2[..]]));
    assert!(deleted.get(b"a").unwrap().is_tombstone());
    assert_eq!(deleted.live_cells().count(), 0);

    let revived = decode(&full_merge(&op, Some(&dead_t2[..]), &[&live_t3[..]]));
    assert_eq!(revived.get(b"a").unwrap().value(), Some(&b"y"[..]));
}

#[test]
fn equal_timestamps_resolve_the_same_everywhere() {
    let op = RowValueMergeOperator::new();
    let live = encode(vec![("a", Cell::live(ts(5), b"v".to_vec()))]);
    let dead = encode(vec![("a", Cell::tombstone(ts(5), ts(5)))]);

    let one = full_merge(&op, Some(&live[..]), &[&dead[..]]);
    let two = full_merge(&op, Some(&dead[..]), &[&live[..]]);
    assert_eq!(one, two);
    // Deletes win ties
    assert!(decode(&one).get(b"a").unwrap().is_tombstone());
}

#[test]
fn disjoint_cells_union() {
    let op = RowValueMergeOperator::new();
    let left = encode(vec![("a", Cell::live(ts(1), b"1".to_vec()))]);
    let right = encode(vec![("b", Cell::expiring(ts(1), b"2".to_vec(), 60))]);

    let merged: RowValue = decode(&partial_merge_multi(&op, &[&left[..], &right[..]]));
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.get(b"b").unwrap().value(), Some(&b"2"[..]));
}
