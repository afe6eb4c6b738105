//! Bounds record lifecycle: construct, update in place, replace, retire.

use super::common::assert_violation;
use tether::{arena_stats, make_checked_iterator, BoundsRecord, IterState, RecordHandle, Span};

#[test]
fn construct_records_the_range() {
    let record = BoundsRecord::new(3, 9);
    assert_eq!(record.span(), Span { begin: 3, end: 9 });
    assert_eq!(record.begin(), 3);
    assert_eq!(record.end(), 9);
    assert!(!record.handle().is_expired());
}

#[test]
fn construct_rejects_inverted_range() {
    assert_violation("invalid range construction: begin 9 > end 3", || {
        let _ = BoundsRecord::new(9, 3);
    });
}

#[test]
fn update_bounds_is_seen_by_existing_iterators() {
    let mut record = BoundsRecord::new(0, 5);
    let inside = make_checked_iterator(1usize, &record);
    let tail = make_checked_iterator(4usize, &record);

    record.update_bounds(0, 4);

    assert_eq!(inside.state(), IterState::InBounds);
    assert_eq!(tail.state(), IterState::OutOfBounds);
    assert_eq!(inside.checked_address(), 1);
}

#[test]
fn update_can_move_begin() {
    let mut record = BoundsRecord::new(0, 5);
    let front = make_checked_iterator(0usize, &record);
    record.update_bounds(1, 5);
    assert_eq!(front.state(), IterState::OutOfBounds);
    assert!(record.is_dereferenceable(1));
    assert!(!record.is_dereferenceable(0));
}

#[test]
fn replacement_distinguishes_dangling_from_out_of_bounds() {
    // Same shrink, two ways: in place keeps the record, relocation replaces it.
    let mut in_place = BoundsRecord::new(0, 5);
    let a = make_checked_iterator(4usize, &in_place);
    in_place.update_bounds(0, 4);
    assert_violation("out-of-bounds access", || {
        a.checked_address();
    });

    let mut relocated = BoundsRecord::new(0, 5);
    let b = make_checked_iterator(4usize, &relocated);
    relocated = BoundsRecord::new(0, 4);
    assert_violation("dangling iterator", || {
        b.checked_address();
    });
    drop(relocated);
}

#[test]
fn owns_compares_identity() {
    let a = BoundsRecord::new(0, 2);
    let b = BoundsRecord::new(0, 2);
    let it = make_checked_iterator(0usize, &a);
    assert!(a.owns(&it));
    assert!(!b.owns(&it));
}

#[test]
fn owns_is_false_after_replacement() {
    let mut record = BoundsRecord::new(0, 2);
    let it = make_checked_iterator(0usize, &record);
    record = BoundsRecord::new(0, 2);
    assert!(!record.owns(&it));
}

#[test]
fn null_handle_is_expired() {
    assert!(RecordHandle::NULL.is_null());
    assert!(RecordHandle::NULL.is_expired());
    assert_eq!(RecordHandle::NULL.resolve(), None);
}

#[test]
fn arena_stats_count_mints_and_retires() {
    // Other tests run in parallel against the same arena, so only lower bounds
    // are meaningful.
    let before = arena_stats();
    let records: Vec<_> = (0..10).map(|n| BoundsRecord::new(0, n)).collect();
    drop(records);
    let after = arena_stats();
    assert!(after.minted >= before.minted + 10);
    assert!(after.retired >= before.retired + 10);

    let json = serde_json::to_value(after).unwrap();
    assert!(json["high_water"].as_u64().unwrap() >= 1);
}

#[test]
fn many_records_span_several_chunks() {
    let records: Vec<_> = (0..500).map(|n| BoundsRecord::new(0, n)).collect();
    for (n, record) in records.iter().enumerate() {
        assert_eq!(record.span(), Span { begin: 0, end: n });
    }
    let handles: Vec<_> = records.iter().map(BoundsRecord::handle).collect();
    drop(records);
    assert!(handles.iter().all(|h| h.is_expired()));
}
