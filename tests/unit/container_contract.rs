//! How each container operation treats the bounds record.

use super::common::{assert_violation, filled_to_capacity, vec_of};
use tether::{as_const, CheckedVec, IterState};

// ============================================================================
// IN-PLACE OPERATIONS (record updated, identity kept)
// ============================================================================

#[test]
fn in_place_operations_keep_record_identity() {
    let mut v: CheckedVec<i32> = CheckedVec::with_capacity(32);
    let id = v.record();

    v.push(1);
    v.push(2);
    v.push(3);
    v.insert(v.cbegin(), 0);
    v.erase(v.cbegin());
    v.pop();
    v.remove(0);
    v.resize(6, 7);
    v.truncate(3);
    v.erase_range(v.cbegin(), v.cbegin() + 1);
    v.extend([1, 2]);
    v.clear();

    assert_eq!(v.record(), id);
}

#[test]
fn pop_makes_last_position_out_of_bounds() {
    let mut v = vec_of(&[1, 2, 3]);
    let last = v.end() - 1;
    v.pop();
    assert_eq!(last.state(), IterState::OutOfBounds);
    v.push(9);
    // Same record, back in range.
    assert_eq!(v[last], 9);
}

#[test]
fn truncate_reports_out_of_bounds_not_dangling() {
    let mut v = vec_of(&[1, 2, 3, 4]);
    let it = v.begin() + 3;
    v.truncate(2);
    assert_violation("out-of-bounds access: position 3 outside [0, 2)", || {
        let _ = v[it];
    });
}

// ============================================================================
// RELOCATING OPERATIONS (record replaced)
// ============================================================================

#[test]
fn relocating_operations_expire_iterators() {
    let mut v = vec_of(&[1, 2]);
    let it = v.begin();
    v.reserve(1000);
    assert_eq!(it.state(), IterState::Expired);

    let it = v.begin();
    v.shrink_to_fit();
    assert_eq!(it.state(), IterState::Expired);

    let it = v.begin();
    let cap = v.capacity();
    v.resize(cap + 1, 0);
    assert_eq!(it.state(), IterState::Expired);
}

#[test]
fn insert_into_full_container_expires_and_returns_fresh_iterator() {
    let mut v = filled_to_capacity(&[1, 2]);
    let stale = v.begin();
    let fresh = v.insert(v.cend(), 3);
    assert_eq!(stale.state(), IterState::Expired);
    assert_eq!(fresh.state(), IterState::InBounds);
    assert_eq!(v[fresh], 3);
}

#[test]
fn extend_past_capacity_relocates() {
    let mut v = filled_to_capacity(&[1]);
    let stale = v.begin();
    v.extend(vec![2; 100]);
    assert_eq!(stale.state(), IterState::Expired);
    assert_eq!(v.len(), 100 + v.iter().filter(|&&x| x == 1).count());
    let fresh = v.begin();
    assert_eq!(v[fresh], 1);
}

// ============================================================================
// WHOLE-CONTAINER OPERATIONS
// ============================================================================

#[test]
fn move_transfers_record() {
    let v = vec_of(&[1, 2, 3]);
    let it = v.begin() + 1;
    let moved = v;
    assert_eq!(moved[it], 2);

    let boxed = Box::new(moved);
    assert_eq!(boxed[it], 2);
}

#[test]
fn take_leaves_source_with_fresh_record() {
    let mut v = vec_of(&[1, 2, 3]);
    let it = v.begin();
    let taken = v.take();

    assert!(v.is_empty());
    assert_ne!(v.record(), taken.record());
    assert_eq!(taken[it], 1);
    assert_violation("foreign iterator", || {
        let _ = v.get(it);
    });
}

#[test]
fn assignment_expires_destination_iterators() {
    let mut dst = vec_of(&[1, 2]);
    let src = vec_of(&[7, 8, 9]);
    let old = dst.begin();
    let carried = src.begin();

    dst = src;

    assert_eq!(old.state(), IterState::Expired);
    assert_eq!(dst[carried], 7);
}

#[test]
fn clone_has_distinct_record() {
    let v = vec_of(&[1, 2, 3]);
    let copy = v.clone();
    assert_eq!(v, copy);
    assert_ne!(v.record(), copy.record());

    let it = v.begin();
    assert_violation(
        "foreign iterator: position 0 was issued by another container",
        || {
            let _ = copy[it];
        },
    );
}

#[test]
fn clone_survives_source_drop() {
    let v = vec_of(&[1, 2, 3]);
    let copy = v.clone();
    drop(v);
    let it = copy.begin() + 2;
    assert_eq!(copy[it], 3);
}

#[test]
fn swap_gives_both_sides_fresh_records() {
    let mut a = vec_of(&[1, 2]);
    let mut b = vec_of(&[3, 4, 5]);
    let (ra, rb) = (a.record(), b.record());
    let ia = a.begin();
    let ib = b.begin();

    a.swap(&mut b);

    assert_eq!(a.as_slice(), &[3, 4, 5]);
    assert_eq!(b.as_slice(), &[1, 2]);
    assert_ne!(a.record(), ra);
    assert_ne!(b.record(), rb);
    assert_ne!(a.record(), b.record());
    assert_eq!(ia.state(), IterState::Expired);
    assert_eq!(ib.state(), IterState::Expired);
}

#[test]
fn into_vec_retires_record() {
    let v = vec_of(&[1, 2]);
    let it = v.begin();
    let plain = v.into_vec();
    assert_eq!(plain, vec![1, 2]);
    assert_eq!(it.state(), IterState::Expired);
}

// ============================================================================
// ITERATOR ORIGIN CHECKS
// ============================================================================

#[test]
fn iterator_from_other_container_is_foreign() {
    let v = vec_of(&[1, 2]);
    let w = vec_of(&[1, 2]);
    let it = w.begin();
    assert_violation("foreign iterator", || {
        let _ = v[it];
    });
}

#[test]
fn insert_rejects_dangling_position() {
    let mut v = filled_to_capacity(&[1]);
    let stale = v.cbegin();
    v.push(2);
    assert_violation("dangling iterator", || {
        v.insert(stale, 0);
    });
}

#[test]
fn erase_rejects_foreign_position() {
    let mut v = vec_of(&[1, 2]);
    let w = vec_of(&[1, 2]);
    let theirs = w.cbegin();
    assert_violation("foreign iterator", || {
        v.erase(theirs);
    });
}

#[test]
fn erase_range_accepts_full_range() {
    let mut v = vec_of(&[1, 2, 3]);
    let it = v.erase_range(v.cbegin(), v.cend());
    assert!(v.is_empty());
    assert_eq!(it, v.begin());
    assert_eq!(it.state(), IterState::OutOfBounds);
}

#[test]
fn write_through_iterator_after_in_place_growth() {
    let mut v = vec_of(&[1, 2]);
    let it = v.begin();
    v.push(3);
    v[it] = 10;
    *v.at_mut(it, 2) = 30;
    assert_eq!(v.as_slice(), &[10, 2, 30]);
    assert_eq!(v[as_const(it + 1)], 2);
}
