//! Checked iterator behavior observed through a container.

use super::common::{assert_violation, filled_to_capacity, vec_of};
use tether::{as_const, CheckedIter, CheckedVec, ConstIter, ContiguousIter, IterState, Iter};

#[test]
fn dereference_yields_element_at_position() {
    let v = vec_of(&[10, 20, 30]);
    let it = v.begin() + 1;
    assert_eq!(v[it], 20);
    assert_eq!(*v.get(it), 20);
    assert_eq!(it.checked_address(), 1);
}

#[test]
fn subscript_is_dereference_of_offset() {
    let v = vec_of(&[1, 2, 3, 4, 5]);
    let it = v.begin() + 1;
    for n in -1..4isize {
        assert_eq!(v.at(it, n), v.get(it + n));
    }
}

#[test]
fn arithmetic_never_validates() {
    let v = vec_of(&[1, 2, 3]);
    // Wander far outside the range and come back.
    let it = v.begin() - 100;
    let it = it + 1000;
    let it = it - 899;
    assert_eq!(it.state(), IterState::InBounds);
    assert_eq!(v[it], 2);
}

#[test]
fn arithmetic_on_dangling_iterator_is_allowed() {
    let v = vec_of(&[1, 2, 3]);
    let first = v.begin();
    let last = v.end();
    drop(v);
    let mut walk = first;
    walk += 2;
    walk -= 1;
    assert_eq!(walk - first, 1);
    assert_eq!(last - first, 3);
    assert!(walk < last);
    assert_eq!(walk.state(), IterState::Expired);
}

#[test]
fn arithmetic_composes() {
    let v = vec_of(&[0u8; 16]);
    let it = v.begin();
    assert_eq!((it + 3) + 4, it + 7);
    assert_eq!(4isize + it, it + 4);
    assert_eq!((it + 7) - 7, it);
    assert_eq!((it + 5) - (it + 2), 3);
    assert_eq!((it + 2) - (it + 5), -3);
}

#[test]
fn comparisons_follow_positions() {
    let v = vec_of(&[1, 2, 3]);
    let a = v.begin();
    let b = v.begin() + 2;
    assert!(a < b);
    assert!(b > a);
    assert!(a <= a);
    assert_ne!(a, b);
    assert_eq!(a.max(b), b);
}

#[test]
fn comparison_across_containers_compares_positions() {
    // No same-container check: equal positions compare equal.
    let v = vec_of(&[1, 2]);
    let w = vec_of(&[1, 2]);
    assert_eq!(v.begin(), w.begin());
    assert_eq!(v.end() - w.begin(), 2);
}

#[test]
fn end_is_not_dereferenceable() {
    let v = vec_of(&[1, 2, 3]);
    let end = v.end();
    assert_eq!(end.state(), IterState::OutOfBounds);
    assert_violation("out-of-bounds access: position 3 outside [0, 3)", || {
        let _ = v[end];
    });
}

#[test]
fn before_begin_is_not_dereferenceable() {
    let v = vec_of(&[1, 2, 3]);
    let before = v.begin() - 1;
    assert_violation("out-of-bounds access", || {
        let _ = v[before];
    });
}

#[test]
fn growth_invalidates_earlier_iterators() {
    let mut v = filled_to_capacity(&[1, 2, 3, 4]);
    let it = v.begin();
    v.push(5);
    assert_eq!(it.state(), IterState::Expired);
    assert_violation("dangling iterator", || {
        let _ = v[it];
    });
    // A freshly minted iterator sees the same element.
    assert_eq!(v[v.begin()], 1);
}

#[test]
fn push_with_spare_capacity_keeps_iterators() {
    let mut v = vec_of(&[1, 2, 3]);
    let it = v.begin() + 2;
    v.push(4);
    assert_eq!(v[it], 3);
    // `end` from before the push now points at the new element.
    let old_end = v.begin() + 3;
    assert_eq!(v[old_end], 4);
}

#[test]
fn erase_front_shrinks_range_in_place() {
    let mut v = vec_of(&[10, 20, 30, 40, 50]);
    let first = v.begin() + 1;
    let last = v.begin() + 4;
    v.erase(v.cbegin());

    assert_eq!(v.as_slice(), &[20, 30, 40, 50]);
    assert_eq!(first.state(), IterState::InBounds);
    assert_eq!(v[first], 30);
    assert_eq!(last.state(), IterState::OutOfBounds);
    assert_violation("out-of-bounds access: position 4 outside [0, 4)", || {
        let _ = v[last];
    });
}

#[test]
fn drop_invalidates_every_iterator() {
    let v = vec_of(&["a", "b"]);
    let record = v.record().unwrap();
    let it = v.begin();
    drop(v);
    assert!(record.is_expired());
    assert_violation(
        "dangling iterator: bounds record for position 0 no longer resolves",
        || {
            it.checked_address();
        },
    );
}

#[test]
fn dangling_wins_over_out_of_bounds() {
    let v = vec_of(&[1]);
    let far = v.begin() + 10;
    drop(v);
    assert_violation("dangling iterator", || {
        far.checked_address();
    });
}

#[test]
fn default_iterator_reports_dangling() {
    let it: Iter<u32> = Default::default();
    assert_eq!(it.state(), IterState::Expired);
    assert_violation("dangling iterator", || {
        it.checked_address();
    });
}

#[test]
fn default_iterator_can_be_reassigned() {
    let v = vec_of(&[7]);
    let mut it: Iter<i32> = Iter::default();
    assert_eq!(it.state(), IterState::Expired);
    it = v.begin();
    assert_eq!(v[it], 7);
}

#[test]
fn conversion_to_const_keeps_record() {
    let mut v = vec_of(&[1, 2, 3]);
    let it = v.begin() + 1;
    let cit: ConstIter<i32> = as_const(it);
    assert_eq!(cit.record(), it.record());
    assert_eq!(v[cit], 2);

    v.truncate(1);
    assert_eq!(cit.state(), IterState::OutOfBounds);
}

#[test]
fn const_iterator_reads_through_get_and_at() {
    let v = vec_of(&[5, 6, 7]);
    let it = v.cbegin();
    assert_eq!(*v.get(it), 5);
    assert_eq!(*v.at(it, 2), 7);
    assert_eq!(v.cend() - it, 3);
}

#[test]
fn contiguous_iter_trait_validates_for_checked() {
    fn deref_all<I: ContiguousIter>(it: I, n: isize) -> Vec<usize> {
        (0..n).map(|k| it.subscript(k)).collect()
    }

    let v = vec_of(&[1, 2, 3]);
    assert_eq!(deref_all(v.begin(), 3), vec![0, 1, 2]);
    let it = v.begin();
    assert_violation("out-of-bounds access", || {
        deref_all(it, 4);
    });
}

#[test]
fn raw_positions_implement_contiguous_iter_without_checks() {
    let raw: usize = 42;
    assert_eq!(raw.dereference(), 42);
    assert_eq!(raw.subscript(-2), 40);
    assert_eq!(ContiguousIter::to_address(&raw), 42);
}

#[test]
fn to_address_never_validates() {
    let v = vec_of(&[1]);
    let it = v.begin() + 5;
    drop(v);
    assert_eq!(it.to_address(), 5);
}

#[test]
fn debug_shows_position() {
    let v: CheckedVec<u8> = vec_of(&[1, 2]);
    let it: CheckedIter<_> = v.begin() + 1;
    let debug = format!("{:?}", it);
    assert!(debug.contains("Cursor(1)"), "{}", debug);
}
