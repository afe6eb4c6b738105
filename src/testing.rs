//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of test helpers to avoid duplication.

#![doc(hidden)]

use crate::vec::CheckedVec;

/// A container holding `values`, with spare capacity.
pub fn vec_of<T: Clone>(values: &[T]) -> CheckedVec<T> {
    let mut v = CheckedVec::with_capacity(values.len() * 2 + 1);
    for value in values {
        v.push(value.clone());
    }
    v
}

/// A container holding at least `values`, with `len == capacity`, so the next
/// push must relocate.
///
/// The allocator may round capacity up; the last value is repeated until the
/// buffer is full.
pub fn filled_to_capacity<T: Clone>(values: &[T]) -> CheckedVec<T> {
    assert!(!values.is_empty(), "filled_to_capacity needs at least one value");
    let mut v = CheckedVec::with_capacity(values.len());
    for value in values {
        v.push(value.clone());
    }
    let last = values[values.len() - 1].clone();
    while v.len() < v.capacity() {
        v.push(last.clone());
    }
    v
}
