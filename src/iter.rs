// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Checked iterators: a raw position plus a weak reference to a bounds record.
//!
//! A [`CheckedIter`] is as cheap to build, copy and move as the position it
//! wraps plus a `Copy` record handle. Arithmetic and comparison touch only the
//! position. The record is consulted when the iterator is used to reach an
//! element:
//!
//! | Operation                          | Validates? |
//! |------------------------------------|------------|
//! | `+`, `-`, `+=`, `-=`, `it - it`    | no         |
//! | `==`, `<`, …                       | no         |
//! | [`to_address`](CheckedIter::to_address) | no    |
//! | [`checked_address`](CheckedIter::checked_address) (`*it`) | yes |
//! | [`checked_address_at`](CheckedIter::checked_address_at) (`it[n]`) | yes |
//!
//! Skipping checks on arithmetic is what lets callers form past-the-end
//! positions and compute distances. An iterator can point anywhere; it just
//! cannot be dereferenced there.
//!
//! Comparisons do not verify that both sides share a record. Comparing
//! iterators from two containers compiles and compares positions.

use crate::harden::{fatal, BoundsRecord, RecordHandle, Violation};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// An unchecked position inside contiguous storage.
///
/// Arithmetic wraps: moving before the start is allowed and simply produces a
/// position no bounds record will ever contain.
pub trait RawPosition: Copy + Ord {
    /// The position as an address comparable against a record's bounds.
    fn address(self) -> usize;

    /// Move by `n` elements.
    #[must_use]
    fn offset(self, n: isize) -> Self;

    /// Signed element count from `origin` to `self`.
    fn distance(self, origin: Self) -> isize;
}

impl RawPosition for usize {
    #[inline]
    fn address(self) -> usize {
        self
    }

    #[inline]
    fn offset(self, n: isize) -> Self {
        self.wrapping_add_signed(n)
    }

    #[inline]
    fn distance(self, origin: Self) -> isize {
        self.wrapping_sub(origin) as isize
    }
}

/// What containers need from an iterator, checked or not.
///
/// Implemented by [`CheckedIter`] (validates) and by every [`RawPosition`]
/// (does not). Generic code written against this trait runs the same way with
/// hardening on or off.
pub trait ContiguousIter: Copy {
    /// Address without validation.
    fn to_address(&self) -> usize;

    /// Address for `*it`.
    fn dereference(&self) -> usize;

    /// Address for `it[n]`.
    fn subscript(&self, n: isize) -> usize;
}

impl<P: RawPosition> ContiguousIter for P {
    #[inline]
    fn to_address(&self) -> usize {
        self.address()
    }

    #[inline]
    fn dereference(&self) -> usize {
        self.address()
    }

    #[inline]
    fn subscript(&self, n: isize) -> usize {
        self.offset(n).address()
    }
}

/// Observed validity of a checked iterator. Not stored anywhere; computed from
/// the record on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IterState {
    /// Record alive, position inside `[begin, end)`.
    InBounds,
    /// Record alive, position outside. Not an error until dereferenced.
    OutOfBounds,
    /// Record gone. Terminal.
    Expired,
}

/// A position bound to the bounds record of the storage it was minted from.
#[derive(Clone, Copy)]
pub struct CheckedIter<P> {
    position: P,
    record: RecordHandle,
}

/// Bind `position` to the live `record`. The only way to build a dereferenceable
/// checked iterator.
#[inline]
pub fn make_checked_iterator<P>(position: P, record: &BoundsRecord) -> CheckedIter<P> {
    CheckedIter {
        position,
        record: record.handle(),
    }
}

impl<P: Default> Default for CheckedIter<P> {
    /// Placeholder before first assignment. Bound to no record, so any
    /// dereference reports a dangling iterator.
    fn default() -> Self {
        Self {
            position: P::default(),
            record: RecordHandle::NULL,
        }
    }
}

impl<P> CheckedIter<P> {
    /// The record this iterator was minted against.
    #[inline]
    pub fn record(&self) -> RecordHandle {
        self.record
    }

    /// Switch to a related iterator kind over the same storage. The record
    /// carries over unchanged.
    #[inline]
    pub fn convert<Q: From<P>>(self) -> CheckedIter<Q> {
        CheckedIter {
            position: Q::from(self.position),
            record: self.record,
        }
    }
}

impl<P: RawPosition> CheckedIter<P> {
    /// The wrapped position, unchecked.
    #[inline]
    pub fn position(&self) -> P {
        self.position
    }

    /// Address of the position, unchecked.
    #[inline]
    pub fn to_address(&self) -> usize {
        self.position.address()
    }

    /// Address to dereference, after checking the record is alive and the
    /// position is inside it.
    ///
    /// # Panics
    /// Reports `DanglingIterator` or `OutOfBoundsAccess`.
    #[inline]
    #[track_caller]
    pub fn checked_address(&self) -> usize {
        self.validate(self.position.address())
    }

    /// Address of `it[n]`, checked the same way as [`checked_address`].
    ///
    /// [`checked_address`]: CheckedIter::checked_address
    #[inline]
    #[track_caller]
    pub fn checked_address_at(&self, n: isize) -> usize {
        self.validate(self.position.offset(n).address())
    }

    /// Where this iterator sits in its state machine right now.
    pub fn state(&self) -> IterState {
        match self.record.resolve() {
            None => IterState::Expired,
            Some(span) if span.contains(self.position.address()) => IterState::InBounds,
            Some(_) => IterState::OutOfBounds,
        }
    }

    #[inline]
    #[track_caller]
    fn validate(&self, address: usize) -> usize {
        let Some(span) = self.record.resolve() else {
            fatal(Violation::DanglingIterator { address });
        };
        if !span.contains(address) {
            fatal(Violation::OutOfBoundsAccess {
                address,
                begin: span.begin,
                end: span.end,
            });
        }
        address
    }
}

impl<P: RawPosition> ContiguousIter for CheckedIter<P> {
    #[inline]
    fn to_address(&self) -> usize {
        CheckedIter::to_address(self)
    }

    #[inline]
    #[track_caller]
    fn dereference(&self) -> usize {
        self.checked_address()
    }

    #[inline]
    #[track_caller]
    fn subscript(&self, n: isize) -> usize {
        self.checked_address_at(n)
    }
}

// ============================================================================
// ARITHMETIC (never validates)
// ============================================================================

impl<P: RawPosition> AddAssign<isize> for CheckedIter<P> {
    #[inline]
    fn add_assign(&mut self, n: isize) {
        self.position = self.position.offset(n);
    }
}

impl<P: RawPosition> SubAssign<isize> for CheckedIter<P> {
    #[inline]
    fn sub_assign(&mut self, n: isize) {
        self.position = self.position.offset(n.wrapping_neg());
    }
}

impl<P: RawPosition> Add<isize> for CheckedIter<P> {
    type Output = Self;

    #[inline]
    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<P: RawPosition> Add<CheckedIter<P>> for isize {
    type Output = CheckedIter<P>;

    #[inline]
    fn add(self, it: CheckedIter<P>) -> CheckedIter<P> {
        it + self
    }
}

impl<P: RawPosition> Sub<isize> for CheckedIter<P> {
    type Output = Self;

    #[inline]
    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<P: RawPosition> Sub for CheckedIter<P> {
    type Output = isize;

    /// Element distance. Does not check that both iterators share a record.
    #[inline]
    fn sub(self, origin: Self) -> isize {
        self.position.distance(origin.position)
    }
}

// ============================================================================
// COMPARISON (positions only)
// ============================================================================

impl<P: PartialEq> PartialEq for CheckedIter<P> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl<P: Eq> Eq for CheckedIter<P> {}

impl<P: PartialOrd> PartialOrd for CheckedIter<P> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.position.partial_cmp(&other.position)
    }
}

impl<P: Ord> Ord for CheckedIter<P> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.position.cmp(&other.position)
    }
}

impl<P: fmt::Debug> fmt::Debug for CheckedIter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckedIter")
            .field("position", &self.position)
            .field("record", &self.record.index())
            .field("generation", &self.record.generation())
            .finish()
    }
}
