// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `CheckedVec`: a growable contiguous sequence that hands out hardened iterators.
//!
//! The buffer is a plain `Vec<T>`, but the container decides when it moves.
//! `Vec` is never allowed to reallocate behind our back: every operation that
//! would outgrow the capacity builds a new buffer explicitly and replaces the
//! bounds record. Everything else updates the record in place.
//!
//! ```text
//!   push (spare capacity) ──▶ update_bounds   (old iterators: still live)
//!   push (full)           ──▶ new record      (old iterators: dangling)
//!   pop / erase / clear   ──▶ update_bounds   (old iterators past len: out of bounds)
//!   drop                  ──▶ record retired  (old iterators: dangling)
//! ```
//!
//! Iterators do not borrow the container, so they survive mutations. Reaching an
//! element goes through the container ([`get`](CheckedVec::get),
//! [`at`](CheckedVec::at), indexing), which runs the hardening checks first.
//!
//! # Moves
//!
//! A Rust move transfers the container handle, not the buffer. The record moves
//! with it and iterators issued before the move stay valid. Overwriting a
//! container (`a = b`) drops `a`'s old record and expires its iterators.

use crate::contracts;
use crate::harden::{self, ContainerBounds, HardenedIter, RecordHandle};
use crate::iter::RawPosition;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign};

/// Smallest capacity a growing relocation allocates.
pub const MIN_CAPACITY: usize = 4;

// ============================================================================
// CURSORS (the raw position kinds)
// ============================================================================

macro_rules! cursor {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T> {
            index: usize,
            _elem: PhantomData<fn() -> T>,
        }

        impl<T> $name<T> {
            #[inline]
            pub(crate) fn new(index: usize) -> Self {
                Self {
                    index,
                    _elem: PhantomData,
                }
            }

            /// Element index, unchecked.
            #[inline]
            pub fn index(self) -> usize {
                self.index
            }
        }

        impl<T> Clone for $name<T> {
            #[inline]
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::new(0)
            }
        }

        impl<T> PartialEq for $name<T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index
            }
        }

        impl<T> Eq for $name<T> {}

        impl<T> PartialOrd for $name<T> {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<T> Ord for $name<T> {
            #[inline]
            fn cmp(&self, other: &Self) -> Ordering {
                self.index.cmp(&other.index)
            }
        }

        impl<T> Hash for $name<T> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.index.hash(state);
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.index).finish()
            }
        }

        impl<T> RawPosition for $name<T> {
            #[inline]
            fn address(self) -> usize {
                self.index
            }

            #[inline]
            fn offset(self, n: isize) -> Self {
                Self::new(self.index.wrapping_add_signed(n))
            }

            #[inline]
            fn distance(self, origin: Self) -> isize {
                self.index.wrapping_sub(origin.index) as isize
            }
        }

        // Raw arithmetic, so iterator code reads the same with hardening off.
        impl<T> AddAssign<isize> for $name<T> {
            #[inline]
            fn add_assign(&mut self, n: isize) {
                *self = self.offset(n);
            }
        }

        impl<T> SubAssign<isize> for $name<T> {
            #[inline]
            fn sub_assign(&mut self, n: isize) {
                *self = self.offset(n.wrapping_neg());
            }
        }

        impl<T> Add<isize> for $name<T> {
            type Output = Self;

            #[inline]
            fn add(self, n: isize) -> Self {
                self.offset(n)
            }
        }

        impl<T> Add<$name<T>> for isize {
            type Output = $name<T>;

            #[inline]
            fn add(self, it: $name<T>) -> $name<T> {
                it.offset(self)
            }
        }

        impl<T> Sub<isize> for $name<T> {
            type Output = Self;

            #[inline]
            fn sub(self, n: isize) -> Self {
                self.offset(n.wrapping_neg())
            }
        }

        impl<T> Sub for $name<T> {
            type Output = isize;

            #[inline]
            fn sub(self, origin: Self) -> isize {
                self.distance(origin)
            }
        }
    };
}

cursor! {
    /// Mutable-kind position into a [`CheckedVec`].
    Cursor
}

cursor! {
    /// Read-only-kind position into a [`CheckedVec`].
    ConstCursor
}

impl<T> From<Cursor<T>> for ConstCursor<T> {
    #[inline]
    fn from(cursor: Cursor<T>) -> Self {
        ConstCursor::new(cursor.index)
    }
}

/// Mutable iterator into a [`CheckedVec`].
pub type Iter<T> = HardenedIter<Cursor<T>>;

/// Read-only iterator into a [`CheckedVec`].
pub type ConstIter<T> = HardenedIter<ConstCursor<T>>;

/// Positions a [`CheckedVec<T>`] accepts for reads.
pub trait CursorKind<T>: RawPosition {}

impl<T> CursorKind<T> for Cursor<T> {}
impl<T> CursorKind<T> for ConstCursor<T> {}

/// Degrade a mutable iterator to a read-only one. The record carries over.
#[inline]
pub fn as_const<T>(it: Iter<T>) -> ConstIter<T> {
    harden::convert(it)
}

// ============================================================================
// CONTAINER
// ============================================================================

/// Growable contiguous sequence with hardened iterators.
pub struct CheckedVec<T> {
    buf: Vec<T>,
    bounds: ContainerBounds,
}

impl<T> CheckedVec<T> {
    pub fn new() -> Self {
        Self::from_buffer(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_buffer(Vec::with_capacity(capacity))
    }

    fn from_buffer(buf: Vec<T>) -> Self {
        let bounds = ContainerBounds::new(buf.len());
        Self { buf, bounds }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buf
    }

    /// Identity of the current bounds record. `None` without hardening.
    pub fn record(&self) -> Option<RecordHandle> {
        self.bounds.handle()
    }

    /// Take the buffer out. The record is retired.
    pub fn into_vec(self) -> Vec<T> {
        self.buf
    }

    // ------------------------------------------------------------------------
    // Minting
    // ------------------------------------------------------------------------

    #[inline]
    pub fn begin(&self) -> Iter<T> {
        self.iter_at(0)
    }

    /// Past-the-end. Valid to hold and do arithmetic on, never to dereference.
    #[inline]
    pub fn end(&self) -> Iter<T> {
        self.iter_at(self.len())
    }

    #[inline]
    pub fn cbegin(&self) -> ConstIter<T> {
        self.bounds.mint(ConstCursor::new(0))
    }

    #[inline]
    pub fn cend(&self) -> ConstIter<T> {
        self.bounds.mint(ConstCursor::new(self.len()))
    }

    /// Iterator at `index`. Any index is accepted; only dereference checks it.
    #[inline]
    pub fn iter_at(&self, index: usize) -> Iter<T> {
        self.bounds.mint(Cursor::new(index))
    }

    // ------------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------------

    /// `*it`.
    ///
    /// # Panics
    /// With hardening: `DanglingIterator`, `OutOfBoundsAccess` or
    /// `ForeignIterator`. Without: the slice bounds check.
    #[inline]
    #[track_caller]
    pub fn get<P: CursorKind<T>>(&self, it: HardenedIter<P>) -> &T {
        let index = self.bounds.check_access(&it);
        &self.buf[index]
    }

    /// `it[n]`.
    #[inline]
    #[track_caller]
    pub fn at<P: CursorKind<T>>(&self, it: HardenedIter<P>, n: isize) -> &T {
        let index = self.bounds.check_access_at(&it, n);
        &self.buf[index]
    }

    /// `*it` through a mutable iterator.
    #[inline]
    #[track_caller]
    pub fn get_mut(&mut self, it: Iter<T>) -> &mut T {
        let index = self.bounds.check_access(&it);
        &mut self.buf[index]
    }

    /// `it[n]` through a mutable iterator.
    #[inline]
    #[track_caller]
    pub fn at_mut(&mut self, it: Iter<T>, n: isize) -> &mut T {
        let index = self.bounds.check_access_at(&it, n);
        &mut self.buf[index]
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    pub fn push(&mut self, value: T) {
        if self.buf.len() == self.buf.capacity() {
            self.relocate(self.grown_capacity(1));
        }
        self.buf.push(value);
        self.sync_bounds();
    }

    pub fn pop(&mut self) -> Option<T> {
        let value = self.buf.pop()?;
        self.sync_bounds();
        Some(value)
    }

    /// Insert before `pos`, which may be past-the-end. Returns an iterator at the
    /// new element.
    #[track_caller]
    pub fn insert(&mut self, pos: ConstIter<T>, value: T) -> Iter<T> {
        let index = self.bounds.check_insertable(&pos);
        if self.buf.len() == self.buf.capacity() {
            self.relocate(self.grown_capacity(1));
        }
        self.buf.insert(index, value);
        self.sync_bounds();
        self.iter_at(index)
    }

    /// Remove the element at `pos`. Returns an iterator at the element that
    /// followed it.
    #[track_caller]
    pub fn erase(&mut self, pos: ConstIter<T>) -> Iter<T> {
        let index = self.bounds.check_access(&pos);
        self.buf.remove(index);
        self.sync_bounds();
        self.iter_at(index)
    }

    /// Remove `[first, last)`. Returns an iterator at the element that followed
    /// the range.
    ///
    /// # Panics
    /// If `first > last`, or either end fails the insertion-position check.
    #[track_caller]
    pub fn erase_range(&mut self, first: ConstIter<T>, last: ConstIter<T>) -> Iter<T> {
        let start = self.bounds.check_insertable(&first);
        let stop = self.bounds.check_insertable(&last);
        assert!(start <= stop, "erase_range: first {} after last {}", start, stop);
        self.buf.drain(start..stop);
        self.sync_bounds();
        self.iter_at(start)
    }

    /// Remove and return the element at `index`, shifting the tail down.
    pub fn remove(&mut self, index: usize) -> T {
        let value = self.buf.remove(index);
        self.sync_bounds();
        value
    }

    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
        self.sync_bounds();
    }

    /// Drop every element. The buffer stays, so the record is updated, not
    /// replaced.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.sync_bounds();
    }

    /// Make room for `additional` more elements, relocating if needed.
    pub fn reserve(&mut self, additional: usize) {
        if self.buf.capacity() - self.buf.len() < additional {
            self.relocate(self.grown_capacity(additional));
        }
    }

    /// Move into a buffer of exactly `len` capacity, if it is larger.
    pub fn shrink_to_fit(&mut self) {
        // Zero-sized elements never allocate, there is nothing to move.
        if std::mem::size_of::<T>() != 0 && self.buf.capacity() > self.buf.len() {
            self.relocate(self.buf.len());
        }
    }

    /// Exchange contents with `other`. Both buffers change owners, so both
    /// containers get fresh records.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.buf, &mut other.buf);
        self.bounds.relocate(self.buf.len());
        other.bounds.relocate(other.buf.len());
        if let (Some(a), Some(b)) = (self.record(), other.record()) {
            contracts::check_distinct_records(a, b);
        }
        tracing::debug!("swapped storage, minted fresh records for both");
    }

    /// Move the contents out, leaving `self` empty with a fresh record. The
    /// returned container keeps the original record, so iterators issued before
    /// the call stay valid against it.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    // ------------------------------------------------------------------------
    // Growth
    // ------------------------------------------------------------------------

    fn grown_capacity(&self, additional: usize) -> usize {
        let required = self.buf.len().saturating_add(additional);
        required.max(self.buf.capacity().saturating_mul(2)).max(MIN_CAPACITY)
    }

    /// Move every element into a new buffer of `capacity` and replace the record.
    fn relocate(&mut self, capacity: usize) {
        let old_capacity = self.buf.capacity();
        let old_record = self.record();
        let mut fresh = Vec::with_capacity(capacity);
        fresh.append(&mut self.buf);
        self.buf = fresh;
        self.bounds.relocate(self.buf.len());
        tracing::debug!(
            old_capacity,
            new_capacity = self.buf.capacity(),
            len = self.buf.len(),
            ?old_record,
            new_record = ?self.record(),
            "relocated storage"
        );
    }

    #[inline]
    fn sync_bounds(&mut self) {
        self.bounds.update(self.buf.len());
        self.bounds.debug_check_tracks(self.buf.len());
    }
}

impl<T: Clone> CheckedVec<T> {
    /// Resize to `len`, filling with `value`. Relocates only if `len` exceeds
    /// the capacity.
    pub fn resize(&mut self, len: usize, value: T) {
        if len > self.buf.capacity() {
            self.relocate(self.grown_capacity(len - self.buf.len()));
        }
        self.buf.resize(len, value);
        self.sync_bounds();
    }
}

impl<T> Default for CheckedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for CheckedVec<T> {
    /// Equal contents, separate record: iterators never carry across copies.
    fn clone(&self) -> Self {
        let copy = Self::from_buffer(self.buf.clone());
        if let (Some(a), Some(b)) = (self.record(), copy.record()) {
            contracts::check_distinct_records(a, b);
        }
        copy
    }
}

impl<T> From<Vec<T>> for CheckedVec<T> {
    fn from(buf: Vec<T>) -> Self {
        Self::from_buffer(buf)
    }
}

impl<T> FromIterator<T> for CheckedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_buffer(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for CheckedVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> Deref for CheckedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.buf
    }
}

impl<T> DerefMut for CheckedVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.buf
    }
}

impl<T> Index<usize> for CheckedVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.buf[index]
    }
}

impl<T> IndexMut<usize> for CheckedVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.buf[index]
    }
}

impl<T> Index<Iter<T>> for CheckedVec<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, it: Iter<T>) -> &T {
        self.get(it)
    }
}

impl<T> Index<ConstIter<T>> for CheckedVec<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, it: ConstIter<T>) -> &T {
        self.get(it)
    }
}

impl<T> IndexMut<Iter<T>> for CheckedVec<T> {
    #[track_caller]
    fn index_mut(&mut self, it: Iter<T>) -> &mut T {
        self.get_mut(it)
    }
}

impl<T: PartialEq> PartialEq for CheckedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl<T: Eq> Eq for CheckedVec<T> {}

impl<T: fmt::Debug> fmt::Debug for CheckedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.buf.iter()).finish()
    }
}
