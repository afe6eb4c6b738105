// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The bounds record: `[begin, end)` of a container's current storage.
//!
//! A container owns exactly one record per live buffer. Iterators hold only a
//! [`RecordHandle`], so they observe in-place updates and go dangling when the
//! record is dropped.
//!
//! The container has two ways to change a record, and picking the right one is
//! what keeps the two failure kinds apart:
//!
//! | Storage change            | Record change                   | Stale iterator reports |
//! |---------------------------|---------------------------------|------------------------|
//! | in place (pop, erase, …)  | [`BoundsRecord::update_bounds`] | `OutOfBoundsAccess`    |
//! | relocation (growth, swap) | drop + [`BoundsRecord::new`]    | `DanglingIterator`     |

use super::arena::{BoundsArena, RecordHandle, Span};
use crate::iter::CheckedIter;
use std::fmt;

/// Shared bounds metadata for one storage buffer. Exclusively owned by its
/// container; dropping it expires every iterator minted against it.
pub struct BoundsRecord {
    handle: RecordHandle,
}

impl BoundsRecord {
    /// Create a record for `[begin, end)`.
    ///
    /// # Panics
    /// Reports `InvalidRangeConstruction` if `begin > end`.
    #[track_caller]
    pub fn new(begin: usize, end: usize) -> Self {
        Self {
            handle: BoundsArena::global().mint(begin, end),
        }
    }

    /// The non-owning identity iterators carry.
    #[inline]
    pub fn handle(&self) -> RecordHandle {
        self.handle
    }

    /// Current `[begin, end)`.
    #[inline]
    pub fn span(&self) -> Span {
        // INVARIANT: a record's own handle resolves for as long as the record lives
        match self.handle.resolve() {
            Some(span) => span,
            None => unreachable!("live bounds record {:?} failed to resolve", self.handle),
        }
    }

    pub fn begin(&self) -> usize {
        self.span().begin
    }

    pub fn end(&self) -> usize {
        self.span().end
    }

    /// Move the bounds in place. For mutations that keep the buffer where it is;
    /// iterators already issued keep resolving and see the new range.
    ///
    /// # Panics
    /// Reports `InvalidRangeConstruction` if `begin > end`.
    #[track_caller]
    pub fn update_bounds(&mut self, begin: usize, end: usize) {
        BoundsArena::global().update(self.handle, begin, end);
    }

    /// `begin <= address < end`.
    #[inline]
    pub fn is_dereferenceable(&self, address: usize) -> bool {
        self.span().contains(address)
    }

    /// Whether `it` was minted against this record and this record is still the
    /// one it resolves to. Dangling iterators are never owned.
    pub fn owns<P>(&self, it: &CheckedIter<P>) -> bool {
        let record = it.record();
        record == self.handle && !record.is_expired()
    }
}

impl Drop for BoundsRecord {
    fn drop(&mut self) {
        BoundsArena::global().retire(self.handle);
    }
}

impl fmt::Debug for BoundsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        f.debug_struct("BoundsRecord")
            .field("index", &self.handle.index())
            .field("generation", &self.handle.generation())
            .field("begin", &span.begin)
            .field("end", &span.end)
            .finish()
    }
}
