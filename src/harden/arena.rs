// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Generation-indexed slot arena that stores every bounds record.
//!
//! Iterators never point at a record directly. They remember `(slot, generation)`
//! and look the slot up when they are dereferenced. Retiring a record bumps the
//! slot's generation, so every handle minted before the bump stops resolving,
//! even after the slot is reused for another container.
//!
//! # Layout
//!
//! Slots live in chunks that double in size: chunk `k` holds `64 << k` slots.
//! A chunk is allocated on first use and never moves, so a slot reference is
//! stable for the life of the process and readers need no lock.
//!
//! ```text
//! chunk 0: [0, 64)   chunk 1: [64, 192)   chunk 2: [192, 448)   ...
//! ```
//!
//! # Concurrency
//!
//! Lookup is lock-free: load the generation, load the bounds, load the generation
//! again. If either load disagrees with the handle, the handle is dangling. Only
//! mint and retire touch the free list, which sits behind a `parking_lot` mutex.
//! The owning container serializes its own updates; concurrent mutation while
//! another thread dereferences is a caller bug the arena does not try to detect.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;

use super::violation::Violation;

/// log2 of the slot count of chunk 0.
pub const FIRST_CHUNK_BITS: u32 = 6;

/// Number of chunks. Together they hold `2^32 - 64` slots.
pub const CHUNK_COUNT: usize = 26;

/// Total slots the arena can hand out.
pub const ARENA_CAPACITY: u64 = (1u64 << FIRST_CHUNK_BITS) * ((1u64 << CHUNK_COUNT) - 1);

/// Map a slot index to `(chunk, offset within chunk)`.
///
/// Bias the index by the size of chunk 0; the highest set bit then names the
/// chunk and the remaining bits are the offset.
#[inline]
pub(crate) fn locate(index: u32) -> (usize, usize) {
    let biased = u64::from(index) + (1u64 << FIRST_CHUNK_BITS);
    let bit = 63 - biased.leading_zeros();
    let chunk = (bit - FIRST_CHUNK_BITS) as usize;
    let offset = (biased - (1u64 << bit)) as usize;
    (chunk, offset)
}

/// Number of slots in `chunk`.
#[inline]
pub(crate) fn chunk_len(chunk: usize) -> usize {
    1usize << (FIRST_CHUNK_BITS as usize + chunk)
}

/// One arena cell.
pub(crate) struct Slot {
    generation: AtomicU64,
    begin: AtomicUsize,
    end: AtomicUsize,
}

impl Slot {
    fn vacant() -> Self {
        Self {
            generation: AtomicU64::new(0),
            begin: AtomicUsize::new(0),
            end: AtomicUsize::new(0),
        }
    }
}

/// Identity of a record: which slot, and which lifetime of that slot.
///
/// This is the non-owning half. Copying it is free and it never keeps a record
/// alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordHandle {
    index: u32,
    generation: u64,
}

impl RecordHandle {
    /// A handle that never resolves. Placeholder iterators carry it.
    pub const NULL: RecordHandle = RecordHandle {
        index: u32::MAX,
        generation: u64::MAX,
    };

    /// Slot index inside the arena.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the record was minted.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Look up the current `[begin, end)` of the record, if it is still alive.
    #[inline]
    pub fn resolve(self) -> Option<Span> {
        BoundsArena::global().resolve(self)
    }

    /// `true` once the record was retired (or for the null handle).
    #[inline]
    pub fn is_expired(self) -> bool {
        self.resolve().is_none()
    }
}

/// A half-open position range `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn contains(&self, address: usize) -> bool {
        self.begin <= address && address < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// Point-in-time arena counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArenaStats {
    /// Records ever minted.
    pub minted: u64,
    /// Records ever retired.
    pub retired: u64,
    /// Records currently alive.
    pub live: u64,
    /// Highest slot index ever handed out, plus one.
    pub high_water: u32,
}

/// Snapshot of the process-wide arena.
pub fn arena_stats() -> ArenaStats {
    BoundsArena::global().stats()
}

/// The slot arena. One process-wide instance backs every [`BoundsRecord`].
///
/// [`BoundsRecord`]: super::BoundsRecord
pub(crate) struct BoundsArena {
    chunks: [OnceLock<Box<[Slot]>>; CHUNK_COUNT],
    next: AtomicU32,
    free: Mutex<Vec<u32>>,
    minted: AtomicU64,
    retired: AtomicU64,
}

impl BoundsArena {
    pub(crate) const fn new() -> Self {
        Self {
            chunks: [const { OnceLock::new() }; CHUNK_COUNT],
            next: AtomicU32::new(0),
            free: parking_lot::const_mutex(Vec::new()),
            minted: AtomicU64::new(0),
            retired: AtomicU64::new(0),
        }
    }

    pub(crate) fn global() -> &'static BoundsArena {
        static ARENA: BoundsArena = BoundsArena::new();
        &ARENA
    }

    /// Slot for `index`, if its chunk exists.
    #[inline]
    fn slot(&self, index: u32) -> Option<&Slot> {
        if u64::from(index) >= ARENA_CAPACITY {
            return None;
        }
        let (chunk, offset) = locate(index);
        self.chunks[chunk].get().map(|slots| &slots[offset])
    }

    fn slot_or_init(&self, index: u32) -> &Slot {
        let (chunk, offset) = locate(index);
        let slots = self.chunks[chunk].get_or_init(|| {
            tracing::trace!(chunk, len = chunk_len(chunk), "allocating arena chunk");
            (0..chunk_len(chunk)).map(|_| Slot::vacant()).collect()
        });
        &slots[offset]
    }

    /// Claim a slot for a fresh record spanning `[begin, end)`.
    ///
    /// # Panics
    /// Reports `InvalidRangeConstruction` if `begin > end`. Panics if every slot
    /// is live.
    #[track_caller]
    pub(crate) fn mint(&self, begin: usize, end: usize) -> RecordHandle {
        if begin > end {
            super::violation::fatal(Violation::InvalidRangeConstruction { begin, end });
        }

        let reused = self.free.lock().pop();
        let index = match reused {
            Some(index) => index,
            None => {
                let index = self.next.fetch_add(1, Ordering::Relaxed);
                assert!(
                    u64::from(index) < ARENA_CAPACITY,
                    "bounds arena exhausted: {} live records",
                    ARENA_CAPACITY
                );
                index
            }
        };

        let slot = self.slot_or_init(index);
        slot.begin.store(begin, Ordering::Relaxed);
        slot.end.store(end, Ordering::Relaxed);
        let generation = slot.generation.load(Ordering::Acquire);
        self.minted.fetch_add(1, Ordering::Relaxed);

        let handle = RecordHandle { index, generation };
        tracing::trace!(index, generation, begin, end, reused = reused.is_some(), "minted bounds record");
        handle
    }

    /// Overwrite the bounds of a live record in place.
    ///
    /// # Panics
    /// Reports `InvalidRangeConstruction` if `begin > end`.
    #[track_caller]
    pub(crate) fn update(&self, handle: RecordHandle, begin: usize, end: usize) {
        if begin > end {
            super::violation::fatal(Violation::InvalidRangeConstruction { begin, end });
        }
        let Some(slot) = self.slot(handle.index) else {
            return;
        };
        debug_assert_eq!(
            slot.generation.load(Ordering::Relaxed),
            handle.generation,
            "Contract violation: update through a retired record"
        );
        slot.begin.store(begin, Ordering::Release);
        slot.end.store(end, Ordering::Release);
        tracing::trace!(index = handle.index, begin, end, "updated bounds in place");
    }

    /// Resolve a handle to its live span.
    #[inline]
    pub(crate) fn resolve(&self, handle: RecordHandle) -> Option<Span> {
        let slot = self.slot(handle.index)?;
        if slot.generation.load(Ordering::Acquire) != handle.generation {
            return None;
        }
        let begin = slot.begin.load(Ordering::Acquire);
        let end = slot.end.load(Ordering::Acquire);
        // Seqlock-style recheck: a retire between the two generation loads
        // means the bounds we read may belong to the next occupant.
        if slot.generation.load(Ordering::Acquire) != handle.generation {
            return None;
        }
        Some(Span { begin, end })
    }

    /// Retire a record. Every outstanding copy of `handle` stops resolving.
    pub(crate) fn retire(&self, handle: RecordHandle) {
        let Some(slot) = self.slot(handle.index) else {
            return;
        };
        let previous = slot.generation.fetch_add(1, Ordering::AcqRel);
        debug_assert_eq!(
            previous, handle.generation,
            "Contract violation: bounds record retired twice"
        );
        self.free.lock().push(handle.index);
        self.retired.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(index = handle.index, generation = handle.generation, "retired bounds record");
    }

    pub(crate) fn stats(&self) -> ArenaStats {
        let minted = self.minted.load(Ordering::Relaxed);
        let retired = self.retired.load(Ordering::Relaxed);
        ArenaStats {
            minted,
            retired,
            live: minted.saturating_sub(retired),
            high_water: self.next.load(Ordering::Relaxed).min(ARENA_CAPACITY as u32),
        }
    }
}
