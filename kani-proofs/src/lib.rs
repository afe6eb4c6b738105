// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Kani model checking proofs for tether's bounds arena arithmetic.
//!
//! This standalone crate extracts the slot-index math and the bounds
//! predicate and proves them correct for every input using Kani.
//!
//! Run with: `cargo kani`
//!
//! ## Verified Properties
//!
//! 1. **Locate is in range**: every `u32` below capacity maps to a real chunk
//!    and an offset inside it
//! 2. **Locate is injective**: distinct indices never share a slot
//! 3. **Chunks tile the index space**: chunk `k` starts where `k - 1` ends
//! 4. **Bounds predicate**: `contains(p)` iff `begin <= p < end`
//! 5. **Generations**: a retired handle never resolves again

/// log2 of the slot count of chunk 0.
pub const FIRST_CHUNK_BITS: u32 = 6;

/// Number of chunks.
pub const CHUNK_COUNT: usize = 26;

/// Total slots.
pub const ARENA_CAPACITY: u64 = (1u64 << FIRST_CHUNK_BITS) * ((1u64 << CHUNK_COUNT) - 1);

// ============================================================================
// ARENA INDEX MATH (copied from src/harden/arena.rs)
// ============================================================================

/// Map a slot index to `(chunk, offset within chunk)`.
pub fn locate(index: u32) -> (usize, usize) {
    let biased = u64::from(index) + (1u64 << FIRST_CHUNK_BITS);
    let bit = 63 - biased.leading_zeros();
    let chunk = (bit - FIRST_CHUNK_BITS) as usize;
    let offset = (biased - (1u64 << bit)) as usize;
    (chunk, offset)
}

/// Number of slots in `chunk`.
pub fn chunk_len(chunk: usize) -> usize {
    1usize << (FIRST_CHUNK_BITS as usize + chunk)
}

/// First index stored in `chunk`.
pub fn chunk_start(chunk: usize) -> u64 {
    (1u64 << (FIRST_CHUNK_BITS as usize + chunk)) - (1u64 << FIRST_CHUNK_BITS)
}

// ============================================================================
// BOUNDS PREDICATE (copied from src/harden/arena.rs)
// ============================================================================

/// Half-open position range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn contains(&self, address: usize) -> bool {
        self.begin <= address && address < self.end
    }
}

// ============================================================================
// GENERATION CHECK (the resolve rule, without atomics)
// ============================================================================

/// A slot reduced to what resolve compares.
#[derive(Debug, Clone, Copy)]
pub struct SlotModel {
    pub generation: u64,
}

impl SlotModel {
    pub fn resolves(&self, handle_generation: u64) -> bool {
        self.generation == handle_generation
    }

    pub fn retire(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

// ============================================================================
// KANI MODEL CHECKING PROOFS
// ============================================================================

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Every index below capacity lands inside an allocated chunk.
    #[kani::proof]
    fn verify_locate_in_range() {
        let index: u32 = kani::any();
        kani::assume(u64::from(index) < ARENA_CAPACITY);

        let (chunk, offset) = locate(index);
        kani::assert(chunk < CHUNK_COUNT, "chunk must exist");
        kani::assert(offset < chunk_len(chunk), "offset must fit the chunk");
    }

    /// `locate` inverts `chunk_start + offset`.
    #[kani::proof]
    fn verify_locate_roundtrip() {
        let index: u32 = kani::any();
        kani::assume(u64::from(index) < ARENA_CAPACITY);

        let (chunk, offset) = locate(index);
        kani::assert(
            chunk_start(chunk) + offset as u64 == u64::from(index),
            "chunk start plus offset must give back the index",
        );
    }

    /// Two different indices never map to the same slot.
    #[kani::proof]
    fn verify_locate_injective() {
        let a: u32 = kani::any();
        let b: u32 = kani::any();
        kani::assume(a != b);
        kani::assume(u64::from(a) < ARENA_CAPACITY && u64::from(b) < ARENA_CAPACITY);

        kani::assert(locate(a) != locate(b), "distinct indices must not alias");
    }

    /// Chunk `k + 1` starts right after chunk `k` ends.
    #[kani::proof]
    fn verify_chunks_tile() {
        let chunk: usize = kani::any_where(|&c| c + 1 < CHUNK_COUNT);
        kani::assert(
            chunk_start(chunk) + chunk_len(chunk) as u64 == chunk_start(chunk + 1),
            "chunks must be contiguous",
        );
    }

    /// `contains` is exactly the half-open interval test.
    #[kani::proof]
    fn verify_span_contains() {
        let begin: usize = kani::any();
        let end: usize = kani::any();
        let address: usize = kani::any();
        kani::assume(begin <= end);

        let span = Span { begin, end };
        let inside = span.contains(address);
        kani::assert(inside == (address >= begin && address < end), "half-open");
        kani::assert(!span.contains(end), "end is never dereferenceable");
    }

    /// An empty span contains nothing.
    #[kani::proof]
    fn verify_empty_span() {
        let at: usize = kani::any();
        let address: usize = kani::any();
        let span = Span { begin: at, end: at };
        kani::assert(!span.contains(address), "empty span must reject every address");
    }

    /// After retire, the handle from before never resolves.
    #[kani::proof]
    fn verify_retire_expires_handle() {
        let generation: u64 = kani::any();
        let mut slot = SlotModel { generation };
        kani::assert(slot.resolves(generation), "fresh handle resolves");
        slot.retire();
        kani::assert(!slot.resolves(generation), "retired handle must not resolve");
    }
}
