//! Runtime contracts for containers that hand out checked iterators.
//!
//! These are the container-side rules. Breaking one does not crash anything by
//! itself; it silently weakens the iterator checks, which is worse. The
//! contracts:
//!
//! 1. Are **zero-cost in release builds** (use `debug_assert!`)
//! 2. Run on every storage change in debug builds and tests
//! 3. Complement the hardening checks, which only fire on dereference
//!
//! # INVARIANTS (DO NOT REMOVE THESE CHECKS)
//!
//! | Contract Function                   | Rule                                          |
//! |-------------------------------------|-----------------------------------------------|
//! | `check_bounds_track_storage`        | record spans exactly `[0, len)`               |
//! | `check_in_place_kept_identity`      | non-relocating change keeps the record        |
//! | `check_relocation_minted_fresh`     | relocation retires the old record, mints new  |
//! | `check_distinct_records`            | two containers never share a record           |
//!
//! # Usage
//!
//! ```ignore
//! use tether::contracts::*;
//!
//! // In debug builds, this panics if the container forgot to update its record
//! check_bounds_track_storage(record.span(), buf.len());
//! ```

use crate::harden::{RecordHandle, Span};

// ============================================================================
// COMPILE-TIME ASSERTIONS (evaluated at build time)
// ============================================================================

// INVARIANT: the null handle can never collide with a minted slot
const _: () = assert!((u32::MAX as u64) >= crate::harden::ARENA_CAPACITY);

// ============================================================================
// RECORD CONTRACTS
// ============================================================================

/// Check that a container's record matches its storage.
///
/// # Panics (debug builds only)
/// Panics if the record is not exactly `[0, len)`.
#[inline]
pub fn check_bounds_track_storage(span: Span, len: usize) {
    // INVARIANT: begin <= end, and the record covers every live element
    debug_assert!(
        span.begin <= span.end,
        "Contract violation: record span [{}, {}) is inverted",
        span.begin,
        span.end
    );
    debug_assert!(
        span.begin == 0 && span.end == len,
        "Contract violation: record span [{}, {}) does not track storage [0, {})",
        span.begin,
        span.end,
        len
    );
}

/// Check that a non-relocating change left the record's identity alone.
///
/// # Panics (debug builds only)
/// Panics if the handle changed or stopped resolving.
#[inline]
pub fn check_in_place_kept_identity(before: RecordHandle, after: RecordHandle) {
    // INVARIANT: in-place size changes reuse the same record
    debug_assert_eq!(
        before, after,
        "Contract violation: in-place update replaced the bounds record"
    );
    debug_assert!(
        !after.is_expired(),
        "Contract violation: in-place update expired the bounds record"
    );
}

/// Check that a relocation replaced the record.
///
/// # Panics (debug builds only)
/// Panics if the new handle equals the old one, the old one still resolves, or
/// the new one does not.
#[inline]
pub fn check_relocation_minted_fresh(old: RecordHandle, new: RecordHandle) {
    // INVARIANT: relocation always produces a new record with a new identity
    debug_assert_ne!(
        old, new,
        "Contract violation: relocation reused the old bounds record"
    );
    debug_assert!(
        old.is_expired(),
        "Contract violation: relocated storage left its old record alive"
    );
    debug_assert!(
        !new.is_expired(),
        "Contract violation: replacement record does not resolve"
    );
}

/// Check that two live containers hold different records.
///
/// # Panics (debug builds only)
/// Panics if both handles are equal.
#[inline]
pub fn check_distinct_records(a: RecordHandle, b: RecordHandle) {
    // INVARIANT: iterators are never portable across container instances
    debug_assert_ne!(
        a, b,
        "Contract violation: two containers share bounds record {:?}",
        a
    );
}
