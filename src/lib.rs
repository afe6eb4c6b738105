//! Runtime iterator-validity hardening for contiguous sequence containers.
//!
//! An iterator handed out by a container can outlive the storage it points
//! into: the container grows and moves its buffer, shrinks, or is dropped.
//! This crate lets such an iterator notice, at the moment it is used, that the
//! position it holds is no longer live and in bounds, and stop the program
//! there instead of reading the wrong memory.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   handle    ┌──────────────────┐
//! │  BoundsRecord    │◀ ─ ─ ─ ─ ─ ─│  CheckedIter<P>  │
//! │ [begin, end) in  │  (weak,     │ position + handle│
//! │ a generation slot│   Copy)     └────────┬─────────┘
//! └────────▲─────────┘                      │ get / at / [ ]
//!          │ owns one per buffer            ▼
//! ┌────────┴─────────────────────────────────────────────┐
//! │ CheckedVec<T>  (update in place / replace on move)   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! | Module      | Role                                                  |
//! |-------------|-------------------------------------------------------|
//! | `harden`    | Bounds records, arena, violations, build-time switch  |
//! | `iter`      | `CheckedIter`, `RawPosition`, `ContiguousIter`        |
//! | `vec`       | `CheckedVec`, a container following the contract      |
//! | `contracts` | Debug-build checks of the container-side rules        |
//!
//! # Failure kinds
//!
//! - `DanglingIterator`: the record is gone (container dropped, or storage
//!   relocated).
//! - `OutOfBoundsAccess`: the record is alive but the position is outside it
//!   (e.g. past a shrink).
//! - `InvalidRangeConstruction`: a record was given `begin > end`.
//!
//! All of them are fatal: the violation is logged and the process aborts, in
//! any binary that links this crate. The `unwind-on-violation` feature turns
//! the abort into a panic for test harnesses that need to catch it.
//!
//! # Usage
//!
//! ```
//! use tether::CheckedVec;
//!
//! let mut v: CheckedVec<i32> = (1..=4).collect();
//! let first = v.begin();
//! let last = v.end() - 1;
//! assert_eq!(v[first], 1);
//! assert_eq!(last - first, 3);
//!
//! v.pop();
//! assert_eq!(v[first], 1);  // still live: pop updates the record in place
//! // v[last] would now stop with "out-of-bounds access"
//!
//! v.shrink_to_fit();        // relocates: `first` now dangles
//! // v[first] would now stop with "dangling iterator"
//! ```
//!
//! Build with `--no-default-features` to turn hardening off. Iterators then
//! erase to plain positions and no check runs.

pub mod contracts;
pub mod harden;
pub mod iter;
pub mod testing;
pub mod vec;

// Re-exports for public API
pub use harden::{
    arena_stats, ArenaStats, BoundsRecord, ContainerBounds, HardenedIter, RecordHandle, Span,
    Violation,
};
pub use iter::{make_checked_iterator, CheckedIter, ContiguousIter, IterState, RawPosition};
pub use vec::{as_const, CheckedVec, ConstCursor, ConstIter, Cursor, CursorKind, Iter};
