// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The failure taxonomy and the one place failures are reported.
//!
//! A violation is never handed back to the caller. It means the caller used an
//! iterator the container already invalidated, and the only useful response is to
//! stop at the earliest observable point. [`fatal`] logs the violation and aborts
//! the process, whatever panic strategy the final binary was built with.
//!
//! The `unwind-on-violation` feature (off by default) turns the abort into a
//! panic, so a test harness can catch the violation and assert on its message.
//! This crate's own tests enable it.

use serde::Serialize;
use std::fmt;

/// A hardening check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Violation {
    /// A bounds record was built (or updated) with `begin > end`.
    InvalidRangeConstruction { begin: usize, end: usize },
    /// The iterator's bounds record no longer resolves: the container was
    /// dropped, or its storage relocated.
    DanglingIterator { address: usize },
    /// The record resolves, but the position is outside `[begin, end)`.
    OutOfBoundsAccess {
        address: usize,
        begin: usize,
        end: usize,
    },
    /// The record resolves, but it belongs to a different container than the one
    /// the iterator was handed to.
    ForeignIterator { address: usize },
}

impl Violation {
    /// Short machine-friendly name of the violated check.
    pub fn check_name(&self) -> &'static str {
        match self {
            Violation::InvalidRangeConstruction { .. } => "invalid_range_construction",
            Violation::DanglingIterator { .. } => "dangling_iterator",
            Violation::OutOfBoundsAccess { .. } => "out_of_bounds_access",
            Violation::ForeignIterator { .. } => "foreign_iterator",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InvalidRangeConstruction { begin, end } => {
                write!(f, "invalid range construction: begin {} > end {}", begin, end)
            }
            Violation::DanglingIterator { address } => {
                write!(
                    f,
                    "dangling iterator: bounds record for position {} no longer resolves",
                    address
                )
            }
            Violation::OutOfBoundsAccess {
                address,
                begin,
                end,
            } => {
                write!(
                    f,
                    "out-of-bounds access: position {} outside [{}, {})",
                    address, begin, end
                )
            }
            Violation::ForeignIterator { address } => {
                write!(
                    f,
                    "foreign iterator: position {} was issued by another container",
                    address
                )
            }
        }
    }
}

impl std::error::Error for Violation {}

/// What [`fatal`] does after logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnViolation {
    /// Print the diagnostic to stderr and `abort()`. Not catchable.
    Abort,
    /// Panic with `"hardening violation: …"`. Catchable; for tests only.
    Unwind,
}

/// The policy this build uses.
pub const ON_VIOLATION: OnViolation = if cfg!(any(test, feature = "unwind-on-violation")) {
    OnViolation::Unwind
} else {
    OnViolation::Abort
};

/// Report a violation and stop.
///
/// # Panics
/// Only with `unwind-on-violation`. Otherwise the process aborts.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fatal(violation: Violation) -> ! {
    stop(violation, ON_VIOLATION)
}

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn stop(violation: Violation, on: OnViolation) -> ! {
    let location = std::panic::Location::caller();
    tracing::error!(
        check = violation.check_name(),
        %location,
        "{}",
        violation
    );
    match on {
        OnViolation::Unwind => panic!("hardening violation: {}", violation),
        OnViolation::Abort => {
            eprintln!("hardening violation: {} at {}", violation, location);
            std::process::abort()
        }
    }
}
