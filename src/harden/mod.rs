// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hardening: bounds records and the build-time switch that turns checks on.
//!
//! The records themselves ([`BoundsRecord`], [`RecordHandle`]) are always
//! available. What the `hardening` Cargo feature controls is what a container
//! hands out:
//!
//! | `hardening` | [`HardenedIter<P>`]   | [`ContainerBounds`]            |
//! |-------------|-----------------------|--------------------------------|
//! | on          | `CheckedIter<P>`      | owns one `BoundsRecord`        |
//! | off         | `P`                   | zero-sized, every method no-op |
//!
//! Containers are written once against this module and compile to plain raw
//! positions when the feature is off.

mod arena;
mod bounds;
pub mod violation;

pub use arena::{arena_stats, ArenaStats, RecordHandle, Span, ARENA_CAPACITY, CHUNK_COUNT, FIRST_CHUNK_BITS};
pub use bounds::BoundsRecord;
pub use violation::{fatal, OnViolation, Violation, ON_VIOLATION};

/// `true` when the crate was built with the `hardening` feature.
pub const ENABLED: bool = cfg!(feature = "hardening");

#[cfg(feature = "hardening")]
pub use enabled::{convert, ContainerBounds, HardenedIter};

#[cfg(not(feature = "hardening"))]
pub use disabled::{convert, ContainerBounds, HardenedIter};

#[cfg(feature = "hardening")]
mod enabled {
    use super::{fatal, BoundsRecord, RecordHandle, Violation};
    use crate::contracts;
    use crate::iter::{make_checked_iterator, CheckedIter, RawPosition};

    /// Iterator type containers hand out.
    pub type HardenedIter<P> = CheckedIter<P>;

    /// Change the iterator kind, keeping its record.
    #[inline]
    pub fn convert<P, Q: From<P>>(it: HardenedIter<P>) -> HardenedIter<Q> {
        it.convert()
    }

    /// The container's side of the contract: one record for the current buffer,
    /// with positions `[0, len)`.
    #[derive(Debug)]
    pub struct ContainerBounds {
        record: BoundsRecord,
    }

    impl ContainerBounds {
        pub fn new(len: usize) -> Self {
            Self {
                record: BoundsRecord::new(0, len),
            }
        }

        /// Element count changed, buffer did not move.
        #[inline]
        pub fn update(&mut self, len: usize) {
            let before = self.record.handle();
            self.record.update_bounds(0, len);
            contracts::check_in_place_kept_identity(before, self.record.handle());
        }

        /// Buffer moved: retire the record and mint a fresh one.
        pub fn relocate(&mut self, len: usize) {
            let old = self.record.handle();
            self.record = BoundsRecord::new(0, len);
            contracts::check_relocation_minted_fresh(old, self.record.handle());
        }

        #[inline]
        pub fn mint<P>(&self, position: P) -> HardenedIter<P> {
            make_checked_iterator(position, &self.record)
        }

        /// Address for `*it`: live, in bounds, and minted by this container.
        #[inline]
        #[track_caller]
        pub fn check_access<P: RawPosition>(&self, it: &HardenedIter<P>) -> usize {
            let address = it.checked_address();
            self.check_owned(it, address);
            address
        }

        /// Address for `it[n]`.
        #[inline]
        #[track_caller]
        pub fn check_access_at<P: RawPosition>(&self, it: &HardenedIter<P>, n: isize) -> usize {
            let address = it.checked_address_at(n);
            self.check_owned(it, address);
            address
        }

        /// Address of an insertion or range boundary: live, owned, and inside
        /// `[begin, end]` (past-the-end allowed).
        #[track_caller]
        pub fn check_insertable<P: RawPosition>(&self, it: &HardenedIter<P>) -> usize {
            let address = it.to_address();
            let Some(span) = it.record().resolve() else {
                fatal(Violation::DanglingIterator { address });
            };
            self.check_owned(it, address);
            if address < span.begin || address > span.end {
                fatal(Violation::OutOfBoundsAccess {
                    address,
                    begin: span.begin,
                    end: span.end,
                });
            }
            address
        }

        /// Identity of the current record.
        pub fn handle(&self) -> Option<RecordHandle> {
            Some(self.record.handle())
        }

        #[inline]
        #[track_caller]
        fn check_owned<P>(&self, it: &CheckedIter<P>, address: usize) {
            if !self.record.owns(it) {
                fatal(Violation::ForeignIterator { address });
            }
        }

        /// Checked in debug builds: the record tracks `[0, len)`.
        pub(crate) fn debug_check_tracks(&self, len: usize) {
            contracts::check_bounds_track_storage(self.record.span(), len);
        }
    }
}

#[cfg(not(feature = "hardening"))]
mod disabled {
    use super::RecordHandle;
    use crate::iter::RawPosition;

    /// Without hardening, containers hand out raw positions.
    pub type HardenedIter<P> = P;

    #[inline(always)]
    pub fn convert<P, Q: From<P>>(it: HardenedIter<P>) -> HardenedIter<Q> {
        Q::from(it)
    }

    /// Zero-sized stand-in: no record, no checks.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ContainerBounds;

    impl ContainerBounds {
        #[inline(always)]
        pub fn new(_len: usize) -> Self {
            Self
        }

        #[inline(always)]
        pub fn update(&mut self, _len: usize) {}

        #[inline(always)]
        pub fn relocate(&mut self, _len: usize) {}

        #[inline(always)]
        pub fn mint<P>(&self, position: P) -> HardenedIter<P> {
            position
        }

        #[inline(always)]
        pub fn check_access<P: RawPosition>(&self, it: &HardenedIter<P>) -> usize {
            it.address()
        }

        #[inline(always)]
        pub fn check_access_at<P: RawPosition>(&self, it: &HardenedIter<P>, n: isize) -> usize {
            it.offset(n).address()
        }

        #[inline(always)]
        pub fn check_insertable<P: RawPosition>(&self, it: &HardenedIter<P>) -> usize {
            it.address()
        }

        #[inline(always)]
        pub fn handle(&self) -> Option<RecordHandle> {
            None
        }

        #[inline(always)]
        pub(crate) fn debug_check_tracks(&self, _len: usize) {}
    }
}
