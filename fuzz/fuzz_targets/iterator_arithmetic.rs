// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for checked iterator arithmetic.
//!
//! Arithmetic and comparison must never validate, so no offset sequence may
//! stop the program, even after the container is gone. The final position is
//! then classified against the bounds and must match plain integer math.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tether::{CheckedVec, IterState};

fuzz_target!(|input: (u8, Vec<i16>, bool)| {
    let (len, steps, drop_first) = input;
    let v: CheckedVec<u8> = (0..len).collect();
    let begin = v.begin();
    let mut it = begin;
    let mut expected: isize = 0;

    for step in &steps {
        let n = *step as isize;
        if n % 2 == 0 {
            it += n;
        } else {
            it = it - (-n);
        }
        expected = expected.wrapping_add(n);
        assert_eq!(it - begin, expected);
        assert_eq!(it == begin, expected == 0);
    }

    let in_range = expected >= 0 && (expected as usize) < len as usize;
    if drop_first {
        drop(v);
        assert_eq!(it.state(), IterState::Expired);
        return;
    }
    let state = it.state();
    if in_range {
        assert_eq!(state, IterState::InBounds);
        assert_eq!(v[it] as isize, expected);
    } else {
        assert_eq!(state, IterState::OutOfBounds);
    }
});
