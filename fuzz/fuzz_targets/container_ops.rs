// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for container operations against held iterators.
//!
//! Runs arbitrary operation sequences on a `CheckedVec` while holding
//! iterators minted along the way. A parallel model (a plain `Vec` plus a
//! relocation epoch) predicts each iterator's state. Any mismatch, or any
//! violation raised while touching only in-bounds iterators, is a bug.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tether::{as_const, CheckedVec, IterState, Iter};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u16),
    Pop,
    Insert { at: u8, value: u16 },
    Erase { at: u8 },
    EraseRange { from: u8, len: u8 },
    Truncate(u8),
    Clear,
    Reserve(u8),
    ShrinkToFit,
    Mint(u8),
    Write { slot: u8, value: u16 },
    Take,
    CloneInto,
}

#[derive(Debug, Arbitrary)]
struct Input {
    initial: Vec<u16>,
    ops: Vec<Op>,
}

struct Held {
    it: Iter<u16>,
    index: usize,
    epoch: u64,
}

fuzz_target!(|input: Input| {
    if input.initial.len() > 256 || input.ops.len() > 512 {
        return;
    }

    let mut v: CheckedVec<u16> = input.initial.iter().copied().collect();
    let mut model = input.initial.clone();
    let mut epoch = 0u64;
    let mut held: Vec<Held> = Vec::new();

    for op in &input.ops {
        let len = v.len();
        let cap = v.capacity();
        match *op {
            Op::Push(x) => {
                if len == cap {
                    epoch += 1;
                }
                v.push(x);
                model.push(x);
            }
            Op::Pop => {
                assert_eq!(v.pop(), model.pop());
            }
            Op::Insert { at, value } => {
                let at = at as usize % (len + 1);
                if len == cap {
                    epoch += 1;
                }
                let it = v.insert(as_const(v.iter_at(at)), value);
                model.insert(at, value);
                held.push(Held { it, index: at, epoch });
            }
            Op::Erase { at } => {
                if len > 0 {
                    let at = at as usize % len;
                    let it = v.erase(as_const(v.iter_at(at)));
                    model.remove(at);
                    held.push(Held { it, index: at, epoch });
                }
            }
            Op::EraseRange { from, len: count } => {
                let from = from as usize % (len + 1);
                let to = (from + count as usize).min(len);
                let it = v.erase_range(as_const(v.iter_at(from)), as_const(v.iter_at(to)));
                model.drain(from..to);
                held.push(Held { it, index: from, epoch });
            }
            Op::Truncate(n) => {
                v.truncate(n as usize);
                model.truncate(n as usize);
            }
            Op::Clear => {
                v.clear();
                model.clear();
            }
            Op::Reserve(n) => {
                if cap - len < n as usize {
                    epoch += 1;
                }
                v.reserve(n as usize);
            }
            Op::ShrinkToFit => {
                if cap > len {
                    epoch += 1;
                }
                v.shrink_to_fit();
            }
            Op::Mint(at) => {
                held.push(Held {
                    it: v.iter_at(at as usize),
                    index: at as usize,
                    epoch,
                });
            }
            Op::Write { slot, value } => {
                let live: Vec<usize> = held
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| h.epoch == epoch && h.index < model.len())
                    .map(|(i, _)| i)
                    .collect();
                if !live.is_empty() {
                    let h = &held[live[slot as usize % live.len()]];
                    v[h.it] = value;
                    model[h.index] = value;
                }
            }
            Op::Take => {
                // The taken container keeps the record; iterators follow it.
                v = v.take();
            }
            Op::CloneInto => {
                // Assignment from a clone drops the old record.
                v = v.clone();
                epoch += 1;
            }
        }

        assert_eq!(v.as_slice(), model.as_slice());
        for h in &held {
            let expected = if h.epoch != epoch {
                IterState::Expired
            } else if h.index < model.len() {
                IterState::InBounds
            } else {
                IterState::OutOfBounds
            };
            assert_eq!(h.it.state(), expected, "after {:?}, iterator at {}", op, h.index);
            if expected == IterState::InBounds {
                assert_eq!(v[h.it], model[h.index]);
            }
        }
        held.retain(|h| h.epoch == epoch);
    }
});
