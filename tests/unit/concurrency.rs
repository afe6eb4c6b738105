//! Records are shared state: iterators read them from any thread.

use super::common::{assert_violation, filled_to_capacity, vec_of};
use std::sync::{Arc, Barrier};
use std::thread;
use tether::{BoundsRecord, IterState, RecordHandle};

#[test]
fn concurrent_reads_through_shared_container() {
    let v = vec_of(&(0..64).collect::<Vec<u32>>());
    let begin = v.begin();

    thread::scope(|s| {
        for t in 0..8isize {
            let v = &v;
            s.spawn(move || {
                for k in 0..64isize {
                    let n = (k + t * 8) % 64;
                    assert_eq!(*v.at(begin, n), n as u32);
                }
            });
        }
    });
}

#[test]
fn relocation_in_one_thread_is_seen_in_another() {
    let mut v = filled_to_capacity(&[1u8, 2, 3]);
    let it = v.begin();

    thread::scope(|s| {
        s.spawn(|| v.push(4)).join().unwrap();
    });

    let seen = thread::spawn(move || it.state()).join().unwrap();
    assert_eq!(seen, IterState::Expired);
    assert_violation("dangling iterator", || {
        let _ = v[it];
    });
}

#[test]
fn drop_on_another_thread_expires_iterator() {
    let v = vec_of(&["x", "y"]);
    let it = v.begin();
    thread::spawn(move || drop(v)).join().unwrap();
    assert_eq!(it.state(), IterState::Expired);
}

#[test]
fn in_place_update_is_visible_after_join() {
    let record = Arc::new(parking_lot::Mutex::new(BoundsRecord::new(0, 10)));
    let handle: RecordHandle = record.lock().handle();

    let writer = {
        let record = Arc::clone(&record);
        thread::spawn(move || record.lock().update_bounds(0, 3))
    };
    writer.join().unwrap();

    let span = handle.resolve().unwrap();
    assert_eq!((span.begin, span.end), (0, 3));
}

#[test]
fn readers_after_a_barrier_see_the_completed_update() {
    let mut record = BoundsRecord::new(0, 100);
    let handle = record.handle();
    record.update_bounds(10, 20);
    let barrier = Arc::new(Barrier::new(4));

    thread::scope(|s| {
        for _ in 0..4 {
            let barrier = Arc::clone(&barrier);
            s.spawn(move || {
                barrier.wait();
                for _ in 0..1_000 {
                    let span = handle.resolve().unwrap();
                    assert_eq!((span.begin, span.end), (10, 20));
                }
            });
        }
    });
    drop(record);
}

#[test]
fn concurrent_minting_yields_distinct_handles() {
    let records: Vec<BoundsRecord> = thread::scope(|s| {
        let workers: Vec<_> = (0..8)
            .map(|_| s.spawn(|| (0..50).map(|n| BoundsRecord::new(0, n)).collect::<Vec<_>>()))
            .collect();
        workers.into_iter().flat_map(|w| w.join().unwrap()).collect()
    });

    let mut ids: Vec<_> = records
        .iter()
        .map(|r| (r.handle().index(), r.handle().generation()))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8 * 50);
    assert!(records.iter().all(|r| !r.handle().is_expired()));
}
