//! Verifies the `nm` events emitted by `KeyedPool`.
//!
//! This test is in a separate integration test binary to avoid polluting
//! the global statics used by other tests.

use std::io;

use keyed_pool::{KeyedPool, PoolKey};
use new_zealand::nz;
use nm::Report;

fn count_of(report: &Report, name: &str) -> u64 {
    report
        .events()
        .find(|e| e.name() == name)
        .map_or(0, |e| e.count())
}

#[test]
fn pool_activity_is_counted() {
    let mut pool = KeyedPool::<u32>::builder()
        .capacity(1)
        .decay_period(nz!(2))
        .build();

    let a = PoolKey::new(1);
    let b = PoolKey::new(2);

    pool.acquire(a, |_| Ok::<_, io::Error>(1)).unwrap(); // miss
    pool.acquire(a, |_| Ok::<_, io::Error>(1)).unwrap(); // hit, decay
    pool.acquire(b, |_| Ok::<_, io::Error>(2)).unwrap(); // miss, eviction
    pool.acquire(a, |_| Err(io::Error::other("no memory"))).unwrap_err(); // miss, eviction, failure

    let report = Report::collect();

    assert_eq!(count_of(&report, "keyed_pool_hits"), 1);
    assert_eq!(count_of(&report, "keyed_pool_misses"), 3);
    assert_eq!(count_of(&report, "keyed_pool_evictions"), 2);
    assert_eq!(count_of(&report, "keyed_pool_construction_failures"), 1);
    assert_eq!(count_of(&report, "keyed_pool_decays"), 1);
}
