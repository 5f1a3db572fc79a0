//! Metrics for keyed pools.
//!
//! All pools on a thread share the same events. The magnitude of every event is nominal (1),
//! so only the counts carry information.

use nm::Event;

thread_local! {
    /// A requested key was already present in the pool.
    pub(crate) static HITS: Event = Event::builder()
        .name("keyed_pool_hits")
        .build();

    /// A requested key was not present and a resource had to be constructed.
    pub(crate) static MISSES: Event = Event::builder()
        .name("keyed_pool_misses")
        .build();

    /// A resource was dropped from a full pool to make room for a different key.
    pub(crate) static EVICTIONS: Event = Event::builder()
        .name("keyed_pool_evictions")
        .build();

    /// A resource constructor returned an error.
    pub(crate) static CONSTRUCTION_FAILURES: Event = Event::builder()
        .name("keyed_pool_construction_failures")
        .build();

    /// All hit scores were divided down at the end of a decay period.
    pub(crate) static DECAYS: Event = Event::builder()
        .name("keyed_pool_decays")
        .build();
}
