//! Metrics for frame loading.

use nm::{Event, Magnitude};

/// Histogram buckets for loading one frame sequence, in milliseconds.
///
/// Covers everything from a hot decoder on a short sequence to a cold decoder construction
/// followed by a long seek.
const SEQUENCE_LOAD_MS_BUCKETS: &[Magnitude] = &[0, 1, 2, 5, 10, 20, 50, 100, 200, 500, 1000];

thread_local! {
    /// Time taken by one `video_frames()` call, including failed calls.
    ///
    /// The magnitude is the duration in milliseconds.
    pub(crate) static SEQUENCE_LOAD_MS: Event = Event::builder()
        .name("frame_loader_sequence_load_ms")
        .histogram(SEQUENCE_LOAD_MS_BUCKETS)
        .build();

    /// A call into the decode backend returned an error.
    pub(crate) static BACKEND_FAILURES: Event = Event::builder()
        .name("frame_loader_backend_failures")
        .build();
}
