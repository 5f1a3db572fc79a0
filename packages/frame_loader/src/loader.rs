use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;
use std::path::Path;

use keyed_pool::{KeyedPool, LogLevel, PoolKey};
use new_zealand::nz;
use tracing::{debug, warn};

use crate::layout::{buffer_extent, strides_for};
use crate::metrics::{BACKEND_FAILURES, SEQUENCE_LOAD_MS};
use crate::{BackendError, DecodeBackend, Error, LayerDesc, LayerElement, Result, SequencePlan};

const DEFAULT_COUNT: NonZero<u16> = nz!(4);
const DEFAULT_INTERVAL: NonZero<u16> = nz!(1);
const DEFAULT_MAX_DECODERS: usize = 20;
const DEFAULT_CLEAR_FREQ: NonZero<u16> = nz!(500);

/// A decoded frame sequence together with the layer description that matches its buffer.
#[derive(Debug)]
pub struct Frames<B> {
    layer: LayerDesc,
    buffer: B,
}

impl<B> Frames<B> {
    /// The layer description, with strides matching the buffer.
    #[must_use]
    pub fn layer(&self) -> &LayerDesc {
        &self.layer
    }

    /// The device buffer holding the decoded frames.
    #[must_use]
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Takes ownership of the device buffer.
    #[must_use]
    pub fn into_buffer(self) -> B {
        self.buffer
    }
}

/// Loads frame sequences from video files into pitched device buffers of `T` elements.
///
/// Decoders are pooled by video frame size: every video with the same width and height is
/// decoded by the same decoder, as long as that decoder has not been evicted. The pool holds
/// at most [`max_decoders()`][FrameLoaderBuilder::max_decoders] decoders and evicts the least
/// useful one when a new frame size arrives at a full pool.
///
/// # Example
///
/// See `examples/frame_loader_readme.rs` for a complete example with an in-memory backend.
pub struct FrameLoader<B, T>
where
    B: DecodeBackend,
    T: LayerElement,
{
    backend: B,
    decoders: KeyedPool<B::Decoder>,
    layer: LayerDesc,
    plan: SequencePlan,

    _element: PhantomData<fn() -> T>,
}

impl<B, T> FrameLoader<B, T>
where
    B: DecodeBackend,
    T: LayerElement,
{
    /// Starts building a loader that drives the given backend.
    pub fn builder(backend: B) -> FrameLoaderBuilder<B, T> {
        FrameLoaderBuilder::new(backend)
    }

    /// Decodes the configured frame sequence from a video file.
    ///
    /// A decoder for the video's frame size is taken from the pool or constructed. A fresh
    /// pitched buffer is allocated for every call and returned to the caller.
    ///
    /// # Errors
    ///
    /// * [`Error::Backend`] if any backend call fails.
    /// * [`Error::Pool`] if no decoder could be obtained, e.g. because decoder construction
    ///   failed or the pool has zero capacity.
    /// * [`Error::Layout`] if the buffer size overflows or the allocator returned an unusable
    ///   pitch.
    pub fn video_frames(&mut self, path: impl AsRef<Path>) -> Result<Frames<B::Buffer>> {
        let path = path.as_ref();

        SEQUENCE_LOAD_MS.with(|e| e.observe_duration_millis(|| self.load(path)))
    }

    fn load(&mut self, path: &Path) -> Result<Frames<B::Buffer>> {
        let backend = &self.backend;

        let size = backend
            .video_size(path)
            .map_err(|source| backend_failure("video_size", path, source))?;

        let key = PoolKey::from_dimensions(size.width(), size.height());

        let decoder = self
            .decoders
            .acquire(key, |config| backend.create_decoder(config))?;

        let (row_bytes, rows) = buffer_extent::<T>(&self.layer)?;

        let allocation = backend
            .allocate_pitched(row_bytes, rows)
            .map_err(|source| backend_failure("allocate_pitched", path, source))?;

        let strides = strides_for::<T>(&self.layer, allocation.pitch(), row_bytes)?;
        let layer = self.layer.clone().with_strides(strides);
        let mut buffer = allocation.into_buffer();

        backend
            .read_sequence(decoder, path, &self.plan)
            .map_err(|source| backend_failure("read_sequence", path, source))?;

        backend
            .receive_sequence(decoder, &layer, &mut buffer)
            .map_err(|source| backend_failure("receive_sequence", path, source))?;

        debug!(
            path = %path.display(),
            width = size.width(),
            height = size.height(),
            element = T::NAME,
            stride_n = strides.n,
            stride_c = strides.c,
            stride_y = strides.y,
            stride_x = strides.x,
            "loaded frame sequence"
        );

        Ok(Frames { layer, buffer })
    }

    /// The backend this loader drives.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The layer description applied to every loaded sequence. Strides are not yet set.
    #[must_use]
    pub fn layer(&self) -> &LayerDesc {
        &self.layer
    }

    /// The frames read from every video.
    #[must_use]
    pub fn plan(&self) -> SequencePlan {
        self.plan
    }

    /// The pool of decoders, keyed by packed frame size.
    #[must_use]
    pub fn decoders(&self) -> &KeyedPool<B::Decoder> {
        &self.decoders
    }
}

fn backend_failure(operation: &'static str, path: &Path, source: BackendError) -> Error {
    BACKEND_FAILURES.with(nm::Event::observe_once);
    warn!(operation, path = %path.display(), error = %source, "decode backend call failed");

    Error::Backend { operation, source }
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl<B, T> fmt::Debug for FrameLoader<B, T>
where
    B: DecodeBackend,
    T: LayerElement,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("decoders", &self.decoders)
            .field("layer", &self.layer)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FrameLoader`].
///
/// The defaults are:
///
/// | Setting        | Default                 |
/// |----------------|-------------------------|
/// | `layer`        | [`LayerDesc::default()`]|
/// | `count`        | 4                       |
/// | `start_frame`  | 0                       |
/// | `interval`     | 1                       |
/// | `key_base`     | 0                       |
/// | `max_decoders` | 20                      |
/// | `clear_freq`   | 500                     |
/// | `device_id`    | 0                       |
/// | `log_level`    | [`LogLevel::Error`]     |
#[must_use]
pub struct FrameLoaderBuilder<B, T> {
    backend: B,
    layer: LayerDesc,
    count: NonZero<u16>,
    start_frame: u16,
    interval: NonZero<u16>,
    key_base: u16,
    max_decoders: usize,
    clear_freq: NonZero<u16>,
    device_id: u16,
    log_level: LogLevel,

    _element: PhantomData<fn() -> T>,
}

impl<B, T> FrameLoaderBuilder<B, T>
where
    B: DecodeBackend,
    T: LayerElement,
{
    fn new(backend: B) -> Self {
        Self {
            backend,
            layer: LayerDesc::default(),
            count: DEFAULT_COUNT,
            start_frame: 0,
            interval: DEFAULT_INTERVAL,
            key_base: 0,
            max_decoders: DEFAULT_MAX_DECODERS,
            clear_freq: DEFAULT_CLEAR_FREQ,
            device_id: 0,
            log_level: LogLevel::default(),
            _element: PhantomData,
        }
    }

    /// Sets the description of the output layer.
    pub fn layer(mut self, layer: LayerDesc) -> Self {
        self.layer = layer;
        self
    }

    /// Sets how many frames are read from every video.
    pub fn count(mut self, count: NonZero<u16>) -> Self {
        self.count = count;
        self
    }

    /// Sets the index of the first frame to read.
    pub fn start_frame(mut self, start_frame: u16) -> Self {
        self.start_frame = start_frame;
        self
    }

    /// Sets the distance between consecutive frames that are read.
    pub fn interval(mut self, interval: NonZero<u16>) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the key frame base passed to the backend.
    pub fn key_base(mut self, key_base: u16) -> Self {
        self.key_base = key_base;
        self
    }

    /// Sets how many decoders are kept in the pool at most.
    ///
    /// With zero, every load fails with a pool error.
    pub fn max_decoders(mut self, max_decoders: usize) -> Self {
        self.max_decoders = max_decoders;
        self
    }

    /// Sets how many loads pass between decoder score decays.
    pub fn clear_freq(mut self, clear_freq: NonZero<u16>) -> Self {
        self.clear_freq = clear_freq;
        self
    }

    /// Sets the device decoders are created on.
    pub fn device_id(mut self, device_id: u16) -> Self {
        self.device_id = device_id;
        self
    }

    /// Sets the log level requested from decoders.
    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Builds the loader.
    #[must_use]
    pub fn build(self) -> FrameLoader<B, T> {
        let decoders = KeyedPool::builder()
            .capacity(self.max_decoders)
            .decay_period(self.clear_freq)
            .device_id(self.device_id)
            .log_level(self.log_level)
            .build();

        FrameLoader {
            backend: self.backend,
            decoders,
            layer: self.layer.with_count(self.count),
            plan: SequencePlan::new(
                self.start_frame,
                self.count.get(),
                self.interval.get(),
                self.key_base,
            ),
            _element: PhantomData,
        }
    }
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl<B, T> fmt::Debug for FrameLoaderBuilder<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("layer", &self.layer)
            .field("count", &self.count)
            .field("start_frame", &self.start_frame)
            .field("interval", &self.interval)
            .field("key_base", &self.key_base)
            .field("max_decoders", &self.max_decoders)
            .field("clear_freq", &self.clear_freq)
            .field("device_id", &self.device_id)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}
