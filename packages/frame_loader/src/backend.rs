use std::path::Path;

use keyed_pool::ResourceConfig;

use crate::LayerDesc;

/// Boxed error produced by a decode backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dimensions of the frames in a video file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VideoSize {
    width: u16,
    height: u16,
}

impl VideoSize {
    /// Creates a video size from frame dimensions in pixels.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }
}

/// Which frames to read from a video file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SequencePlan {
    start_frame: u16,
    count: u16,
    interval: u16,
    key_base: u16,
}

impl SequencePlan {
    pub(crate) const fn new(start_frame: u16, count: u16, interval: u16, key_base: u16) -> Self {
        Self {
            start_frame,
            count,
            interval,
            key_base,
        }
    }

    /// Index of the first frame to read.
    #[must_use]
    pub const fn start_frame(&self) -> u16 {
        self.start_frame
    }

    /// Number of frames to read.
    #[must_use]
    pub const fn count(&self) -> u16 {
        self.count
    }

    /// Distance between consecutive frames that are read.
    #[must_use]
    pub const fn interval(&self) -> u16 {
        self.interval
    }

    /// Key frame base used by the backend to seek.
    #[must_use]
    pub const fn key_base(&self) -> u16 {
        self.key_base
    }
}

/// A pitched 2D allocation in device memory.
///
/// Each row occupies `pitch` bytes, which may be more than requested so that rows start at
/// aligned addresses.
#[derive(Debug)]
pub struct PitchedAllocation<B> {
    buffer: B,
    pitch: usize,
}

impl<B> PitchedAllocation<B> {
    /// Wraps a backend buffer together with the row pitch chosen by the allocator.
    #[must_use]
    pub const fn new(buffer: B, pitch: usize) -> Self {
        Self { buffer, pitch }
    }

    /// Bytes from the start of one row to the start of the next.
    #[must_use]
    pub const fn pitch(&self) -> usize {
        self.pitch
    }

    pub(crate) fn into_buffer(self) -> B {
        self.buffer
    }
}

/// The external decoding engine that the frame loader drives.
///
/// Decoders are expensive, so the loader keeps a pool of them and reuses a decoder for every
/// video with the same frame size. Everything else (memory allocation and the actual decode)
/// is delegated to the backend unchanged.
#[cfg_attr(test, mockall::automock(type Decoder = u32; type Buffer = Vec<u8>;))]
pub trait DecodeBackend {
    /// A decoder instance bound to a device.
    type Decoder;

    /// Device memory that receives decoded frames.
    type Buffer;

    /// Reads the frame dimensions of a video file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a supported video.
    fn video_size(&self, path: &Path) -> Result<VideoSize, BackendError>;

    /// Creates a new decoder. Called only when no suitable decoder is pooled.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder cannot be created, e.g. when the device is out of
    /// memory.
    fn create_decoder(&self, config: &ResourceConfig) -> Result<Self::Decoder, BackendError>;

    /// Allocates `rows` rows of at least `row_bytes` bytes each.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot satisfy the allocation.
    fn allocate_pitched(
        &self,
        row_bytes: usize,
        rows: usize,
    ) -> Result<PitchedAllocation<Self::Buffer>, BackendError>;

    /// Starts reading the planned frames from a video file.
    ///
    /// # Errors
    ///
    /// Returns an error if the read cannot be started.
    fn read_sequence(
        &self,
        decoder: &mut Self::Decoder,
        path: &Path,
        plan: &SequencePlan,
    ) -> Result<(), BackendError>;

    /// Decodes the sequence started by [`read_sequence()`][Self::read_sequence] into the
    /// buffer, laid out as described by `layer`. Blocks until the sequence is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    fn receive_sequence(
        &self,
        decoder: &mut Self::Decoder,
        layer: &LayerDesc,
        buffer: &mut Self::Buffer,
    ) -> Result<(), BackendError>;
}
