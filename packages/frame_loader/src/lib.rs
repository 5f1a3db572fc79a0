#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Loads sequences of decoded video frames into pitched device buffers.
//!
//! The decoding itself is done by an external engine, exposed to this crate through the
//! [`DecodeBackend`] trait. This crate takes care of the parts around it:
//!
//! * Decoders are expensive, so a [`keyed_pool::KeyedPool`] keeps up to a configured number of
//!   them, one per video frame size. Videos with the same frame size reuse the same decoder.
//! * The output tensor is described by a [`LayerDesc`]: crop, scale, color space and
//!   normalization.
//! * The output buffer is a pitched 2D allocation. Its strides depend on the pitch chosen by
//!   the allocator and are filled into the layer description of every loaded sequence.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use frame_loader::{
//!     BackendError, DecodeBackend, FrameLoader, LayerDesc, PitchedAllocation, SequencePlan,
//!     VideoSize,
//! };
//! use keyed_pool::ResourceConfig;
//! use new_zealand::nz;
//!
//! /// Decodes nothing, but allocates like a device would: rows padded to 512 bytes.
//! struct HostBackend;
//!
//! impl DecodeBackend for HostBackend {
//!     type Decoder = ();
//!     type Buffer = Vec<u8>;
//!
//!     fn video_size(&self, _path: &Path) -> Result<VideoSize, BackendError> {
//!         Ok(VideoSize::new(1920, 1080))
//!     }
//!
//!     fn create_decoder(&self, _config: &ResourceConfig) -> Result<(), BackendError> {
//!         Ok(())
//!     }
//!
//!     fn allocate_pitched(
//!         &self,
//!         row_bytes: usize,
//!         rows: usize,
//!     ) -> Result<PitchedAllocation<Vec<u8>>, BackendError> {
//!         let pitch = row_bytes.next_multiple_of(512);
//!         Ok(PitchedAllocation::new(vec![0; pitch * rows], pitch))
//!     }
//!
//!     fn read_sequence(&self, _: &mut (), _: &Path, _: &SequencePlan) -> Result<(), BackendError> {
//!         Ok(())
//!     }
//!
//!     fn receive_sequence(
//!         &self,
//!         _: &mut (),
//!         _: &LayerDesc,
//!         _: &mut Vec<u8>,
//!     ) -> Result<(), BackendError> {
//!         Ok(())
//!     }
//! }
//!
//! let layer = LayerDesc::builder().size(224, 224).build().unwrap();
//!
//! let mut loader = FrameLoader::<_, f32>::builder(HostBackend)
//!     .layer(layer)
//!     .count(nz!(8))
//!     .max_decoders(4)
//!     .build();
//!
//! let frames = loader.video_frames("/data/clip.mp4").unwrap();
//!
//! // 224 f32 values take 896 bytes, padded to a 1024 byte pitch.
//! assert_eq!(frames.layer().strides().y, 256);
//! assert_eq!(frames.layer().strides().n, 256 * 224 * 3);
//! ```
//!
//! A longer walkthrough that mixes frame sizes is in `examples/frame_loader_readme.rs`.

mod backend;
mod element;
mod error;
mod layer;
mod layout;
mod loader;
mod metrics;

pub use backend::*;
pub use element::*;
pub use error::*;
pub use layer::*;
pub use loader::*;
