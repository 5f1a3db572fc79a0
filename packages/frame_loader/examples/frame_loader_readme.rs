//! Loads frame sequences from a few "videos" with a backend that decodes into host memory.
//!
//! Videos with the same frame size share one decoder; a new size beyond the pool capacity
//! replaces the least useful decoder.

use std::cell::Cell;
use std::path::Path;

use frame_loader::{
    BackendError, DecodeBackend, FrameLoader, LayerDesc, PitchedAllocation, SequencePlan,
    VideoSize,
};
use keyed_pool::ResourceConfig;
use new_zealand::nz;

#[derive(Debug, Default)]
struct HostBackend {
    decoders_created: Cell<u32>,
}

#[derive(Debug)]
struct HostDecoder {
    id: u32,
    frames_requested: u16,
}

impl DecodeBackend for HostBackend {
    type Decoder = HostDecoder;
    type Buffer = Vec<u8>;

    fn video_size(&self, path: &Path) -> Result<VideoSize, BackendError> {
        // The file name encodes the frame size, e.g. "clip_1920x1080.mp4".
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or("video path has no file name")?;

        let (_, size) = stem.rsplit_once('_').ok_or("file name has no frame size")?;
        let (width, height) = size.split_once('x').ok_or("frame size is not WxH")?;

        Ok(VideoSize::new(width.parse()?, height.parse()?))
    }

    fn create_decoder(&self, config: &ResourceConfig) -> Result<HostDecoder, BackendError> {
        let id = self.decoders_created.get();
        self.decoders_created.set(id.wrapping_add(1));

        println!("Creating decoder #{id} on device {}", config.device_id());

        Ok(HostDecoder {
            id,
            frames_requested: 0,
        })
    }

    fn allocate_pitched(
        &self,
        row_bytes: usize,
        rows: usize,
    ) -> Result<PitchedAllocation<Vec<u8>>, BackendError> {
        let pitch = row_bytes.next_multiple_of(512);
        let len = pitch.checked_mul(rows).ok_or("allocation too large")?;

        Ok(PitchedAllocation::new(vec![0; len], pitch))
    }

    fn read_sequence(
        &self,
        decoder: &mut HostDecoder,
        _path: &Path,
        plan: &SequencePlan,
    ) -> Result<(), BackendError> {
        decoder.frames_requested = plan.count();
        Ok(())
    }

    fn receive_sequence(
        &self,
        decoder: &mut HostDecoder,
        _layer: &LayerDesc,
        _buffer: &mut Vec<u8>,
    ) -> Result<(), BackendError> {
        println!(
            "Decoder #{} decoded {} frames",
            decoder.id, decoder.frames_requested
        );
        Ok(())
    }
}

fn main() {
    let layer = LayerDesc::builder()
        .size(224, 224)
        .scale_shorter_side(256)
        .build()
        .unwrap();

    let mut loader = FrameLoader::<_, f32>::builder(HostBackend::default())
        .layer(layer)
        .count(nz!(8))
        .max_decoders(2)
        .build();

    let videos = [
        "beach_1920x1080.mp4",
        "forest_1280x720.mp4",
        "city_1920x1080.mp4",
        "night_640x360.mp4",
        "river_1920x1080.mp4",
    ];

    for video in videos {
        let frames = loader.video_frames(video).unwrap();
        let strides = frames.layer().strides();

        println!(
            "{video}: {} bytes, strides n={} c={} y={} x={}",
            frames.buffer().len(),
            strides.n,
            strides.c,
            strides.y,
            strides.x
        );
    }

    println!(
        "{} decoders created, {} pooled",
        loader.backend().decoders_created.get(),
        loader.decoders().len()
    );
}
