use std::num::NonZero;

use new_zealand::nz;

use crate::{Error, Result};

/// Color space of the decoded output.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ColorSpace {
    /// Red, green and blue planes. This is the default.
    #[default]
    Rgb,

    /// Luma and two chroma planes.
    YCbCr,
}

impl ColorSpace {
    /// The number of planes a frame occupies in this color space.
    #[must_use]
    pub const fn channels(self) -> u16 {
        match self {
            Self::Rgb | Self::YCbCr => 3,
        }
    }
}

/// How subsampled chroma planes are brought up to full resolution.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ChromaUpMethod {
    /// Bilinear interpolation. This is the default.
    #[default]
    Linear,
}

/// How frames are resampled to the scaled size.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ScaleMethod {
    /// Nearest neighbor sampling.
    Nearest,

    /// Bilinear interpolation. This is the default.
    #[default]
    Linear,
}

/// One value per color channel, used for normalization parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct ChannelValues {
    /// First channel (red in RGB).
    pub r: f32,
    /// Second channel (green in RGB).
    pub g: f32,
    /// Third channel (blue in RGB).
    pub b: f32,
}

impl ChannelValues {
    /// Creates a triple from per-channel values.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Uses the same value for every channel.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    fn any_zero(&self) -> bool {
        [self.r, self.g, self.b].iter().any(|v| *v == 0.0)
    }
}

/// Element strides of an NCHW buffer. All values are in elements, not bytes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct Strides {
    /// Distance between consecutive frames.
    pub n: usize,
    /// Distance between consecutive channel planes.
    pub c: usize,
    /// Distance between consecutive rows.
    pub y: usize,
    /// Distance between consecutive pixels in a row.
    pub x: usize,
}

/// Describes the tensor a frame sequence is decoded into: crop, scale, color space,
/// normalization and memory layout. Only the NCHW layout is supported.
///
/// Strides start out as zero and are filled in by the loader once the pitched buffer has
/// been allocated, because they depend on the pitch chosen by the allocator.
///
/// # Example
///
/// ```
/// use frame_loader::{ColorSpace, LayerDesc};
///
/// let layer = LayerDesc::builder()
///     .size(112, 112)
///     .color_space(ColorSpace::YCbCr)
///     .horiz_flip(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(layer.channels(), 3);
/// assert_eq!(layer.scale_shorter_side(), 256);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LayerDesc {
    count: u16,
    width: u16,
    height: u16,
    scale_width: u16,
    scale_height: u16,
    scale_shorter_side: u16,
    crop_x: u16,
    crop_y: u16,
    test_crops: NonZero<u16>,
    mean: ChannelValues,
    std: ChannelValues,
    center_crop: bool,
    normalized: bool,
    horiz_flip: bool,
    color_space: ColorSpace,
    chroma_up_method: ChromaUpMethod,
    scale_method: ScaleMethod,
    strides: Strides,
}

impl LayerDesc {
    /// Starts describing a layer. See [`LayerDescBuilder`] for the defaults.
    pub fn builder() -> LayerDescBuilder {
        LayerDescBuilder::new()
    }

    /// Number of frames in the sequence.
    #[must_use]
    pub const fn count(&self) -> u16 {
        self.count
    }

    /// Number of channel planes per frame.
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.color_space.channels()
    }

    /// Output width in pixels, after cropping.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Output height in pixels, after cropping.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Width to scale to before cropping. Zero means derived from the shorter side.
    #[must_use]
    pub const fn scale_width(&self) -> u16 {
        self.scale_width
    }

    /// Height to scale to before cropping. Zero means derived from the shorter side.
    #[must_use]
    pub const fn scale_height(&self) -> u16 {
        self.scale_height
    }

    /// Length the shorter frame side is scaled to, preserving aspect ratio.
    #[must_use]
    pub const fn scale_shorter_side(&self) -> u16 {
        self.scale_shorter_side
    }

    /// Horizontal crop offset. Ignored when center cropping.
    #[must_use]
    pub const fn crop_x(&self) -> u16 {
        self.crop_x
    }

    /// Vertical crop offset. Ignored when center cropping.
    #[must_use]
    pub const fn crop_y(&self) -> u16 {
        self.crop_y
    }

    /// Number of crops taken from every frame.
    #[must_use]
    pub const fn test_crops(&self) -> NonZero<u16> {
        self.test_crops
    }

    /// Per-channel mean subtracted during normalization.
    #[must_use]
    pub const fn mean(&self) -> ChannelValues {
        self.mean
    }

    /// Per-channel standard deviation divided out during normalization.
    #[must_use]
    pub const fn std(&self) -> ChannelValues {
        self.std
    }

    /// Whether the crop window is centered instead of placed at the crop offsets.
    #[must_use]
    pub const fn center_crop(&self) -> bool {
        self.center_crop
    }

    /// Whether values are normalized with the mean and standard deviation.
    #[must_use]
    pub const fn normalized(&self) -> bool {
        self.normalized
    }

    /// Whether frames are mirrored horizontally.
    #[must_use]
    pub const fn horiz_flip(&self) -> bool {
        self.horiz_flip
    }

    /// Output color space.
    #[must_use]
    pub const fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Chroma upsampling method.
    #[must_use]
    pub const fn chroma_up_method(&self) -> ChromaUpMethod {
        self.chroma_up_method
    }

    /// Scaling method.
    #[must_use]
    pub const fn scale_method(&self) -> ScaleMethod {
        self.scale_method
    }

    /// Buffer strides. Zero until the layer has been bound to an allocated buffer.
    #[must_use]
    pub const fn strides(&self) -> Strides {
        self.strides
    }

    pub(crate) fn with_count(mut self, count: NonZero<u16>) -> Self {
        self.count = count.get();
        self
    }

    pub(crate) fn with_strides(mut self, strides: Strides) -> Self {
        self.strides = strides;
        self
    }
}

/// Builder for [`LayerDesc`].
///
/// The defaults describe a normalized 224x224 RGB center crop from frames whose shorter side
/// is scaled to 256 pixels:
///
/// | Setting              | Default                 |
/// |----------------------|-------------------------|
/// | `size`               | 224 x 224               |
/// | `scale_size`         | 0 x 0 (not fixed)       |
/// | `scale_shorter_side` | 256                     |
/// | `crop_offset`        | 0, 0                    |
/// | `test_crops`         | 1                       |
/// | `mean`               | 0.5 per channel         |
/// | `std`                | 1.0 per channel         |
/// | `center_crop`        | true                    |
/// | `normalized`         | true                    |
/// | `horiz_flip`         | false                   |
/// | `color_space`        | [`ColorSpace::Rgb`]     |
/// | `chroma_up_method`   | [`ChromaUpMethod::Linear`] |
/// | `scale_method`       | [`ScaleMethod::Linear`] |
#[derive(Clone, Debug)]
#[must_use]
pub struct LayerDescBuilder {
    layer: LayerDesc,
}

impl LayerDescBuilder {
    fn new() -> Self {
        Self {
            layer: LayerDesc {
                count: 0,
                width: 224,
                height: 224,
                scale_width: 0,
                scale_height: 0,
                scale_shorter_side: 256,
                crop_x: 0,
                crop_y: 0,
                test_crops: nz!(1),
                mean: ChannelValues::splat(0.5),
                std: ChannelValues::splat(1.0),
                center_crop: true,
                normalized: true,
                horiz_flip: false,
                color_space: ColorSpace::default(),
                chroma_up_method: ChromaUpMethod::default(),
                scale_method: ScaleMethod::default(),
                strides: Strides::default(),
            },
        }
    }

    /// Sets the output width and height, after cropping.
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.layer.width = width;
        self.layer.height = height;
        self
    }

    /// Scales frames to exactly this size before cropping. Zero in either dimension means
    /// the size is derived from [`scale_shorter_side()`][Self::scale_shorter_side].
    pub fn scale_size(mut self, width: u16, height: u16) -> Self {
        self.layer.scale_width = width;
        self.layer.scale_height = height;
        self
    }

    /// Scales the shorter frame side to this length before cropping.
    pub fn scale_shorter_side(mut self, length: u16) -> Self {
        self.layer.scale_shorter_side = length;
        self
    }

    /// Places the crop window at this offset. Only used when center cropping is off.
    pub fn crop_offset(mut self, x: u16, y: u16) -> Self {
        self.layer.crop_x = x;
        self.layer.crop_y = y;
        self
    }

    /// Sets how many crops are taken from every frame.
    pub fn test_crops(mut self, test_crops: NonZero<u16>) -> Self {
        self.layer.test_crops = test_crops;
        self
    }

    /// Sets the per-channel mean subtracted during normalization.
    pub fn mean(mut self, mean: ChannelValues) -> Self {
        self.layer.mean = mean;
        self
    }

    /// Sets the per-channel standard deviation divided out during normalization.
    pub fn std(mut self, std: ChannelValues) -> Self {
        self.layer.std = std;
        self
    }

    /// Whether to center the crop window.
    pub fn center_crop(mut self, center_crop: bool) -> Self {
        self.layer.center_crop = center_crop;
        self
    }

    /// Whether to normalize values with the mean and standard deviation.
    pub fn normalized(mut self, normalized: bool) -> Self {
        self.layer.normalized = normalized;
        self
    }

    /// Whether to mirror frames horizontally.
    pub fn horiz_flip(mut self, horiz_flip: bool) -> Self {
        self.layer.horiz_flip = horiz_flip;
        self
    }

    /// Sets the output color space.
    pub fn color_space(mut self, color_space: ColorSpace) -> Self {
        self.layer.color_space = color_space;
        self
    }

    /// Sets the chroma upsampling method.
    pub fn chroma_up_method(mut self, chroma_up_method: ChromaUpMethod) -> Self {
        self.layer.chroma_up_method = chroma_up_method;
        self
    }

    /// Sets the scaling method.
    pub fn scale_method(mut self, scale_method: ScaleMethod) -> Self {
        self.layer.scale_method = scale_method;
        self
    }

    /// Validates the description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayer`] if:
    ///
    /// * the output width or height is zero;
    /// * normalization is on and a standard deviation component is zero;
    /// * the crop window does not fit inside a fixed scale size;
    /// * only the shorter side is scaled and even the smaller extent of the crop window is
    ///   longer than that side.
    ///
    /// Which frame side is shorter depends on the video, so the larger extent of the crop
    /// window is only checked once the frame size is known.
    pub fn build(self) -> Result<LayerDesc> {
        let layer = self.layer;

        if layer.width == 0 || layer.height == 0 {
            return Err(invalid(format!(
                "output size {}x{} has a zero dimension",
                layer.width, layer.height
            )));
        }

        if layer.normalized && layer.std.any_zero() {
            return Err(invalid(format!(
                "normalization requires a non-zero standard deviation, got {:?}",
                layer.std
            )));
        }

        let (crop_x, crop_y) = if layer.center_crop {
            (0, 0)
        } else {
            (layer.crop_x, layer.crop_y)
        };

        let crop_right = u32::from(crop_x) + u32::from(layer.width);
        let crop_bottom = u32::from(crop_y) + u32::from(layer.height);

        if layer.scale_width != 0 && layer.scale_height != 0 {
            if crop_right > u32::from(layer.scale_width)
                || crop_bottom > u32::from(layer.scale_height)
            {
                return Err(invalid(format!(
                    "crop window ending at {crop_right}x{crop_bottom} does not fit in scale size {}x{}",
                    layer.scale_width, layer.scale_height
                )));
            }
        } else if layer.scale_shorter_side != 0
            && crop_right.min(crop_bottom) > u32::from(layer.scale_shorter_side)
        {
            return Err(invalid(format!(
                "crop window ending at {crop_right}x{crop_bottom} exceeds shorter side length {} both ways",
                layer.scale_shorter_side
            )));
        }

        Ok(layer)
    }
}

fn invalid(problem: String) -> Error {
    Error::InvalidLayer { problem }
}

impl Default for LayerDesc {
    fn default() -> Self {
        // The defaults are known to be valid.
        LayerDescBuilder::new().layer
    }
}
