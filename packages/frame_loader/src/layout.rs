//! Sizing of the pitched buffer that receives a decoded sequence.
//!
//! The buffer is one pitched 2D allocation: every row holds `width` elements and there is
//! one row per line of every plane of every crop of every frame. The pitch is chosen by the
//! allocator and determines the strides.

use crate::{Error, LayerDesc, LayerElement, Result, Strides};

/// Planes allocated per frame. Fixed at 3 regardless of color space.
const ALLOCATED_PLANES: usize = 3;

/// The size to request from the allocator, as `(row_bytes, rows)`.
pub(crate) fn buffer_extent<T: LayerElement>(layer: &LayerDesc) -> Result<(usize, usize)> {
    let row_bytes = usize::from(layer.width())
        .checked_mul(size_of::<T>())
        .ok_or_else(|| overflow(layer))?;

    let rows = usize::from(layer.height())
        .checked_mul(usize::from(layer.count()))
        .and_then(|rows| rows.checked_mul(usize::from(layer.test_crops().get())))
        .and_then(|rows| rows.checked_mul(ALLOCATED_PLANES))
        .ok_or_else(|| overflow(layer))?;

    Ok((row_bytes, rows))
}

/// Element strides for a buffer allocated with the given pitch (in bytes).
pub(crate) fn strides_for<T: LayerElement>(
    layer: &LayerDesc,
    pitch: usize,
    row_bytes: usize,
) -> Result<Strides> {
    if pitch < row_bytes {
        return Err(Error::Layout {
            problem: format!("pitch of {pitch} bytes is smaller than the {row_bytes} byte row"),
        });
    }

    let element_size = size_of::<T>();

    if pitch % element_size != 0 {
        return Err(Error::Layout {
            problem: format!(
                "pitch of {pitch} bytes is not a multiple of the {element_size} byte {} element",
                T::NAME
            ),
        });
    }

    let y = pitch / element_size;

    let c = y
        .checked_mul(usize::from(layer.height()))
        .ok_or_else(|| overflow(layer))?;

    let n = c
        .checked_mul(usize::from(layer.channels()))
        .ok_or_else(|| overflow(layer))?;

    Ok(Strides { n, c, y, x: 1 })
}

fn overflow(layer: &LayerDesc) -> Error {
    Error::Layout {
        problem: format!(
            "buffer for {} frames of {}x{} with {} crops does not fit in the address space",
            layer.count(),
            layer.width(),
            layer.height(),
            layer.test_crops()
        ),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;

    use super::*;

    fn layer(width: u16, height: u16, count: u16) -> LayerDesc {
        LayerDesc::builder()
            .size(width, height)
            .scale_shorter_side(0)
            .build()
            .unwrap()
            .with_count(std::num::NonZero::new(count).unwrap())
    }

    #[test]
    fn extent_scales_with_element_size() {
        let layer = layer(224, 224, 4);

        assert_eq!(buffer_extent::<u8>(&layer).unwrap(), (224, 224 * 4 * 3));
        assert_eq!(buffer_extent::<f32>(&layer).unwrap(), (896, 224 * 4 * 3));
        assert_eq!(buffer_extent::<f64>(&layer).unwrap(), (1792, 224 * 4 * 3));
    }

    #[test]
    fn extent_includes_test_crops() {
        let layer = LayerDesc::builder()
            .test_crops(nz!(5))
            .build()
            .unwrap()
            .with_count(nz!(2));

        assert_eq!(buffer_extent::<u8>(&layer).unwrap().1, 224 * 2 * 5 * 3);
    }

    #[test]
    fn strides_follow_pitch() {
        let layer = layer(224, 100, 4);

        // 224 f32 = 896 bytes, padded to 1024.
        let strides = strides_for::<f32>(&layer, 1024, 896).unwrap();

        assert_eq!(strides.x, 1);
        assert_eq!(strides.y, 256);
        assert_eq!(strides.c, 256 * 100);
        assert_eq!(strides.n, 256 * 100 * 3);
    }

    #[test]
    fn exact_pitch_is_accepted() {
        let layer = layer(10, 10, 1);

        let strides = strides_for::<u16>(&layer, 20, 20).unwrap();

        assert_eq!(strides.y, 10);
    }

    #[test]
    fn short_pitch_is_rejected() {
        let layer = layer(224, 224, 1);

        assert!(matches!(
            strides_for::<f32>(&layer, 512, 896),
            Err(Error::Layout { .. })
        ));
    }

    #[test]
    fn misaligned_pitch_is_rejected() {
        let layer = layer(3, 3, 1);

        assert!(matches!(
            strides_for::<f32>(&layer, 14, 12),
            Err(Error::Layout { .. })
        ));
    }
}
