/// Numeric type of the values in a decoded layer.
///
/// Implemented for the element types the decode backends support.
pub trait LayerElement: Copy + Send + Sync + 'static {
    /// Short name of the type, used in diagnostics.
    const NAME: &'static str;
}

impl LayerElement for u8 {
    const NAME: &'static str = "u8";
}

impl LayerElement for u16 {
    const NAME: &'static str = "u16";
}

impl LayerElement for f32 {
    const NAME: &'static str = "f32";
}

impl LayerElement for f64 {
    const NAME: &'static str = "f64";
}
