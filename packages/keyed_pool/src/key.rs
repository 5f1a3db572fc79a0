use std::fmt;

/// Identifies the "shape" of a pooled resource.
///
/// Two requests that can be served by interchangeable resources must derive the same key. The
/// pool treats the key as an opaque integer; how it is derived is up to the caller.
///
/// # Example
///
/// ```
/// use keyed_pool::PoolKey;
///
/// let key = PoolKey::from_dimensions(1920, 1080);
///
/// assert_eq!(key.get(), (1920 << 16) | 1080);
/// assert_eq!(key, PoolKey::new((1920 << 16) | 1080));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PoolKey(u32);

impl PoolKey {
    /// Wraps a caller-derived integer as a pool key.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Packs a width and height into a single key as `(width << 16) | height`.
    ///
    /// Every distinct `(width, height)` pair yields a distinct key.
    #[must_use]
    #[expect(
        clippy::cast_lossless,
        reason = "u16 to u32 is lossless and From is not usable in const fn"
    )]
    pub const fn from_dimensions(width: u16, height: u16) -> Self {
        Self(((width as u32) << 16) | (height as u32))
    }

    /// The raw integer value of the key.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for PoolKey {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<PoolKey> for u32 {
    fn from(key: PoolKey) -> Self {
        key.0
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
