/// RGB clear color. Alpha is always written as fully opaque.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Neutral dark grey used as the default frame background.
    #[inline]
    pub const fn background() -> Self {
        Self::new(0.2, 0.2, 0.2)
    }
}
