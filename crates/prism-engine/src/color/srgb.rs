use super::LinearRgba;
use super::linear::pack_rgba8;
use super::transfer::linear_rgb_to_normalized_srgb;

/// sRGB-encoded color with alpha; every channel normalized to `[0, 1]`.
///
/// This is the display- and storage-referred representation (e.g. the bytes of an
/// `Rgba8UnormSrgb` texel). Do not do lighting math on it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct NormalizedSrgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl NormalizedSrgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// From straight 8-bit sRGB channels, e.g. a hex color literal.
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Packed `r | g << 8 | b << 16 | a << 24` of the encoded values.
    #[inline]
    pub fn to_rgba8(self) -> u32 {
        pack_rgba8(self.to_array())
    }
}

impl From<LinearRgba> for NormalizedSrgba {
    #[inline]
    fn from(c: LinearRgba) -> Self {
        Self::from_array(linear_rgb_to_normalized_srgb(c.to_array()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_round_trip_through_types() {
        let lin = LinearRgba::new(0.05, 0.5, 0.95, 0.4);
        let srgb = NormalizedSrgba::from(lin);
        let back = LinearRgba::from(srgb);
        for (a, b) in lin.to_array().iter().zip(back.to_array()) {
            assert!((a - b).abs() < 1e-5);
        }
        assert_eq!(srgb.a, 0.4);
    }

    #[test]
    fn srgb_bytes_decode_to_expected_linear() {
        // #808080 is ~21.6% linear.
        let grey = LinearRgba::from(NormalizedSrgba::from_srgb_u8(128, 128, 128, 255));
        assert!((grey.r - 0.2158605).abs() < 1e-5);
        assert_eq!(grey.a, 1.0);
    }
}
