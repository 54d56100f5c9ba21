use super::NormalizedSrgba;
use super::transfer::normalized_srgb_to_linear_rgb;

/// Linear RGBA color with straight (non-premultiplied) alpha.
///
/// All lighting math runs on this type. Conversion to sRGB happens only where a
/// value is written to a display- or storage-referred target.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LinearRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearRgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    #[inline]
    pub const fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// RGB multiplied by alpha; alpha unchanged.
    #[inline]
    pub fn premultiplied(self) -> Self {
        Self::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Quantizes to 8 bits per channel, packed `r | g << 8 | b << 16 | a << 24`.
    ///
    /// The value is stored as-is (no transfer function); channels are clamped to `[0, 1]`.
    #[inline]
    pub fn to_rgba8(self) -> u32 {
        pack_rgba8(self.to_array())
    }

    /// Quantizes to 16 bits per channel, packed ABGR (`a` in the top 16 bits),
    /// the memory order of an `rgba16Unorm` texel.
    #[inline]
    pub fn to_rgba16(self) -> u64 {
        pack_rgba16(self.to_array())
    }

    /// Inverse of [`LinearRgba::to_rgba8`].
    #[inline]
    pub fn from_rgba8(packed: u32) -> Self {
        Self::from_array(unpack_rgba8(packed))
    }
}

impl From<NormalizedSrgba> for LinearRgba {
    #[inline]
    fn from(c: NormalizedSrgba) -> Self {
        Self::from_array(normalized_srgb_to_linear_rgb(c.to_array()))
    }
}

#[inline]
fn quantize(c: f32, max: f32) -> f32 {
    (c.clamp(0.0, 1.0) * max).round()
}

pub(super) fn pack_rgba8(c: [f32; 4]) -> u32 {
    let q = |i: usize| quantize(c[i], 255.0) as u32;
    q(3) << 24 | q(2) << 16 | q(1) << 8 | q(0)
}

pub(super) fn unpack_rgba8(p: u32) -> [f32; 4] {
    let ch = |shift: u32| ((p >> shift) & 0xFF) as f32 / 255.0;
    [ch(0), ch(8), ch(16), ch(24)]
}

pub(super) fn pack_rgba16(c: [f32; 4]) -> u64 {
    let q = |i: usize| quantize(c[i], 65535.0) as u64;
    q(3) << 48 | q(2) << 32 | q(1) << 16 | q(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_byte_order_is_rgba_in_memory() {
        let p = LinearRgba::new(1.0, 0.0, 0.0, 1.0).to_rgba8();
        assert_eq!(p, 0xFF00_00FF);
        assert_eq!(p.to_le_bytes(), [0xFF, 0x00, 0x00, 0xFF]);
        let p = LinearRgba::new(0.0, 1.0, 0.5, 0.0).to_rgba8();
        assert_eq!(p.to_le_bytes(), [0x00, 0xFF, 0x80, 0x00]);
    }

    #[test]
    fn rgba16_packs_abgr() {
        let p = LinearRgba::new(1.0, 0.0, 0.0, 0.5).to_rgba16();
        assert_eq!(p & 0xFFFF, 0xFFFF);
        assert_eq!(p >> 48, 32768);
    }

    #[test]
    fn packing_clamps_out_of_range_channels() {
        let p = LinearRgba::new(-0.5, 2.0, 0.0, 1.0).to_rgba8();
        assert_eq!(p.to_le_bytes(), [0x00, 0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn rgba8_round_trip_within_one_step() {
        let c = LinearRgba::new(0.1, 0.5, 0.9, 0.25);
        let back = LinearRgba::from_rgba8(c.to_rgba8());
        for (a, b) in c.to_array().iter().zip(back.to_array()) {
            assert!((a - b).abs() <= 0.5 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn premultiplied_scales_rgb_only() {
        let c = LinearRgba::new(0.8, 0.4, 0.2, 0.5).premultiplied();
        assert_eq!(c, LinearRgba::new(0.4, 0.2, 0.1, 0.5));
    }
}
