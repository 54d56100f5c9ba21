//! Piecewise sRGB transfer function (IEC 61966-2-1).
//!
//! Both directions are odd functions (`f(-c) == -f(c)`), so extended-range
//! wide-gamut values below zero survive a round trip.

/// Linear values at or below this use the linear segment when encoding.
const LINEAR_CUTOFF: f32 = 0.003_130_8;
/// Encoded values at or below this use the linear segment when decoding.
const ENCODED_CUTOFF: f32 = 0.040_45;
const LINEAR_SLOPE: f32 = 12.92;
const GAMMA: f32 = 2.4;
const OFFSET: f32 = 0.055;
const SCALE: f32 = 1.055;

/// Encodes one linear channel to normalized sRGB.
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    let a = c.abs();
    let e = if a <= LINEAR_CUTOFF {
        a * LINEAR_SLOPE
    } else {
        SCALE * a.powf(1.0 / GAMMA) - OFFSET
    };
    e.copysign(c)
}

/// Decodes one normalized sRGB channel to linear.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    let a = c.abs();
    let l = if a <= ENCODED_CUTOFF {
        a / LINEAR_SLOPE
    } else {
        ((a + OFFSET) / SCALE).powf(GAMMA)
    };
    l.copysign(c)
}

/// Converts linear RGB to normalized sRGB. Alpha is passed through unchanged.
#[inline]
pub fn linear_rgb_to_normalized_srgb(c: [f32; 4]) -> [f32; 4] {
    [linear_to_srgb(c[0]), linear_to_srgb(c[1]), linear_to_srgb(c[2]), c[3]]
}

/// Converts normalized sRGB to linear RGB. Alpha is passed through unchanged.
#[inline]
pub fn normalized_srgb_to_linear_rgb(c: [f32; 4]) -> [f32; 4] {
    [srgb_to_linear(c[0]), srgb_to_linear(c[1]), srgb_to_linear(c[2]), c[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_TRIP_EPS: f32 = 1e-5;

    /// 0, 1/64, …, 1; crosses both linear-segment cutoffs.
    fn grid() -> impl Iterator<Item = f32> {
        (0..=64).map(|i| i as f32 / 64.0).chain([0.0031308, 0.04045, 1e-6])
    }

    #[test]
    fn reference_values() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        // Mid grey: sRGB 0.5 is ~21.4% linear.
        assert!((srgb_to_linear(0.5) - 0.214_041).abs() < 1e-5);
        assert!((linear_to_srgb(0.214_041) - 0.5).abs() < 1e-5);
        // Linear segment.
        assert!((linear_to_srgb(0.001) - 0.012_92).abs() < 1e-7);
    }

    #[test]
    fn srgb_to_linear_to_srgb_round_trips() {
        for r in grid() {
            for g in [0.0, 0.3, 1.0] {
                let c = [r, g, 1.0 - r, r * 0.5];
                let back = linear_rgb_to_normalized_srgb(normalized_srgb_to_linear_rgb(c));
                for (a, b) in c.iter().zip(back) {
                    assert!((a - b).abs() <= ROUND_TRIP_EPS, "{c:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn linear_to_srgb_to_linear_round_trips() {
        for r in grid() {
            let c = [r, 1.0 - r, 0.5, 1.0 - r];
            let back = normalized_srgb_to_linear_rgb(linear_rgb_to_normalized_srgb(c));
            for (a, b) in c.iter().zip(back) {
                assert!((a - b).abs() <= ROUND_TRIP_EPS, "{c:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn alpha_is_untouched() {
        let c = linear_rgb_to_normalized_srgb([0.2, 0.4, 0.6, 0.33]);
        assert_eq!(c[3], 0.33);
        let c = normalized_srgb_to_linear_rgb([0.2, 0.4, 0.6, 0.77]);
        assert_eq!(c[3], 0.77);
    }

    #[test]
    fn negative_values_are_mirrored() {
        assert_eq!(linear_to_srgb(-0.5), -linear_to_srgb(0.5));
        assert_eq!(srgb_to_linear(-0.5), -srgb_to_linear(0.5));
    }

    #[test]
    fn encoding_is_strictly_monotonic() {
        let mut last = linear_to_srgb(0.0);
        for i in 1..=1000 {
            let e = linear_to_srgb(i as f32 / 1000.0);
            assert!(e > last);
            last = e;
        }
    }
}
