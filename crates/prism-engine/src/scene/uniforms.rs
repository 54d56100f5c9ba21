use crate::math::{Mat4, Vec2};

/// Near-plane transparency parameters (revision 2 scene block).
///
/// `start`/`end` are view depths. Fragments nearer than `end` fade out linearly
/// and are fully transparent at `start`. `reserved` is carried to the GPU as is.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NearTransparency {
    pub start: f32,
    pub end: f32,
    pub reserved: [f32; 2],
}

impl NearTransparency {
    pub const DISABLED: Self = Self { start: 0.0, end: 0.0, reserved: [2.0, 2.0] };

    #[inline]
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end, reserved: Self::DISABLED.reserved }
    }

    #[inline]
    pub const fn from_array(v: [f32; 4]) -> Self {
        Self { start: v[0], end: v[1], reserved: [v[2], v[3]] }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.start, self.end, self.reserved[0], self.reserved[1]]
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.end > self.start
    }

    /// Alpha multiplier in `[0, 1]` for a fragment at view depth `depth`.
    pub fn fade(&self, depth: f32) -> f32 {
        if !self.is_enabled() {
            return 1.0;
        }
        ((depth - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }
}

impl Default for NearTransparency {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Per-frame scene values, written once at frame start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scene {
    /// Seconds since the clock started.
    pub elapsed_time: f32,
    pub wind_direction: f32,
    /// Pointer position in normalized view coordinates.
    pub touch_position: Vec2,
    pub projection: Mat4,
    pub view: Mat4,
    pub near_transparency: NearTransparency,
}

impl Scene {
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            elapsed_time: 0.0,
            wind_direction: 0.0,
            touch_position: Vec2::ZERO,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            near_transparency: NearTransparency::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_near_transparency_is_disabled() {
        let n = NearTransparency::default();
        assert_eq!(n.to_array(), [0.0, 0.0, 2.0, 2.0]);
        assert!(!n.is_enabled());
        assert_eq!(n.fade(0.0), 1.0);
        assert_eq!(n.fade(0.5), 1.0);
    }

    #[test]
    fn near_fade_is_linear_inside_the_range() {
        let n = NearTransparency::new(1.0, 3.0);
        assert_eq!(n.fade(0.5), 0.0);
        assert_eq!(n.fade(1.0), 0.0);
        assert_eq!(n.fade(2.0), 0.5);
        assert_eq!(n.fade(3.0), 1.0);
        assert_eq!(n.fade(10.0), 1.0);
    }

    #[test]
    fn array_round_trip_keeps_reserved_lanes() {
        let v = [0.5, 1.5, 7.0, 9.0];
        assert_eq!(NearTransparency::from_array(v).to_array(), v);
    }
}
