use core::ops::Mul;

use super::{Mat4, Quat, Vec3};

/// Relative tolerance for treating a scale as uniform.
const UNIFORM_SCALE_EPS: f32 = 1e-5;

/// Scale, then rotate, then translate.
///
/// `apply(v) = position + rotation.rotate(v * scale)`. The order is the coordinate
/// convention of every instance in the system and must not be permuted.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    /// Must be a unit quaternion.
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
    };

    #[inline]
    pub const fn new(position: Vec3, scale: Vec3, rotation: Quat) -> Self {
        Self { position, scale, rotation }
    }

    #[inline]
    pub const fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    #[inline]
    pub const fn from_position_scale(position: Vec3, scale: f32) -> Self {
        Self { position, scale: Vec3::splat(scale), rotation: Quat::IDENTITY }
    }

    /// Builds a transform from a rigid matrix (translation + rotation, scale assumed 1).
    pub fn from_rigid_mat4(m: &Mat4) -> Self {
        let t = m.cols[3];
        Self {
            position: Vec3::new(t[0], t[1], t[2]),
            scale: Vec3::ONE,
            rotation: Quat::from_rotation_mat4(m),
        }
    }

    /// Decomposes an affine matrix into scale, rotation and translation.
    ///
    /// Scale is taken from the lengths of the first three columns, the rotation
    /// from the columns once that scale is divided out. A mirroring matrix keeps
    /// a proper rotation and carries the reflection as a negative `scale.x`.
    /// Returns `None` when a column has zero length. Shear is not representable
    /// and is lost.
    pub fn from_mat4(m: &Mat4) -> Option<Self> {
        let axis = |i: usize| {
            let c = m.cols[i];
            Vec3::new(c[0], c[1], c[2])
        };
        let (x, y, z) = (axis(0), axis(1), axis(2));
        let mut scale = Vec3::new(x.length(), y.length(), z.length());
        if scale.x <= f32::EPSILON || scale.y <= f32::EPSILON || scale.z <= f32::EPSILON {
            return None;
        }

        let mut x = x / scale.x;
        let (y, z) = (y / scale.y, z / scale.z);
        if x.dot(y.cross(z)) < 0.0 {
            x = -x;
            scale.x = -scale.x;
        }

        let rotation = Mat4::from_cols(
            x.extend(0.0).to_array(),
            y.extend(0.0).to_array(),
            z.extend(0.0).to_array(),
            Mat4::IDENTITY.cols[3],
        );
        let t = m.cols[3];
        Some(Self {
            position: Vec3::new(t[0], t[1], t[2]),
            scale,
            rotation: Quat::from_rotation_mat4(&rotation),
        })
    }

    /// Transforms a point.
    #[inline]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(v * self.scale)
    }

    /// Transforms a direction and renormalizes it. Translation is ignored.
    #[inline]
    pub fn rotate_direction(&self, d: Vec3) -> Vec3 {
        // Scale first: rotating and then scaling would skew the direction.
        self.rotation.rotate(self.scale * d).normalize()
    }

    /// Inverse transform, or `None` when it cannot be written as scale-rotate-translate.
    ///
    /// Only uniform, non-zero scale inverts exactly. With non-uniform scale and a
    /// rotation the true inverse has shear, so it is refused.
    pub fn inverse(&self) -> Option<Self> {
        if !self.has_uniform_scale() || self.scale.x == 0.0 {
            return None;
        }
        let r = self.rotation.inverse();
        let s = self.scale.recip();
        Some(Self {
            position: r.rotate(s * -self.position),
            scale: s,
            rotation: r,
        })
    }

    /// `true` when all three scale components agree, relative to their magnitude.
    #[inline]
    pub fn has_uniform_scale(&self) -> bool {
        let s = self.scale;
        s.abs_diff_eq(Vec3::splat(s.x), UNIFORM_SCALE_EPS * s.x.abs().max(1.0))
    }

    /// Column-major matrix equivalent of [`Transform::apply`].
    pub fn to_mat4(&self) -> Mat4 {
        let r = self.rotation.to_mat4().cols;
        let scaled = |c: [f32; 4], s: f32| [c[0] * s, c[1] * s, c[2] * s, 0.0];
        Mat4::from_cols(
            scaled(r[0], self.scale.x),
            scaled(r[1], self.scale.y),
            scaled(r[2], self.scale.z),
            [self.position.x, self.position.y, self.position.z, 1.0],
        )
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Transform {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        self.apply(v)
    }
}

/// Parent-child composition: `(a * b).apply(v) == a.apply(b.apply(v))` for uniform scale.
impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            position: self.apply(rhs.position),
            scale: self.scale * rhs.scale,
            rotation: self.rotation * rhs.rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-4;

    fn sample() -> Transform {
        Transform::new(
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::splat(2.0),
            Quat::from_axis_angle(Vec3::new(0.0, 1.0, 1.0).normalize(), 0.8),
        )
    }

    #[test]
    fn identity_leaves_points_unchanged() {
        for v in [Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), Vec3::new(-7.5, 0.25, 1e3)] {
            assert_eq!(Transform::IDENTITY.apply(v), v);
        }
    }

    #[test]
    fn applies_scale_then_rotation_then_translation() {
        let t = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
            Quat::from_axis_angle(Vec3::Z, FRAC_PI_2),
        );
        // (1,0,0) -> scale (2,0,0) -> rotate 90° about Z (0,2,0) -> translate (10,2,0).
        assert!(t.apply(Vec3::X).abs_diff_eq(Vec3::new(10.0, 2.0, 0.0), EPS));
    }

    #[test]
    fn inverse_undoes_apply() {
        let t = sample();
        let inv = t.inverse().expect("uniform scale inverts");
        for v in [Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.5, 9.0)] {
            assert!(inv.apply(t.apply(v)).abs_diff_eq(v, EPS));
        }
    }

    #[test]
    fn composition_matches_nested_application() {
        let a = sample();
        let b = Transform::new(
            Vec3::new(0.0, 3.0, -1.0),
            Vec3::splat(0.5),
            Quat::from_axis_angle(Vec3::X, -0.3),
        );
        let v = Vec3::new(0.3, -0.7, 2.0);
        assert!((a * b).apply(v).abs_diff_eq(a.apply(b.apply(v)), EPS));
    }

    #[test]
    fn matrix_matches_apply() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(Vec3::Y, 0.6),
        );
        let m = t.to_mat4();
        let v = Vec3::new(-1.0, 0.5, 2.0);
        assert!(m.transform_point(v).abs_diff_eq(t.apply(v), EPS));
    }

    #[test]
    fn rigid_matrix_round_trip() {
        let t0 = Transform::new(
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::ONE,
            Quat::from_axis_angle(Vec3::Y, core::f32::consts::FRAC_PI_4),
        );
        let t1 = Transform::from_rigid_mat4(&t0.to_mat4());
        assert!(t1.position.abs_diff_eq(t0.position, EPS));
        assert!(t1.scale.abs_diff_eq(t0.scale, EPS));
        assert!((t1.rotation.dot(t0.rotation).abs() - 1.0).abs() < EPS);
    }

    #[test]
    fn inverse_refuses_non_uniform_scale() {
        let t = Transform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 3.0, 1.0),
            Quat::from_axis_angle(Vec3::Z, core::f32::consts::FRAC_PI_4),
        );
        assert!(!t.has_uniform_scale());
        assert_eq!(t.inverse(), None);
    }

    #[test]
    fn inverse_refuses_zero_scale() {
        assert_eq!(Transform::from_position_scale(Vec3::X, 0.0).inverse(), None);
    }

    #[test]
    fn inverse_accepts_scale_within_rounding() {
        let t = Transform::new(Vec3::ZERO, Vec3::new(100.0, 100.0001, 100.0), Quat::IDENTITY);
        assert!(t.inverse().is_some());
    }

    // ── matrix decomposition ──────────────────────────────────────────────

    #[test]
    fn matrix_decomposition_recovers_non_uniform_scale() {
        let t0 = Transform::new(
            Vec3::new(4.0, -1.0, 2.5),
            Vec3::new(2.0, 0.5, 3.0),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.7),
        );
        let t1 = Transform::from_mat4(&t0.to_mat4()).expect("decomposable");
        assert!(t1.position.abs_diff_eq(t0.position, EPS));
        assert!(t1.scale.abs_diff_eq(t0.scale, EPS));
        assert!((t1.rotation.dot(t0.rotation).abs() - 1.0).abs() < EPS);

        let v = Vec3::new(-1.0, 2.0, 0.25);
        assert!(t1.apply(v).abs_diff_eq(t0.apply(v), EPS));
    }

    #[test]
    fn matrix_decomposition_keeps_mirroring_in_scale() {
        let t0 = Transform::new(
            Vec3::ZERO,
            Vec3::new(-2.0, 1.0, 1.0),
            Quat::from_axis_angle(Vec3::Y, 0.4),
        );
        let t1 = Transform::from_mat4(&t0.to_mat4()).expect("decomposable");
        assert!(t1.scale.abs_diff_eq(t0.scale, EPS));
        assert!(t1.rotation.is_normalized());
        let v = Vec3::new(0.5, -1.0, 2.0);
        assert!(t1.apply(v).abs_diff_eq(t0.apply(v), EPS));
    }

    #[test]
    fn matrix_decomposition_refuses_collapsed_axes() {
        let flat = Transform::new(Vec3::X, Vec3::new(1.0, 0.0, 1.0), Quat::IDENTITY);
        assert_eq!(Transform::from_mat4(&flat.to_mat4()), None);
    }

    #[test]
    fn rotate_direction_returns_unit_vectors() {
        let d = sample().rotate_direction(Vec3::new(0.0, 3.0, 4.0));
        assert!((d.length() - 1.0).abs() < EPS);
    }
}
