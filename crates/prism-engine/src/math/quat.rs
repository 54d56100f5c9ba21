use core::fmt;
use core::ops::{Add, Mul};

use super::{Mat4, Vec3, Vec4};

/// Tolerance on `|‖q‖² − 1|` below which a quaternion counts as a rotation.
const UNIT_NORM_EPS: f32 = 1e-3;

/// Per-component tolerance under which two directions count as equal or opposite.
const ARC_EPS: f32 = 0.01;

/// Quaternion stored as `(x, y, z, w)`: `xyz` is the vector part, `w` the scalar part.
///
/// Only unit quaternions represent rotations. Non-unit values appear as transient
/// intermediates (e.g. inside the sandwich product of [`Quat::rotate`] or after
/// [`Quat::lerp`]) and must be normalized before they are used to rotate anything.
///
/// The type is an immutable value; the single in-place mutation is [`Quat::set_w`].
#[derive(Copy, Clone, PartialEq)]
pub struct Quat {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Creates a quaternion from its scalar and vector parts.
    #[inline]
    pub const fn new(w: f32, v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z, w }
    }

    /// Creates a quaternion from `[x, y, z, w]`, the GPU storage order.
    #[inline]
    pub const fn from_array(a: [f32; 4]) -> Self {
        Self { x: a[0], y: a[1], z: a[2], w: a[3] }
    }

    /// Rotation of `angle` radians around `axis` (expected unit length).
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (s, c) = (0.5 * angle).sin_cos();
        Self::new(c, axis * s)
    }

    /// Shortest rotation taking unit vector `start` onto unit vector `end`.
    ///
    /// Nearly equal vectors give the identity. Opposite vectors have no unique
    /// shortest arc, so the result is a half turn about `up`.
    pub fn from_rotation_arc(start: Vec3, end: Vec3, up: Vec3) -> Self {
        if end.abs_diff_eq(start, ARC_EPS) {
            return Self::IDENTITY;
        }
        if end.abs_diff_eq(-start, ARC_EPS) {
            return Self::from_axis_angle(up.normalize(), core::f32::consts::PI);
        }
        let angle = start.dot(end).clamp(-1.0, 1.0).acos();
        Self::from_axis_angle(start.cross(end).normalize(), angle)
    }

    /// Extracts the rotation held by the upper 3×3 block of `m`.
    ///
    /// `m` must be a pure rotation (no scale or shear).
    pub fn from_rotation_mat4(m: &Mat4) -> Self {
        let c = m.cols;
        // Row-major element accessor: r(row, col).
        let r = |row: usize, col: usize| c[col][row];
        let trace = r(0, 0) + r(1, 1) + r(2, 2);

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self {
                w: 0.25 * s,
                x: (r(2, 1) - r(1, 2)) / s,
                y: (r(0, 2) - r(2, 0)) / s,
                z: (r(1, 0) - r(0, 1)) / s,
            }
        } else if r(0, 0) > r(1, 1) && r(0, 0) > r(2, 2) {
            let s = (1.0 + r(0, 0) - r(1, 1) - r(2, 2)).sqrt() * 2.0;
            Self {
                w: (r(2, 1) - r(1, 2)) / s,
                x: 0.25 * s,
                y: (r(0, 1) + r(1, 0)) / s,
                z: (r(0, 2) + r(2, 0)) / s,
            }
        } else if r(1, 1) > r(2, 2) {
            let s = (1.0 + r(1, 1) - r(0, 0) - r(2, 2)).sqrt() * 2.0;
            Self {
                w: (r(0, 2) - r(2, 0)) / s,
                x: (r(0, 1) + r(1, 0)) / s,
                y: 0.25 * s,
                z: (r(1, 2) + r(2, 1)) / s,
            }
        } else {
            let s = (1.0 + r(2, 2) - r(0, 0) - r(1, 1)).sqrt() * 2.0;
            Self {
                w: (r(1, 0) - r(0, 1)) / s,
                x: (r(0, 2) + r(2, 0)) / s,
                y: (r(1, 2) + r(2, 1)) / s,
                z: 0.25 * s,
            }
        };
        q.normalize()
    }

    /// Scalar part.
    #[inline]
    pub const fn w(self) -> f32 {
        self.w
    }

    /// Vector part.
    #[inline]
    pub const fn v(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Replaces the scalar part, keeping the vector part.
    #[inline]
    pub fn set_w(&mut self, w: f32) -> &mut Self {
        self.w = w;
        self
    }

    /// `[x, y, z, w]`, the layout read by shaders.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    #[inline]
    pub const fn to_vec4(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, self.w)
    }

    /// Negates the vector part.
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.v())
    }

    /// Inverse of a **unit** quaternion, i.e. its conjugate.
    ///
    /// This is not the general inverse: for a non-unit `self` the result is silently
    /// wrong. Callers must normalize first. Debug builds assert it.
    #[inline]
    pub fn inverse(self) -> Self {
        debug_assert!(
            self.is_normalized(),
            "Quat::inverse: non-unit quaternion {self:?} (norm² = {})",
            self.length_squared()
        );
        self.conjugate()
    }

    /// 4D dot product; measures how close two rotations are.
    #[inline]
    pub fn dot(self, rhs: Quat) -> f32 {
        self.v().dot(rhs.v()) + self.w * rhs.w
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn is_normalized(self) -> bool {
        (self.length_squared() - 1.0).abs() <= UNIT_NORM_EPS
    }

    #[inline]
    pub fn normalize(self) -> Self {
        self * self.length().recip()
    }

    /// Rotates `v` by this unit quaternion: the vector part of `q * (v, 0) * q⁻¹`.
    ///
    /// Two Hamilton products per call. When rotating many points by the same
    /// quaternion, convert once with [`Quat::to_mat4`] instead.
    #[inline]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        (self * Quat::new(0.0, v) * self.inverse()).v()
    }

    /// Component-wise linear interpolation. The result is generally not unit length.
    #[inline]
    pub fn lerp(self, end: Quat, t: f32) -> Self {
        self * (1.0 - t) + end * t
    }

    /// Spherical linear interpolation.
    ///
    /// Falls back to [`Quat::lerp`] weights when the two rotations are nearly
    /// identical (`sin θ ≤ 0.001`). No shortest-arc flip is applied: callers who
    /// want the short path pass an `end` in the same hemisphere as `self`.
    pub fn slerp(self, end: Quat, t: f32) -> Self {
        let cos_theta = self.dot(end).clamp(-1.0, 1.0);
        let theta = cos_theta.acos();
        let sin_theta = theta.sin();

        let (w1, w2) = if sin_theta > 0.001 {
            (((1.0 - t) * theta).sin() / sin_theta, (t * theta).sin() / sin_theta)
        } else {
            (1.0 - t, t)
        };
        self * w1 + end * w2
    }

    /// Column-major rotation matrix (`p' = M * p`).
    ///
    /// The `[3][3]` element is `‖q‖²`, which is 1 for unit quaternions.
    pub fn to_mat4(self) -> Mat4 {
        let Self { x, y, z, w } = self;
        let (w2, x2, y2, z2) = (w * w, x * x, y * y, z * z);
        Mat4::from_cols(
            [w2 + x2 - y2 - z2, 2.0 * (x * y + w * z), 2.0 * (x * z - w * y), 0.0],
            [2.0 * (x * y - w * z), w2 - x2 + y2 - z2, 2.0 * (y * z + w * x), 0.0],
            [2.0 * (x * z + w * y), 2.0 * (y * z - w * x), w2 - x2 - y2 + z2, 0.0],
            [0.0, 0.0, 0.0, w2 + x2 + y2 + z2],
        )
    }
}

impl Default for Quat {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Quat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q(w: {}, v: ({}, {}, {}))", self.w, self.x, self.y, self.z)
    }
}

/// Hamilton product. Non-commutative: `(a * b).rotate(v) == a.rotate(b.rotate(v))`.
impl Mul for Quat {
    type Output = Quat;
    #[inline]
    fn mul(self, rhs: Quat) -> Quat {
        let (v1, v2) = (self.v(), rhs.v());
        let scalar = self.w * rhs.w - v1.dot(v2);
        let vector = v1.cross(v2) + v2 * self.w + v1 * rhs.w;
        Quat::new(scalar, vector)
    }
}

/// Rotation of a vector by a unit quaternion.
impl Mul<Vec3> for Quat {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}

impl Mul<f32> for Quat {
    type Output = Quat;
    #[inline]
    fn mul(self, s: f32) -> Quat {
        Quat { x: self.x * s, y: self.y * s, z: self.z * s, w: self.w * s }
    }
}

impl Add for Quat {
    type Output = Quat;
    #[inline]
    fn add(self, rhs: Quat) -> Quat {
        Quat { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z, w: self.w + rhs.w }
    }
}
