use core::ops::Mul;

use super::{Vec3, Vec4};

/// Column-major 4×4 matrix, the layout of every `float4x4` shader uniform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self::from_cols(
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    );

    #[inline]
    pub const fn from_cols(c0: [f32; 4], c1: [f32; 4], c2: [f32; 4], c3: [f32; 4]) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    #[inline]
    pub const fn to_cols_array(self) -> [[f32; 4]; 4] {
        self.cols
    }

    #[inline]
    pub fn col(&self, i: usize) -> Vec4 {
        Vec4::from(self.cols[i])
    }

    /// Right-handed perspective projection mapping view-space depth to `0..=1`
    /// (Metal / wgpu / D3D clip convention).
    pub fn perspective_rh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        debug_assert!(near > 0.0 && far > near, "perspective_rh: invalid depth range");
        let f = 1.0 / (0.5 * fov_y).tan();
        let range = far / (near - far);
        Self::from_cols(
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, range, -1.0],
            [0.0, 0.0, range * near, 0.0],
        )
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);
        Self::from_cols(
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
        )
    }

    #[inline]
    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        self.col(0) * v.x + self.col(1) * v.y + self.col(2) * v.z + self.col(3) * v.w
    }

    /// Transforms a point (`w = 1`) and drops `w` without dividing.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.mul_vec4(p.extend(1.0)).truncate()
    }

    /// Transforms a direction (`w = 0`).
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.mul_vec4(v.extend(0.0)).truncate()
    }

    /// Transforms a point and performs the perspective divide.
    #[inline]
    pub fn project_point(&self, p: Vec3) -> Vec3 {
        let c = self.mul_vec4(p.extend(1.0));
        c.truncate() / c.w
    }
}

impl Default for Mat4 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let c = |i: usize| self.mul_vec4(rhs.col(i)).to_array();
        Mat4::from_cols(c(0), c(1), c(2), c(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::look_at_rh(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn look_at_moves_target_onto_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let p = view.transform_point(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth_range() {
        let proj = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0);
        let near = proj.project_point(Vec3::new(0.0, 0.0, -0.1));
        let far = proj.project_point(Vec3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }
}
