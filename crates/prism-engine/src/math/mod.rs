//! Vector, quaternion and transform algebra used to place every instance.
//!
//! Conventions:
//! - right-handed coordinates
//! - column-major matrices (`p' = M * p`), matching shader `float4x4`
//! - quaternions stored `(x, y, z, w)` with `w` the scalar part

mod mat4;
mod quat;
mod transform;
mod vec;

pub use mat4::Mat4;
pub use quat::Quat;
pub use transform::Transform;
pub use vec::{Vec2, Vec3, Vec4};
