use super::Material;
use crate::math::Transform;

/// One drawable instance as the CPU sees it.
///
/// Encoded into `PerInstanceUniforms` (V1) or `PrimitiveInstance` (V2) by the
/// layout module. `object_id` is only carried by V2 records.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Instance {
    pub transform: Transform,
    pub material: Material,
    /// `None` is written as 0, which the G-buffer reads as "no object".
    pub object_id: Option<u16>,
}

impl Instance {
    #[inline]
    pub const fn new(transform: Transform, material: Material) -> Self {
        Self { transform, material, object_id: None }
    }

    #[inline]
    pub const fn with_object_id(mut self, id: u16) -> Self {
        self.object_id = if id == 0 { None } else { Some(id) };
        self
    }

    /// Object id as written to the GPU.
    #[inline]
    pub fn raw_object_id(&self) -> u16 {
        self.object_id.unwrap_or(0)
    }
}
