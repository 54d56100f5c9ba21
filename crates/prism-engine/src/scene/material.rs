use crate::color::LinearRgba;
use crate::math::Vec2;
use crate::render::SamplerPolicy;

/// Surface description shared by every revision.
///
/// `uv_scale` and `uv_offset` only reach the GPU from revision 2 on; V1 records
/// drop them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    /// Linear RGBA, straight alpha.
    pub diffuse: LinearRgba,
    pub uv_scale: Vec2,
    pub uv_offset: Vec2,
    /// `None` samples with the pipeline's default (see `PipelineConfig::material_sampler`).
    pub sampler: Option<SamplerPolicy>,
}

impl Material {
    pub const WHITE: Self = Self::new(LinearRgba::WHITE);

    #[inline]
    pub const fn new(diffuse: LinearRgba) -> Self {
        Self {
            diffuse,
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            sampler: None,
        }
    }

    #[inline]
    pub const fn with_uv(mut self, scale: Vec2, offset: Vec2) -> Self {
        self.uv_scale = scale;
        self.uv_offset = offset;
        self
    }

    #[inline]
    pub const fn with_sampler(mut self, sampler: SamplerPolicy) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Applies the UV transform the way the geometry shader does.
    #[inline]
    pub fn map_uv(&self, uv: Vec2) -> Vec2 {
        Vec2::new(
            uv.x * self.uv_scale.x + self.uv_offset.x,
            uv.y * self.uv_scale.y + self.uv_offset.y,
        )
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.diffuse.a < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uv_transform_is_identity() {
        let m = Material::default();
        assert_eq!(m.map_uv(Vec2::new(0.3, 0.7)), Vec2::new(0.3, 0.7));
        assert!(!m.is_transparent());
        assert_eq!(m.sampler, None);
    }

    #[test]
    fn explicit_sampler_is_kept() {
        let m = Material::WHITE.with_sampler(SamplerPolicy::POINT_CLAMP);
        assert_eq!(m.sampler, Some(SamplerPolicy::POINT_CLAMP));
    }

    #[test]
    fn uv_transform_scales_then_offsets() {
        let m = Material::WHITE.with_uv(Vec2::new(2.0, 4.0), Vec2::new(0.5, 0.25));
        assert_eq!(m.map_uv(Vec2::new(0.5, 0.5)), Vec2::new(1.5, 2.25));
    }
}
