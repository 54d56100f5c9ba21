use crate::layout::FormatRevision;
use crate::render::oit::{DEFAULT_EPSILON, WeightFunction};
use crate::render::{AddressMode, DiscriminatorStrategy, SamplerPolicy, SamplerPreset};
use crate::scene::{FrameRing, Material};

/// Transparency settings of a pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OitConfig {
    pub weight: WeightFunction,
    /// Floor for the accumulated weight in the resolve divide.
    pub epsilon: f32,
}

impl Default for OitConfig {
    fn default() -> Self {
        Self { weight: WeightFunction::default(), epsilon: DEFAULT_EPSILON }
    }
}

/// Data-contract choices made once per pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineConfig {
    pub revision: FormatRevision,
    pub discriminator: DiscriminatorStrategy,
    /// Address mode of the sampler given to materials without their own.
    pub sampler_address: AddressMode,
    pub oit: OitConfig,
    pub frames_in_flight: usize,
}

impl PipelineConfig {
    /// Defaults for `revision`, including its sampler addressing.
    pub fn for_revision(revision: FormatRevision) -> Self {
        Self {
            revision,
            discriminator: DiscriminatorStrategy::default(),
            sampler_address: AddressMode::for_revision(revision),
            oit: OitConfig::default(),
            frames_in_flight: FrameRing::DEFAULT_LEN,
        }
    }

    #[inline]
    pub fn ring(&self) -> FrameRing {
        FrameRing::new(self.frames_in_flight)
    }

    #[inline]
    pub fn sampler(&self, preset: SamplerPreset) -> SamplerPolicy {
        SamplerPolicy::new(preset, self.sampler_address)
    }

    /// The material's own sampler, or linear filtering with this pipeline's addressing.
    #[inline]
    pub fn material_sampler(&self, material: &Material) -> SamplerPolicy {
        material.sampler.unwrap_or_else(|| self.sampler(SamplerPreset::Linear))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_revision(FormatRevision::LATEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_latest_revision() {
        let config = PipelineConfig::default();
        assert_eq!(config.revision, FormatRevision::V2);
        assert_eq!(config.discriminator, DiscriminatorStrategy::ObjectId);
        assert_eq!(config.sampler_address, AddressMode::ClampToEdge);
        assert_eq!(config.ring().len(), 3);
        assert_eq!(config.oit.weight, WeightFunction::MCGUIRE);
    }

    #[test]
    fn v1_pipelines_wrap_texture_coordinates() {
        let config = PipelineConfig::for_revision(FormatRevision::V1);
        assert_eq!(config.sampler(SamplerPreset::Point).address, AddressMode::Repeat);
        assert_eq!(config.sampler(SamplerPreset::Cubemap), SamplerPolicy::CUBEMAP);
    }

    #[test]
    fn materials_without_a_sampler_follow_the_revision() {
        let plain = Material::WHITE;
        let v1 = PipelineConfig::for_revision(FormatRevision::V1).material_sampler(&plain);
        let v2 = PipelineConfig::for_revision(FormatRevision::V2).material_sampler(&plain);
        assert_eq!(v1, SamplerPolicy::LINEAR_REPEAT);
        assert_eq!(v2, SamplerPolicy::LINEAR_CLAMP);

        let point = Material::WHITE.with_sampler(SamplerPolicy::POINT_CLAMP);
        let v1 = PipelineConfig::for_revision(FormatRevision::V1).material_sampler(&point);
        assert_eq!(v1, SamplerPolicy::POINT_CLAMP);
    }
}
