use std::collections::HashMap;

use crate::layout::FormatRevision;

/// Filtering preset for material textures.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SamplerPreset {
    /// Nearest-neighbour, no mips.
    Point,
    /// Bilinear, no mips.
    Linear,
    /// Trilinear, always clamped.
    Cubemap,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AddressMode {
    Repeat,
    ClampToEdge,
}

impl AddressMode {
    /// Revision 1 shaders wrap texture coordinates; revision 2 clamps.
    pub const fn for_revision(revision: FormatRevision) -> Self {
        match revision {
            FormatRevision::V1 => Self::Repeat,
            FormatRevision::V2 => Self::ClampToEdge,
        }
    }

    const fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            Self::Repeat => wgpu::AddressMode::Repeat,
            Self::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// How a material samples its textures. Coordinates are always normalized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SamplerPolicy {
    pub preset: SamplerPreset,
    pub address: AddressMode,
}

impl SamplerPolicy {
    pub const POINT_CLAMP: Self = Self::new(SamplerPreset::Point, AddressMode::ClampToEdge);
    pub const LINEAR_CLAMP: Self = Self::new(SamplerPreset::Linear, AddressMode::ClampToEdge);
    pub const LINEAR_REPEAT: Self = Self::new(SamplerPreset::Linear, AddressMode::Repeat);
    pub const CUBEMAP: Self = Self::new(SamplerPreset::Cubemap, AddressMode::ClampToEdge);

    /// Cubemaps ignore `address` and clamp.
    pub const fn new(preset: SamplerPreset, address: AddressMode) -> Self {
        let address = match preset {
            SamplerPreset::Cubemap => AddressMode::ClampToEdge,
            _ => address,
        };
        Self { preset, address }
    }

    pub const fn for_revision(preset: SamplerPreset, revision: FormatRevision) -> Self {
        Self::new(preset, AddressMode::for_revision(revision))
    }

    pub fn label(&self) -> &'static str {
        match (self.preset, self.address) {
            (SamplerPreset::Point, AddressMode::Repeat) => "prism sampler point/repeat",
            (SamplerPreset::Point, AddressMode::ClampToEdge) => "prism sampler point/clamp",
            (SamplerPreset::Linear, AddressMode::Repeat) => "prism sampler linear/repeat",
            (SamplerPreset::Linear, AddressMode::ClampToEdge) => "prism sampler linear/clamp",
            (SamplerPreset::Cubemap, _) => "prism sampler cubemap",
        }
    }

    pub fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        let (filter, mipmap_filter) = match self.preset {
            SamplerPreset::Point => (wgpu::FilterMode::Nearest, wgpu::MipmapFilterMode::Nearest),
            SamplerPreset::Linear => (wgpu::FilterMode::Linear, wgpu::MipmapFilterMode::Nearest),
            SamplerPreset::Cubemap => (wgpu::FilterMode::Linear, wgpu::MipmapFilterMode::Linear),
        };
        let address = self.address.to_wgpu();

        wgpu::SamplerDescriptor {
            label: Some(self.label()),
            address_mode_u: address,
            address_mode_v: address,
            address_mode_w: address,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter,
            ..Default::default()
        }
    }
}

impl Default for SamplerPolicy {
    fn default() -> Self {
        Self::LINEAR_CLAMP
    }
}

/// Creates at most one `wgpu::Sampler` per policy.
#[derive(Debug, Default)]
pub struct SamplerCache {
    samplers: HashMap<SamplerPolicy, wgpu::Sampler>,
}

impl SamplerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, device: &wgpu::Device, policy: SamplerPolicy) -> &wgpu::Sampler {
        self.samplers.entry(policy).or_insert_with(|| {
            log::debug!("SamplerCache: creating {}", policy.label());
            device.create_sampler(&policy.descriptor())
        })
    }

    pub fn get(&self, policy: SamplerPolicy) -> Option<&wgpu::Sampler> {
        self.samplers.get(&policy)
    }

    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }

    /// Drops every sampler, e.g. after the device was lost.
    pub fn clear(&mut self) {
        self.samplers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_and_linear_presets_have_no_mip_filtering() {
        let point = SamplerPolicy::POINT_CLAMP.descriptor();
        assert_eq!(point.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(point.min_filter, wgpu::FilterMode::Nearest);
        assert_eq!(point.mipmap_filter, wgpu::MipmapFilterMode::Nearest);

        let linear = SamplerPolicy::LINEAR_REPEAT.descriptor();
        assert_eq!(linear.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(linear.mipmap_filter, wgpu::MipmapFilterMode::Nearest);
        assert_eq!(linear.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(linear.address_mode_w, wgpu::AddressMode::Repeat);
    }

    #[test]
    fn cubemap_is_trilinear_and_always_clamped() {
        let policy = SamplerPolicy::new(SamplerPreset::Cubemap, AddressMode::Repeat);
        assert_eq!(policy, SamplerPolicy::CUBEMAP);

        let d = policy.descriptor();
        assert_eq!(d.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(d.mipmap_filter, wgpu::MipmapFilterMode::Linear);
        assert_eq!(d.address_mode_v, wgpu::AddressMode::ClampToEdge);
    }

    #[test]
    fn addressing_follows_the_revision() {
        let v1 = SamplerPolicy::for_revision(SamplerPreset::Linear, FormatRevision::V1);
        let v2 = SamplerPolicy::for_revision(SamplerPreset::Linear, FormatRevision::V2);
        assert_eq!(v1, SamplerPolicy::LINEAR_REPEAT);
        assert_eq!(v2, SamplerPolicy::LINEAR_CLAMP);
        assert_eq!(SamplerPolicy::default(), v2);
    }

    #[test]
    fn labels_are_distinct() {
        let policies = [
            SamplerPolicy::POINT_CLAMP,
            SamplerPolicy::new(SamplerPreset::Point, AddressMode::Repeat),
            SamplerPolicy::LINEAR_CLAMP,
            SamplerPolicy::LINEAR_REPEAT,
            SamplerPolicy::CUBEMAP,
        ];
        let mut labels: Vec<_> = policies.iter().map(|p| p.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), policies.len());
    }
}
