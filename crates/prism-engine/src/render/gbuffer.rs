//! Deferred-shading G-buffer: attachment formats and the per-pixel texel.

use crate::color::{LinearRgba, NormalizedSrgba};
use crate::math::Vec3;

pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Snorm;
pub const OBJECT_ID_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Uint;
pub const LINEAR_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Output of the lighting pass.
pub const SHADED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// What the third G-buffer attachment stores. A pipeline uses exactly one.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DiscriminatorStrategy {
    /// 16-bit object id; lets the lighting pass find object edges.
    #[default]
    ObjectId,
    /// 32-bit view depth.
    LinearDepth,
}

impl DiscriminatorStrategy {
    pub const fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::ObjectId => OBJECT_ID_FORMAT,
            Self::LinearDepth => LINEAR_DEPTH_FORMAT,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GBufferTarget {
    Albedo,
    Normal,
    ObjectId,
    LinearDepth,
}

impl GBufferTarget {
    pub const fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Albedo => ALBEDO_FORMAT,
            Self::Normal => NORMAL_FORMAT,
            Self::ObjectId => OBJECT_ID_FORMAT,
            Self::LinearDepth => LINEAR_DEPTH_FORMAT,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Albedo => "prism gbuffer albedo",
            Self::Normal => "prism gbuffer normal",
            Self::ObjectId => "prism gbuffer object id",
            Self::LinearDepth => "prism gbuffer linear depth",
        }
    }

    /// Clear value. Linear depth clears to "infinitely far".
    pub const fn clear_color(self) -> wgpu::Color {
        match self {
            Self::LinearDepth => wgpu::Color { r: f32::MAX as f64, g: 0.0, b: 0.0, a: 0.0 },
            _ => wgpu::Color::TRANSPARENT,
        }
    }
}

/// Ordered color attachments of the geometry pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GBufferLayout {
    strategy: DiscriminatorStrategy,
}

impl GBufferLayout {
    pub const fn for_strategy(strategy: DiscriminatorStrategy) -> Self {
        Self { strategy }
    }

    #[inline]
    pub const fn strategy(&self) -> DiscriminatorStrategy {
        self.strategy
    }

    /// Attachment order matches the fragment shader's output locations.
    pub const fn targets(&self) -> [GBufferTarget; 3] {
        let discriminator = match self.strategy {
            DiscriminatorStrategy::ObjectId => GBufferTarget::ObjectId,
            DiscriminatorStrategy::LinearDepth => GBufferTarget::LinearDepth,
        };
        [GBufferTarget::Albedo, GBufferTarget::Normal, discriminator]
    }

    pub fn formats(&self) -> [wgpu::TextureFormat; 3] {
        self.targets().map(GBufferTarget::format)
    }

    /// G-buffer writes replace; nothing blends.
    pub fn color_target_states(&self) -> [Option<wgpu::ColorTargetState>; 3] {
        self.targets().map(|t| {
            Some(wgpu::ColorTargetState {
                format: t.format(),
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        })
    }
}

// ── texel model ───────────────────────────────────────────────────────────

/// Third-channel value of one pixel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Discriminator {
    /// `None` is stored as 0 (background).
    ObjectId(Option<u16>),
    LinearDepth(f32),
}

impl Discriminator {
    pub const fn strategy(&self) -> DiscriminatorStrategy {
        match self {
            Self::ObjectId(_) => DiscriminatorStrategy::ObjectId,
            Self::LinearDepth(_) => DiscriminatorStrategy::LinearDepth,
        }
    }
}

/// Decoded G-buffer pixel as the lighting pass sees it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GBufferSample {
    pub albedo: LinearRgba,
    /// Unit length.
    pub normal: Vec3,
    pub discriminator: Discriminator,
}

/// One G-buffer pixel as stored in the attachments.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GBufferTexel {
    /// sRGB-encoded bytes, `[r, g, b, a]`.
    pub albedo: [u8; 4],
    /// Snorm16 `xyz`, `w` unused.
    pub normal: [i16; 4],
    pub discriminator: StoredDiscriminator,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StoredDiscriminator {
    ObjectId(u16),
    LinearDepth(f32),
}

impl GBufferTexel {
    /// What the geometry pass writes for `sample`.
    pub fn encode(sample: &GBufferSample) -> Self {
        let [nx, ny, nz] = sample.normal.to_array();
        Self {
            albedo: NormalizedSrgba::from(sample.albedo).to_rgba8().to_le_bytes(),
            normal: [snorm16(nx), snorm16(ny), snorm16(nz), 0],
            discriminator: match sample.discriminator {
                Discriminator::ObjectId(id) => StoredDiscriminator::ObjectId(id.unwrap_or(0)),
                Discriminator::LinearDepth(z) => StoredDiscriminator::LinearDepth(z),
            },
        }
    }

    /// What the lighting pass reads. The normal is renormalized; a zero normal
    /// reads as +Z.
    pub fn decode(&self) -> GBufferSample {
        let [r, g, b, a] = self.albedo;
        let n = Vec3::new(
            from_snorm16(self.normal[0]),
            from_snorm16(self.normal[1]),
            from_snorm16(self.normal[2]),
        );
        let normal = if n.length_squared() > 0.0 { n.normalize() } else { Vec3::Z };

        GBufferSample {
            albedo: NormalizedSrgba::from_srgb_u8(r, g, b, a).into(),
            normal,
            discriminator: match self.discriminator {
                StoredDiscriminator::ObjectId(0) => Discriminator::ObjectId(None),
                StoredDiscriminator::ObjectId(id) => Discriminator::ObjectId(Some(id)),
                StoredDiscriminator::LinearDepth(z) => Discriminator::LinearDepth(z),
            },
        }
    }
}

#[inline]
fn snorm16(v: f32) -> i16 {
    (v.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

#[inline]
fn from_snorm16(v: i16) -> f32 {
    (v as f32 / i16::MAX as f32).max(-1.0)
}

/// `true` if any neighbouring pixel belongs to a different object.
///
/// Background (id 0) counts as an object of its own.
pub fn is_object_edge(center: u16, neighbours: &[u16]) -> bool {
    neighbours.iter().any(|&n| n != center)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(normal: Vec3, discriminator: Discriminator) -> GBufferSample {
        GBufferSample {
            albedo: LinearRgba::new(0.2, 0.4, 0.8, 1.0),
            normal,
            discriminator,
        }
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn strategy_selects_exactly_one_discriminator() {
        let id = GBufferLayout::default();
        assert_eq!(id.strategy(), DiscriminatorStrategy::ObjectId);
        assert_eq!(
            id.formats(),
            [ALBEDO_FORMAT, NORMAL_FORMAT, wgpu::TextureFormat::R16Uint]
        );

        let depth = GBufferLayout::for_strategy(DiscriminatorStrategy::LinearDepth);
        assert_eq!(depth.formats()[2], wgpu::TextureFormat::R32Float);
        assert!(!depth.targets().contains(&GBufferTarget::ObjectId));
    }

    #[test]
    fn gbuffer_targets_do_not_blend() {
        for state in GBufferLayout::default().color_target_states() {
            let Some(state) = state else { panic!("missing target") };
            assert!(state.blend.is_none());
            assert_eq!(state.write_mask, wgpu::ColorWrites::ALL);
        }
    }

    // ── texel ─────────────────────────────────────────────────────────────

    #[test]
    fn normals_are_renormalized_on_read() {
        let n = Vec3::new(1.0, 2.0, 3.0).normalize();
        let texel = GBufferTexel::encode(&sample(n, Discriminator::ObjectId(Some(3))));
        let back = texel.decode();

        assert!((back.normal.length() - 1.0).abs() < 1e-6);
        assert!(back.normal.abs_diff_eq(n, 1e-4));
    }

    #[test]
    fn zero_normal_reads_as_up() {
        let texel = GBufferTexel {
            albedo: [0; 4],
            normal: [0; 4],
            discriminator: StoredDiscriminator::ObjectId(0),
        };
        assert_eq!(texel.decode().normal, Vec3::Z);
    }

    #[test]
    fn albedo_is_stored_as_srgb_bytes() {
        let texel = GBufferTexel::encode(&sample(Vec3::Z, Discriminator::ObjectId(None)));
        // linear 0.2 → sRGB ≈ 0.4845 → 124
        assert_eq!(texel.albedo[0], 124);
        assert_eq!(texel.albedo[3], 255);

        let back = texel.decode().albedo;
        assert!((back.r - 0.2).abs() < 0.01);
        assert!((back.b - 0.8).abs() < 0.01);
    }

    #[test]
    fn discriminators_round_trip() {
        let id = GBufferTexel::encode(&sample(Vec3::Z, Discriminator::ObjectId(Some(42))));
        assert_eq!(id.discriminator, StoredDiscriminator::ObjectId(42));
        assert_eq!(id.decode().discriminator, Discriminator::ObjectId(Some(42)));

        let none = GBufferTexel::encode(&sample(Vec3::Z, Discriminator::ObjectId(None)));
        assert_eq!(none.decode().discriminator, Discriminator::ObjectId(None));

        let depth = GBufferTexel::encode(&sample(Vec3::Z, Discriminator::LinearDepth(17.5)));
        assert_eq!(depth.decode().discriminator, Discriminator::LinearDepth(17.5));
        assert_eq!(
            depth.decode().discriminator.strategy(),
            DiscriminatorStrategy::LinearDepth
        );
    }

    #[test]
    fn object_edges_follow_id_changes() {
        assert!(!is_object_edge(5, &[5, 5, 5, 5]));
        assert!(is_object_edge(5, &[5, 5, 6, 5]));
        assert!(is_object_edge(5, &[0, 5, 5, 5]));
        assert!(!is_object_edge(0, &[]));
    }
}
