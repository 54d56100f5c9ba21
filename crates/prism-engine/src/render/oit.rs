//! Weighted blended order-independent transparency.
//!
//! Transparent fragments write two targets with fixed-function blending:
//! accumulation (`One, One`) sums weighted premultiplied color and reveal
//! (`Zero, OneMinusSrcAlpha`) multiplies the remaining visibility. Both are
//! commutative, so draw order does not matter. A full-screen resolve divides
//! the accumulated color by its accumulated weight and composites it over the
//! opaque result.
//!
//! [`OitPixel`] runs the exact blend states below on the CPU.

use crate::color::LinearRgba;
use crate::scene::NearTransparency;

pub const ACCUMULATION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const REVEAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Float;

pub const ACCUMULATION_CLEAR: wgpu::Color = wgpu::Color::TRANSPARENT;
pub const REVEAL_CLEAR: wgpu::Color = wgpu::Color { r: 1.0, g: 0.0, b: 0.0, a: 0.0 };

/// Floor for the accumulated weight in the resolve divide.
pub const DEFAULT_EPSILON: f32 = 1e-5;

// ── weight ────────────────────────────────────────────────────────────────

/// Per-fragment weight `w(alpha, z)` applied to the accumulation output.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WeightFunction {
    /// `w = 1`: a plain alpha-weighted average.
    Constant,
    /// `w = alpha * clamp(0.03 / (1e-5 + (z / scale)^exponent), min, max)`.
    DepthPower { scale: f32, exponent: f32, min: f32, max: f32 },
}

impl WeightFunction {
    /// McGuire & Bavoil, equation 7.
    pub const MCGUIRE: Self = Self::DepthPower { scale: 200.0, exponent: 4.0, min: 1e-2, max: 3e3 };

    /// `depth` is positive view-space distance.
    pub fn weight(&self, alpha: f32, depth: f32) -> f32 {
        match *self {
            Self::Constant => 1.0,
            Self::DepthPower { scale, exponent, min, max } => {
                let d = (depth.max(0.0) / scale).powf(exponent);
                alpha * (0.03 / (1e-5 + d)).clamp(min, max)
            }
        }
    }
}

impl Default for WeightFunction {
    fn default() -> Self {
        Self::MCGUIRE
    }
}

// ── fragment ──────────────────────────────────────────────────────────────

/// A transparent fragment entering the OIT pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OitFragment {
    /// Straight alpha.
    pub color: LinearRgba,
    /// Positive view-space distance.
    pub depth: f32,
}

/// Fragment shader outputs for the two OIT targets.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OitOutput {
    pub accumulation: [f32; 4],
    /// Only `a` matters to the blend; `r` is written for debugging views.
    pub reveal: [f32; 4],
}

impl OitFragment {
    #[inline]
    pub const fn new(color: LinearRgba, depth: f32) -> Self {
        Self { color, depth }
    }

    /// What the fragment shader writes.
    pub fn shade(&self, weight: &WeightFunction, near: &NearTransparency) -> OitOutput {
        let alpha = (self.color.a * near.fade(self.depth)).clamp(0.0, 1.0);
        let w = weight.weight(alpha, self.depth);
        let c = self.color;
        OitOutput {
            accumulation: [c.r * alpha * w, c.g * alpha * w, c.b * alpha * w, alpha * w],
            reveal: [alpha, 0.0, 0.0, alpha],
        }
    }
}

// ── blend states ──────────────────────────────────────────────────────────

const ADDITIVE: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

const REVEAL: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::Zero,
    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
    operation: wgpu::BlendOperation::Add,
};

const OVER: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::SrcAlpha,
    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
    operation: wgpu::BlendOperation::Add,
};

pub const fn accumulation_blend_state() -> wgpu::BlendState {
    wgpu::BlendState { color: ADDITIVE, alpha: ADDITIVE }
}

pub const fn reveal_blend_state() -> wgpu::BlendState {
    wgpu::BlendState { color: REVEAL, alpha: REVEAL }
}

/// Composites the resolved transparent color over the opaque target.
pub const fn resolve_blend_state() -> wgpu::BlendState {
    wgpu::BlendState { color: OVER, alpha: OVER }
}

/// Targets of the transparent pass, in output-location order.
pub fn oit_color_target_states() -> [Option<wgpu::ColorTargetState>; 2] {
    [
        Some(wgpu::ColorTargetState {
            format: ACCUMULATION_FORMAT,
            blend: Some(accumulation_blend_state()),
            write_mask: wgpu::ColorWrites::ALL,
        }),
        Some(wgpu::ColorTargetState {
            format: REVEAL_FORMAT,
            blend: Some(reveal_blend_state()),
            write_mask: wgpu::ColorWrites::RED,
        }),
    ]
}

pub fn resolve_color_target_state(format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: Some(resolve_blend_state()),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

/// Fixed-function blend of `src` onto `dst`.
///
/// Constant and dual-source factors are not modeled and act as `One`.
fn blend(state: &wgpu::BlendState, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (i, o) in out.iter_mut().enumerate() {
        let component = if i < 3 { &state.color } else { &state.alpha };
        let s = src[i] * factor(component.src_factor, i, src, dst);
        let d = dst[i] * factor(component.dst_factor, i, src, dst);
        *o = match component.operation {
            wgpu::BlendOperation::Add => s + d,
            wgpu::BlendOperation::Subtract => s - d,
            wgpu::BlendOperation::ReverseSubtract => d - s,
            wgpu::BlendOperation::Min => src[i].min(dst[i]),
            wgpu::BlendOperation::Max => src[i].max(dst[i]),
        };
    }
    out
}

fn factor(f: wgpu::BlendFactor, i: usize, src: [f32; 4], dst: [f32; 4]) -> f32 {
    use wgpu::BlendFactor as F;
    match f {
        F::Zero => 0.0,
        F::Src => src[i],
        F::OneMinusSrc => 1.0 - src[i],
        F::SrcAlpha => src[3],
        F::OneMinusSrcAlpha => 1.0 - src[3],
        F::Dst => dst[i],
        F::OneMinusDst => 1.0 - dst[i],
        F::DstAlpha => dst[3],
        F::OneMinusDstAlpha => 1.0 - dst[3],
        F::SrcAlphaSaturated if i < 3 => src[3].min(1.0 - dst[3]),
        _ => 1.0,
    }
}

// ── pixel ─────────────────────────────────────────────────────────────────

/// Contents of one pixel of the accumulation and reveal targets.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OitPixel {
    pub accumulation: [f32; 4],
    /// Fraction of the opaque background still visible. Never increases.
    pub reveal: f32,
}

impl OitPixel {
    /// Both targets after their clear.
    pub const CLEARED: Self = Self {
        accumulation: [
            ACCUMULATION_CLEAR.r as f32,
            ACCUMULATION_CLEAR.g as f32,
            ACCUMULATION_CLEAR.b as f32,
            ACCUMULATION_CLEAR.a as f32,
        ],
        reveal: REVEAL_CLEAR.r as f32,
    };

    /// Applies one fragment's outputs through the OIT blend states.
    pub fn blend(&mut self, out: &OitOutput) {
        self.accumulation = blend(&accumulation_blend_state(), out.accumulation, self.accumulation);
        // R16Float stores only the red channel.
        let dst = [self.reveal, 0.0, 0.0, 0.0];
        self.reveal = blend(&reveal_blend_state(), out.reveal, dst)[0];
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reveal >= 1.0 && self.accumulation[3] <= 0.0
    }

    /// Weighted average of the transparent fragments, with `1 - reveal` coverage
    /// as alpha. This is what the resolve shader outputs.
    pub fn average(&self, epsilon: f32) -> LinearRgba {
        let [r, g, b, w] = self.accumulation;
        let w = w.max(epsilon);
        LinearRgba::new(r / w, g / w, b / w, 1.0 - self.reveal)
    }

    /// Final color of the pixel over `opaque`.
    pub fn resolve(&self, opaque: LinearRgba, epsilon: f32) -> LinearRgba {
        if self.is_empty() {
            return opaque;
        }
        let out = blend(
            &resolve_blend_state(),
            self.average(epsilon).to_array(),
            opaque.to_array(),
        );
        LinearRgba::from_array(out)
    }
}

impl Default for OitPixel {
    fn default() -> Self {
        Self::CLEARED
    }
}

/// Runs `fragments` through shading and blending into a cleared pixel.
pub fn accumulate<'a>(
    fragments: impl IntoIterator<Item = &'a OitFragment>,
    weight: &WeightFunction,
    near: &NearTransparency,
) -> OitPixel {
    let mut pixel = OitPixel::CLEARED;
    for fragment in fragments {
        pixel.blend(&fragment.shade(weight, near));
    }
    pixel
}
