//! Per-mesh vertex records. Immutable once a mesh is loaded.
//!
//! All vector fields are tightly packed (`packed_float3` on the shader side), so
//! no record here carries padding.

use bytemuck::{Pod, Zeroable};

use super::{FieldLayout, FormatRevision, GpuRecord};
use crate::color::LinearRgba;
use crate::math::{Vec2, Vec3};

/// A record that can be bound as a vertex buffer.
///
/// Per-mesh vertices use locations 0..=2. Instance records step per instance and
/// start at location 3.
pub trait VertexRecord: GpuRecord {
    const STEP_MODE: wgpu::VertexStepMode = wgpu::VertexStepMode::Vertex;
    const ATTRIBUTES: &'static [wgpu::VertexAttribute];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::stride() as u64,
            step_mode: Self::STEP_MODE,
            attributes: Self::ATTRIBUTES,
        }
    }
}

// ── textured (lit) ────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

const _: () = assert!(size_of::<TexturedVertex>() == 32);

impl TexturedVertex {
    #[inline]
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coords: tex_coords.to_array(),
        }
    }
}

impl GpuRecord for TexturedVertex {
    const NAME: &'static str = "TexturedVertex";
    const REVISION: Option<FormatRevision> = None;
    const ALIGN: usize = 4;
    const FIELDS: &'static [FieldLayout] = &[
        FieldLayout::data("position", 0, 12),
        FieldLayout::data("normal", 12, 12),
        FieldLayout::data("tex_coords", 24, 8),
    ];
}

impl VertexRecord for TexturedVertex {
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // tex_coords
    ];
}

// ── colored unlit textured ────────────────────────────────────────────────

/// Revision-independent description of a colored unlit vertex.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColoredVertex {
    pub position: Vec3,
    pub tex_coords: Vec2,
    pub color: LinearRgba,
}

impl ColoredVertex {
    #[inline]
    pub const fn new(position: Vec3, tex_coords: Vec2, color: LinearRgba) -> Self {
        Self { position, tex_coords, color }
    }
}

/// A colored vertex record for one format revision.
pub trait ColoredVertexRecord: VertexRecord {
    fn encode(v: &ColoredVertex) -> Self;
    fn decode(&self) -> ColoredVertex;
}

/// V1: color quantized to `unorm8x4` (`r | g << 8 | b << 16 | a << 24`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColoredUnlitTexturedVertexV1 {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: u32,
}

const _: () = assert!(size_of::<ColoredUnlitTexturedVertexV1>() == 24);

impl GpuRecord for ColoredUnlitTexturedVertexV1 {
    const NAME: &'static str = "ColoredUnlitTexturedVertexV1";
    const REVISION: Option<FormatRevision> = Some(FormatRevision::V1);
    const ALIGN: usize = 4;
    const FIELDS: &'static [FieldLayout] = &[
        FieldLayout::data("position", 0, 12),
        FieldLayout::data("tex_coords", 12, 8),
        FieldLayout::data("color", 20, 4),
    ];
}

impl VertexRecord for ColoredUnlitTexturedVertexV1 {
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Unorm8x4
    ];
}

impl ColoredVertexRecord for ColoredUnlitTexturedVertexV1 {
    fn encode(v: &ColoredVertex) -> Self {
        Self {
            position: v.position.to_array(),
            tex_coords: v.tex_coords.to_array(),
            color: v.color.to_rgba8(),
        }
    }

    fn decode(&self) -> ColoredVertex {
        ColoredVertex {
            position: self.position.into(),
            tex_coords: self.tex_coords.into(),
            color: LinearRgba::from_rgba8(self.color),
        }
    }
}

/// V2: full-precision `float4` color. 36 bytes; must not gain 16-byte alignment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColoredUnlitTexturedVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

const _: () = assert!(size_of::<ColoredUnlitTexturedVertex>() == 36);

impl GpuRecord for ColoredUnlitTexturedVertex {
    const NAME: &'static str = "ColoredUnlitTexturedVertex";
    const REVISION: Option<FormatRevision> = Some(FormatRevision::V2);
    const ALIGN: usize = 4;
    const FIELDS: &'static [FieldLayout] = &[
        FieldLayout::data("position", 0, 12),
        FieldLayout::data("tex_coords", 12, 8),
        FieldLayout::data("color", 20, 16),
    ];
}

impl VertexRecord for ColoredUnlitTexturedVertex {
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32x4
    ];
}

impl ColoredVertexRecord for ColoredUnlitTexturedVertex {
    fn encode(v: &ColoredVertex) -> Self {
        Self {
            position: v.position.to_array(),
            tex_coords: v.tex_coords.to_array(),
            color: v.color.to_array(),
        }
    }

    fn decode(&self) -> ColoredVertex {
        ColoredVertex {
            position: self.position.into(),
            tex_coords: self.tex_coords.into(),
            color: LinearRgba::from_array(self.color),
        }
    }
}
