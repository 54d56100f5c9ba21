//! Per-frame scene uniform block. One record per frame, read by every draw.

use bytemuck::{Pod, Zeroable};

use super::{FieldLayout, FormatRevision, GpuRecord};
use crate::math::Mat4;
use crate::scene::{NearTransparency, Scene};

/// A scene uniform record for one format revision.
pub trait SceneRecord: GpuRecord {
    fn encode(scene: &Scene) -> Self;
    fn decode(&self) -> Scene;
}

/// V1 scene uniforms.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub elapsed_time: f32,
    pub wind_direction: f32,
    pub touch_position: [f32; 2],
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

const _: () = assert!(size_of::<Uniforms>() == 144);

const COMMON_FIELDS: [FieldLayout; 5] = [
    FieldLayout::data("elapsed_time", 0, 4),
    FieldLayout::data("wind_direction", 4, 4),
    FieldLayout::data("touch_position", 8, 8),
    FieldLayout::data("projection", 16, 64),
    FieldLayout::data("view", 80, 64),
];

impl GpuRecord for Uniforms {
    const NAME: &'static str = "Uniforms";
    const REVISION: Option<FormatRevision> = Some(FormatRevision::V1);
    const ALIGN: usize = 16;
    const FIELDS: &'static [FieldLayout] = &COMMON_FIELDS;
}

impl SceneRecord for Uniforms {
    fn encode(scene: &Scene) -> Self {
        Self {
            elapsed_time: scene.elapsed_time,
            wind_direction: scene.wind_direction,
            touch_position: scene.touch_position.to_array(),
            projection: scene.projection.to_cols_array(),
            view: scene.view.to_cols_array(),
        }
    }

    fn decode(&self) -> Scene {
        Scene {
            elapsed_time: self.elapsed_time,
            wind_direction: self.wind_direction,
            touch_position: self.touch_position.into(),
            projection: Mat4 { cols: self.projection },
            view: Mat4 { cols: self.view },
            near_transparency: NearTransparency::default(),
        }
    }
}

/// V2 scene uniforms: V1 plus the near-transparency vector.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub elapsed_time: f32,
    pub wind_direction: f32,
    pub touch_position: [f32; 2],
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub near_transparency: [f32; 4],
}

const _: () = assert!(size_of::<SceneUniforms>() == 160);

impl GpuRecord for SceneUniforms {
    const NAME: &'static str = "SceneUniforms";
    const REVISION: Option<FormatRevision> = Some(FormatRevision::V2);
    const ALIGN: usize = 16;
    const FIELDS: &'static [FieldLayout] = &[
        COMMON_FIELDS[0],
        COMMON_FIELDS[1],
        COMMON_FIELDS[2],
        COMMON_FIELDS[3],
        COMMON_FIELDS[4],
        FieldLayout::data("near_transparency", 144, 16),
    ];
}

impl SceneRecord for SceneUniforms {
    fn encode(scene: &Scene) -> Self {
        Self {
            elapsed_time: scene.elapsed_time,
            wind_direction: scene.wind_direction,
            touch_position: scene.touch_position.to_array(),
            projection: scene.projection.to_cols_array(),
            view: scene.view.to_cols_array(),
            near_transparency: scene.near_transparency.to_array(),
        }
    }

    fn decode(&self) -> Scene {
        Scene {
            near_transparency: NearTransparency::from_array(self.near_transparency),
            ..Uniforms::decode(&self.common())
        }
    }
}

impl SceneUniforms {
    /// The V1 prefix of this block.
    pub fn common(&self) -> Uniforms {
        Uniforms {
            elapsed_time: self.elapsed_time,
            wind_direction: self.wind_direction,
            touch_position: self.touch_position,
            projection: self.projection,
            view: self.view,
        }
    }
}

/// Scene uniform block of a runtime-selected revision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SceneBlock {
    V1(Uniforms),
    V2(SceneUniforms),
}

impl SceneBlock {
    pub fn encode(revision: FormatRevision, scene: &Scene) -> Self {
        match revision {
            FormatRevision::V1 => Self::V1(Uniforms::encode(scene)),
            FormatRevision::V2 => Self::V2(SceneUniforms::encode(scene)),
        }
    }

    pub fn revision(&self) -> FormatRevision {
        match self {
            Self::V1(_) => FormatRevision::V1,
            Self::V2(_) => FormatRevision::V2,
        }
    }

    pub fn size(revision: FormatRevision) -> usize {
        match revision {
            FormatRevision::V1 => Uniforms::stride(),
            FormatRevision::V2 => SceneUniforms::stride(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V1(u) => bytemuck::bytes_of(u),
            Self::V2(u) => bytemuck::bytes_of(u),
        }
    }

    pub fn decode(&self) -> Scene {
        match self {
            Self::V1(u) => u.decode(),
            Self::V2(u) => u.decode(),
        }
    }
}
