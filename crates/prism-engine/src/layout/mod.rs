//! Byte layouts shared between the CPU writer and the shader reader.
//!
//! Every record is `#[repr(C)]` + `Pod`, has its size pinned at compile time and
//! carries a reader-side field table (see [`GpuRecord`]). Records that differ
//! between format revisions exist once per revision; the CPU-side models in
//! [`crate::scene`] are encoded into whichever one the pipeline selected.

mod buffer;
mod instance;
mod record;
mod revision;
mod uniforms;
mod vertex;

pub use buffer::{read_records, RecordBuffer};
pub use instance::{
    GpuMaterial, GpuTransform, InstanceBatch, InstanceRecord, MaterialV1, PerInstanceUniforms,
    PrimitiveInstance,
};
pub use record::{check_revision, field, pad_len, validate_layout, FieldLayout, GpuRecord};
pub use revision::FormatRevision;
pub use uniforms::{SceneBlock, SceneRecord, SceneUniforms, Uniforms};
pub use vertex::{
    ColoredUnlitTexturedVertex, ColoredUnlitTexturedVertexV1, ColoredVertex, ColoredVertexRecord,
    TexturedVertex, VertexRecord,
};
