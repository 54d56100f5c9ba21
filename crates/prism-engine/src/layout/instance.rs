//! Per-instance records, indexed by instance id in the instance buffer.

use bytemuck::{Pod, Zeroable};

use super::{FieldLayout, FormatRevision, GpuRecord, RecordBuffer, VertexRecord, pad_len};
use crate::color::LinearRgba;
use crate::math::{Quat, Transform, Vec3};
use crate::scene::{Instance, Material};

// ── shared blocks ─────────────────────────────────────────────────────────

/// GPU form of [`Transform`]. The fourth lane of `position` and `scale` is unused
/// and written as zero.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuTransform {
    pub position: [f32; 4],
    pub scale: [f32; 4],
    /// `(x, y, z, w)`.
    pub rotation: [f32; 4],
}

const _: () = assert!(size_of::<GpuTransform>() == 48);

impl GpuTransform {
    pub fn to_transform(&self) -> Transform {
        let [px, py, pz, _] = self.position;
        let [sx, sy, sz, _] = self.scale;
        Transform {
            position: Vec3::new(px, py, pz),
            scale: Vec3::new(sx, sy, sz),
            rotation: Quat::from_array(self.rotation),
        }
    }
}

impl From<&Transform> for GpuTransform {
    fn from(t: &Transform) -> Self {
        Self {
            position: t.position.extend(0.0).to_array(),
            scale: t.scale.extend(0.0).to_array(),
            rotation: t.rotation.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialV1 {
    pub diffuse: [f32; 4],
}

const _: () = assert!(size_of::<MaterialV1>() == 16);

impl From<&Material> for MaterialV1 {
    fn from(m: &Material) -> Self {
        Self { diffuse: m.diffuse.to_array() }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub diffuse: [f32; 4],
    pub uv_scale: [f32; 2],
    pub uv_offset: [f32; 2],
}

const _: () = assert!(size_of::<GpuMaterial>() == 32);

impl From<&Material> for GpuMaterial {
    fn from(m: &Material) -> Self {
        Self {
            diffuse: m.diffuse.to_array(),
            uv_scale: m.uv_scale.to_array(),
            uv_offset: m.uv_offset.to_array(),
        }
    }
}

// ── records ───────────────────────────────────────────────────────────────

/// An instance record for one format revision.
pub trait InstanceRecord: VertexRecord {
    fn encode(instance: &Instance) -> Self;

    /// Reads the record back. Values a revision does not carry come back as
    /// their defaults; the sampler policy is never stored on the GPU.
    fn decode(&self) -> Instance;
}

/// V1 instance record.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PerInstanceUniforms {
    pub transform: GpuTransform,
    pub material: MaterialV1,
}

const _: () = assert!(size_of::<PerInstanceUniforms>() == 64);

const TRANSFORM_FIELDS: [FieldLayout; 3] = [
    FieldLayout::data("transform.position", 0, 16),
    FieldLayout::data("transform.scale", 16, 16),
    FieldLayout::data("transform.rotation", 32, 16),
];

impl GpuRecord for PerInstanceUniforms {
    const NAME: &'static str = "PerInstanceUniforms";
    const REVISION: Option<FormatRevision> = Some(FormatRevision::V1);
    const ALIGN: usize = 16;
    const FIELDS: &'static [FieldLayout] = &[
        TRANSFORM_FIELDS[0],
        TRANSFORM_FIELDS[1],
        TRANSFORM_FIELDS[2],
        FieldLayout::data("material.diffuse", 48, 16),
    ];
}

impl VertexRecord for PerInstanceUniforms {
    const STEP_MODE: wgpu::VertexStepMode = wgpu::VertexStepMode::Instance;
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        3 => Float32x4, // transform.position
        4 => Float32x4, // transform.scale
        5 => Float32x4, // transform.rotation
        6 => Float32x4  // material.diffuse
    ];
}

impl InstanceRecord for PerInstanceUniforms {
    fn encode(instance: &Instance) -> Self {
        Self {
            transform: (&instance.transform).into(),
            material: (&instance.material).into(),
        }
    }

    fn decode(&self) -> Instance {
        Instance::new(
            self.transform.to_transform(),
            Material::new(LinearRgba::from_array(self.material.diffuse)),
        )
    }
}

/// Bytes of payload in a [`PrimitiveInstance`] before its tail padding.
const PRIMITIVE_PAYLOAD: usize = 48 + 32 + 2;

/// V2 instance record. The 16-bit object id is followed by zeroed padding up to
/// the next 16-byte boundary.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PrimitiveInstance {
    pub transform: GpuTransform,
    pub material: GpuMaterial,
    pub object_id: u16,
    _pad: [u8; pad_len(PRIMITIVE_PAYLOAD, 16)],
}

const _: () = assert!(size_of::<PrimitiveInstance>() == 96);

impl PrimitiveInstance {
    #[inline]
    pub fn new(transform: GpuTransform, material: GpuMaterial, object_id: u16) -> Self {
        Self { transform, material, object_id, _pad: Zeroable::zeroed() }
    }
}

impl GpuRecord for PrimitiveInstance {
    const NAME: &'static str = "PrimitiveInstance";
    const REVISION: Option<FormatRevision> = Some(FormatRevision::V2);
    const ALIGN: usize = 16;
    const FIELDS: &'static [FieldLayout] = &[
        TRANSFORM_FIELDS[0],
        TRANSFORM_FIELDS[1],
        TRANSFORM_FIELDS[2],
        FieldLayout::data("material.diffuse", 48, 16),
        FieldLayout::data("material.uv_scale", 64, 8),
        FieldLayout::data("material.uv_offset", 72, 8),
        FieldLayout::data("object_id", 80, 2),
        FieldLayout::padding(PRIMITIVE_PAYLOAD, pad_len(PRIMITIVE_PAYLOAD, 16)),
    ];
}

impl VertexRecord for PrimitiveInstance {
    const STEP_MODE: wgpu::VertexStepMode = wgpu::VertexStepMode::Instance;
    // The id is fetched as `Uint16x2`; its second lane is padding and reads 0.
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        3 => Float32x4, // transform.position
        4 => Float32x4, // transform.scale
        5 => Float32x4, // transform.rotation
        6 => Float32x4, // material.diffuse
        7 => Float32x2, // material.uv_scale
        8 => Float32x2, // material.uv_offset
        9 => Uint16x2   // object_id
    ];
}

impl InstanceRecord for PrimitiveInstance {
    fn encode(instance: &Instance) -> Self {
        Self::new(
            (&instance.transform).into(),
            (&instance.material).into(),
            instance.raw_object_id(),
        )
    }

    fn decode(&self) -> Instance {
        let material = Material::new(LinearRgba::from_array(self.material.diffuse))
            .with_uv(self.material.uv_scale.into(), self.material.uv_offset.into());
        Instance::new(self.transform.to_transform(), material).with_object_id(self.object_id)
    }
}

// ── runtime revision selection ────────────────────────────────────────────

/// Instance buffer whose record type is picked at runtime from a [`FormatRevision`].
#[derive(Debug, Clone)]
pub enum InstanceBatch {
    V1(RecordBuffer<PerInstanceUniforms>),
    V2(RecordBuffer<PrimitiveInstance>),
}

impl InstanceBatch {
    pub fn new(revision: FormatRevision) -> Self {
        match revision {
            FormatRevision::V1 => Self::V1(RecordBuffer::new()),
            FormatRevision::V2 => Self::V2(RecordBuffer::new()),
        }
    }

    pub fn revision(&self) -> FormatRevision {
        match self {
            Self::V1(_) => FormatRevision::V1,
            Self::V2(_) => FormatRevision::V2,
        }
    }

    /// Appends an instance; the returned index is its instance id.
    pub fn push(&mut self, instance: &Instance) -> usize {
        match self {
            Self::V1(buf) => buf.push(PerInstanceUniforms::encode(instance)),
            Self::V2(buf) => buf.push(PrimitiveInstance::encode(instance)),
        }
    }

    pub fn set(&mut self, index: usize, instance: &Instance) -> bool {
        match self {
            Self::V1(buf) => buf.set(index, PerInstanceUniforms::encode(instance)),
            Self::V2(buf) => buf.set(index, PrimitiveInstance::encode(instance)),
        }
    }

    pub fn get(&self, index: usize) -> Option<Instance> {
        match self {
            Self::V1(buf) => buf.get(index).map(|r| r.decode()),
            Self::V2(buf) => buf.get(index).map(|r| r.decode()),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::V1(buf) => buf.clear(),
            Self::V2(buf) => buf.clear(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::V1(buf) => buf.len(),
            Self::V2(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stride(&self) -> usize {
        match self {
            Self::V1(_) => PerInstanceUniforms::stride(),
            Self::V2(_) => PrimitiveInstance::stride(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V1(buf) => buf.as_bytes(),
            Self::V2(buf) => buf.as_bytes(),
        }
    }

    /// Byte offset and bytes of the records written since the previous call.
    pub fn take_dirty_bytes(&mut self) -> Option<(usize, &[u8])> {
        match self {
            Self::V1(buf) => {
                let range = buf.take_dirty()?;
                Some(buf.bytes_of_range(range))
            }
            Self::V2(buf) => {
                let range = buf.take_dirty()?;
                Some(buf.bytes_of_range(range))
            }
        }
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            Self::V1(_) => PerInstanceUniforms::layout(),
            Self::V2(_) => PrimitiveInstance::layout(),
        }
    }
}

impl Extend<Instance> for InstanceBatch {
    fn extend<I: IntoIterator<Item = Instance>>(&mut self, iter: I) {
        for instance in iter {
            self.push(&instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{field, read_records, validate_layout};
    use crate::math::Vec2;
    use core::mem::offset_of;

    fn sample_instance() -> Instance {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::splat(2.0),
            rotation: Quat::from_axis_angle(Vec3::Y, 0.5),
        };
        let material = Material::new(LinearRgba::new(0.25, 0.5, 0.75, 0.5))
            .with_uv(Vec2::new(2.0, 2.0), Vec2::new(0.5, 0.0));
        Instance::new(transform, material).with_object_id(0x1234)
    }

    fn f32s_at(bytes: &[u8], offset: usize, n: usize) -> Vec<f32> {
        bytes[offset..offset + 4 * n]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn offset_of_field<R: GpuRecord>(name: &str) -> usize {
        match field::<R>(name) {
            Some(f) => f.offset,
            None => panic!("{} has no field {name}", R::NAME),
        }
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn field_tables_validate() {
        assert_eq!(validate_layout::<PerInstanceUniforms>(), Ok(()));
        assert_eq!(validate_layout::<PrimitiveInstance>(), Ok(()));
    }

    #[test]
    fn struct_offsets_match_field_tables() {
        assert_eq!(offset_of!(PerInstanceUniforms, material), 48);
        assert_eq!(offset_of!(PrimitiveInstance, material), 48);
        assert_eq!(
            offset_of!(PrimitiveInstance, material) + offset_of!(GpuMaterial, uv_offset),
            offset_of_field::<PrimitiveInstance>("material.uv_offset"),
        );
        assert_eq!(
            offset_of!(PrimitiveInstance, object_id),
            offset_of_field::<PrimitiveInstance>("object_id"),
        );
        assert_eq!(offset_of!(PrimitiveInstance, _pad), 82);
    }

    #[test]
    fn instance_attributes_match_field_tables() {
        let offsets: Vec<u64> = PrimitiveInstance::ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 16, 32, 48, 64, 72, 80]);
        let locations: Vec<u32> =
            PerInstanceUniforms::ATTRIBUTES.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, [3, 4, 5, 6]);
        assert_eq!(PrimitiveInstance::layout().array_stride, 96);
        assert_eq!(PrimitiveInstance::layout().step_mode, wgpu::VertexStepMode::Instance);
    }

    // ── serialization ─────────────────────────────────────────────────────

    #[test]
    fn serialized_record_reads_back_at_table_offsets() {
        let instance = sample_instance();
        let record = PrimitiveInstance::encode(&instance);
        let bytes = bytemuck::bytes_of(&record);

        let pos = offset_of_field::<PrimitiveInstance>("transform.position");
        assert_eq!(f32s_at(bytes, pos, 4), [1.0, 2.0, 3.0, 0.0]);

        let rot = offset_of_field::<PrimitiveInstance>("transform.rotation");
        assert_eq!(f32s_at(bytes, rot, 4), instance.transform.rotation.to_array());

        let diffuse = offset_of_field::<PrimitiveInstance>("material.diffuse");
        assert_eq!(f32s_at(bytes, diffuse, 4), [0.25, 0.5, 0.75, 0.5]);

        let uv = offset_of_field::<PrimitiveInstance>("material.uv_scale");
        assert_eq!(f32s_at(bytes, uv, 4), [2.0, 2.0, 0.5, 0.0]);

        let id = offset_of_field::<PrimitiveInstance>("object_id");
        assert_eq!(u16::from_le_bytes([bytes[id], bytes[id + 1]]), 0x1234);
    }

    #[test]
    fn padding_bytes_are_zero() {
        let mut batch = InstanceBatch::new(FormatRevision::V2);
        batch.push(&sample_instance());
        batch.push(&sample_instance().with_object_id(u16::MAX));

        for record in batch.as_bytes().chunks_exact(96) {
            assert!(record[82..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn records_decode_back_to_the_instance() {
        let instance = sample_instance();

        let v2 = PrimitiveInstance::encode(&instance).decode();
        assert_eq!(v2.object_id, Some(0x1234));
        assert_eq!(v2.material.uv_offset, Vec2::new(0.5, 0.0));
        assert_eq!(v2.transform, instance.transform);

        // V1 has no uv transform and no object id.
        let v1 = PerInstanceUniforms::encode(&instance).decode();
        assert_eq!(v1.object_id, None);
        assert_eq!(v1.material.uv_scale, Vec2::ONE);
        assert_eq!(v1.material.diffuse, instance.material.diffuse);
    }

    #[test]
    fn byte_buffer_reinterprets_as_records() {
        let mut batch = InstanceBatch::new(FormatRevision::V1);
        batch.extend([sample_instance(), Instance::default()]);

        let records = read_records::<PerInstanceUniforms>(batch.as_bytes())
            .expect("whole records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], PerInstanceUniforms::encode(&Instance::default()));
    }

    // ── batch ─────────────────────────────────────────────────────────────

    #[test]
    fn batch_follows_the_selected_revision() {
        let mut v1 = InstanceBatch::new(FormatRevision::V1);
        let mut v2 = InstanceBatch::new(FormatRevision::V2);
        assert_eq!(v1.revision(), FormatRevision::V1);

        assert_eq!(v1.push(&sample_instance()), 0);
        assert_eq!(v2.push(&sample_instance()), 0);
        assert_eq!(v2.push(&Instance::default()), 1);

        assert_eq!(v1.as_bytes().len(), 64);
        assert_eq!(v2.as_bytes().len(), 2 * 96);
        assert_eq!(v2.stride(), 96);

        assert!(v2.set(1, &sample_instance()));
        assert!(!v2.set(5, &sample_instance()));
        assert_eq!(v2.get(1).and_then(|i| i.object_id), Some(0x1234));

        let dirty = v2.take_dirty_bytes().map(|(offset, bytes)| (offset, bytes.len()));
        assert_eq!(dirty, Some((0, 2 * 96)));
        assert!(v2.take_dirty_bytes().is_none());

        v2.clear();
        assert!(v2.is_empty());
    }
}
