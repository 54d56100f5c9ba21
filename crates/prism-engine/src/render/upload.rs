//! Uploads of staged records into GPU buffers.

use crate::layout::{FormatRevision, GpuRecord, InstanceBatch, RecordBuffer, SceneBlock};
use crate::render::RenderCtx;
use crate::scene::{FrameRing, PublishedScene};

/// Smallest capacity, in records, a record buffer is created with.
const MIN_CAPACITY: usize = 64;

/// Staged records that can be mirrored into a GPU buffer.
pub trait RecordSource {
    fn stride(&self) -> usize;
    fn len(&self) -> usize;
    fn as_bytes(&self) -> &[u8];

    /// Byte offset and bytes written since the previous call.
    fn take_dirty_bytes(&mut self) -> Option<(usize, &[u8])>;
}

impl<R: GpuRecord> RecordSource for RecordBuffer<R> {
    fn stride(&self) -> usize {
        R::stride()
    }

    fn len(&self) -> usize {
        RecordBuffer::len(self)
    }

    fn as_bytes(&self) -> &[u8] {
        RecordBuffer::as_bytes(self)
    }

    fn take_dirty_bytes(&mut self) -> Option<(usize, &[u8])> {
        let range = self.take_dirty()?;
        Some(self.bytes_of_range(range))
    }
}

impl RecordSource for InstanceBatch {
    fn stride(&self) -> usize {
        InstanceBatch::stride(self)
    }

    fn len(&self) -> usize {
        InstanceBatch::len(self)
    }

    fn as_bytes(&self) -> &[u8] {
        InstanceBatch::as_bytes(self)
    }

    fn take_dirty_bytes(&mut self) -> Option<(usize, &[u8])> {
        InstanceBatch::take_dirty_bytes(self)
    }
}

/// Record capacity allocated for `required` records.
#[inline]
pub fn grown_capacity(required: usize) -> usize {
    required.next_power_of_two().max(MIN_CAPACITY)
}

/// What a [`GpuRecordBuffer::sync`] sent to the GPU.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Upload {
    Nothing,
    /// The buffer was (re)created and received every record.
    Full { bytes: usize },
    /// Only the dirty range was written.
    Range { offset: usize, bytes: usize },
}

/// GPU buffer mirroring a [`RecordSource`] (vertex, instance or storage data).
///
/// Grows to the next power of two and uploads only the dirty range when it
/// does not have to grow.
#[derive(Debug)]
pub struct GpuRecordBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    stride: usize,
}

impl GpuRecordBuffer {
    pub fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            buffer: None,
            capacity: 0,
            stride: 0,
        }
    }

    pub fn vertex(label: &'static str) -> Self {
        Self::new(label, wgpu::BufferUsages::VERTEX)
    }

    /// Instance data bound as a storage buffer for vertex pulling.
    pub fn storage(label: &'static str) -> Self {
        Self::new(label, wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX)
    }

    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Capacity in records.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record stride the current buffer was sized for.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Uploads whatever changed in `source` since the previous sync.
    pub fn sync(&mut self, ctx: &RenderCtx<'_>, source: &mut impl RecordSource) -> Upload {
        if source.len() == 0 {
            return Upload::Nothing;
        }

        if self.ensure_capacity(ctx, source.len(), source.stride()) {
            // A fresh buffer has no contents; send everything.
            source.take_dirty_bytes();
            let Some(buffer) = self.buffer.as_ref() else { return Upload::Nothing };
            let bytes = source.as_bytes();
            ctx.queue.write_buffer(buffer, 0, bytes);
            return Upload::Full { bytes: bytes.len() };
        }

        let Some(buffer) = self.buffer.as_ref() else { return Upload::Nothing };
        match source.take_dirty_bytes() {
            Some((offset, bytes)) => {
                ctx.queue.write_buffer(buffer, offset as u64, bytes);
                Upload::Range { offset, bytes: bytes.len() }
            }
            None => Upload::Nothing,
        }
    }

    /// Returns `true` if a new buffer was created.
    fn ensure_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize, stride: usize) -> bool {
        if required <= self.capacity && stride == self.stride && self.buffer.is_some() {
            return false;
        }

        let new_cap = grown_capacity(required);
        log::debug!(
            "{}: growing to {} records of {} bytes (was {})",
            self.label,
            new_cap,
            stride,
            self.capacity
        );

        self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: (new_cap * stride) as u64,
            usage: self.usage,
            mapped_at_creation: false,
        }));
        self.capacity = new_cap;
        self.stride = stride;
        true
    }
}

/// Rounds `size` up to the device's dynamic-offset alignment.
#[inline]
pub fn aligned_slot_size(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Uniform buffer holding one scene block per frame-ring slot.
///
/// Bind with a dynamic offset; [`GpuFrameUniforms::write`] returns the offset of
/// the frame just written.
#[derive(Debug)]
pub struct GpuFrameUniforms {
    ring: FrameRing,
    revision: FormatRevision,
    slot_size: u64,
    buffer: Option<wgpu::Buffer>,
}

impl GpuFrameUniforms {
    pub fn new(ring: FrameRing, revision: FormatRevision) -> Self {
        Self { ring, revision, slot_size: 0, buffer: None }
    }

    #[inline]
    pub fn revision(&self) -> FormatRevision {
        self.revision
    }

    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Distance between slots, once the buffer exists.
    #[inline]
    pub fn slot_size(&self) -> u64 {
        self.slot_size
    }

    /// Size of one scene block, for the binding's `size`.
    #[inline]
    pub fn block_size(&self) -> u64 {
        SceneBlock::size(self.revision) as u64
    }

    /// Writes `published` into this buffer's slot for its frame and returns the
    /// slot's byte offset.
    ///
    /// The slot follows this buffer's own ring, which need not have the length
    /// of the ring the scene was published through.
    pub fn write(&mut self, ctx: &RenderCtx<'_>, published: &PublishedScene) -> u64 {
        self.ensure_buffer(ctx);

        let block = SceneBlock::encode(self.revision, published.scene());
        let offset = self.ring.slot_offset(published.frame_index(), self.slot_size);
        if let Some(buffer) = self.buffer.as_ref() {
            ctx.queue.write_buffer(buffer, offset, block.as_bytes());
        }
        offset
    }

    fn ensure_buffer(&mut self, ctx: &RenderCtx<'_>) {
        if self.buffer.is_some() {
            return;
        }

        let alignment = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        self.slot_size = aligned_slot_size(self.block_size(), alignment);
        log::debug!(
            "GpuFrameUniforms: {} slots of {} bytes ({})",
            self.ring.len(),
            self.slot_size,
            self.revision
        );

        self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism scene uniforms"),
            size: self.ring.buffer_size(self.slot_size),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
    }
}
