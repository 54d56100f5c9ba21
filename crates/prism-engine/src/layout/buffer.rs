use std::ops::Range;

use super::GpuRecord;
use crate::LayoutError;

/// CPU-side staging for an ordered array of GPU records (an instance buffer,
/// a vertex buffer, …), indexed by record id.
///
/// Tracks the index range written since the last upload so callers can push only
/// the dirty part to the GPU.
#[derive(Debug, Clone)]
pub struct RecordBuffer<R: GpuRecord> {
    records: Vec<R>,
    dirty: Option<Range<usize>>,
}

impl<R: GpuRecord> Default for RecordBuffer<R> {
    fn default() -> Self {
        Self { records: Vec::new(), dirty: None }
    }
}

impl<R: GpuRecord> RecordBuffer<R> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { records: Vec::with_capacity(capacity), dirty: None }
    }

    /// Appends a record and returns its index.
    pub fn push(&mut self, record: R) -> usize {
        let index = self.records.len();
        self.records.push(record);
        self.mark_dirty(index);
        index
    }

    /// Overwrites the record at `index`. Returns `false` if it is out of range.
    pub fn set(&mut self, index: usize, record: R) -> bool {
        let Some(slot) = self.records.get_mut(index) else { return false };
        *slot = record;
        self.mark_dirty(index);
        true
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    /// Drops all records, keeping the allocation for the next frame.
    pub fn clear(&mut self) {
        self.records.clear();
        self.dirty = None;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[R] {
        &self.records
    }

    /// The whole buffer as the bytes the reader sees.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.records.len() * R::stride()
    }

    /// Record range written since the previous call, if any, and resets tracking.
    pub fn take_dirty(&mut self) -> Option<Range<usize>> {
        self.dirty.take()
    }

    /// Bytes of the records in `range`, together with their byte offset in the buffer.
    pub fn bytes_of_range(&self, range: Range<usize>) -> (usize, &[u8]) {
        let end = range.end.min(self.records.len());
        let start = range.start.min(end);
        (start * R::stride(), bytemuck::cast_slice(&self.records[start..end]))
    }

    fn mark_dirty(&mut self, index: usize) {
        self.dirty = Some(match self.dirty.take() {
            Some(r) => r.start.min(index)..r.end.max(index + 1),
            None => index..index + 1,
        });
    }
}

impl<R: GpuRecord> Extend<R> for RecordBuffer<R> {
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        for r in iter {
            self.push(r);
        }
    }
}

impl<R: GpuRecord> FromIterator<R> for RecordBuffer<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut buf = Self::new();
        buf.extend(iter);
        buf
    }
}

/// Reinterprets reader-side bytes as records.
///
/// `bytes` need not be aligned; every record is copied out.
pub fn read_records<R: GpuRecord>(bytes: &[u8]) -> Result<Vec<R>, LayoutError> {
    let stride = R::stride();
    if bytes.len() % stride != 0 {
        return Err(LayoutError::Truncated { record: R::NAME, stride, len: bytes.len() });
    }
    Ok(bytes.chunks_exact(stride).map(bytemuck::pod_read_unaligned).collect())
}
