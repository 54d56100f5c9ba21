/// Fixed ring of per-frame slots.
///
/// The CPU writes slot `frame_index % len` while the GPU may still read the
/// slots of up to `len - 1` earlier frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameRing {
    len: usize,
}

impl FrameRing {
    /// Triple buffering.
    pub const DEFAULT_LEN: usize = 3;

    /// `len` is clamped to at least one slot.
    #[inline]
    pub const fn new(len: usize) -> Self {
        Self { len: if len == 0 { 1 } else { len } }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Slot written during frame `frame_index`.
    #[inline]
    pub const fn slot(&self, frame_index: u64) -> usize {
        (frame_index % self.len as u64) as usize
    }

    /// Slot published by the frame before `frame_index`.
    #[inline]
    pub const fn previous_slot(&self, frame_index: u64) -> usize {
        (self.slot(frame_index) + self.len - 1) % self.len
    }

    /// Byte offset of the frame's slot in a buffer holding `len` records of `stride` bytes.
    #[inline]
    pub const fn slot_offset(&self, frame_index: u64, stride: u64) -> u64 {
        self.slot(frame_index) as u64 * stride
    }

    /// Size of a buffer holding one `stride`-byte record per slot.
    #[inline]
    pub const fn buffer_size(&self, stride: u64) -> u64 {
        self.len as u64 * stride
    }
}

impl Default for FrameRing {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEN)
    }
}
