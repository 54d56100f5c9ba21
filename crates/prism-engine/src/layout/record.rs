use bytemuck::Pod;

use super::FormatRevision;
use crate::LayoutError;

/// Number of padding bytes that bring `payload` up to a multiple of `align`.
///
/// Padding arrays in records are sized with this instead of hand-counted dummy fields.
#[inline]
pub const fn pad_len(payload: usize, align: usize) -> usize {
    (align - payload % align) % align
}

/// One entry of a record's reader-side field table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
    /// Padding carries no value and is always written as zero.
    pub padding: bool,
}

impl FieldLayout {
    pub const fn data(name: &'static str, offset: usize, size: usize) -> Self {
        Self { name, offset, size, padding: false }
    }

    pub const fn padding(offset: usize, size: usize) -> Self {
        Self { name: "_pad", offset, size, padding: true }
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// A record shared byte-for-byte between the CPU writer and a shader reader.
///
/// `FIELDS` is the reader's view of the record, written out by hand in the order
/// and at the offsets the shader declares. The Rust struct is the writer's view.
/// [`validate_layout`] and the layout tests keep the two in agreement.
pub trait GpuRecord: Pod {
    const NAME: &'static str;

    /// `None` for records identical in every revision.
    const REVISION: Option<FormatRevision>;

    /// Alignment the reader requires of the record stride.
    const ALIGN: usize;

    const FIELDS: &'static [FieldLayout];

    /// Byte stride between consecutive records in a buffer.
    #[inline]
    fn stride() -> usize {
        core::mem::size_of::<Self>()
    }

    /// `true` if the record may be used by a pipeline running `revision`.
    #[inline]
    fn supports(revision: FormatRevision) -> bool {
        Self::REVISION.is_none_or(|r| r == revision)
    }
}

/// Checks a record's field table against its Rust layout.
///
/// Fields must be listed in order, back to back, covering the whole record, and
/// the record size must be a multiple of [`GpuRecord::ALIGN`].
pub fn validate_layout<R: GpuRecord>() -> Result<(), LayoutError> {
    let mut cursor = 0;
    for field in R::FIELDS {
        if field.offset != cursor {
            return Err(LayoutError::FieldOffset {
                record: R::NAME,
                field: field.name,
                expected: cursor,
                actual: field.offset,
            });
        }
        cursor = field.end();
    }

    let size = R::stride();
    if cursor != size {
        return Err(LayoutError::SizeMismatch { record: R::NAME, expected: size, actual: cursor });
    }
    if size % R::ALIGN != 0 {
        return Err(LayoutError::Misaligned { record: R::NAME, size, align: R::ALIGN });
    }
    Ok(())
}

/// Fails if `R` cannot be used by a pipeline running `revision`.
pub fn check_revision<R: GpuRecord>(revision: FormatRevision) -> Result<(), LayoutError> {
    match R::REVISION {
        Some(actual) if actual != revision => Err(LayoutError::RevisionMismatch {
            record: R::NAME,
            expected: revision,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Looks up a field by name in a record's table.
pub fn field<R: GpuRecord>(name: &str) -> Option<&'static FieldLayout> {
    R::FIELDS.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[repr(C)]
    #[derive(Debug, Copy, Clone, Pod, Zeroable)]
    struct Probe {
        a: [f32; 3],
        b: u32,
    }

    impl GpuRecord for Probe {
        const NAME: &'static str = "Probe";
        const REVISION: Option<FormatRevision> = Some(FormatRevision::V1);
        const ALIGN: usize = 16;
        const FIELDS: &'static [FieldLayout] =
            &[FieldLayout::data("a", 0, 12), FieldLayout::data("b", 12, 4)];
    }

    #[repr(C)]
    #[derive(Debug, Copy, Clone, Pod, Zeroable)]
    struct Gappy {
        a: [f32; 4],
    }

    impl GpuRecord for Gappy {
        const NAME: &'static str = "Gappy";
        const REVISION: Option<FormatRevision> = None;
        const ALIGN: usize = 4;
        const FIELDS: &'static [FieldLayout] =
            &[FieldLayout::data("x", 0, 4), FieldLayout::data("z", 8, 4)];
    }

    #[test]
    fn pad_len_reaches_next_multiple() {
        assert_eq!(pad_len(82, 16), 14);
        assert_eq!(pad_len(96, 16), 0);
        assert_eq!(pad_len(8, 16), 8);
        assert_eq!(pad_len(0, 4), 0);
    }

    #[test]
    fn contiguous_table_validates() {
        assert_eq!(validate_layout::<Probe>(), Ok(()));
    }

    #[test]
    fn gap_in_table_is_reported() {
        assert_eq!(
            validate_layout::<Gappy>(),
            Err(LayoutError::FieldOffset { record: "Gappy", field: "z", expected: 4, actual: 8 })
        );
    }

    #[test]
    fn revision_checks() {
        assert!(Probe::supports(FormatRevision::V1));
        assert!(!Probe::supports(FormatRevision::V2));
        assert!(Gappy::supports(FormatRevision::V2));
        assert!(check_revision::<Probe>(FormatRevision::V2).is_err());
        assert_eq!(check_revision::<Gappy>(FormatRevision::V1), Ok(()));
    }

    #[test]
    fn finds_fields_by_name() {
        assert_eq!(field::<Probe>("b").map(|f| f.offset), Some(12));
        assert!(field::<Probe>("c").is_none());
    }
}
