//! Resolved field layout with byte offsets.

use super::{
    DescriptorError, DescriptorMismatch, FieldSpec, PrimitiveKind, align_up, parse_for_size,
};
use crate::consts::{PADDING_PREFIX, TIMESTAMP_FIELD};

/// A descriptor field placed at its byte offset within the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutField {
    pub name: String,
    pub kind: PrimitiveKind,
    /// 1 for scalars.
    pub array_len: usize,
    /// Byte offset from the start of the record.
    pub offset: usize,
}

impl LayoutField {
    /// Total width in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.kind.width().saturating_mul(self.array_len)
    }

    /// One past the last byte of this field.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.size())
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.array_len > 1
    }

    #[inline]
    pub fn is_padding(&self) -> bool {
        self.name.starts_with(PADDING_PREFIX)
    }
}

/// Parsed descriptor with offsets resolved under natural alignment.
///
/// Built once per topic at registration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<LayoutField>,
    size: usize,
    align: usize,
}

impl Layout {
    /// Place `specs` in declaration order.
    pub fn from_specs(specs: &[FieldSpec<'_>]) -> Self {
        let mut fields = Vec::with_capacity(specs.len());
        let mut offset = 0usize;
        let mut align = 1usize;

        for spec in specs {
            let field_align = spec.kind.align();
            align = align.max(field_align);
            offset = align_up(offset, field_align);
            fields.push(LayoutField {
                name: spec.name.to_string(),
                kind: spec.kind,
                array_len: spec.array_len,
                offset,
            });
            offset = offset.saturating_add(spec.size());
        }

        Self {
            fields,
            size: align_up(offset, align),
            align,
        }
    }

    /// Parse `descriptor` declared for a `byte_size`-byte record.
    ///
    /// Only grammar errors fail here; size agreement is checked separately
    /// with [`Layout::check`].
    pub fn parse(descriptor: &str, byte_size: usize) -> Result<Self, DescriptorError> {
        let specs = parse_for_size(descriptor, byte_size)?;
        Ok(Self::from_specs(&specs))
    }

    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }

    /// Record size including alignment padding.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Largest field alignment.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Size without trailing padding: the end of the last field that is not
    /// a generator padding field.
    pub fn size_no_padding(&self) -> usize {
        self.fields
            .iter()
            .rev()
            .find(|f| !f.is_padding())
            .map_or(0, LayoutField::end)
    }

    pub fn field(&self, name: &str) -> Option<&LayoutField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The leading `uint64_t timestamp` field, if the record has one.
    pub fn timestamp_field(&self) -> Option<&LayoutField> {
        self.fields
            .first()
            .filter(|f| f.name == TIMESTAMP_FIELD && f.kind == PrimitiveKind::U64 && !f.is_array())
    }

    /// Confirm the layout matches the declared record size.
    pub fn check(&self, byte_size: usize) -> Result<(), DescriptorMismatch> {
        if self.size == byte_size {
            Ok(())
        } else {
            Err(DescriptorMismatch {
                declared: byte_size,
                computed: self.size,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADC_REPORT: &str = "uint64_t timestamp;uint32_t device_id;int32_t[12] raw_data;\
        uint32_t resolution;float v_ref;int16_t[12] channel_id;uint8_t[4] _padding0;";

    #[test]
    fn adc_report_offsets() {
        let layout = Layout::parse(ADC_REPORT, 96).unwrap();
        let offsets: Vec<_> = layout
            .fields()
            .iter()
            .map(|f| (f.name.as_str(), f.offset))
            .collect();
        assert_eq!(
            offsets,
            vec![
                ("timestamp", 0),
                ("device_id", 8),
                ("raw_data", 12),
                ("resolution", 60),
                ("v_ref", 64),
                ("channel_id", 68),
                ("_padding0", 92),
            ]
        );
        assert_eq!(layout.size(), 96);
        assert_eq!(layout.align(), 8);
        assert_eq!(layout.size_no_padding(), 92);
        assert!(layout.check(96).is_ok());
    }

    #[test]
    fn timestamp_field_only_when_first() {
        let layout = Layout::parse("uint64_t timestamp;uint8_t x;", 16).unwrap();
        assert!(layout.timestamp_field().is_some());

        let layout = Layout::parse("uint8_t x;uint64_t timestamp;", 16).unwrap();
        assert!(layout.timestamp_field().is_none());

        let layout = Layout::parse("uint32_t timestamp;", 4).unwrap();
        assert!(layout.timestamp_field().is_none());
    }

    #[test]
    fn empty_layout() {
        let layout = Layout::parse("", 0).unwrap();
        assert_eq!(layout.size(), 0);
        assert_eq!(layout.size_no_padding(), 0);
        assert!(layout.fields().is_empty());
    }

    #[test]
    fn check_mismatch() {
        let layout = Layout::parse("uint32_t a;", 8).unwrap();
        let err = layout.check(8).unwrap_err();
        assert_eq!(err.computed, 4);
        assert_eq!(err.declared, 8);
    }

    #[test]
    fn lookup_by_field_name() {
        let layout = Layout::parse(ADC_REPORT, 96).unwrap();
        let v_ref = layout.field("v_ref").unwrap();
        assert_eq!(v_ref.kind, PrimitiveKind::F32);
        assert!(layout.field("missing").is_none());
    }
}
