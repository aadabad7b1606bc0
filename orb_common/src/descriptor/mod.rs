//! Field descriptor language.
//!
//! A descriptor is a flat string listing a record's fields in memory order:
//!
//! ```text
//! uint64_t timestamp;char[127] text;uint8_t severity;
//! ```
//!
//! Each field is `<type>[ '[' N ']' ] <name>;`. Types are the fixed-width
//! primitives of [`PrimitiveKind`]. Struct padding is never implicit between
//! fields the generator emits; it appears as explicit `uint8_t[N] _paddingK`
//! fields.
//!
//! Parsing is available as a lazy, allocation-free iterator ([`fields`]) that
//! borrows from the descriptor, or collected ([`parse`]). [`Layout`] resolves
//! byte offsets for the formatter.

mod kind;
mod layout;

pub use kind::PrimitiveKind;
pub use layout::{Layout, LayoutField};

use thiserror::Error;

use crate::consts::PADDING_PREFIX;

// ─── Error Types ────────────────────────────────────────────────────

/// A descriptor that cannot be parsed (`MalformedDescriptor`).
///
/// Fatal to reflection of the affected topic only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Type token is not a recognised primitive.
    #[error("field {index}: unknown type '{token}'")]
    UnknownType { index: usize, token: String },

    /// Array length is zero, negative or not a number.
    #[error("field {index}: invalid array length in '{token}'")]
    InvalidArrayLength { index: usize, token: String },

    /// Field or record would exceed the largest addressable object.
    #[error("field {index}: '{token}' exceeds the maximum record size")]
    TooLarge { index: usize, token: String },

    /// Segment has no field name after the type.
    #[error("field {index}: missing field name in '{segment}'")]
    MissingName { index: usize, segment: String },

    /// Empty descriptor declared for a non-empty record.
    #[error("empty descriptor for a {byte_size}-byte record")]
    Empty { byte_size: usize },
}

/// Declared record size and descriptor layout disagree.
///
/// Indicates generator/schema drift; surfaced, never silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("descriptor layout is {computed} bytes but record is {declared} bytes")]
pub struct DescriptorMismatch {
    /// Size supplied at registration.
    pub declared: usize,
    /// Size computed from the descriptor.
    pub computed: usize,
}

// ─── FieldSpec ──────────────────────────────────────────────────────

/// One parsed field, borrowing its name from the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec<'a> {
    pub kind: PrimitiveKind,
    /// 1 for scalars.
    pub array_len: usize,
    pub name: &'a str,
}

impl FieldSpec<'_> {
    /// Encoded width of the whole field (element width × length).
    #[inline]
    pub fn size(&self) -> usize {
        self.kind.width().saturating_mul(self.array_len)
    }

    /// Generator-inserted padding field.
    #[inline]
    pub fn is_padding(&self) -> bool {
        self.name.starts_with(PADDING_PREFIX)
    }
}

// ─── Parsing ────────────────────────────────────────────────────────

/// Largest record a descriptor may describe.
pub const MAX_RECORD_SIZE: usize = isize::MAX as usize;

/// Lazy iterator over the fields of a descriptor.
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    rest: &'a str,
    index: usize,
    /// End offset of the fields yielded so far.
    end: usize,
}

/// Iterate the fields of `descriptor` without allocating.
pub fn fields(descriptor: &str) -> Fields<'_> {
    Fields {
        rest: descriptor,
        index: 0,
        end: 0,
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<FieldSpec<'a>, DescriptorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }
            let (segment, rest) = match self.rest.split_once(';') {
                Some((segment, rest)) => (segment, rest),
                None => (self.rest, ""),
            };
            self.rest = rest;

            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let index = self.index;
            self.index += 1;
            let parsed = parse_segment(index, segment).and_then(|spec| {
                self.end = align_up(self.end, spec.kind.align())
                    .checked_add(spec.size())
                    .filter(|&end| end <= MAX_RECORD_SIZE)
                    .ok_or_else(|| DescriptorError::TooLarge {
                        index,
                        token: segment.to_string(),
                    })?;
                Ok(spec)
            });
            if parsed.is_err() {
                self.rest = "";
            }
            return Some(parsed);
        }
    }
}

fn parse_segment(index: usize, segment: &str) -> Result<FieldSpec<'_>, DescriptorError> {
    let (type_token, name) = match segment.split_once(char::is_whitespace) {
        Some((t, n)) => (t, n.trim()),
        None => (segment, ""),
    };

    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(DescriptorError::MissingName {
            index,
            segment: segment.to_string(),
        });
    }

    let (base, array_len) = match type_token.split_once('[') {
        Some((base, len_part)) => {
            let invalid = || DescriptorError::InvalidArrayLength {
                index,
                token: type_token.to_string(),
            };
            let digits = len_part.strip_suffix(']').ok_or_else(invalid)?;
            let len: usize = digits.parse().map_err(|_| invalid())?;
            if len == 0 {
                return Err(invalid());
            }
            (base, len)
        }
        None => (type_token, 1),
    };

    let kind = PrimitiveKind::from_token(base).ok_or_else(|| DescriptorError::UnknownType {
        index,
        token: base.to_string(),
    })?;

    if kind
        .width()
        .checked_mul(array_len)
        .is_none_or(|size| size > MAX_RECORD_SIZE)
    {
        return Err(DescriptorError::TooLarge {
            index,
            token: type_token.to_string(),
        });
    }

    Ok(FieldSpec {
        kind,
        array_len,
        name,
    })
}

/// Parse a whole descriptor into its ordered field list.
pub fn parse(descriptor: &str) -> Result<Vec<FieldSpec<'_>>, DescriptorError> {
    fields(descriptor).collect()
}

/// Parse a descriptor declared for a record of `byte_size` bytes.
///
/// Additionally rejects an empty descriptor when the record is non-empty.
pub fn parse_for_size(
    descriptor: &str,
    byte_size: usize,
) -> Result<Vec<FieldSpec<'_>>, DescriptorError> {
    let specs = parse(descriptor)?;
    if specs.is_empty() && byte_size != 0 {
        return Err(DescriptorError::Empty { byte_size });
    }
    Ok(specs)
}

// ─── Validation ─────────────────────────────────────────────────────

/// Size of a host struct with these fields, in declaration order, with
/// natural alignment and trailing padding to the largest alignment.
pub fn computed_size(specs: &[FieldSpec<'_>]) -> usize {
    let mut offset = 0usize;
    let mut max_align = 1usize;
    for spec in specs {
        let align = spec.kind.align();
        max_align = max_align.max(align);
        offset = align_up(offset, align).saturating_add(spec.size());
    }
    align_up(offset, max_align)
}

/// Whether the fields lay out to exactly `byte_size` bytes.
pub fn validate(specs: &[FieldSpec<'_>], byte_size: usize) -> bool {
    computed_size(specs) == byte_size
}

/// Like [`validate`], reporting both sizes on mismatch.
pub fn check(specs: &[FieldSpec<'_>], byte_size: usize) -> Result<(), DescriptorMismatch> {
    let computed = computed_size(specs);
    if computed == byte_size {
        Ok(())
    } else {
        Err(DescriptorMismatch {
            declared: byte_size,
            computed,
        })
    }
}

#[inline]
pub(crate) const fn align_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align).saturating_mul(align)
}
