//! Generic message formatter.
//!
//! Renders any topic's raw bytes as a human-readable report using only the
//! topic's registry entry:
//!
//! ```text
//!  adc_report
//! 	timestamp: 1000000  (2.500000 seconds ago)
//! 	device_id: 2180113 (Type: 0x21, I2C:2 (0x44))
//! 	raw_data: [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
//! 	v_ref: 3.3000
//! ```
//!
//! The only failure modes are a buffer of the wrong length and a topic whose
//! descriptor could not be parsed. Field contents never cause an error or a
//! panic; values are printed exactly as the numeric formatting produces them.

use std::fmt;

use thiserror::Error;

use crate::clock::MonotonicTime;
use crate::consts::{DEFAULT_FLOAT_PRECISION, DEVICE_ID_SUFFIX, ELAPSED_PRECISION};
use crate::descriptor::{Layout, LayoutField, PrimitiveKind};
use crate::device_id::DeviceId;
use crate::raw::{RawReader, Scalar};
use crate::registry::TopicEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Buffer length differs from the topic's record size.
    #[error("topic '{topic}' expects {expected} bytes, got {actual}")]
    SizeMismatch {
        topic: String,
        expected: usize,
        actual: usize,
    },

    /// Topic registered with a malformed descriptor.
    #[error("topic '{topic}' has no usable field descriptor")]
    NoLayout { topic: String },
}

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Decimal places for `float`/`double` fields.
    pub float_precision: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

/// Format one message of `entry`'s topic.
///
/// `now` is the monotonic clock sample used for the freshness line.
///
/// # Errors
///
/// - `SizeMismatch` if `buf.len() != entry.byte_size()`; nothing is read.
/// - `NoLayout` if the topic's descriptor was malformed.
pub fn format(entry: &TopicEntry, buf: &[u8], now: MonotonicTime) -> Result<String, FormatError> {
    format_with(entry, buf, now, FormatOptions::default())
}

/// [`format`] with explicit options.
pub fn format_with(
    entry: &TopicEntry,
    buf: &[u8],
    now: MonotonicTime,
    options: FormatOptions,
) -> Result<String, FormatError> {
    Ok(MessageView::new(entry, buf, now, options)?.to_string())
}

/// A validated message ready to render through `Display`.
///
/// Lets callers stream the report into any `fmt::Write` sink without an
/// intermediate `String`.
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    name: &'a str,
    layout: &'a Layout,
    reader: RawReader<'a>,
    now: MonotonicTime,
    options: FormatOptions,
}

impl<'a> MessageView<'a> {
    pub fn new(
        entry: &'a TopicEntry,
        buf: &'a [u8],
        now: MonotonicTime,
        options: FormatOptions,
    ) -> Result<Self, FormatError> {
        if buf.len() != entry.byte_size() {
            return Err(FormatError::SizeMismatch {
                topic: entry.name().to_string(),
                expected: entry.byte_size(),
                actual: buf.len(),
            });
        }
        let layout = entry.layout().ok_or_else(|| FormatError::NoLayout {
            topic: entry.name().to_string(),
        })?;
        Ok(Self {
            name: entry.name(),
            layout,
            reader: RawReader::new(buf),
            now,
            options,
        })
    }

    fn write_timestamp(&self, f: &mut fmt::Formatter<'_>, field: &LayoutField) -> fmt::Result {
        match self.reader.read_u64(field.offset) {
            Some(0) => writeln!(f),
            Some(stamp) => writeln!(
                f,
                "\t{}: {}  ({:.prec$} seconds ago)",
                field.name,
                stamp,
                self.now.seconds_since(stamp),
                prec = ELAPSED_PRECISION
            ),
            None => writeln!(f, "\t{}: <out of bounds>", field.name),
        }
    }

    fn write_field(&self, f: &mut fmt::Formatter<'_>, field: &LayoutField) -> fmt::Result {
        write!(f, "\t{}: ", field.name)?;

        if self.reader.bytes(field.offset, field.size()).is_none() {
            return writeln!(f, "<out of bounds>");
        }

        if field.kind == PrimitiveKind::Char && field.is_array() {
            return self.write_text(f, field);
        }

        if is_device_id(field) {
            if let Some(raw) = self.reader.read_u32(field.offset) {
                return writeln!(f, "{} ({})", raw, DeviceId(raw));
            }
        }

        if field.is_array() {
            f.write_str("[")?;
            for i in 0..field.array_len {
                if i > 0 {
                    f.write_str(", ")?;
                }
                self.write_element(f, field.kind, field.offset + i * field.kind.width())?;
            }
            f.write_str("]")?;
        } else {
            self.write_element(f, field.kind, field.offset)?;
        }
        writeln!(f)
    }

    /// Char arrays print as a quoted, NUL-terminated string.
    fn write_text(&self, f: &mut fmt::Formatter<'_>, field: &LayoutField) -> fmt::Result {
        let bytes = self
            .reader
            .bytes(field.offset, field.size())
            .unwrap_or_default();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        writeln!(f, "\"{}\"", String::from_utf8_lossy(&bytes[..end]))
    }

    fn write_element(
        &self,
        f: &mut fmt::Formatter<'_>,
        kind: PrimitiveKind,
        offset: usize,
    ) -> fmt::Result {
        match self.reader.scalar(kind, offset) {
            Some(Scalar::Unsigned(v)) => write!(f, "{v}"),
            Some(Scalar::Signed(v)) => write!(f, "{v}"),
            Some(Scalar::Float(v)) => write!(f, "{v:.prec$}", prec = self.options.float_precision),
            Some(Scalar::Bool(v)) => f.write_str(if v { "True" } else { "False" }),
            Some(Scalar::Char(c)) => write!(f, "{}", char::from(c)),
            None => f.write_str("?"),
        }
    }
}

impl fmt::Display for MessageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " {}", self.name)?;

        let stamp = self.layout.timestamp_field();
        if let Some(field) = stamp {
            self.write_timestamp(f, field)?;
        }

        let rest = &self.layout.fields()[usize::from(stamp.is_some())..];
        for field in rest.iter().filter(|field| !field.is_padding()) {
            self.write_field(f, field)?;
        }
        Ok(())
    }
}

/// `uint32_t` scalars named `*device_id` carry a packed device identifier.
fn is_device_id(field: &LayoutField) -> bool {
    field.kind == PrimitiveKind::U32 && !field.is_array() && field.name.ends_with(DEVICE_ID_SUFFIX)
}
