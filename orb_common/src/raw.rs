//! Native-endian access to raw message bytes.
//!
//! [`RawReader`] performs bounds-checked reads at byte offsets and never
//! panics; out-of-range reads return `None`. [`RawWriter`] is used by
//! generated record types to copy themselves into a message buffer laid out
//! exactly as the descriptor describes.

use crate::descriptor::PrimitiveKind;

/// One decoded primitive element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
    Char(u8),
}

// ─── Reader ─────────────────────────────────────────────────────────

/// Borrowed view over one message instance.
#[derive(Debug, Clone, Copy)]
pub struct RawReader<'a> {
    buf: &'a [u8],
}

macro_rules! read_ne {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&self, offset: usize) -> Option<$ty> {
                let bytes = self.bytes(offset, core::mem::size_of::<$ty>())?;
                Some(<$ty>::from_ne_bytes(bytes.try_into().ok()?))
            }
        )*
    };
}

impl<'a> RawReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// `len` bytes starting at `offset`, if entirely in bounds.
    #[inline]
    pub fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.buf.get(offset..end)
    }

    read_ne! {
        read_u8 => u8,
        read_i8 => i8,
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// Decode one element of `kind` at `offset`.
    pub fn scalar(&self, kind: PrimitiveKind, offset: usize) -> Option<Scalar> {
        Some(match kind {
            PrimitiveKind::U8 => Scalar::Unsigned(self.read_u8(offset)?.into()),
            PrimitiveKind::U16 => Scalar::Unsigned(self.read_u16(offset)?.into()),
            PrimitiveKind::U32 => Scalar::Unsigned(self.read_u32(offset)?.into()),
            PrimitiveKind::U64 => Scalar::Unsigned(self.read_u64(offset)?),
            PrimitiveKind::I8 => Scalar::Signed(self.read_i8(offset)?.into()),
            PrimitiveKind::I16 => Scalar::Signed(self.read_i16(offset)?.into()),
            PrimitiveKind::I32 => Scalar::Signed(self.read_i32(offset)?.into()),
            PrimitiveKind::I64 => Scalar::Signed(self.read_i64(offset)?),
            PrimitiveKind::F32 => Scalar::Float(self.read_f32(offset)?.into()),
            PrimitiveKind::F64 => Scalar::Float(self.read_f64(offset)?),
            PrimitiveKind::Bool => Scalar::Bool(self.read_u8(offset)? != 0),
            PrimitiveKind::Char => Scalar::Char(self.read_u8(offset)?),
        })
    }
}

// ─── Writer ─────────────────────────────────────────────────────────

/// Sequential native-endian writer into a zeroed buffer.
///
/// Each `put_*` aligns the cursor to the value's natural alignment first, so
/// the output matches a `#[repr(C)]` struct with the same field order.
/// Writes past the end are dropped.
#[derive(Debug)]
pub struct RawWriter {
    buf: Vec<u8>,
    pos: usize,
}

macro_rules! put_ne {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) -> &mut Self {
                self.put_bytes_aligned(&value.to_ne_bytes(), core::mem::align_of::<$ty>())
            }
        )*
    };
}

impl RawWriter {
    /// Writer for a record of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            buf: vec![0; len],
            pos: 0,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    put_ne! {
        put_u8 => u8,
        put_i8 => i8,
        put_u16 => u16,
        put_i16 => i16,
        put_u32 => u32,
        put_i32 => i32,
        put_u64 => u64,
        put_i64 => i64,
        put_f32 => f32,
        put_f64 => f64,
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_u8(u8::from(value))
    }

    /// Raw bytes at byte alignment (char arrays, padding).
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_bytes_aligned(bytes, 1)
    }

    fn put_bytes_aligned(&mut self, bytes: &[u8], align: usize) -> &mut Self {
        let start = self.pos.div_ceil(align).saturating_mul(align);
        let end = start.saturating_add(bytes.len());
        if let Some(dst) = self.buf.get_mut(start..end) {
            dst.copy_from_slice(bytes);
        }
        self.pos = end;
        self
    }

    /// Finished buffer; bytes never written stay zero.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
