//! Primitive field kinds understood by the descriptor language.

use std::fmt;

/// A fixed-width native primitive a descriptor field can hold.
///
/// Widths and alignments follow the host C ABI: every kind is aligned to its
/// own width, `bool` and `char` occupy one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrimitiveKind {
    U8 = 0,
    I8 = 1,
    U16 = 2,
    I16 = 3,
    U32 = 4,
    I32 = 5,
    U64 = 6,
    I64 = 7,
    F32 = 8,
    F64 = 9,
    Bool = 10,
    Char = 11,
}

impl PrimitiveKind {
    /// All kinds, in discriminant order.
    pub const ALL: [PrimitiveKind; 12] = [
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::U64,
        Self::I64,
        Self::F32,
        Self::F64,
        Self::Bool,
        Self::Char,
    ];

    /// Resolve a descriptor type token (`uint32_t`, `float`, ...).
    ///
    /// Returns `None` for anything that is not a primitive, including nested
    /// message type names.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "uint8_t" => Some(Self::U8),
            "int8_t" => Some(Self::I8),
            "uint16_t" => Some(Self::U16),
            "int16_t" => Some(Self::I16),
            "uint32_t" => Some(Self::U32),
            "int32_t" => Some(Self::I32),
            "uint64_t" => Some(Self::U64),
            "int64_t" => Some(Self::I64),
            "float" => Some(Self::F32),
            "double" => Some(Self::F64),
            "bool" => Some(Self::Bool),
            "char" => Some(Self::Char),
            _ => None,
        }
    }

    /// Descriptor spelling of this kind.
    pub const fn token(self) -> &'static str {
        match self {
            Self::U8 => "uint8_t",
            Self::I8 => "int8_t",
            Self::U16 => "uint16_t",
            Self::I16 => "int16_t",
            Self::U32 => "uint32_t",
            Self::I32 => "int32_t",
            Self::U64 => "uint64_t",
            Self::I64 => "int64_t",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Bool => "bool",
            Self::Char => "char",
        }
    }

    /// Width of one element in bytes.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Bool | Self::Char => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Natural alignment in bytes.
    #[inline]
    pub const fn align(self) -> usize {
        self.width()
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
