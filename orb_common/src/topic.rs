//! Contract between generated topic definitions and the registry.

use std::any::{TypeId, type_name};
use std::fmt;

use crate::raw::{RawReader, RawWriter};

/// A concrete record type emitted by the message generator.
///
/// Implementors are `#[repr(C)]` structs whose field order matches
/// [`OrbMessage::FIELDS`] exactly; the generator also emits a compile-time
/// assertion on their size.
pub trait OrbMessage: Copy + Sized + 'static {
    /// Topic name, e.g. `"mavlink_log"`.
    const NAME: &'static str;
    /// Numeric id from the build's topic enumeration.
    const ID: u16;
    /// Field descriptor string.
    const FIELDS: &'static str;

    /// Copy every field, including explicit padding, into `w` in order.
    fn write_raw(&self, w: &mut RawWriter);

    /// Rebuild a record from one raw message. `None` if `r` is too short.
    fn read_raw(r: &RawReader<'_>) -> Option<Self>;

    /// Compiled record size.
    fn byte_size() -> usize {
        core::mem::size_of::<Self>()
    }

    /// Raw message bytes for this record.
    fn to_raw(&self) -> Vec<u8> {
        let mut w = RawWriter::new(Self::byte_size());
        self.write_raw(&mut w);
        w.finish()
    }
}

/// Opaque handle identifying the concrete record type of a topic.
///
/// Topics registered from hand-written tables have no Rust type behind them
/// and carry an untyped tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    type_id: Option<TypeId>,
    type_name: &'static str,
}

impl TypeTag {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            type_name: type_name::<T>(),
        }
    }

    /// Tag for a topic with no Rust record type, labelled `label`.
    pub const fn untyped(label: &'static str) -> Self {
        Self {
            type_id: None,
            type_name: label,
        }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>())
    }

    pub fn is_typed(&self) -> bool {
        self.type_id.is_some()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.type_name).finish()
    }
}
