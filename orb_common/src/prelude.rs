//! Prelude module for common re-exports.
//!
//! `use orb_common::prelude::*;` brings in the types needed to register
//! topics and print messages.

// ─── Logging / Configuration ────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Reflection ─────────────────────────────────────────────────────
pub use crate::descriptor::{Layout, LayoutField, PrimitiveKind};
pub use crate::device_id::DeviceId;

// ─── Registry ───────────────────────────────────────────────────────
pub use crate::registry::{
    DescriptorPolicy, Registration, RegistryError, TopicEntry, TopicRegistry,
};
pub use crate::topic::{OrbMessage, TypeTag};

// ─── Formatting ─────────────────────────────────────────────────────
pub use crate::clock::{Clock, MonotonicTime, SystemMonotonic};
pub use crate::format::{FormatError, FormatOptions, format};
