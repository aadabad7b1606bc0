//! ORB Common Library
//!
//! Self-describing topic metadata for the ORB publish/subscribe bus: every
//! topic carries a compact field descriptor so generic tools can decode and
//! print any message without type-specific code.
//!
//! # Module Structure
//!
//! - [`descriptor`] - Field descriptor language and resolved layouts
//! - [`device_id`] - Packed 32-bit device identifier codec
//! - [`registry`] - Write-once topic registry
//! - [`format`] - Generic human-readable message formatter
//! - [`raw`] - Bounds-checked native-endian buffer access
//! - [`clock`] - Monotonic time source for freshness
//! - [`topic`] - Contract implemented by generated record types
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml` with alias for shorter imports:
//! ```toml
//! [dependencies]
//! orb = { package = "orb_common", path = "../orb_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use orb_common::prelude::*;
//!
//! let mut registry = TopicRegistry::new();
//! registry
//!     .register("heartbeat", 1, 8, "uint64_t timestamp;", TypeTag::untyped("heartbeat"))
//!     .unwrap();
//! registry.seal();
//!
//! let entry = registry.lookup_by_name("heartbeat").unwrap();
//! let report = format(entry, &0u64.to_ne_bytes(), MonotonicTime(0)).unwrap();
//! assert_eq!(report, " heartbeat\n\n");
//! ```

pub mod clock;
pub mod config;
pub mod consts;
pub mod descriptor;
pub mod device_id;
pub mod format;
pub mod prelude;
pub mod raw;
pub mod registry;
pub mod topic;
