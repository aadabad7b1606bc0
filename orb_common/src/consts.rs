//! Constants shared by the descriptor language, codec and formatter.
//!
//! Single source of truth; generated topic crates import from here.

/// Name prefix of generator-inserted padding fields.
pub const PADDING_PREFIX: &str = "_padding";

/// Name of the leading freshness timestamp field.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Field name suffix marking a `uint32_t` as a packed device identifier.
pub const DEVICE_ID_SUFFIX: &str = "device_id";

/// Monotonic clock ticks (microseconds) per second.
pub const USEC_PER_SEC: f64 = 1_000_000.0;

/// Decimal places of the "seconds ago" freshness value.
pub const ELAPSED_PRECISION: usize = 6;

/// Default decimal places for float fields.
pub const DEFAULT_FLOAT_PRECISION: usize = 4;

/// Capacity of the fixed device id text buffer.
pub const DEVICE_ID_STR_LEN: usize = 80;
