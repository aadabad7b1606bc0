//! `mavlink_log`: text log lines forwarded to the ground station.

use core::mem::{offset_of, size_of};

use orb::raw::{RawReader, RawWriter};
use orb::topic::OrbMessage;
use static_assertions::const_assert_eq;

use crate::OrbId;

/// Capacity of [`MavlinkLog::text`], including the terminating NUL.
pub const TEXT_LEN: usize = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct MavlinkLog {
    /// Monotonic publication time in microseconds. Zero when unset.
    pub timestamp: u64,
    /// NUL-terminated message text.
    pub text: [u8; TEXT_LEN],
    /// MAVLink severity, 0 (emergency) through 7 (debug).
    pub severity: u8,
}

const_assert_eq!(size_of::<MavlinkLog>(), 136);

impl MavlinkLog {
    /// Build a record, truncating `text` so a NUL terminator always fits.
    pub fn new(timestamp: u64, severity: u8, text: &str) -> Self {
        let mut buf = [0u8; TEXT_LEN];
        let len = text.len().min(TEXT_LEN - 1);
        buf[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self {
            timestamp,
            text: buf,
            severity,
        }
    }

    /// Text up to the first NUL.
    pub fn text_lossy(&self) -> String {
        let end = self.text.iter().position(|&b| b == 0).unwrap_or(TEXT_LEN);
        String::from_utf8_lossy(&self.text[..end]).into_owned()
    }
}

impl Default for MavlinkLog {
    fn default() -> Self {
        Self {
            timestamp: 0,
            text: [0; TEXT_LEN],
            severity: 0,
        }
    }
}

impl OrbMessage for MavlinkLog {
    const NAME: &'static str = "mavlink_log";
    const ID: u16 = OrbId::MavlinkLog as u16;
    const FIELDS: &'static str = "uint64_t timestamp;char[127] text;uint8_t severity;";

    fn write_raw(&self, w: &mut RawWriter) {
        w.put_u64(self.timestamp)
            .put_bytes(&self.text)
            .put_u8(self.severity);
    }

    fn read_raw(r: &RawReader<'_>) -> Option<Self> {
        Some(Self {
            timestamp: r.read_u64(offset_of!(Self, timestamp))?,
            text: r.bytes(offset_of!(Self, text), TEXT_LEN)?.try_into().ok()?,
            severity: r.read_u8(offset_of!(Self, severity))?,
        })
    }
}
