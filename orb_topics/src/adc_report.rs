//! `adc_report`: raw samples from an analog-to-digital converter.

use core::mem::{offset_of, size_of};

use orb::device_id::DeviceId;
use orb::raw::{RawReader, RawWriter};
use orb::topic::OrbMessage;
use static_assertions::const_assert_eq;

use crate::OrbId;

/// Channels per report.
pub const MAX_CHANNELS: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct AdcReport {
    pub timestamp: u64,
    /// Packed id of the converter.
    pub device_id: u32,
    /// Conversion result per channel.
    pub raw_data: [i32; MAX_CHANNELS],
    /// Full-scale count.
    pub resolution: u32,
    /// Reference voltage.
    pub v_ref: f32,
    /// Physical channel behind each `raw_data` slot, -1 if unused.
    pub channel_id: [i16; MAX_CHANNELS],
    pub _padding0: [u8; 4],
}

const_assert_eq!(size_of::<AdcReport>(), 96);
const_assert_eq!(offset_of!(AdcReport, _padding0), 92);

impl AdcReport {
    pub fn device(&self) -> DeviceId {
        DeviceId(self.device_id)
    }

    /// Channel reading in volts, if `slot` holds a channel.
    pub fn voltage(&self, slot: usize) -> Option<f32> {
        let raw = *self.raw_data.get(slot)?;
        if self.channel_id[slot] < 0 || self.resolution == 0 {
            return None;
        }
        Some(raw as f32 * self.v_ref / self.resolution as f32)
    }
}

/// Read `N` consecutive elements starting at `offset`.
fn read_array<T: Copy + Default, const N: usize>(
    offset: usize,
    read: impl Fn(usize) -> Option<T>,
) -> Option<[T; N]> {
    let mut out = [T::default(); N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = read(offset + i * size_of::<T>())?;
    }
    Some(out)
}

impl OrbMessage for AdcReport {
    const NAME: &'static str = "adc_report";
    const ID: u16 = OrbId::AdcReport as u16;
    const FIELDS: &'static str = "uint64_t timestamp;uint32_t device_id;int32_t[12] raw_data;\
        uint32_t resolution;float v_ref;int16_t[12] channel_id;uint8_t[4] _padding0;";

    fn write_raw(&self, w: &mut RawWriter) {
        w.put_u64(self.timestamp).put_u32(self.device_id);
        for v in self.raw_data {
            w.put_i32(v);
        }
        w.put_u32(self.resolution).put_f32(self.v_ref);
        for c in self.channel_id {
            w.put_i16(c);
        }
        w.put_bytes(&self._padding0);
    }

    fn read_raw(r: &RawReader<'_>) -> Option<Self> {
        Some(Self {
            timestamp: r.read_u64(offset_of!(Self, timestamp))?,
            device_id: r.read_u32(offset_of!(Self, device_id))?,
            raw_data: read_array(offset_of!(Self, raw_data), |at| r.read_i32(at))?,
            resolution: r.read_u32(offset_of!(Self, resolution))?,
            v_ref: r.read_f32(offset_of!(Self, v_ref))?,
            channel_id: read_array(offset_of!(Self, channel_id), |at| r.read_i16(at))?,
            _padding0: r.bytes(offset_of!(Self, _padding0), 4)?.try_into().ok()?,
        })
    }
}
