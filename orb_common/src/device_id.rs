//! Packed 32-bit device identifier codec.
//!
//! ## Bit layout
//!
//! | Bits  | Field       | Width |
//! |-------|-------------|-------|
//! | 0–2   | bus type    | 3     |
//! | 3–7   | bus number  | 5     |
//! | 8–15  | address     | 8     |
//! | 16–23 | device type | 8     |
//! | 24–31 | reserved    | 8     |
//!
//! Decoding is total: every `u32` is a structurally valid id. Unknown bus
//! type codes render numerically so a dump never aborts on garbage ids.

use std::fmt::{self, Write};

use crate::consts::DEVICE_ID_STR_LEN;

const BUS_TYPE_MASK: u32 = 0x07;
const BUS_MASK: u32 = 0x1F;
const BUS_SHIFT: u32 = 3;
const ADDRESS_SHIFT: u32 = 8;
const DEVTYPE_SHIFT: u32 = 16;
const RESERVED_SHIFT: u32 = 24;

/// Known bus type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeviceBusType {
    Unknown = 0,
    I2c = 1,
    Spi = 2,
    Uavcan = 3,
    Simulation = 4,
    Serial = 5,
    Mavlink = 6,
}

impl DeviceBusType {
    /// Convert from a raw bus type code. Returns `None` for unassigned codes.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::I2c),
            2 => Some(Self::Spi),
            3 => Some(Self::Uavcan),
            4 => Some(Self::Simulation),
            5 => Some(Self::Serial),
            6 => Some(Self::Mavlink),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::I2c => "I2C",
            Self::Spi => "SPI",
            Self::Uavcan => "UAVCAN",
            Self::Simulation => "SIMULATION",
            Self::Serial => "SERIAL",
            Self::Mavlink => "MAVLINK",
        }
    }
}

/// Decoded fields of a device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceIdParts {
    /// Bus type code (3 bits).
    pub bus_type: u8,
    /// Bus instance number (5 bits).
    pub bus: u8,
    /// Device address on the bus.
    pub address: u8,
    /// Driver-specific device type.
    pub devtype: u8,
    /// Upper byte, carried verbatim.
    pub reserved: u8,
}

impl DeviceIdParts {
    /// Pack into a raw id. Bits beyond each field's width are masked off.
    #[inline]
    pub const fn encode(&self) -> u32 {
        (self.bus_type as u32 & BUS_TYPE_MASK)
            | ((self.bus as u32 & BUS_MASK) << BUS_SHIFT)
            | ((self.address as u32) << ADDRESS_SHIFT)
            | ((self.devtype as u32) << DEVTYPE_SHIFT)
            | ((self.reserved as u32) << RESERVED_SHIFT)
    }

    /// Named bus type, `None` for unassigned codes.
    #[inline]
    pub const fn bus_type_kind(&self) -> Option<DeviceBusType> {
        DeviceBusType::from_u8(self.bus_type)
    }
}

/// Encode bus type, bus number, address and device type into a raw id.
#[inline]
pub const fn encode(bus_type: u8, bus: u8, address: u8, devtype: u8) -> u32 {
    DeviceIdParts {
        bus_type,
        bus,
        address,
        devtype,
        reserved: 0,
    }
    .encode()
}

/// Split a raw id into its fields. Never fails.
#[inline]
pub const fn decode(id: u32) -> DeviceIdParts {
    DeviceIdParts {
        bus_type: (id & BUS_TYPE_MASK) as u8,
        bus: ((id >> BUS_SHIFT) & BUS_MASK) as u8,
        address: (id >> ADDRESS_SHIFT) as u8,
        devtype: (id >> DEVTYPE_SHIFT) as u8,
        reserved: (id >> RESERVED_SHIFT) as u8,
    }
}

/// Render `id` as `Type: 0xTT, BUS:N (0xAA)`.
pub fn format(id: u32) -> String {
    DeviceId(id).to_string()
}

/// Render `id` into a fixed-capacity buffer without heap allocation.
pub fn format_into(id: u32) -> heapless::String<DEVICE_ID_STR_LEN> {
    let mut buf = heapless::String::new();
    // The longest rendering is well under capacity; overflow would only truncate.
    let _ = write!(buf, "{}", DeviceId(id));
    buf
}

/// Raw device id with a human-readable `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub u32);

impl DeviceId {
    pub const fn new(bus_type: DeviceBusType, bus: u8, address: u8, devtype: u8) -> Self {
        Self(encode(bus_type as u8, bus, address, devtype))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn parts(self) -> DeviceIdParts {
        decode(self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<DeviceIdParts> for DeviceId {
    fn from(parts: DeviceIdParts) -> Self {
        Self(parts.encode())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.parts();
        write!(f, "Type: 0x{:02X}, ", p.devtype)?;
        match p.bus_type_kind() {
            Some(kind) => f.write_str(kind.as_str())?,
            None => write!(f, "BUS{}", p.bus_type)?,
        }
        write!(f, ":{} (0x{:02X})", p.bus, p.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_places_fields() {
        let id = encode(1, 2, 0x44, 0x21);
        assert_eq!(id, 0x0021_4411);
        let parts = decode(id);
        assert_eq!(parts.bus_type, 1);
        assert_eq!(parts.bus, 2);
        assert_eq!(parts.address, 0x44);
        assert_eq!(parts.devtype, 0x21);
        assert_eq!(parts.reserved, 0);
    }

    #[test]
    fn encode_masks_overwide_fields() {
        let id = encode(0xFF, 0xFF, 0, 0);
        let parts = decode(id);
        assert_eq!(parts.bus_type, 0x07);
        assert_eq!(parts.bus, 0x1F);
    }

    #[test]
    fn format_known_bus() {
        let id = DeviceId::new(DeviceBusType::I2c, 2, 0x44, 0x21);
        assert_eq!(id.to_string(), "Type: 0x21, I2C:2 (0x44)");
        assert_eq!(
            format(encode(2, 1, 0x00, 0x3B)),
            "Type: 0x3B, SPI:1 (0x00)"
        );
    }

    #[test]
    fn format_unknown_bus_falls_back_to_number() {
        let id = encode(7, 3, 0x10, 0x05);
        assert_eq!(format(id), "Type: 0x05, BUS7:3 (0x10)");
    }

    #[test]
    fn format_garbage_ids() {
        for id in [0u32, u32::MAX, 0xDEAD_BEEF, 0x8000_0000] {
            let text = format(id);
            assert!(text.starts_with("Type: 0x"));
        }
        assert_eq!(format(u32::MAX), "Type: 0xFF, BUS7:31 (0xFF)");
        assert_eq!(format(0), "Type: 0x00, UNKNOWN:0 (0x00)");
    }

    #[test]
    fn format_into_matches_format() {
        for id in [0u32, 0x0021_4411, u32::MAX] {
            assert_eq!(format_into(id).as_str(), format(id));
        }
    }

    #[test]
    fn bus_type_names() {
        for code in 0..=6u8 {
            let kind = DeviceBusType::from_u8(code).unwrap();
            assert_eq!(kind as u8, code);
        }
        assert!(DeviceBusType::from_u8(7).is_none());
        assert_eq!(DeviceBusType::Uavcan.as_str(), "UAVCAN");
    }

    #[test]
    fn reserved_byte_preserved() {
        let parts = decode(0xAB00_0000);
        assert_eq!(parts.reserved, 0xAB);
        assert_eq!(parts.encode(), 0xAB00_0000);
    }
}
