//! Numeric topic ids for this build.

use crate::{AdcReport, MavlinkLog};
use orb::topic::OrbMessage;

/// Topic enumeration. Values are dense and start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum OrbId {
    MavlinkLog = 0,
    AdcReport = 1,
}

impl OrbId {
    /// Every id in numeric order.
    pub const ALL: [Self; 2] = [Self::MavlinkLog, Self::AdcReport];

    /// Returns `None` for ids not present in this build.
    #[inline]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::MavlinkLog),
            1 => Some(Self::AdcReport),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::MavlinkLog => MavlinkLog::NAME,
            Self::AdcReport => AdcReport::NAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for id in OrbId::ALL {
            assert_eq!(OrbId::from_u16(id.as_u16()), Some(id));
        }
        assert_eq!(OrbId::from_u16(2), None);
    }

    #[test]
    fn ids_match_record_constants() {
        assert_eq!(OrbId::MavlinkLog.as_u16(), MavlinkLog::ID);
        assert_eq!(OrbId::AdcReport.as_u16(), AdcReport::ID);
        assert_eq!(OrbId::AdcReport.name(), "adc_report");
    }
}
