//! Status report decoding.

use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;
use std::io::Cursor;

use super::constants::{CONFIG1_VALID, CONFIG2_VALID, FEATURE_RPT_SIZE};
use crate::error::{Result, YkError};

/// Firmware version triple, ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, build: u8) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl From<(u8, u8, u8)> for Version {
    fn from((major, minor, build): (u8, u8, u8)) -> Self {
        Self::new(major, minor, build)
    }
}

/// Status report (`status_st` from ykdef.h, after one skipped byte).
///
/// ```text
/// [x] [major] [minor] [build] [pgm_seq] [touch_level: u16 LE] [flags]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub version_major: u8,
    pub version_minor: u8,
    pub version_build: u8,
    /// Programming sequence number. 0 if no valid configuration.
    pub pgm_seq: u8,
    pub touch_level: u16,
    /// Transport flags of the report this status was decoded from.
    pub flags: u8,
}

impl Status {
    pub const SIZE: usize = FEATURE_RPT_SIZE;

    pub fn parse(data: &[u8; FEATURE_RPT_SIZE]) -> Self {
        // Seven bytes follow the skipped one, exactly what decode reads.
        Self::decode(&data[1..]).unwrap_or_default()
    }

    fn decode(data: &[u8]) -> std::io::Result<Self> {
        let mut cursor = Cursor::new(data);
        Ok(Self {
            version_major: cursor.read_u8()?,
            version_minor: cursor.read_u8()?,
            version_build: cursor.read_u8()?,
            pgm_seq: cursor.read_u8()?,
            touch_level: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u8()?,
        })
    }

    pub fn version(&self) -> Version {
        Version::new(self.version_major, self.version_minor, self.version_build)
    }

    /// Slots holding a valid configuration. Requires firmware 2.1.
    pub fn valid_slots(&self) -> Result<Vec<u8>> {
        if self.version() < Version::new(2, 1, 0) {
            return Err(YkError::unsupported("Valid configs", self.version()));
        }
        let mut slots = Vec::with_capacity(2);
        if self.touch_level & CONFIG1_VALID == CONFIG1_VALID {
            slots.push(1);
        }
        if self.touch_level & CONFIG2_VALID == CONFIG2_VALID {
            slots.push(2);
        }
        Ok(slots)
    }

    /// Re-encode into a report, mainly for simulators.
    pub fn to_report(&self) -> [u8; FEATURE_RPT_SIZE] {
        let touch = self.touch_level.to_le_bytes();
        [
            0,
            self.version_major,
            self.version_minor,
            self.version_build,
            self.pgm_seq,
            touch[0],
            touch[1],
            self.flags,
        ]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "YubiKey version {}, pgm_seq={}, touch_level={}",
            self.version(),
            self.pgm_seq,
            self.touch_level
        )?;
        if let Ok(slots) = self.valid_slots() {
            write!(f, ", valid={:?}", slots)?;
        }
        if self.flags != 0 {
            write!(f, " (flags 0x{:x})", self.flags)?;
        }
        Ok(())
    }
}
