//! YKFRAME encoding.
//!
//! A frame is 64 bytes of payload plus a command byte and the payload CRC.
//! On the wire it is packed little-endian into 70 bytes and split into ten
//! 8-byte feature reports: 7 data bytes plus a trailer of
//! `SLOT_WRITE_FLAG | sequence`.

use byteorder::{LittleEndian, WriteBytesExt};
use std::fmt;

use super::constants::{
    FEATURE_RPT_DATA_SIZE, FEATURE_RPT_SIZE, FRAME_SIZE, SLOT_DATA_SIZE, SLOT_WRITE_FLAG, slot,
};
use crate::crc::crc16;
use crate::error::{Result, YkError};

/// One 8-byte HID feature report.
pub type FeatureReport = [u8; FEATURE_RPT_SIZE];

/// Command frame sent to the device.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    payload: [u8; SLOT_DATA_SIZE],
    command: u8,
    crc: u16,
}

impl Frame {
    /// Build a frame. An empty payload is sent as 64 zero bytes.
    pub fn new(command: u8, payload: &[u8]) -> Result<Self> {
        let mut buf = [0u8; SLOT_DATA_SIZE];
        if !payload.is_empty() {
            if payload.len() != SLOT_DATA_SIZE {
                return Err(YkError::invalid(format!(
                    "payload must be empty or {} bytes (got {})",
                    SLOT_DATA_SIZE,
                    payload.len()
                )));
            }
            buf.copy_from_slice(payload);
        }
        Ok(Self::from_array(command, buf))
    }

    /// Build a frame carrying no data.
    pub fn empty(command: u8) -> Self {
        Self::from_array(command, [0u8; SLOT_DATA_SIZE])
    }

    fn from_array(command: u8, payload: [u8; SLOT_DATA_SIZE]) -> Self {
        Self {
            crc: crc16(&payload),
            payload,
            command,
        }
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn payload(&self) -> &[u8; SLOT_DATA_SIZE] {
        &self.payload
    }

    pub fn crc(&self) -> u16 {
        self.crc
    }

    /// The 70 byte wire representation.
    pub fn to_wire_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut buf = Vec::with_capacity(FRAME_SIZE);
        buf.extend_from_slice(&self.payload);
        buf.push(self.command);
        // Writing into a Vec cannot fail.
        let _ = buf.write_u16::<LittleEndian>(self.crc);
        buf.resize(FRAME_SIZE, 0);

        let mut out = [0u8; FRAME_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Split the frame into feature reports ready to be written.
    ///
    /// Interior reports with all-zero data are left out; the device keeps
    /// zeros in any position it is not sent. The first and last report are
    /// always present. The trailer carries the chunk index, so an elided
    /// chunk leaves a gap in the sequence.
    pub fn to_feature_reports(&self) -> Vec<FeatureReport> {
        let wire = self.to_wire_bytes();
        let chunks = wire.chunks(FEATURE_RPT_DATA_SIZE);
        let last = chunks.len() - 1;

        chunks
            .enumerate()
            .filter(|(seq, chunk)| *seq == 0 || *seq == last || chunk.iter().any(|&b| b != 0))
            .map(|(seq, chunk)| {
                let mut report = [0u8; FEATURE_RPT_SIZE];
                report[..chunk.len()].copy_from_slice(chunk);
                report[FEATURE_RPT_DATA_SIZE] = SLOT_WRITE_FLAG | seq as u8;
                report
            })
            .collect()
    }

    /// Layout hint for a report of a slot configuration frame, for trace logs.
    ///
    /// F = fixed, U = uid, K = key, A = access code, l = fixed length,
    /// E/T/C = ext/ticket/config flags, r = reserved, C R = crc.
    pub fn annotate(&self, report: &FeatureReport) -> &'static str {
        if !slot::is_slot_config(self.command) {
            return "";
        }
        match report[FEATURE_RPT_DATA_SIZE] {
            0x80 | 0x81 => "FFFFFFF",
            0x82 => "FFUUUUU",
            0x83 => "UKKKKKK",
            0x84 => "KKKKKKK",
            0x85 => "KKKAAAA",
            0x86 => "AAlETCr",
            0x87 => "rCR",
            0x89 => " Scr",
            _ => "",
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match slot::name(self.command) {
            Some(name) => write!(f, "Frame({} crc=0x{:04X})", name, self.crc),
            None => write!(f, "Frame(0x{:02X} crc=0x{:04X})", self.command, self.crc),
        }
    }
}
