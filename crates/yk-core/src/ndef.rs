//! YubiKey NEO payloads: NDEF tag, DEVICE_CONFIG and scan map.
//!
//! These share the frame envelope with slot configurations but carry their
//! own payload layouts and no internal CRC.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Result, YkError};
use crate::protocol::Frame;
use crate::protocol::constants::{
    ACC_CODE_SIZE, NDEF_DATA_SIZE, SCAN_MAP_SIZE, SLOT_DATA_SIZE, mode, slot,
};
use crate::util::decode_input;

pub const NDEF_URI_TYPE: u8 = b'U';
pub const NDEF_TEXT_TYPE: u8 = b'T';

/// URI identifier codes (NFC Forum RTD URI 1.0).
pub const URI_IDENTIFIERS: &[(u8, &str)] = &[
    (0x01, "http://www."),
    (0x02, "https://www."),
    (0x03, "http://"),
    (0x04, "https://"),
    (0x05, "tel:"),
    (0x06, "mailto:"),
    (0x07, "ftp://anonymous:anonymous@"),
    (0x08, "ftp://ftp."),
    (0x09, "ftps://"),
    (0x0a, "sftp://"),
    (0x0b, "smb://"),
    (0x0c, "nfs://"),
    (0x0d, "ftp://"),
    (0x0e, "dav://"),
    (0x0f, "news:"),
    (0x10, "telnet://"),
    (0x11, "imap:"),
    (0x12, "rtsp://"),
    (0x13, "urn:"),
    (0x14, "pop:"),
    (0x15, "sip:"),
    (0x16, "sips:"),
    (0x17, "tftp:"),
    (0x18, "btspp://"),
    (0x19, "btl2cap://"),
    (0x1a, "btgoep://"),
    (0x1b, "tcpobex://"),
    (0x1c, "irdaobex://"),
    (0x1d, "file://"),
    (0x1e, "urn:epc:id:"),
    (0x1f, "urn:epc:tag:"),
    (0x20, "urn:epc:pat:"),
    (0x21, "urn:epc:raw:"),
    (0x22, "urn:epc:"),
    (0x23, "urn:nfc:"),
];

/// Kind of NDEF record and its type-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NdefKind {
    Uri,
    Text { language: String, utf16: bool },
    /// Raw type byte, data sent as is.
    Other(u8),
}

/// NDEF tag emitted over NFC.
///
/// ```text
/// [len] [type] [data:54] [acc_code:6]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ndef {
    data: Vec<u8>,
    kind: NdefKind,
    access_code: [u8; ACC_CODE_SIZE],
}

impl Ndef {
    pub fn uri(uri: &str) -> Self {
        Self::with_kind(uri.as_bytes(), NdefKind::Uri)
    }

    /// Text record. With `utf16` the body is UTF-16 big-endian without a
    /// BOM, which is what readers assume when none is present.
    pub fn text(text: &str, language: &str, utf16: bool) -> Self {
        let body: Vec<u8> = if utf16 {
            text.encode_utf16().flat_map(u16::to_be_bytes).collect()
        } else {
            text.as_bytes().to_vec()
        };
        Self::with_kind(
            &body,
            NdefKind::Text {
                language: language.to_string(),
                utf16,
            },
        )
    }

    pub fn custom(ndef_type: u8, data: &[u8]) -> Self {
        Self::with_kind(data, NdefKind::Other(ndef_type))
    }

    fn with_kind(data: &[u8], kind: NdefKind) -> Self {
        Self {
            data: data.to_vec(),
            kind,
            access_code: [0u8; ACC_CODE_SIZE],
        }
    }

    /// Current access code of the NEO, if it has one.
    pub fn with_access_code(mut self, code: &[u8]) -> Result<Self> {
        let code = decode_input(code)?;
        if code.len() != ACC_CODE_SIZE {
            return Err(YkError::invalid("Access code must be exactly 6 bytes"));
        }
        self.access_code.copy_from_slice(&code);
        Ok(self)
    }

    pub fn kind(&self) -> &NdefKind {
        &self.kind
    }

    pub fn type_byte(&self) -> u8 {
        match self.kind {
            NdefKind::Uri => NDEF_URI_TYPE,
            NdefKind::Text { .. } => NDEF_TEXT_TYPE,
            NdefKind::Other(t) => t,
        }
    }

    /// Record payload as stored in the data field.
    pub fn encoded_data(&self) -> Vec<u8> {
        match &self.kind {
            NdefKind::Uri => encode_uri(&self.data),
            NdefKind::Text { language, utf16 } => {
                // Status byte: language length, bit 7 set for UTF-16.
                let mut status = language.len() as u8 & 0x3f;
                if *utf16 {
                    status |= 0x80;
                }
                let mut out = vec![status];
                out.extend_from_slice(language.as_bytes());
                out.extend_from_slice(&self.data);
                out
            }
            NdefKind::Other(_) => self.data.clone(),
        }
    }

    pub fn to_bytes(&self) -> Result<[u8; SLOT_DATA_SIZE]> {
        let data = self.encoded_data();
        if data.len() > NDEF_DATA_SIZE {
            return Err(YkError::invalid(format!(
                "NDEF payload too long ({} > {})",
                data.len(),
                NDEF_DATA_SIZE
            )));
        }
        let mut out = [0u8; SLOT_DATA_SIZE];
        out[0] = data.len() as u8;
        out[1] = self.type_byte();
        out[2..2 + data.len()].copy_from_slice(&data);
        let acc = 2 + NDEF_DATA_SIZE;
        out[acc..acc + ACC_CODE_SIZE].copy_from_slice(&self.access_code);
        Ok(out)
    }

    /// Frame writing this tag to NDEF slot 1 or 2.
    pub fn to_frame(&self, slot_num: u8) -> Result<Frame> {
        let command = match slot_num {
            1 => slot::NDEF,
            2 => slot::NDEF2,
            _ => return Err(YkError::UnsupportedSlot(slot_num)),
        };
        Frame::new(command, &self.to_bytes()?)
    }
}

/// Replace a well known prefix with its one byte identifier code; 0x00
/// when none matches.
fn encode_uri(uri: &[u8]) -> Vec<u8> {
    let found = URI_IDENTIFIERS.iter().find(|(_, prefix)| {
        uri.len() >= prefix.len() && uri[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    });
    match found {
        Some((code, prefix)) => {
            let mut out = vec![*code];
            out.extend_from_slice(&uri[prefix.len()..]);
            out
        }
        None => {
            let mut out = vec![0x00];
            out.extend_from_slice(uri);
            out
        }
    }
}

/// NEO DEVICE_CONFIG: USB mode and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub mode: u8,
    /// Challenge-response timeout in seconds.
    pub cr_timeout: u8,
    /// Auto eject time in units of 10 seconds.
    pub auto_eject_time: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(mode::OTP)
    }
}

impl DeviceConfig {
    pub fn new(usb_mode: u8) -> Self {
        Self {
            mode: usb_mode,
            cr_timeout: 0,
            auto_eject_time: 0,
        }
    }

    pub fn cr_timeout(mut self, seconds: u8) -> Self {
        self.cr_timeout = seconds;
        self
    }

    pub fn auto_eject_time(mut self, time: u16) -> Self {
        self.auto_eject_time = time;
        self
    }

    /// `<mode> <cr_timeout> <auto_eject_time: u16 LE>`
    pub fn to_bytes(&self) -> [u8; 4] {
        let mut buf = Vec::with_capacity(4);
        buf.push(self.mode);
        buf.push(self.cr_timeout);
        // Writing into a Vec cannot fail.
        let _ = buf.write_u16::<LittleEndian>(self.auto_eject_time);
        let mut out = [0u8; 4];
        out.copy_from_slice(&buf);
        out
    }

    pub fn to_frame(&self) -> Result<Frame> {
        let mut payload = [0u8; SLOT_DATA_SIZE];
        payload[..4].copy_from_slice(&self.to_bytes());
        Frame::new(slot::DEVICE_CONFIG, &payload)
    }
}

/// Keyboard scan code map of a NEO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMap {
    map: [u8; SCAN_MAP_SIZE],
}

impl ScanMap {
    /// Exactly 45 bytes, raw or `h:` hex.
    pub fn new(data: &[u8]) -> Result<Self> {
        let data = decode_input(data)?;
        if data.len() != SCAN_MAP_SIZE {
            return Err(YkError::invalid(format!(
                "Scan map must be exactly {} bytes",
                SCAN_MAP_SIZE
            )));
        }
        let mut map = [0u8; SCAN_MAP_SIZE];
        map.copy_from_slice(&data);
        Ok(Self { map })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    pub fn to_frame(&self) -> Result<Frame> {
        let mut payload = [0u8; SLOT_DATA_SIZE];
        payload[..SCAN_MAP_SIZE].copy_from_slice(&self.map);
        Frame::new(slot::SCAN_MAP, &payload)
    }
}
