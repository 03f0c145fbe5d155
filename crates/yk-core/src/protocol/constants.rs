//! Protocol constants for the YubiKey HID interface.
//!
//! Derived from Yubico `ykdef.h` / `ykcore_backend.h`.

// ============================================================================
// Device Identification
// ============================================================================

/// Yubico AB Vendor ID
pub const YUBICO_VID: u16 = 0x1050;

pub const PID_YUBIKEY: u16 = 0x0010;
pub const PID_NEO_OTP: u16 = 0x0110;
pub const PID_NEO_OTP_CCID: u16 = 0x0111;
pub const PID_NEO_CCID: u16 = 0x0112;
pub const PID_NEO_U2F: u16 = 0x0113;
pub const PID_NEO_OTP_U2F: u16 = 0x0114;
pub const PID_NEO_U2F_CCID: u16 = 0x0115;
pub const PID_NEO_OTP_U2F_CCID: u16 = 0x0116;
pub const PID_YK4_OTP: u16 = 0x0401;
pub const PID_YK4_U2F: u16 = 0x0402;
pub const PID_YK4_OTP_U2F: u16 = 0x0403;
pub const PID_YK4_CCID: u16 = 0x0404;
pub const PID_YK4_OTP_CCID: u16 = 0x0405;
pub const PID_YK4_U2F_CCID: u16 = 0x0406;
pub const PID_YK4_OTP_U2F_CCID: u16 = 0x0407;
pub const PID_PLUS_U2F_OTP: u16 = 0x0410;

/// Product IDs exposing the OTP (HID keyboard) interface.
pub const OTP_PIDS: &[u16] = &[
    PID_YUBIKEY,
    PID_NEO_OTP,
    PID_NEO_OTP_CCID,
    PID_NEO_OTP_U2F,
    PID_NEO_OTP_U2F_CCID,
    PID_YK4_OTP,
    PID_YK4_OTP_U2F,
    PID_YK4_OTP_CCID,
    PID_YK4_OTP_U2F_CCID,
    PID_PLUS_U2F_OTP,
];

// ============================================================================
// USB HID
// ============================================================================

pub const HID_GET_REPORT: u8 = 0x01;
pub const HID_SET_REPORT: u8 = 0x09;
pub const REPORT_TYPE_FEATURE: u16 = 0x03;
pub const FEATURE_RPT_SIZE: usize = 8;
/// Data bytes carried per feature report (the 8th is the trailer).
pub const FEATURE_RPT_DATA_SIZE: usize = 7;
pub const USB_TIMEOUT_MS: u64 = 2000;

// ============================================================================
// Status byte flags (ykdef.h "low level interface #2.3")
// ============================================================================

/// Write flag - set by app, cleared by device.
pub const SLOT_WRITE_FLAG: u8 = 0x80;
/// Response pending flag.
pub const RESP_PENDING_FLAG: u8 = 0x40;
/// Waiting for timeout operation - seconds left in lower 5 bits.
pub const RESP_TIMEOUT_WAIT_FLAG: u8 = 0x20;
pub const RESP_TIMEOUT_WAIT_MASK: u8 = 0x1F;
/// Response sequence number within a pending response.
pub const RESP_SEQ_MASK: u8 = 0x1F;

/// Trailer of the dummy write that takes the device out of response mode.
pub const DUMMY_REPORT_WRITE: u8 = 0x8F;

// ============================================================================
// Frame layout
// ============================================================================

pub const SLOT_DATA_SIZE: usize = 64;
/// payload + command + crc + filler
pub const FRAME_SIZE: usize = 70;

pub const SHA1_MAX_BLOCK_SIZE: usize = 64;
pub const SHA1_DIGEST_SIZE: usize = 20;
/// Bytes returned for a Yubico OTP challenge.
pub const OTP_CHALRESP_SIZE: usize = 16;
pub const UID_SIZE: usize = 6;
pub const FIXED_SIZE: usize = 16;
pub const KEY_SIZE: usize = 16;
pub const KEY_SIZE_OATH: usize = 20;
pub const ACC_CODE_SIZE: usize = 6;
pub const NDEF_DATA_SIZE: usize = 54;
pub const SCAN_MAP_SIZE: usize = 45;

// ============================================================================
// Slot commands (Host -> Device)
// ============================================================================

pub mod slot {
    /// First (default / V1) configuration
    pub const CONFIG: u8 = 0x01;
    /// Second (V2) configuration
    pub const CONFIG2: u8 = 0x03;
    pub const UPDATE1: u8 = 0x04;
    pub const UPDATE2: u8 = 0x05;
    /// Swap configurations 1 and 2
    pub const SWAP: u8 = 0x06;
    /// NEO NDEF, slot 1
    pub const NDEF: u8 = 0x08;
    pub const NDEF2: u8 = 0x09;
    pub const DEVICE_SERIAL: u8 = 0x10;
    pub const DEVICE_CONFIG: u8 = 0x11;
    pub const SCAN_MAP: u8 = 0x12;
    pub const YK4_CAPABILITIES: u8 = 0x13;
    /// 6 byte challenge to slot 1, Yubico OTP response
    pub const CHAL_OTP1: u8 = 0x20;
    pub const CHAL_OTP2: u8 = 0x28;
    /// 64 byte challenge to slot 1, HMAC-SHA1 response
    pub const CHAL_HMAC1: u8 = 0x30;
    pub const CHAL_HMAC2: u8 = 0x38;

    /// Symbolic name of a slot command, for logs.
    pub fn name(command: u8) -> Option<&'static str> {
        Some(match command {
            CONFIG => "SLOT_CONFIG",
            CONFIG2 => "SLOT_CONFIG2",
            UPDATE1 => "SLOT_UPDATE1",
            UPDATE2 => "SLOT_UPDATE2",
            SWAP => "SLOT_SWAP",
            NDEF => "SLOT_NDEF",
            NDEF2 => "SLOT_NDEF2",
            DEVICE_SERIAL => "SLOT_DEVICE_SERIAL",
            DEVICE_CONFIG => "SLOT_DEVICE_CONFIG",
            SCAN_MAP => "SLOT_SCAN_MAP",
            YK4_CAPABILITIES => "SLOT_YK4_CAPABILITIES",
            CHAL_OTP1 => "SLOT_CHAL_OTP1",
            CHAL_OTP2 => "SLOT_CHAL_OTP2",
            CHAL_HMAC1 => "SLOT_CHAL_HMAC1",
            CHAL_HMAC2 => "SLOT_CHAL_HMAC2",
            _ => return None,
        })
    }

    /// True for commands whose payload is a `config_st` slot configuration.
    pub fn is_slot_config(command: u8) -> bool {
        matches!(command, CONFIG | CONFIG2 | UPDATE1 | UPDATE2 | SWAP)
    }
}

// ============================================================================
// USB modes (DEVICE_CONFIG)
// ============================================================================

pub mod mode {
    pub const OTP: u8 = 0x00;
    pub const CCID: u8 = 0x01;
    pub const OTP_CCID: u8 = 0x02;
    pub const U2F: u8 = 0x03;
    pub const OTP_U2F: u8 = 0x04;
    pub const U2F_CCID: u8 = 0x05;
    pub const OTP_U2F_CCID: u8 = 0x06;
    pub const MASK: u8 = 0x07;
    pub const FLAG_EJECT: u8 = 0x80;
}

/// Tag of the capability bitmask in the YubiKey 4 capabilities TLV blob.
pub const YK4_CAPA_TAG: u8 = 0x01;

/// Bit in touch_level marking configuration 1 valid (firmware >= 2.1).
pub const CONFIG1_VALID: u16 = 0x01;
pub const CONFIG2_VALID: u16 = 0x02;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_splits_into_ten_reports() {
        assert_eq!(FRAME_SIZE, 10 * FEATURE_RPT_DATA_SIZE);
        assert_eq!(FEATURE_RPT_SIZE, FEATURE_RPT_DATA_SIZE + 1);
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(slot::name(slot::CHAL_HMAC2), Some("SLOT_CHAL_HMAC2"));
        assert_eq!(slot::name(0x7F), None);
        assert!(slot::is_slot_config(slot::SWAP));
        assert!(!slot::is_slot_config(slot::NDEF));
    }

    #[test]
    fn test_otp_pids_exclude_u2f_only() {
        assert!(OTP_PIDS.contains(&PID_YUBIKEY));
        assert!(!OTP_PIDS.contains(&PID_NEO_U2F));
        assert!(!OTP_PIDS.contains(&PID_YK4_CCID));
    }
}
