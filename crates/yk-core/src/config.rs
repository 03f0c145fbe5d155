//! Slot configuration builder (`config_st`).
//!
//! ```text
//! [fixed:16] [uid:6] [key:16] [acc_code:6] [fixed_len] [ext] [tkt] [cfg] [rfu:2] [crc:2] [unlock:6]
//! ```
//!
//! The 52 byte structure is followed by the current access code (if the
//! slot is protected) and zero padded to the 64 byte frame payload.

use byteorder::{LittleEndian, WriteBytesExt};
use std::fmt;

use crate::capabilities::{Capabilities, ChallengeMode};
use crate::crc::crc16;
use crate::error::{Result, YkError};
use crate::flags::{self, FlagDef, FlagKind};
use crate::protocol::Frame;
use crate::protocol::Version;
use crate::protocol::constants::{
    ACC_CODE_SIZE, FIXED_SIZE, KEY_SIZE, KEY_SIZE_OATH, SLOT_DATA_SIZE, UID_SIZE, slot,
};
use crate::util::decode_input;

/// Length of `config_st` without its CRC.
const CONFIG_BODY_SIZE: usize = FIXED_SIZE + UID_SIZE + KEY_SIZE + ACC_CODE_SIZE + 6;

/// Operating mode of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    YubikeyOtp,
    OathHotp,
    ChalResp,
}

impl ConfigMode {
    /// Ticket flag selecting this mode, if any.
    fn ticket_flag(&self) -> Option<&'static str> {
        match self {
            ConfigMode::YubikeyOtp => None,
            ConfigMode::OathHotp => Some("OATH_HOTP"),
            ConfigMode::ChalResp => Some("CHAL_RESP"),
        }
    }
}

impl fmt::Display for ConfigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigMode::YubikeyOtp => write!(f, "YUBIKEY_OTP"),
            ConfigMode::OathHotp => write!(f, "OATH_HOTP"),
            ConfigMode::ChalResp => write!(f, "CHAL_RESP"),
        }
    }
}

/// OATH-HOTP options beyond the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotpOptions {
    /// 6 or 8.
    pub digits: u8,
    /// Initial moving factor seed, stored after the key in the uid field.
    pub factor_seed: Option<u16>,
    /// OATH token identifier: manufacturer prefix, token type and MUI.
    pub omp: u8,
    pub tt: u8,
    pub mui: Vec<u8>,
}

impl Default for HotpOptions {
    fn default() -> Self {
        Self {
            digits: 6,
            factor_seed: None,
            omp: 0,
            tt: 0,
            mui: Vec::new(),
        }
    }
}

/// A slot configuration under construction.
#[derive(Clone)]
pub struct Config {
    fixed: Vec<u8>,
    uid: Vec<u8>,
    key: Vec<u8>,
    access_code: Vec<u8>,
    ticket_flags: u8,
    config_flags: u8,
    extended_flags: u8,
    unlock_code: Vec<u8>,
    mode: Option<ConfigMode>,
    update: bool,
    swap: bool,
    zap: bool,
    required: Version,
    target: Option<Version>,
    capabilities: Capabilities,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, Capabilities::permissive())
    }
}

impl Config {
    /// Start an empty configuration.
    ///
    /// With a `target` version, anything the target cannot do is rejected
    /// as it is set instead of when the device is programmed.
    pub fn new(target: Option<Version>, capabilities: Capabilities) -> Self {
        Self {
            fixed: Vec::new(),
            uid: Vec::new(),
            key: Vec::new(),
            access_code: Vec::new(),
            ticket_flags: 0,
            config_flags: 0,
            extended_flags: 0,
            unlock_code: Vec::new(),
            mode: None,
            update: false,
            swap: false,
            zap: false,
            required: Version::new(0, 0, 0),
            target,
            capabilities,
        }
    }

    /// Update selected parts of an existing configuration instead of
    /// overwriting it. Requires 2.3 and ALLOW_UPDATE in the current slot.
    pub fn enable_update(&mut self) -> Result<()> {
        self.require_version(2, 3)?;
        self.update = true;
        Ok(())
    }

    /// Swap the configurations in slot 1 and 2. Requires 2.3.
    pub fn enable_swap(&mut self) -> Result<()> {
        self.require_version(2, 3)?;
        self.swap = true;
        Ok(())
    }

    /// Delete the slot's configuration.
    pub fn enable_zap(&mut self) {
        self.zap = true;
    }

    /// Minimum firmware this configuration needs.
    pub fn version_required(&self) -> Version {
        self.required
    }

    pub fn mode(&self) -> Option<ConfigMode> {
        self.mode
    }

    pub fn ticket_flags(&self) -> u8 {
        self.ticket_flags
    }

    pub fn config_flags(&self) -> u8 {
        self.config_flags
    }

    pub fn extended_flags(&self) -> u8 {
        self.extended_flags
    }

    pub fn fixed(&self) -> &[u8] {
        &self.fixed
    }

    pub fn uid(&self) -> &[u8] {
        &self.uid
    }

    /// Set the fixed string (public id, or OATH token identifier), 0..16
    /// bytes.
    pub fn fixed_string(&mut self, data: &[u8]) -> Result<()> {
        let new = decode_input(data)?;
        if new.len() > FIXED_SIZE {
            return Err(YkError::invalid(format!(
                "The \"fixed\" string must be 0..{} bytes",
                FIXED_SIZE
            )));
        }
        self.fixed = new;
        Ok(())
    }

    /// Send the fixed string as raw scan codes instead of modhex. Requires
    /// 2.0 and cannot be undone short of rebuilding the configuration.
    pub fn enable_extended_scan_code_mode(&mut self) -> Result<()> {
        if !self.capabilities.have_extended_scan_code_mode() {
            return Err(YkError::unsupported(
                "Extended scan code mode",
                self.capabilities.version(),
            ));
        }
        self.require_version(2, 0)?;
        self.config_flag("SHORT_TICKET", Some(true))?;
        self.config_flag("STATIC_TICKET", Some(false))?;
        Ok(())
    }

    /// Send a shifted 1 (typically '!') before anything else. Requires 2.0.
    pub fn enable_shifted_1(&mut self) -> Result<()> {
        if !self.capabilities.have_shifted_1_mode() {
            return Err(YkError::unsupported("Shifted 1 mode", self.capabilities.version()));
        }
        self.require_version(2, 0)?;
        self.config_flag("STRONG_PW2", Some(true))?;
        self.config_flag("SEND_REF", Some(true))?;
        Ok(())
    }

    /// AES-128 key, exactly 16 bytes after decoding.
    pub fn aes_key(&mut self, data: &[u8]) -> Result<()> {
        let new = decode_input(data)?;
        if new.len() != KEY_SIZE {
            return Err(YkError::invalid("AES128 key must be exactly 16 bytes"));
        }
        self.key = new;
        Ok(())
    }

    /// Current access code, needed to reprogram a protected slot. Also
    /// becomes the new access code unless one was set explicitly.
    pub fn unlock_key(&mut self, data: &[u8]) -> Result<()> {
        let new = decode_input(data)?;
        if new.len() != ACC_CODE_SIZE {
            return Err(YkError::invalid("Unlock key must be exactly 6 bytes"));
        }
        if self.access_code.is_empty() {
            self.access_code = new.clone();
        }
        self.unlock_code = new;
        Ok(())
    }

    /// Access code required for future reprogramming.
    pub fn access_key(&mut self, data: &[u8]) -> Result<()> {
        let new = decode_input(data)?;
        if new.len() != ACC_CODE_SIZE {
            return Err(YkError::invalid("Access key must be exactly 6 bytes"));
        }
        self.access_code = new;
        Ok(())
    }

    /// Standard Yubico OTP.
    pub fn mode_yubikey_otp(&mut self, private_uid: &[u8], aes_key: &[u8]) -> Result<()> {
        if !self.capabilities.have_yubico_otp() {
            return Err(YkError::unsupported("Yubico OTP", self.capabilities.version()));
        }
        let uid = decode_input(private_uid)?;
        if uid.len() != UID_SIZE {
            return Err(YkError::invalid(format!(
                "Private UID must be {} bytes",
                UID_SIZE
            )));
        }
        self.change_mode(ConfigMode::YubikeyOtp, 0, 9)?;
        self.uid = uid;
        self.aes_key(aes_key)
    }

    /// OATH-HOTP. Requires 2.1.
    pub fn mode_oath_hotp(&mut self, secret: &[u8], options: &HotpOptions) -> Result<()> {
        if !self.capabilities.have_oath_hotp() {
            return Err(YkError::unsupported("OATH HOTP", self.capabilities.version()));
        }
        if options.digits != 6 && options.digits != 8 {
            return Err(YkError::invalid("OATH-HOTP digits must be 6 or 8"));
        }
        self.change_mode(ConfigMode::OathHotp, 2, 1)?;
        self.set_20_bytes_key(secret)?;
        if options.digits == 8 {
            self.config_flag("OATH_HOTP8", Some(true))?;
        }
        if options.omp != 0 || options.tt != 0 || !options.mui.is_empty() {
            let mut fixed = vec![options.omp, options.tt];
            fixed.extend(decode_input(&options.mui)?);
            if fixed.len() > FIXED_SIZE {
                return Err(YkError::invalid(format!(
                    "The \"fixed\" string must be 0..{} bytes",
                    FIXED_SIZE
                )));
            }
            self.fixed = fixed;
        }
        if let Some(seed) = options.factor_seed {
            self.uid.extend_from_slice(&seed.to_le_bytes());
        }
        Ok(())
    }

    /// Challenge-response. Requires 2.2.
    ///
    /// HMAC takes a 20 byte secret, OTP a 16 byte AES key. `variable` only
    /// applies to HMAC.
    pub fn mode_challenge_response(
        &mut self,
        secret: &[u8],
        mode: ChallengeMode,
        variable: bool,
        require_button: bool,
    ) -> Result<()> {
        if !self.capabilities.have_challenge_response(mode) {
            return Err(YkError::unsupported(
                format!("{} Challenge-Response", mode),
                self.capabilities.version(),
            ));
        }
        self.change_mode(ConfigMode::ChalResp, 2, 2)?;
        match mode {
            ChallengeMode::Hmac => {
                self.config_flag("CHAL_HMAC", Some(true))?;
                self.config_flag("HMAC_LT64", Some(variable))?;
                self.set_20_bytes_key(secret)?;
            }
            ChallengeMode::Otp => {
                self.config_flag("CHAL_YUBICO", Some(true))?;
                self.aes_key(secret)?;
            }
        }
        self.config_flag("CHAL_BTN_TRIG", Some(require_button))?;
        Ok(())
    }

    /// Get a ticket flag, and set or clear it if `new` is given. Returns the
    /// value before the change.
    pub fn ticket_flag(&mut self, name: &str, new: Option<bool>) -> Result<bool> {
        self.flag(FlagKind::Ticket, name, new)
    }

    pub fn config_flag(&mut self, name: &str, new: Option<bool>) -> Result<bool> {
        self.flag(FlagKind::Config, name, new)
    }

    pub fn extended_flag(&mut self, name: &str, new: Option<bool>) -> Result<bool> {
        self.flag(FlagKind::Extended, name, new)
    }

    fn flag(&mut self, kind: FlagKind, name: &str, new: Option<bool>) -> Result<bool> {
        let def = flags::lookup(kind, name)
            .ok_or_else(|| YkError::invalid(format!("Unknown {}Flag ({})", kind, name)))?;
        self.check_flag(def)?;
        self.require_version(def.min_version.0, def.min_version.1)?;

        let bits = match kind {
            FlagKind::Ticket => &mut self.ticket_flags,
            FlagKind::Config => &mut self.config_flags,
            FlagKind::Extended => &mut self.extended_flags,
        };
        let old = *bits & def.bit == def.bit;
        match new {
            Some(true) => *bits |= def.bit,
            Some(false) => *bits &= !def.bit,
            None => {}
        }
        Ok(old)
    }

    fn check_flag(&self, def: &FlagDef) -> Result<()> {
        let caps = &self.capabilities;
        let ok = match def.kind {
            FlagKind::Ticket => caps.have_ticket_flag(def),
            FlagKind::Config => caps.have_config_flag(def),
            FlagKind::Extended => caps.have_extended_flag(def),
        };
        if ok {
            return Ok(());
        }
        Err(YkError::unsupported(
            format!(
                "{} flag {} (requires {})",
                def.kind,
                def.name,
                def.requirement_string(caps.model())
            ),
            caps.version(),
        ))
    }

    /// The 64 byte slot payload.
    pub fn to_bytes(&self) -> [u8; SLOT_DATA_SIZE] {
        let mut body = Vec::with_capacity(SLOT_DATA_SIZE);
        push_padded(&mut body, &self.fixed, FIXED_SIZE);
        push_padded(&mut body, &self.uid, UID_SIZE);
        push_padded(&mut body, &self.key, KEY_SIZE);
        push_padded(&mut body, &self.access_code, ACC_CODE_SIZE);
        body.push(self.fixed.len().min(FIXED_SIZE) as u8);
        body.push(self.extended_flags);
        body.push(self.ticket_flags);
        body.push(self.config_flags);
        // rfu
        body.extend_from_slice(&[0, 0]);
        debug_assert_eq!(body.len(), CONFIG_BODY_SIZE);

        let crc = 0xffff - crc16(&body);
        // Writing into a Vec cannot fail.
        let _ = body.write_u16::<LittleEndian>(crc);
        body.extend_from_slice(&self.unlock_code);

        let mut out = [0u8; SLOT_DATA_SIZE];
        out[..body.len()].copy_from_slice(&body);
        out
    }

    /// The frame programming this configuration into `slot`.
    pub fn to_frame(&self, slot_num: u8) -> Result<Frame> {
        let command = match (slot_num, self.update) {
            (1, false) => slot::CONFIG,
            (1, true) => slot::UPDATE1,
            (2, false) => slot::CONFIG2,
            (2, true) => slot::UPDATE2,
            _ => return Err(YkError::UnsupportedSlot(slot_num)),
        };
        let command = if self.swap { slot::SWAP } else { command };
        if self.zap {
            return Ok(Frame::empty(command));
        }
        Frame::new(command, &self.to_bytes())
    }

    fn require_version(&mut self, major: u8, minor: u8) -> Result<()> {
        let needed = Version::new(major, minor, 0);
        if let Some(target) = self.target {
            if needed > target {
                return Err(YkError::VersionMismatch {
                    required: needed,
                    actual: target,
                });
            }
        }
        if needed > self.required {
            self.required = needed;
        }
        Ok(())
    }

    fn change_mode(&mut self, mode: ConfigMode, major: u8, minor: u8) -> Result<()> {
        if let Some(current) = self.mode {
            if current != mode {
                return Err(YkError::invalid(format!(
                    "Can't change mode (from {} to {})",
                    current, mode
                )));
            }
        }
        self.require_version(major, minor)?;
        self.mode = Some(mode);
        // when setting mode, we reset all flags
        self.ticket_flags = 0;
        self.config_flags = 0;
        self.extended_flags = 0;
        if let Some(name) = mode.ticket_flag() {
            self.ticket_flag(name, Some(true))?;
        }
        Ok(())
    }

    /// HMAC and HOTP keys spill their last four bytes into the uid field.
    fn set_20_bytes_key(&mut self, data: &[u8]) -> Result<()> {
        let new = decode_input(data)?;
        if new.len() != KEY_SIZE_OATH {
            return Err(YkError::invalid("HMAC key must be exactly 20 bytes"));
        }
        self.key = new[..KEY_SIZE].to_vec();
        self.uid = new[KEY_SIZE..].to_vec();
        Ok(())
    }
}

fn push_padded(buf: &mut Vec<u8>, data: &[u8], size: usize) {
    let len = data.len().min(size);
    buf.extend_from_slice(&data[..len]);
    buf.resize(buf.len() + size - len, 0);
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("mode", &self.mode)
            .field("required", &self.required)
            .field("target", &self.target)
            .field("fixed_len", &self.fixed.len())
            .field("uid_len", &self.uid.len())
            .field("key_len", &self.key.len())
            .field("access_len", &self.access_code.len())
            .field("ticket_flags", &format_args!("{:#04x}", self.ticket_flags))
            .field("config_flags", &format_args!("{:#04x}", self.config_flags))
            .field("extended_flags", &format_args!("{:#04x}", self.extended_flags))
            .field("unlock_len", &self.unlock_code.len())
            .field("update", &self.update)
            .field("swap", &self.swap)
            .field("zap", &self.zap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::validate_crc16;

    const HMAC_KEY: &[u8] = b"h:303132333435363738393a3b3c3d3e3f40414243";

    fn for_device(major: u8, minor: u8, build: u8) -> Config {
        let version = Version::new(major, minor, build);
        Config::new(Some(version), Capabilities::for_version(version))
    }

    #[test]
    fn test_empty_config_layout() {
        let bytes = Config::default().to_bytes();
        assert!(bytes[..CONFIG_BODY_SIZE].iter().all(|&b| b == 0));
        let crc = u16::from_le_bytes([bytes[50], bytes[51]]);
        assert_eq!(crc, 0xffff - crc16(&[0u8; CONFIG_BODY_SIZE]));
        assert!(bytes[52..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_internal_crc_validates() {
        let mut cfg = Config::default();
        cfg.mode_yubikey_otp(b"h:010203040506", b"h:00112233445566778899aabbccddeeff")
            .unwrap();
        let bytes = cfg.to_bytes();
        assert!(validate_crc16(&bytes[..CONFIG_BODY_SIZE + 2]));
    }

    #[test]
    fn test_yubikey_otp_fields() {
        let mut cfg = Config::default();
        cfg.fixed_string(b"m:cccccccccccb").unwrap();
        cfg.mode_yubikey_otp(b"h:010203040506", b"h:00112233445566778899aabbccddeeff")
            .unwrap();
        cfg.ticket_flag("APPEND_CR", Some(true)).unwrap();
        let bytes = cfg.to_bytes();

        assert_eq!(&bytes[..6], &[0, 0, 0, 0, 0, 1]);
        assert_eq!(&bytes[16..22], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(bytes[22], 0x00);
        assert_eq!(bytes[37], 0xff);
        assert_eq!(bytes[44], 6);
        assert_eq!(bytes[46], 0x20);
        assert_eq!(cfg.version_required(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_challenge_response_hmac() {
        let mut cfg = for_device(2, 2, 3);
        cfg.mode_challenge_response(HMAC_KEY, ChallengeMode::Hmac, true, false)
            .unwrap();
        assert_eq!(cfg.mode(), Some(ConfigMode::ChalResp));
        assert_eq!(cfg.ticket_flags(), 0x40);
        assert_eq!(cfg.config_flags(), 0x22 | 0x04);
        assert_eq!(cfg.uid(), b"@ABC");
        assert_eq!(cfg.version_required(), Version::new(2, 2, 0));
    }

    #[test]
    fn test_challenge_response_otp_with_button() {
        let mut cfg = for_device(2, 2, 3);
        cfg.mode_challenge_response(
            b"h:00112233445566778899aabbccddeeff",
            ChallengeMode::Otp,
            true,
            true,
        )
        .unwrap();
        assert_eq!(cfg.config_flags(), 0x20 | 0x08);
    }

    #[test]
    fn test_challenge_response_needs_firmware() {
        let mut cfg = for_device(2, 1, 0);
        let err = cfg
            .mode_challenge_response(HMAC_KEY, ChallengeMode::Hmac, false, false)
            .unwrap_err();
        assert!(matches!(err, YkError::UnsupportedFirmware { .. }));
    }

    #[test]
    fn test_oath_hotp() {
        let mut cfg = for_device(2, 2, 3);
        let options = HotpOptions {
            digits: 8,
            factor_seed: Some(0x0102),
            omp: 0xba,
            tt: 0x01,
            mui: b"h:11223344".to_vec(),
        };
        cfg.mode_oath_hotp(HMAC_KEY, &options).unwrap();
        assert_eq!(cfg.ticket_flags(), 0x40);
        assert_eq!(cfg.config_flags(), 0x02);
        assert_eq!(cfg.uid(), &[0x40, 0x41, 0x42, 0x43, 0x02, 0x01]);
        assert_eq!(cfg.fixed(), &[0xba, 0x01, 0x11, 0x22, 0x33, 0x44]);
        assert_eq!(cfg.version_required(), Version::new(2, 1, 0));
    }

    #[test]
    fn test_oath_hotp_digits() {
        let options = HotpOptions {
            digits: 7,
            ..Default::default()
        };
        let err = Config::default().mode_oath_hotp(HMAC_KEY, &options).unwrap_err();
        assert!(matches!(err, YkError::InvalidPayload(_)));
    }

    #[test]
    fn test_mode_cannot_change() {
        let mut cfg = Config::default();
        cfg.mode_challenge_response(HMAC_KEY, ChallengeMode::Hmac, false, false)
            .unwrap();
        let err = cfg
            .mode_oath_hotp(HMAC_KEY, &HotpOptions::default())
            .unwrap_err();
        assert!(matches!(err, YkError::InvalidPayload(_)));
    }

    #[test]
    fn test_flag_version_gating() {
        let mut cfg = for_device(2, 2, 3);
        let err = cfg.extended_flag("ALLOW_UPDATE", Some(true)).unwrap_err();
        assert!(matches!(err, YkError::UnsupportedFirmware { .. }));

        let mut cfg = Config::default();
        cfg.extended_flag("ALLOW_UPDATE", Some(true)).unwrap();
        assert_eq!(cfg.version_required(), Version::new(2, 3, 0));
        assert!(cfg.extended_flag("ALLOW_UPDATE", None).unwrap());
        assert!(cfg.extended_flag("ALLOW_UPDATE", Some(false)).unwrap());
        assert_eq!(cfg.extended_flags(), 0);
    }

    #[test]
    fn test_unknown_flag() {
        let err = Config::default().ticket_flag("BOGUS", Some(true)).unwrap_err();
        assert!(matches!(err, YkError::InvalidPayload(_)));
    }

    #[test]
    fn test_update_requires_2_3() {
        let err = for_device(2, 2, 3).enable_update().unwrap_err();
        assert!(matches!(err, YkError::VersionMismatch { .. }));
        assert!(for_device(2, 3, 0).enable_update().is_ok());
    }

    #[test]
    fn test_to_frame_commands() {
        let mut cfg = Config::default();
        assert_eq!(cfg.to_frame(1).unwrap().command(), slot::CONFIG);
        assert_eq!(cfg.to_frame(2).unwrap().command(), slot::CONFIG2);
        assert!(matches!(cfg.to_frame(3), Err(YkError::UnsupportedSlot(3))));

        cfg.enable_update().unwrap();
        assert_eq!(cfg.to_frame(1).unwrap().command(), slot::UPDATE1);
        assert_eq!(cfg.to_frame(2).unwrap().command(), slot::UPDATE2);

        cfg.enable_swap().unwrap();
        assert_eq!(cfg.to_frame(1).unwrap().command(), slot::SWAP);
    }

    #[test]
    fn test_zap_sends_empty_payload() {
        let mut cfg = Config::default();
        cfg.access_key(b"h:010203040506").unwrap();
        cfg.enable_zap();
        let frame = cfg.to_frame(2).unwrap();
        assert_eq!(frame.command(), slot::CONFIG2);
        assert!(frame.payload().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_unlock_key_sets_access_code() {
        let mut cfg = Config::default();
        cfg.unlock_key(b"h:aabbccddeeff").unwrap();
        let bytes = cfg.to_bytes();
        assert_eq!(&bytes[38..44], &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(&bytes[52..58], &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert!(cfg.unlock_key(b"short").is_err());
    }

    #[test]
    fn test_fixed_string_too_long() {
        let mut cfg = Config::default();
        assert!(cfg.fixed_string(&[b'x'; 17]).is_err());
        assert!(cfg.fixed_string(&[b'x'; 16]).is_ok());
    }

    #[test]
    fn test_extended_scan_code_and_shifted_1() {
        let mut cfg = Config::default();
        cfg.config_flag("STATIC_TICKET", Some(true)).unwrap();
        cfg.enable_extended_scan_code_mode().unwrap();
        assert_eq!(cfg.config_flags(), 0x02);
        cfg.enable_shifted_1().unwrap();
        assert_eq!(cfg.config_flags(), 0x02 | 0x40 | 0x01);
        assert_eq!(cfg.version_required(), Version::new(2, 0, 0));
    }
}
