//! What a given YubiKey can do.
//!
//! One descriptor per connected device, selected from the firmware version
//! of the first status report. Family differences are version-range checks
//! on the model, not separate types.

use bitflags::bitflags;
use std::fmt;

use crate::flags::FlagDef;
use crate::protocol::Version;
use crate::protocol::constants::mode;

/// Device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// Classic YubiKey (and NANO), firmware below 3.0.
    YubiKey,
    /// NEO pre-release, firmware 2.1.4 to 2.1.9.
    NeoBeta,
    Neo,
    YubiKey4,
}

impl Model {
    /// Family dispatch from the firmware version.
    pub fn for_version(version: Version) -> Self {
        if (Version::new(2, 1, 4)..=Version::new(2, 1, 9)).contains(&version) {
            Model::NeoBeta
        } else if version < Version::new(3, 0, 0) {
            Model::YubiKey
        } else if version < Version::new(4, 0, 0) {
            Model::Neo
        } else {
            Model::YubiKey4
        }
    }

    /// Model name as used in flag requirements.
    pub fn name(&self) -> &'static str {
        match self {
            Model::YubiKey => "YubiKey",
            Model::NeoBeta | Model::Neo => "YubiKey NEO",
            Model::YubiKey4 => "YubiKey 4",
        }
    }

    /// Marketing name of this model at the given firmware.
    pub fn description(&self, version: Version) -> &'static str {
        match self {
            Model::YubiKey => "YubiKey (or YubiKey NANO)",
            Model::NeoBeta => "YubiKey NEO BETA",
            Model::Neo => "YubiKey NEO",
            Model::YubiKey4 if version < Version::new(4, 1, 0) => "YubiKey Plus",
            Model::YubiKey4 if version < Version::new(4, 2, 0) => "YubiKey Edge/Edge-n",
            Model::YubiKey4 => "YubiKey 4",
        }
    }

    fn is_neo_family(&self) -> bool {
        !matches!(self, Model::YubiKey)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Applications reported in the YubiKey 4 capabilities blob.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Yk4Capa: u32 {
        const OTP = 0x01;
        const U2F = 0x02;
        const CCID = 0x04;
    }
}

impl Yk4Capa {
    /// Decode the big-endian bitmask stored under the capability tag.
    pub fn from_tlv_value(value: &[u8]) -> Self {
        let bits = value
            .iter()
            .fold(0u32, |acc, &b| acc.wrapping_shl(8) | u32::from(b));
        Yk4Capa::from_bits_retain(bits)
    }

    /// Applications a USB mode needs, or `None` for an unknown mode.
    pub fn required_for_mode(usb_mode: u8) -> Option<Self> {
        Some(match usb_mode {
            mode::OTP => Yk4Capa::OTP,
            mode::CCID => Yk4Capa::CCID,
            mode::OTP_CCID => Yk4Capa::OTP | Yk4Capa::CCID,
            mode::U2F => Yk4Capa::U2F,
            mode::OTP_U2F => Yk4Capa::OTP | Yk4Capa::U2F,
            mode::U2F_CCID => Yk4Capa::U2F | Yk4Capa::CCID,
            mode::OTP_U2F_CCID => Yk4Capa::OTP | Yk4Capa::U2F | Yk4Capa::CCID,
            _ => return None,
        })
    }
}

/// Challenge-response algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeMode {
    /// HMAC-SHA1, up to 64 byte challenge, 20 byte response.
    Hmac,
    /// Yubico OTP, 6 byte challenge, 16 byte response.
    Otp,
}

impl fmt::Display for ChallengeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeMode::Hmac => write!(f, "HMAC"),
            ChallengeMode::Otp => write!(f, "OTP"),
        }
    }
}

/// Capability descriptor for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    model: Model,
    version: Version,
    yk4_capa: Yk4Capa,
    permissive: bool,
}

impl Capabilities {
    pub fn new(model: Model, version: Version) -> Self {
        Self {
            model,
            version,
            yk4_capa: Yk4Capa::empty(),
            permissive: false,
        }
    }

    pub fn for_version(version: Version) -> Self {
        Self::new(Model::for_version(version), version)
    }

    /// Answers yes to everything. Used for configurations built without a
    /// device at hand.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::new(Model::YubiKey4, Version::new(255, 255, 255))
        }
    }

    pub fn with_yk4_capa(mut self, capa: Yk4Capa) -> Self {
        self.yk4_capa = capa;
        self
    }

    pub fn set_yk4_capa(&mut self, capa: Yk4Capa) {
        self.yk4_capa = capa;
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn yk4_capa(&self) -> Yk4Capa {
        self.yk4_capa
    }

    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    fn at_least(&self, major: u8, minor: u8, build: u8) -> bool {
        self.permissive || self.version >= Version::new(major, minor, build)
    }

    pub fn have_yubico_otp(&self) -> bool {
        true
    }

    pub fn have_oath_hotp(&self) -> bool {
        self.at_least(2, 1, 0)
    }

    pub fn have_challenge_response(&self, _mode: ChallengeMode) -> bool {
        if self.model.is_neo_family() {
            self.at_least(3, 0, 0)
        } else {
            self.at_least(2, 2, 0)
        }
    }

    /// Reading the serial also depends on SERIAL_API_VISIBLE being set.
    pub fn have_serial_number(&self) -> bool {
        self.at_least(2, 2, 0)
    }

    pub fn have_ticket_flag(&self, flag: &FlagDef) -> bool {
        self.have_flag(flag)
    }

    pub fn have_config_flag(&self, flag: &FlagDef) -> bool {
        self.have_flag(flag)
    }

    pub fn have_extended_flag(&self, flag: &FlagDef) -> bool {
        self.have_flag(flag)
    }

    fn have_flag(&self, flag: &FlagDef) -> bool {
        self.permissive || flag.is_compatible(self.model, self.version)
    }

    pub fn have_extended_scan_code_mode(&self) -> bool {
        self.at_least(2, 0, 0)
    }

    pub fn have_shifted_1_mode(&self) -> bool {
        self.at_least(2, 0, 0)
    }

    pub fn have_configuration_slot(&self, slot: u8) -> bool {
        if self.permissive {
            return true;
        }
        if self.model.is_neo_family() && self.version < Version::new(3, 0, 0) {
            return slot == 1;
        }
        matches!(slot, 1 | 2)
    }

    pub fn have_nfc_ndef(&self, slot: u8) -> bool {
        match self.model {
            _ if self.permissive => true,
            Model::YubiKey | Model::YubiKey4 => false,
            Model::NeoBeta | Model::Neo => self.have_configuration_slot(slot),
        }
    }

    pub fn have_device_config(&self) -> bool {
        self.model.is_neo_family() && self.at_least(3, 0, 0)
    }

    pub fn have_scanmap(&self) -> bool {
        self.model.is_neo_family() && self.at_least(3, 0, 0)
    }

    /// Whether DEVICE_CONFIG may select `usb_mode`. The eject flag is
    /// ignored.
    pub fn have_usb_mode(&self, usb_mode: u8) -> bool {
        if self.permissive {
            return true;
        }
        let usb_mode = usb_mode & !mode::FLAG_EJECT;
        match self.model {
            Model::YubiKey => false,
            Model::NeoBeta | Model::Neo => self.have_device_config() && usb_mode <= mode::OTP_U2F_CCID,
            // YubiKey Plus is locked in OTP+U2F
            Model::YubiKey4 if self.version < Version::new(4, 1, 0) => usb_mode == mode::OTP_U2F,
            Model::YubiKey4 => Yk4Capa::required_for_mode(usb_mode)
                .is_some_and(|needed| self.yk4_capa.contains(needed)),
        }
    }

    /// Whether the device reports a capabilities blob.
    pub fn have_capabilities(&self) -> bool {
        self.model == Model::YubiKey4 && self.at_least(4, 1, 0)
    }

    pub fn have_capability(&self, capability: Yk4Capa) -> bool {
        self.permissive || self.yk4_capa.intersects(capability)
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.permissive {
            return write!(f, "any YubiKey");
        }
        write!(f, "{} {}", self.model, self.version)
    }
}
