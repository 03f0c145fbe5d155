//! Ticket, config and extended flag catalog.
//!
//! Static table of every named flag bit with the firmware range and models
//! that understand it. Some config bits are reused with a different
//! meaning per mode (e.g. 0x02 is TICKET_FIRST, SHORT_TICKET or
//! OATH_HOTP8), so flags are always looked up by name.

use std::fmt;

use crate::capabilities::Model;
use crate::protocol::Version;

/// Which of the three flag bytes in `config_st` a flag lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Ticket,
    Config,
    Extended,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::Ticket => write!(f, "Ticket"),
            FlagKind::Config => write!(f, "Config"),
            FlagKind::Extended => write!(f, "Extended"),
        }
    }
}

/// Configuration mode a flag is specific to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagMode {
    Any,
    Oath,
    Chal,
}

const ALL_MODELS: &[Model] = &[Model::YubiKey, Model::NeoBeta, Model::Neo, Model::YubiKey4];

/// One named flag bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagDef {
    pub name: &'static str,
    pub kind: FlagKind,
    pub bit: u8,
    pub min_version: (u8, u8),
    /// Last firmware (major, minor) supporting a deprecated flag.
    pub max_version: Option<(u8, u8)>,
    pub models: &'static [Model],
    pub mode: FlagMode,
    pub doc: &'static str,
}

impl FlagDef {
    const fn new(kind: FlagKind, name: &'static str, bit: u8, min: (u8, u8), doc: &'static str) -> Self {
        Self {
            name,
            kind,
            bit,
            min_version: min,
            max_version: None,
            models: ALL_MODELS,
            mode: FlagMode::Any,
            doc,
        }
    }

    const fn ticket(name: &'static str, bit: u8, min: (u8, u8), doc: &'static str) -> Self {
        Self::new(FlagKind::Ticket, name, bit, min, doc)
    }

    const fn config(name: &'static str, bit: u8, min: (u8, u8), doc: &'static str) -> Self {
        Self::new(FlagKind::Config, name, bit, min, doc)
    }

    const fn extended(name: &'static str, bit: u8, min: (u8, u8), doc: &'static str) -> Self {
        Self::new(FlagKind::Extended, name, bit, min, doc)
    }

    const fn for_mode(mut self, mode: FlagMode) -> Self {
        self.mode = mode;
        self
    }

    const fn until(mut self, max: (u8, u8)) -> Self {
        self.max_version = Some(max);
        self
    }

    /// Minimum firmware as a full version.
    pub fn required_version(&self) -> Version {
        Version::new(self.min_version.0, self.min_version.1, 0)
    }

    /// Whether a `model` at `version` understands this flag.
    pub fn is_compatible(&self, model: Model, version: Version) -> bool {
        if !self.models.contains(&model) {
            return false;
        }
        let ver = (version.major, version.minor);
        match self.max_version {
            Some(max) => ver >= self.min_version && ver <= max,
            None => ver >= self.min_version,
        }
    }

    /// Human readable requirement, e.g. `YubiKey >= 2.3`.
    pub fn requirement_string(&self, model: Model) -> String {
        let who = if self.models.contains(&model) {
            model.name().to_string()
        } else {
            let mut names: Vec<&str> = self.models.iter().map(|m| m.name()).collect();
            names.dedup();
            names.join("/")
        };
        let (min_major, min_minor) = self.min_version;
        match self.max_version {
            Some((max_major, max_minor)) => format!(
                "{} {}.{}..{}.{}",
                who, min_major, min_minor, max_major, max_minor
            ),
            None => format!("{} >= {}.{}", who, min_major, min_minor),
        }
    }
}

/// Every known flag.
pub static FLAGS: &[FlagDef] = &[
    FlagDef::ticket("TAB_FIRST", 0x01, (1, 0), "Send TAB before first part"),
    FlagDef::ticket("APPEND_TAB1", 0x02, (1, 0), "Send TAB after first part"),
    FlagDef::ticket("APPEND_TAB2", 0x04, (1, 0), "Send TAB after second part"),
    FlagDef::ticket("APPEND_DELAY1", 0x08, (1, 0), "Add 0.5s delay after first part"),
    FlagDef::ticket("APPEND_DELAY2", 0x10, (1, 0), "Add 0.5s delay after second part"),
    FlagDef::ticket("APPEND_CR", 0x20, (1, 0), "Append CR as final character"),
    FlagDef::ticket("OATH_HOTP", 0x40, (2, 1), "Choose OATH-HOTP mode"),
    FlagDef::ticket("CHAL_RESP", 0x40, (2, 2), "Choose Challenge-Response mode"),
    FlagDef::ticket("PROTECT_CFG2", 0x80, (2, 0), "Protect configuration in slot 2"),
    FlagDef::config("SEND_REF", 0x01, (1, 0), "Send reference string (0..F) before data"),
    FlagDef::config("TICKET_FIRST", 0x02, (1, 0), "Send ticket first (default is fixed part)")
        .until((1, 9)),
    FlagDef::config("PACING_10MS", 0x04, (1, 0), "Add 10ms intra-key pacing"),
    FlagDef::config("PACING_20MS", 0x08, (1, 0), "Add 20ms intra-key pacing"),
    FlagDef::config("STATIC_TICKET", 0x20, (1, 0), "Static ticket generation"),
    // YubiKey 2.0 and above
    FlagDef::config("SHORT_TICKET", 0x02, (2, 0), "Send truncated ticket (half length)"),
    FlagDef::config("STRONG_PW1", 0x10, (2, 0), "Strong password policy flag #1 (mixed case)"),
    FlagDef::config("STRONG_PW2", 0x40, (2, 0), "Strong password policy flag #2 (subtitute 0..7 to digits)"),
    FlagDef::config("MAN_UPDATE", 0x80, (2, 0), "Allow manual (local) update of static OTP"),
    // YubiKey 2.1 and above
    FlagDef::config("OATH_HOTP8", 0x02, (2, 1), "Generate 8 digits HOTP rather than 6 digits")
        .for_mode(FlagMode::Oath),
    FlagDef::config("OATH_FIXED_MODHEX1", 0x10, (2, 1), "First byte in fixed part sent as modhex")
        .for_mode(FlagMode::Oath),
    FlagDef::config("OATH_FIXED_MODHEX2", 0x40, (2, 1), "First two bytes in fixed part sent as modhex")
        .for_mode(FlagMode::Oath),
    FlagDef::config("OATH_FIXED_MODHEX", 0x50, (2, 1), "Fixed part sent as modhex")
        .for_mode(FlagMode::Oath),
    FlagDef::config("OATH_FIXED_MASK", 0x50, (2, 1), "Mask to get out fixed flags")
        .for_mode(FlagMode::Oath),
    // YubiKey 2.2 and above
    FlagDef::config("CHAL_YUBICO", 0x20, (2, 2), "Challenge-response enabled - Yubico OTP mode")
        .for_mode(FlagMode::Chal),
    FlagDef::config("CHAL_HMAC", 0x22, (2, 2), "Challenge-response enabled - HMAC-SHA1")
        .for_mode(FlagMode::Chal),
    FlagDef::config("HMAC_LT64", 0x04, (2, 2), "Set when HMAC message is less than 64 bytes")
        .for_mode(FlagMode::Chal),
    FlagDef::config("CHAL_BTN_TRIG", 0x08, (2, 2), "Challenge-response operation requires button press")
        .for_mode(FlagMode::Chal),
    FlagDef::extended("SERIAL_BTN_VISIBLE", 0x01, (2, 2), "Serial number visible at startup (button press)"),
    FlagDef::extended("SERIAL_USB_VISIBLE", 0x02, (2, 2), "Serial number visible in USB iSerial field"),
    FlagDef::extended("SERIAL_API_VISIBLE", 0x04, (2, 2), "Serial number visible via API call"),
    // YubiKey 2.3 and above
    FlagDef::extended("USE_NUMERIC_KEYPAD", 0x08, (2, 3), "Use numeric keypad for digits"),
    FlagDef::extended("FAST_TRIG", 0x10, (2, 3), "Use fast trig if only cfg1 set"),
    FlagDef::extended("ALLOW_UPDATE", 0x20, (2, 3), "Allow update of existing configuration (selected flags + access code)"),
    FlagDef::extended("DORMANT", 0x40, (2, 3), "Dormant configuration (can be woken up and flag removed = requires update flag)"),
];

/// Find a flag by kind and name.
pub fn lookup(kind: FlagKind, name: &str) -> Option<&'static FlagDef> {
    FLAGS.iter().find(|f| f.kind == kind && f.name == name)
}

/// All flags of one kind, in table order.
pub fn of_kind(kind: FlagKind) -> impl Iterator<Item = &'static FlagDef> {
    FLAGS.iter().filter(move |f| f.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let flag = lookup(FlagKind::Ticket, "APPEND_CR").unwrap();
        assert_eq!(flag.bit, 0x20);
        assert_eq!(flag.required_version(), Version::new(1, 0, 0));
        assert!(lookup(FlagKind::Config, "APPEND_CR").is_none());
        assert!(lookup(FlagKind::Ticket, "NOPE").is_none());
    }

    #[test]
    fn test_names_unique_per_kind() {
        for flag in FLAGS {
            let same: Vec<_> = of_kind(flag.kind).filter(|f| f.name == flag.name).collect();
            assert_eq!(same.len(), 1, "duplicate flag {}", flag.name);
        }
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(of_kind(FlagKind::Ticket).count(), 9);
        assert_eq!(of_kind(FlagKind::Config).count(), 18);
        assert_eq!(of_kind(FlagKind::Extended).count(), 7);
    }

    #[test]
    fn test_is_compatible_min_version() {
        let flag = lookup(FlagKind::Config, "CHAL_HMAC").unwrap();
        assert_eq!(flag.mode, FlagMode::Chal);
        assert!(!flag.is_compatible(Model::YubiKey, Version::new(2, 1, 9)));
        assert!(flag.is_compatible(Model::YubiKey, Version::new(2, 2, 0)));
        assert!(flag.is_compatible(Model::Neo, Version::new(3, 0, 1)));
    }

    #[test]
    fn test_is_compatible_deprecated_flag() {
        let flag = lookup(FlagKind::Config, "TICKET_FIRST").unwrap();
        assert!(flag.is_compatible(Model::YubiKey, Version::new(1, 3, 2)));
        assert!(flag.is_compatible(Model::YubiKey, Version::new(1, 9, 4)));
        assert!(!flag.is_compatible(Model::YubiKey, Version::new(2, 0, 0)));
    }

    #[test]
    fn test_requirement_string() {
        let flag = lookup(FlagKind::Extended, "DORMANT").unwrap();
        assert_eq!(flag.requirement_string(Model::YubiKey), "YubiKey >= 2.3");
        let flag = lookup(FlagKind::Config, "TICKET_FIRST").unwrap();
        assert_eq!(flag.requirement_string(Model::Neo), "YubiKey NEO 1.0..1.9");
    }
}
