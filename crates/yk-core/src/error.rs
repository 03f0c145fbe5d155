//! Error taxonomy for YubiKey operations.

use thiserror::Error;

use crate::protocol::Version;
use crate::session::PollMode;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum YkError {
    #[error("No YubiKey found (skipped {skip})")]
    DeviceNotFound { skip: usize },

    #[error("YubiKey USB HID initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Invalid input: {0}")]
    InvalidPayload(String),

    #[error("{what} unsupported in firmware {version}")]
    UnsupportedFirmware { what: String, version: Version },

    #[error("Requires YubiKey {required}, and this is {actual}")]
    VersionMismatch { required: Version, actual: Version },

    #[error("Can't write configuration to slot {0}")]
    UnsupportedSlot(u8),

    #[error("Timed out waiting for YubiKey to {mode} status 0x{mask:02X}")]
    Timeout { mask: u8, mode: PollMode },

    #[error("Read from device failed CRC check")]
    CorruptResponse,

    #[error("YubiKey programming failed (seq {before} not increased ({after}))")]
    ProgrammingFailed { before: u8, after: u8 },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T, E = YkError> = std::result::Result<T, E>;

impl YkError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        YkError::InvalidPayload(message.into())
    }

    pub(crate) fn unsupported(what: impl Into<String>, version: Version) -> Self {
        YkError::UnsupportedFirmware {
            what: what.into(),
            version,
        }
    }

    /// Whether the failure happened before anything was sent to the device.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            YkError::InvalidPayload(_)
                | YkError::UnsupportedFirmware { .. }
                | YkError::VersionMismatch { .. }
                | YkError::UnsupportedSlot(_)
        )
    }
}
