//! HID transport abstraction.
//!
//! Defines the `HidTransport` trait for raw feature report I/O,
//! allowing different implementations (nusb, mock, etc.).

use crate::protocol::FeatureReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: VID={vid:04X} (skip {skip})")]
    DeviceNotFound { vid: u16, skip: usize },

    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    #[error("Failed to claim interface {interface}: {message}")]
    ClaimInterfaceFailed { interface: u8, message: String },

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    #[error("Device disconnected")]
    Disconnected,
}

/// Raw USB HID feature report interface.
///
/// Implementations only move 8-byte reports; all flag handling and
/// polling lives in the session.
pub trait HidTransport: Send + Sync {
    /// Read one feature report (HID GET_REPORT).
    fn read_feature_report(&self) -> Result<FeatureReport, TransportError>;

    /// Write one feature report (HID SET_REPORT). Returns bytes written.
    fn write_feature_report(&self, report: &FeatureReport) -> Result<usize, TransportError>;

    /// Get the current VID.
    fn vendor_id(&self) -> u16;

    /// Get the current PID.
    fn product_id(&self) -> u16;
}

impl<T: HidTransport + ?Sized> HidTransport for Box<T> {
    fn read_feature_report(&self) -> Result<FeatureReport, TransportError> {
        (**self).read_feature_report()
    }

    fn write_feature_report(&self, report: &FeatureReport) -> Result<usize, TransportError> {
        (**self).write_feature_report(report)
    }

    fn vendor_id(&self) -> u16 {
        (**self).vendor_id()
    }

    fn product_id(&self) -> u16 {
        (**self).product_id()
    }
}
