//! nusb-based HID transport.
//!
//! Feature reports travel as HID class requests on the control pipe, so the
//! kernel HID driver is detached and interface 0 claimed directly.

use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use nusb::{DeviceInfo, Interface, MaybeFuture, list_devices};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::traits::{HidTransport, TransportError};
use crate::protocol::constants::{
    FEATURE_RPT_SIZE, HID_GET_REPORT, HID_SET_REPORT, OTP_PIDS, REPORT_TYPE_FEATURE,
    USB_TIMEOUT_MS, YUBICO_VID,
};
use crate::protocol::FeatureReport;

const INTERFACE: u8 = 0;
/// Feature report, report id 0.
const REPORT_VALUE: u16 = REPORT_TYPE_FEATURE << 8;

/// Summary of an attached token, for listings.
#[derive(Debug, Clone)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub product: Option<String>,
    pub serial: Option<String>,
}

/// nusb-based HID transport.
pub struct NusbTransport {
    interface: Interface,
    timeout: Duration,
    vid: u16,
    pid: u16,
}

impl NusbTransport {
    /// List attached tokens exposing the OTP HID interface.
    pub fn enumerate() -> Result<Vec<HidDeviceInfo>, TransportError> {
        Ok(Self::candidates()?
            .map(|d| HidDeviceInfo {
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                product: d.product_string().map(str::to_string),
                serial: d.serial_number().map(str::to_string),
            })
            .collect())
    }

    /// Open the `skip`-th matching YubiKey.
    #[instrument(level = "info")]
    pub fn open(skip: usize) -> Result<Self, TransportError> {
        Self::open_with_timeout(skip, Duration::from_millis(USB_TIMEOUT_MS))
    }

    pub fn open_with_timeout(skip: usize, timeout: Duration) -> Result<Self, TransportError> {
        let device_info = Self::candidates()?
            .nth(skip)
            .ok_or(TransportError::DeviceNotFound {
                vid: YUBICO_VID,
                skip,
            })?;

        Self::open_device_info(device_info, timeout)
    }

    fn candidates() -> Result<impl Iterator<Item = DeviceInfo>, TransportError> {
        let devices = list_devices()
            .wait()
            .map_err(|e| TransportError::OpenFailed(e.to_string()))?;

        Ok(devices.filter(|d| d.vendor_id() == YUBICO_VID && OTP_PIDS.contains(&d.product_id())))
    }

    fn open_device_info(device_info: DeviceInfo, timeout: Duration) -> Result<Self, TransportError> {
        let vid = device_info.vendor_id();
        let pid = device_info.product_id();

        info!(
            vendor_id = %format!("{:04X}", vid),
            product_id = %format!("{:04X}", pid),
            "Found device"
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| TransportError::OpenFailed(e.to_string()))?;

        let interface = device
            .detach_and_claim_interface(INTERFACE)
            .wait()
            .map_err(|e| TransportError::ClaimInterfaceFailed {
                interface: INTERFACE,
                message: e.to_string(),
            })?;

        info!("Device opened successfully");

        Ok(Self {
            interface,
            timeout,
            vid,
            pid,
        })
    }
}

impl HidTransport for NusbTransport {
    fn read_feature_report(&self) -> Result<FeatureReport, TransportError> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Class,
                    recipient: Recipient::Interface,
                    request: HID_GET_REPORT,
                    value: REPORT_VALUE,
                    index: INTERFACE as u16,
                    length: FEATURE_RPT_SIZE as u16,
                },
                self.timeout,
            )
            .wait()
            .map_err(|e| TransportError::ReadFailed(e.to_string()))?;

        if data.len() != FEATURE_RPT_SIZE {
            debug!(bytes_read = data.len(), "Short feature report");
            return Err(TransportError::ShortRead {
                expected: FEATURE_RPT_SIZE,
                actual: data.len(),
            });
        }

        let mut report = [0u8; FEATURE_RPT_SIZE];
        report.copy_from_slice(&data);
        Ok(report)
    }

    fn write_feature_report(&self, report: &FeatureReport) -> Result<usize, TransportError> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Class,
                    recipient: Recipient::Interface,
                    request: HID_SET_REPORT,
                    value: REPORT_VALUE,
                    index: INTERFACE as u16,
                    data: report,
                },
                self.timeout,
            )
            .wait()
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;

        Ok(report.len())
    }

    fn vendor_id(&self) -> u16 {
        self.vid
    }

    fn product_id(&self) -> u16 {
        self.pid
    }
}
