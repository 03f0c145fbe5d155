//! High level YubiKey commands.
//!
//! Each command gates on the capability descriptor before any I/O, builds
//! a frame, runs it through the session and validates the response CRC.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::capabilities::{Capabilities, ChallengeMode, Model, Yk4Capa};
use crate::config::Config;
use crate::crc::validate_crc16;
use crate::error::{Result, YkError};
use crate::events::{TracingObserver, YkObserver};
use crate::ndef::{DeviceConfig, Ndef, ScanMap};
use crate::protocol::constants::{
    OTP_CHALRESP_SIZE, SHA1_DIGEST_SIZE, SHA1_MAX_BLOCK_SIZE, UID_SIZE, YK4_CAPA_TAG, slot,
};
use crate::protocol::{Frame, Status, Version};
use crate::session::{HidSession, SessionConfig};
use crate::transport::{HidTransport, NusbTransport};
use crate::util::tlv_parse;

/// Pad a challenge to a full frame payload.
///
/// HMAC challenges shorter than 64 bytes are padded with 0x00, or with
/// 0xFF in variable mode when the challenge itself ends in 0x00 (the
/// device strips trailing padding bytes equal to the last byte). OTP
/// challenges must be exactly 6 bytes. Returns the payload and the
/// expected response length.
pub fn prepare_challenge(
    challenge: &[u8],
    mode: ChallengeMode,
    variable: bool,
) -> Result<([u8; SHA1_MAX_BLOCK_SIZE], usize)> {
    let mut payload = [0u8; SHA1_MAX_BLOCK_SIZE];
    match mode {
        ChallengeMode::Hmac => {
            if challenge.len() > SHA1_MAX_BLOCK_SIZE {
                return Err(YkError::invalid(format!(
                    "Mode HMAC challenge too big ({}/{})",
                    SHA1_MAX_BLOCK_SIZE,
                    challenge.len()
                )));
            }
            if variable && challenge.last() == Some(&0x00) {
                payload.fill(0xff);
            }
            payload[..challenge.len()].copy_from_slice(challenge);
            Ok((payload, SHA1_DIGEST_SIZE))
        }
        ChallengeMode::Otp => {
            if challenge.len() != UID_SIZE {
                return Err(YkError::invalid(format!(
                    "Mode OTP challenge must be {} bytes (got {})",
                    UID_SIZE,
                    challenge.len()
                )));
            }
            payload[..UID_SIZE].copy_from_slice(challenge);
            Ok((payload, OTP_CHALRESP_SIZE))
        }
    }
}

/// Command byte for a challenge to `slot`.
pub fn challenge_command(mode: ChallengeMode, slot_num: u8) -> Option<u8> {
    match (mode, slot_num) {
        (ChallengeMode::Hmac, 1) => Some(slot::CHAL_HMAC1),
        (ChallengeMode::Hmac, 2) => Some(slot::CHAL_HMAC2),
        (ChallengeMode::Otp, 1) => Some(slot::CHAL_OTP1),
        (ChallengeMode::Otp, 2) => Some(slot::CHAL_OTP2),
        _ => None,
    }
}

/// A connected YubiKey of any family.
pub struct YubiKey<T: HidTransport, O: YkObserver = TracingObserver> {
    session: HidSession<T, O>,
    capabilities: Capabilities,
}

impl YubiKey<NusbTransport, TracingObserver> {
    /// Open the `config.skip`-th YubiKey on the bus.
    pub fn open(config: SessionConfig) -> Result<Self> {
        Self::from_session(HidSession::open(config)?)
    }
}

impl<O: YkObserver> YubiKey<NusbTransport, O> {
    pub fn open_with_observer(config: SessionConfig, observer: Arc<O>) -> Result<Self> {
        Self::from_session(HidSession::open_with_observer(config, observer)?)
    }
}

impl<T: HidTransport, O: YkObserver> YubiKey<T, O> {
    /// Pick the device family from the session's first status.
    ///
    /// A YubiKey 4 with firmware 4.1 or later is asked for its capabilities
    /// blob right away.
    pub fn from_session(session: HidSession<T, O>) -> Result<Self> {
        let version = session.last_status().version();
        let mut yk = Self {
            session,
            capabilities: Capabilities::for_version(version),
        };
        if yk.capabilities.have_capabilities() {
            let blob = yk.read_capabilities_blob()?;
            let capa = blob
                .get(&YK4_CAPA_TAG)
                .map(|v| Yk4Capa::from_tlv_value(v))
                .unwrap_or(Yk4Capa::empty());
            yk.capabilities.set_yk4_capa(capa);
        }
        info!(
            model = %yk.capabilities.model(),
            version = %version,
            "{}",
            yk.description()
        );
        Ok(yk)
    }

    pub fn session(&mut self) -> &mut HidSession<T, O> {
        &mut self.session
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn model(&self) -> Model {
        self.capabilities.model()
    }

    pub fn version(&self) -> Version {
        self.capabilities.version()
    }

    pub fn description(&self) -> &'static str {
        self.model().description(self.version())
    }

    /// Poll for a fresh status.
    pub fn status(&mut self) -> Result<Status> {
        self.session.status()
    }

    /// An empty configuration checked against this device.
    pub fn init_config(&self) -> Config {
        Config::new(Some(self.version()), self.capabilities)
    }

    /// Read the serial number. Requires firmware 2.2 and SERIAL_API_VISIBLE.
    ///
    /// With SERIAL_BTN_VISIBLE set the device waits up to 15 seconds for a
    /// button press, so `may_block` decides whether to wait for it.
    #[instrument(skip(self))]
    pub fn read_serial(&mut self, may_block: bool) -> Result<u32> {
        if !self.capabilities.have_serial_number() {
            return Err(YkError::unsupported("Serial number", self.version()));
        }
        self.session.write_frame(&Frame::empty(slot::DEVICE_SERIAL))?;
        let response = self.session.read_response(may_block)?;
        // 4 byte serial + 2 byte crc
        if response.len() < 6 || !validate_crc16(&response[..6]) {
            return Err(YkError::CorruptResponse);
        }
        // the serial number is big-endian, although everything else is little-endian
        let serial = u32::from_be_bytes([response[0], response[1], response[2], response[3]]);
        debug!(serial, "Serial read");
        Ok(serial)
    }

    /// Send a challenge and return the response.
    ///
    /// HMAC returns 20 bytes, OTP a 16 byte ticket with the challenge in
    /// its uid field.
    #[instrument(skip(self, challenge), fields(len = challenge.len()))]
    pub fn challenge_response(
        &mut self,
        challenge: &[u8],
        mode: ChallengeMode,
        slot_num: u8,
        variable: bool,
        may_block: bool,
    ) -> Result<Vec<u8>> {
        if !self.capabilities.have_challenge_response(mode) {
            return Err(YkError::unsupported(
                format!("{} challenge-response", mode),
                self.version(),
            ));
        }
        let (payload, response_len) = prepare_challenge(challenge, mode, variable)?;
        let command = challenge_command(mode, slot_num)
            .ok_or_else(|| YkError::invalid(format!("Invalid slot specified ({})", slot_num)))?;

        let frame = Frame::new(command, &payload)?;
        self.session.write_frame(&frame)?;
        let response = self.session.read_response(may_block)?;
        if response.len() < response_len + 2 || !validate_crc16(&response[..response_len + 2]) {
            return Err(YkError::CorruptResponse);
        }
        Ok(response[..response_len].to_vec())
    }

    /// Program a slot configuration.
    #[instrument(skip(self, config))]
    pub fn write_configuration(&mut self, config: &Config, slot_num: u8) -> Result<Status> {
        if !self.capabilities.have_configuration_slot(slot_num) {
            return Err(YkError::UnsupportedSlot(slot_num));
        }
        let frame = config.to_frame(slot_num)?;
        self.write_config_frame(&frame, slot_num, config.version_required())
    }

    /// Program a prebuilt configuration frame into `slot`.
    pub fn write_config_frame(
        &mut self,
        frame: &Frame,
        slot_num: u8,
        required: Version,
    ) -> Result<Status> {
        if !self.capabilities.have_configuration_slot(slot_num) {
            return Err(YkError::UnsupportedSlot(slot_num));
        }
        if required > self.version() {
            return Err(YkError::VersionMismatch {
                required,
                actual: self.version(),
            });
        }
        self.program(frame, slot_num)
    }

    /// Read and decode the YubiKey 4 capabilities TLV blob.
    ///
    /// ```text
    /// [len] [tlv data: len] [crc:2]
    /// ```
    pub fn read_capabilities_blob(&mut self) -> Result<BTreeMap<u8, Vec<u8>>> {
        self.session
            .write_frame(&Frame::empty(slot::YK4_CAPABILITIES))?;
        let response = self.session.read_response(false)?;
        let r_len = *response.first().ok_or(YkError::CorruptResponse)? as usize;
        // 1 byte length, 2 byte CRC.
        if response.len() < r_len + 3 || !validate_crc16(&response[..r_len + 3]) {
            return Err(YkError::CorruptResponse);
        }
        tlv_parse(&response[1..r_len + 1])
    }

    /// Write an NDEF tag (NEO only).
    pub fn write_ndef(&mut self, ndef: &Ndef, slot_num: u8) -> Result<Status> {
        if !self.capabilities.have_nfc_ndef(slot_num) {
            return Err(YkError::unsupported(
                format!("NDEF slot {}", slot_num),
                self.version(),
            ));
        }
        let frame = ndef.to_frame(slot_num)?;
        self.program(&frame, slot_num)
    }

    /// Change USB mode and timeouts (NEO and YubiKey 4).
    pub fn write_device_config(&mut self, device_config: &DeviceConfig) -> Result<Status> {
        if !self.capabilities.have_usb_mode(device_config.mode) {
            return Err(YkError::unsupported(
                format!("USB mode 0x{:02x}", device_config.mode),
                self.version(),
            ));
        }
        self.program(&device_config.to_frame()?, 0)
    }

    pub fn write_scan_map(&mut self, scan_map: &ScanMap) -> Result<Status> {
        if !self.capabilities.have_scanmap() {
            return Err(YkError::unsupported("Scanmap", self.version()));
        }
        self.program(&scan_map.to_frame()?, 0)
    }

    fn program(&mut self, frame: &Frame, slot_num: u8) -> Result<Status> {
        let prior = self.session.last_status().pgm_seq;
        self.session.write_and_verify_config(frame, slot_num, prior)
    }

    pub fn close(self) -> T {
        self.session.close()
    }
}

impl<T: HidTransport, O: YkObserver> fmt::Display for YubiKey<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model(), self.version())
    }
}
