//! yk-core: YubiKey USB HID protocol implementation in Rust.
//!
//! Talks to the OTP application of a YubiKey (classic, NEO and YubiKey 4)
//! over 8-byte HID feature reports. The device has no interrupt endpoint
//! for this interface, so every exchange is driven by polling the status
//! flags in the last byte of each report.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Constants, the 70-byte frame codec, status decoding
//! - **Transport**: Feature report I/O abstraction (nusb, mock)
//! - **Session**: Polling state machine, response collection, write verify
//! - **Events**: Observer pattern for logging and UI decoupling
//! - **Capabilities**: Per-model feature gating from the firmware version
//! - **Config / NDEF**: Payload builders for slot programming
//! - **Device**: High level commands (serial, challenge-response, programming)
//!
//! # Example
//!
//! ```no_run
//! use yk_core::{ChallengeMode, SessionConfig, YubiKey};
//!
//! let mut yk = YubiKey::open(SessionConfig::default())?;
//! let serial = yk.read_serial(true)?;
//! println!("{} serial {}", yk, serial);
//!
//! let response = yk.challenge_response(b"Sample #2", ChallengeMode::Hmac, 2, true, true)?;
//! println!("{}", hex::encode(response));
//! # Ok::<(), yk_core::YkError>(())
//! ```

pub mod capabilities;
pub mod config;
pub mod crc;
pub mod device;
pub mod error;
pub mod events;
pub mod flags;
pub mod ndef;
pub mod protocol;
pub mod session;
pub mod state;
pub mod transport;
pub mod util;

// Re-exports for convenience
pub use capabilities::{Capabilities, ChallengeMode, Model, Yk4Capa};
pub use config::{Config, ConfigMode, HotpOptions};
pub use crc::{crc16, validate_crc16};
pub use device::YubiKey;
pub use error::{Result, YkError};
pub use events::{NullObserver, RecordingObserver, TracingObserver, YkEvent, YkObserver};
pub use ndef::{DeviceConfig, Ndef, ScanMap};
pub use protocol::{FeatureReport, Frame, Status, Version};
pub use session::{HidSession, PollMode, SessionConfig};
pub use state::SessionState;
pub use transport::{HidTransport, MockTransport, NusbTransport, TransportError};
