//! Transport layer module.

pub mod mock;
pub mod nusb;
pub mod traits;

pub use mock::{CapturedFrame, FrameReply, MockTransport};
pub use nusb::{HidDeviceInfo, NusbTransport};
pub use traits::{HidTransport, TransportError};
