//! Protocol module - YubiKey frame and report definitions.

pub mod constants;
pub mod frame;
pub mod status;

pub use constants::*;
pub use frame::{FeatureReport, Frame};
pub use status::{Status, Version};
