//! Event system for logging and UI decoupling.
//!
//! The session reports every raw read/write, wait decision and state change
//! to an injected observer instead of printing debug output itself.

use std::fmt;
use std::sync::Mutex;

use crate::protocol::{FeatureReport, Version};
use crate::session::PollMode;
use crate::state::SessionState;
use crate::util::hexdump;

/// HID report direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDirection {
    Write, // Host -> Device
    Read,  // Device -> Host
}

impl fmt::Display for ReportDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportDirection::Write => write!(f, "WRITE"),
            ReportDirection::Read => write!(f, "READ "),
        }
    }
}

/// Events emitted by a HID session.
#[derive(Debug, Clone, PartialEq)]
pub enum YkEvent {
    /// Device opened and first status read.
    DeviceOpened { vid: u16, pid: u16, version: Version },
    /// Session state changed.
    StateChanged { from: SessionState, to: SessionState },
    /// Feature report about to be written, or just read.
    Report {
        direction: ReportDirection,
        data: FeatureReport,
        note: &'static str,
    },
    /// Status flags did not match yet.
    Waiting { mode: PollMode, mask: u8, flags: u8 },
    /// Device asked for more time (e.g. waiting for a button press).
    TimeoutWait { seconds_left: u8, extended: bool },
    /// Complete frame written.
    FrameWritten { command: u8 },
    /// Configuration written and pgm_seq checked.
    Programmed { slot: u8, before: u8, after: u8 },
}

/// Observer trait for receiving session events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait YkObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &YkEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl YkObserver for NullObserver {
    fn on_event(&self, _event: &YkEvent) {}
}

/// Observer that keeps every event, for tests and post-mortem dumps.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<YkEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<YkEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl YkObserver for RecordingObserver {
    fn on_event(&self, event: &YkEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl YkObserver for TracingObserver {
    fn on_event(&self, event: &YkEvent) {
        match event {
            YkEvent::DeviceOpened { vid, pid, version } => {
                tracing::info!(vid = %format!("{:04X}", vid), pid = %format!("{:04X}", pid), version = %version, "Device opened");
            }
            YkEvent::StateChanged { from, to } => {
                tracing::trace!(from = %from, to = %to, "Session state");
            }
            YkEvent::Report {
                direction,
                data,
                note,
            } => {
                tracing::trace!("{} : {} {}", direction, hexdump(data).trim_end(), note);
            }
            YkEvent::Waiting { mode, mask, flags } => {
                tracing::trace!(
                    "Status {:#010b} (0x{:x}), waiting to {} bits 0x{:x}",
                    flags,
                    flags,
                    mode,
                    mask
                );
            }
            YkEvent::TimeoutWait {
                seconds_left,
                extended,
            } => {
                tracing::debug!(
                    seconds_left = seconds_left,
                    extended = extended,
                    "Device indicates RESP_TIMEOUT"
                );
            }
            YkEvent::FrameWritten { command } => {
                tracing::debug!(command = %format!("0x{:02X}", command), "Frame written");
            }
            YkEvent::Programmed {
                slot,
                before,
                after,
            } => {
                tracing::info!("Programmed slot {}, sequence {} -> {}", slot, before, after);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let obs = RecordingObserver::new();
        obs.on_event(&YkEvent::FrameWritten { command: 0x10 });
        obs.on_event(&YkEvent::Programmed {
            slot: 1,
            before: 0,
            after: 1,
        });
        let events = obs.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], YkEvent::FrameWritten { command: 0x10 });
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(ReportDirection::Write.to_string(), "WRITE");
        assert_eq!(ReportDirection::Read.to_string(), "READ ");
    }
}
