//! HID session - the write/poll/read handshake with one YubiKey.
//!
//! Every report written to the device must wait for SLOT_WRITE_FLAG to
//! clear, and responses are collected while RESP_PENDING_FLAG is set. The
//! session owns the transport and the last status seen.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, YkError};
use crate::events::{ReportDirection, TracingObserver, YkEvent, YkObserver};
use crate::protocol::constants::{
    DUMMY_REPORT_WRITE, FEATURE_RPT_DATA_SIZE, FEATURE_RPT_SIZE, RESP_PENDING_FLAG,
    RESP_SEQ_MASK, RESP_TIMEOUT_WAIT_FLAG, RESP_TIMEOUT_WAIT_MASK, SLOT_WRITE_FLAG,
    USB_TIMEOUT_MS,
};
use crate::protocol::{FeatureReport, Frame, Status};
use crate::state::SessionState;
use crate::transport::{HidTransport, NusbTransport, TransportError};

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(500);
/// Upper bound on a device-requested wait. `max_block_secs` can only lower it.
pub const MAX_BLOCK_SECS: u32 = 20;

/// Configuration for a HID session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of matching YubiKeys to skip when opening.
    pub skip: usize,
    /// Base wait for a status flag, in seconds.
    pub poll_timeout_secs: u32,
    /// Cap on the device-requested wait when blocking is allowed, at most
    /// `MAX_BLOCK_SECS`.
    pub max_block_secs: u32,
    /// Timeout of each USB control transfer.
    pub usb_timeout_ms: u64,
    /// Default blocking policy for commands that may need a button press.
    pub may_block: bool,
    /// Emit an event for every raw report.
    pub trace_reports: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            skip: 0,
            poll_timeout_secs: 2,
            max_block_secs: MAX_BLOCK_SECS,
            usb_timeout_ms: USB_TIMEOUT_MS,
            may_block: true,
            trace_reports: true,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> AnyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> AnyResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// How `poll_until` compares the status flags against its mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Wait until all bits in the mask are set.
    And,
    /// Wait until not all bits in the mask are set.
    Nand,
}

impl PollMode {
    pub fn matches(&self, flags: u8, mask: u8) -> bool {
        match self {
            PollMode::And => flags & mask == mask,
            PollMode::Nand => flags & mask != mask,
        }
    }
}

impl fmt::Display for PollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollMode::And => write!(f, "set"),
            PollMode::Nand => write!(f, "clear"),
        }
    }
}

/// Number of polls for a wait of `seconds`. The backoff reaches 640 ms
/// after six sleeps, and each further poll is worth about half a second.
pub fn attempt_budget(seconds: u32) -> u32 {
    seconds.saturating_mul(2).saturating_add(5)
}

/// Source of the poll loop's delays.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Records requested delays without sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Check the programming sequence after a configuration write.
///
/// A slot that was already programmed must step `prior + 1`. First-time
/// programming must land on 1. Removing the last configuration resets the
/// counter to 0, which is accepted when no slot is left valid.
pub fn verify_programming(prior_pgm_seq: u8, status: &Status) -> Result<()> {
    let after = status.pgm_seq;
    if prior_pgm_seq == 0 {
        if after == 1 {
            return Ok(());
        }
    } else {
        if after == prior_pgm_seq.wrapping_add(1) {
            return Ok(());
        }
        let zapped_last = after == 0
            && status
                .valid_slots()
                .map(|slots| slots.is_empty())
                .unwrap_or(false);
        if zapped_last {
            return Ok(());
        }
    }
    Err(YkError::ProgrammingFailed {
        before: prior_pgm_seq,
        after,
    })
}

/// One open YubiKey and its request cycle.
pub struct HidSession<T: HidTransport, O: YkObserver = TracingObserver> {
    transport: T,
    observer: Arc<O>,
    sleeper: Box<dyn Sleeper>,
    config: SessionConfig,
    state: SessionState,
    status: Status,
}

impl HidSession<NusbTransport, TracingObserver> {
    /// Open a YubiKey with the default tracing observer.
    pub fn open(config: SessionConfig) -> Result<Self> {
        Self::open_with_observer(config, Arc::new(TracingObserver))
    }
}

impl<O: YkObserver> HidSession<NusbTransport, O> {
    /// Open the `config.skip`-th YubiKey with a custom observer.
    #[instrument(skip(observer))]
    pub fn open_with_observer(config: SessionConfig, observer: Arc<O>) -> Result<Self> {
        let timeout = Duration::from_millis(config.usb_timeout_ms);
        let transport = NusbTransport::open_with_timeout(config.skip, timeout).map_err(|e| {
            match e {
                TransportError::DeviceNotFound { skip, .. } => YkError::DeviceNotFound { skip },
                other => YkError::InitializationFailed(other.to_string()),
            }
        })?;
        HidSession::new(transport, config, observer, Box::new(ThreadSleeper))
    }
}

impl<T: HidTransport, O: YkObserver> HidSession<T, O> {
    /// Wrap an opened transport and prime the status.
    pub fn new(
        transport: T,
        config: SessionConfig,
        observer: Arc<O>,
        sleeper: Box<dyn Sleeper>,
    ) -> Result<Self> {
        let mut session = Self {
            transport,
            observer,
            sleeper,
            config,
            state: SessionState::Idle,
            status: Status::default(),
        };
        session.goto_state(SessionState::Opened);

        let status = session
            .status()
            .map_err(|e| YkError::InitializationFailed(e.to_string()))?;
        session.emit(YkEvent::DeviceOpened {
            vid: session.transport.vendor_id(),
            pid: session.transport.product_id(),
            version: status.version(),
        });
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Status from the most recent poll.
    pub fn last_status(&self) -> &Status {
        &self.status
    }

    /// Poll the device for status.
    pub fn status(&mut self) -> Result<Status> {
        let data = self.raw_read()?;
        self.status = Status::parse(&data);
        Ok(self.status)
    }

    /// Write a frame, waiting for the device to accept each report.
    #[instrument(skip(self))]
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.run(SessionState::Writing, |s| {
            for report in frame.to_feature_reports() {
                s.wait_for_clear(SLOT_WRITE_FLAG, false)?;
                s.raw_write(&report, frame.annotate(&report))?;
            }
            s.emit(YkEvent::FrameWritten {
                command: frame.command(),
            });
            Ok(())
        })
    }

    /// Wait for a response to become available, and read it.
    ///
    /// Returns the concatenated 7-byte data parts; length and CRC are the
    /// caller's to check.
    #[instrument(skip(self))]
    pub fn read_response(&mut self, may_block: bool) -> Result<Vec<u8>> {
        self.run(SessionState::ReadingResponse, |s| {
            let first = s.wait_for_set(RESP_PENDING_FLAG, may_block)?;
            let mut res = first[..FEATURE_RPT_DATA_SIZE].to_vec();
            loop {
                let this = s.raw_read()?;
                let flags = this[FEATURE_RPT_DATA_SIZE];
                if flags & RESP_PENDING_FLAG == 0 {
                    break;
                }
                // Sequence wrapped around: the device restarted the response.
                let seq = flags & RESP_SEQ_MASK;
                if !res.is_empty() && seq == 0 {
                    break;
                }
                res.extend_from_slice(&this[..FEATURE_RPT_DATA_SIZE]);
            }
            s.write_reset()?;
            debug!(len = res.len(), "Response read");
            Ok(res)
        })
    }

    /// Take the device out of response mode with a dummy write.
    pub fn write_reset(&mut self) -> Result<()> {
        let mut report = [0u8; FEATURE_RPT_SIZE];
        report[FEATURE_RPT_DATA_SIZE] = DUMMY_REPORT_WRITE;
        self.raw_write(&report, "reset")?;
        self.wait_for_clear(SLOT_WRITE_FLAG, false)?;
        Ok(())
    }

    /// Write a configuration frame and check that the device took it.
    #[instrument(skip(self, frame), fields(command = frame.command()))]
    pub fn write_and_verify_config(
        &mut self,
        frame: &Frame,
        slot: u8,
        prior_pgm_seq: u8,
    ) -> Result<Status> {
        self.write_frame(frame)?;
        self.wait_for_clear(SLOT_WRITE_FLAG, false)?;
        // make sure we have a fresh pgm_seq value
        let status = self.status()?;
        self.emit(YkEvent::Programmed {
            slot,
            before: prior_pgm_seq,
            after: status.pgm_seq,
        });
        verify_programming(prior_pgm_seq, &status)?;
        Ok(status)
    }

    pub fn wait_for_set(&mut self, mask: u8, may_block: bool) -> Result<FeatureReport> {
        self.poll_until(PollMode::And, mask, may_block)
    }

    pub fn wait_for_clear(&mut self, mask: u8, may_block: bool) -> Result<FeatureReport> {
        self.poll_until(PollMode::Nand, mask, may_block)
    }

    /// Read reports until the flags byte satisfies `mode`/`mask`.
    ///
    /// Returns the report that matched.
    pub fn poll_until(&mut self, mode: PollMode, mask: u8, may_block: bool) -> Result<FeatureReport> {
        self.run(SessionState::Polling, |s| {
            let mut sleep = INITIAL_BACKOFF;
            let mut wait_num = attempt_budget(s.config.poll_timeout_secs);
            // device has not indicated RESP_TIMEOUT (yet)
            let mut resp_timeout = false;

            loop {
                s.sleeper.sleep(sleep);
                let this = s.raw_read()?;
                let flags = this[FEATURE_RPT_DATA_SIZE];

                if flags & RESP_TIMEOUT_WAIT_FLAG != 0 && !resp_timeout {
                    resp_timeout = true;
                    let seconds_left = flags & RESP_TIMEOUT_WAIT_MASK;
                    if may_block {
                        let cap = s.config.max_block_secs.min(MAX_BLOCK_SECS);
                        let seconds = u32::from(seconds_left).min(cap);
                        wait_num = attempt_budget(seconds);
                    }
                    s.emit(YkEvent::TimeoutWait {
                        seconds_left,
                        extended: may_block,
                    });
                }

                if mode.matches(flags, mask) {
                    return Ok(this);
                }
                s.emit(YkEvent::Waiting { mode, mask, flags });

                wait_num = wait_num.saturating_sub(1);
                if wait_num == 0 {
                    return Err(YkError::Timeout { mask, mode });
                }
                sleep = (sleep * 2).min(MAX_BACKOFF);
            }
        })
    }

    /// Release the device.
    pub fn close(mut self) -> T {
        self.goto_state(SessionState::Idle);
        self.transport
    }

    fn run<R>(&mut self, state: SessionState, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let prev = self.state;
        self.goto_state(state);
        let result = f(self);
        self.goto_state(prev);
        result
    }

    fn goto_state(&mut self, new_state: SessionState) {
        if self.state != new_state {
            self.emit(YkEvent::StateChanged {
                from: self.state,
                to: new_state,
            });
            self.state = new_state;
        }
    }

    fn raw_read(&self) -> Result<FeatureReport> {
        let data = self.transport.read_feature_report()?;
        if self.config.trace_reports {
            self.emit(YkEvent::Report {
                direction: ReportDirection::Read,
                data,
                note: "",
            });
        }
        Ok(data)
    }

    fn raw_write(&self, report: &FeatureReport, note: &'static str) -> Result<()> {
        if self.config.trace_reports {
            self.emit(YkEvent::Report {
                direction: ReportDirection::Write,
                data: *report,
                note,
            });
        }
        let sent = self.transport.write_feature_report(report)?;
        if sent != FEATURE_RPT_SIZE {
            return Err(TransportError::ShortWrite {
                expected: FEATURE_RPT_SIZE,
                actual: sent,
            }
            .into());
        }
        Ok(())
    }

    fn emit(&self, event: YkEvent) {
        self.observer.on_event(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullObserver, RecordingObserver};
    use crate::protocol::constants::slot;
    use crate::transport::{FrameReply, MockTransport};

    fn session(mock: &MockTransport) -> (HidSession<MockTransport, NullObserver>, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::new());
        let session = HidSession::new(
            mock.clone(),
            SessionConfig::default(),
            Arc::new(NullObserver),
            Box::new(sleeper.clone()),
        )
        .unwrap();
        (session, sleeper)
    }

    #[test]
    fn test_open_primes_status() {
        let mock = MockTransport::new();
        let (session, _) = session(&mock);
        assert_eq!(mock.read_count(), 1);
        assert_eq!(session.last_status().version().to_string(), "2.2.3");
        assert_eq!(session.state(), SessionState::Opened);
    }

    #[test]
    fn test_open_fails_when_device_silent() {
        let mock = MockTransport::new();
        mock.disconnect();
        let result = HidSession::new(
            mock,
            SessionConfig::default(),
            Arc::new(NullObserver),
            Box::new(RecordingSleeper::new()),
        );
        assert!(matches!(result, Err(YkError::InitializationFailed(_))));
    }

    #[test]
    fn test_attempt_budget() {
        assert_eq!(attempt_budget(2), 9);
        assert_eq!(attempt_budget(20), 45);
        assert_eq!(attempt_budget(u32::MAX), u32::MAX);
        assert_eq!(attempt_budget(u32::MAX / 2), u32::MAX);
    }

    #[test]
    fn test_poll_and_times_out_after_budget() {
        let mock = MockTransport::new();
        let (mut session, sleeper) = session(&mock);

        let err = session
            .poll_until(PollMode::And, RESP_PENDING_FLAG, false)
            .unwrap_err();
        assert!(matches!(
            err,
            YkError::Timeout {
                mask: RESP_PENDING_FLAG,
                mode: PollMode::And
            }
        ));
        assert_eq!(mock.read_count(), 1 + 9);

        let ms: Vec<u128> = sleeper.delays().iter().map(|d| d.as_millis()).collect();
        assert_eq!(ms, vec![10, 20, 40, 80, 160, 320, 500, 500, 500]);
        assert_eq!(session.state(), SessionState::Opened);
    }

    #[test]
    fn test_poll_nand_waits_for_busy_to_clear() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        mock.set_busy_reads(3);
        mock.write_feature_report(&[0; 8]).unwrap();

        let report = session.wait_for_clear(SLOT_WRITE_FLAG, false).unwrap();
        assert_eq!(report[7] & SLOT_WRITE_FLAG, 0);
        assert_eq!(mock.read_count(), 1 + 4);
    }

    #[test]
    fn test_timeout_wait_extends_budget_when_blocking() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        mock.set_stuck_flags(Some(RESP_TIMEOUT_WAIT_FLAG | 15));

        let err = session
            .poll_until(PollMode::And, RESP_PENDING_FLAG, true)
            .unwrap_err();
        assert!(matches!(err, YkError::Timeout { .. }));
        assert_eq!(mock.read_count(), 1 + attempt_budget(15) as usize);
    }

    #[test]
    fn test_timeout_wait_capped_at_max_block() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        mock.set_stuck_flags(Some(RESP_TIMEOUT_WAIT_FLAG | RESP_TIMEOUT_WAIT_MASK));

        let _ = session.poll_until(PollMode::And, RESP_PENDING_FLAG, true);
        assert_eq!(mock.read_count(), 1 + attempt_budget(20) as usize);
    }

    #[test]
    fn test_max_block_secs_cannot_raise_cap() {
        let mock = MockTransport::new();
        let config = SessionConfig {
            max_block_secs: 600,
            ..Default::default()
        };
        let mut session = HidSession::new(
            mock.clone(),
            config,
            Arc::new(NullObserver),
            Box::new(RecordingSleeper::new()),
        )
        .unwrap();
        mock.set_stuck_flags(Some(RESP_TIMEOUT_WAIT_FLAG | RESP_TIMEOUT_WAIT_MASK));

        let _ = session.poll_until(PollMode::And, RESP_PENDING_FLAG, true);
        assert_eq!(mock.read_count(), 1 + attempt_budget(MAX_BLOCK_SECS) as usize);
    }

    #[test]
    fn test_max_block_secs_lowers_cap() {
        let mock = MockTransport::new();
        let config = SessionConfig {
            max_block_secs: 3,
            ..Default::default()
        };
        let mut session = HidSession::new(
            mock.clone(),
            config,
            Arc::new(NullObserver),
            Box::new(RecordingSleeper::new()),
        )
        .unwrap();
        mock.set_stuck_flags(Some(RESP_TIMEOUT_WAIT_FLAG | 15));

        let _ = session.poll_until(PollMode::And, RESP_PENDING_FLAG, true);
        assert_eq!(mock.read_count(), 1 + attempt_budget(3) as usize);
    }

    #[test]
    fn test_timeout_wait_ignored_without_blocking() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        mock.set_stuck_flags(Some(RESP_TIMEOUT_WAIT_FLAG | 15));

        let _ = session.poll_until(PollMode::And, RESP_PENDING_FLAG, false);
        assert_eq!(mock.read_count(), 1 + 9);
    }

    #[test]
    fn test_write_frame_polls_before_each_report() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);

        let frame = Frame::empty(slot::DEVICE_SERIAL);
        session.write_frame(&frame).unwrap();

        let writes = mock.get_writes();
        assert_eq!(writes, frame.to_feature_reports());
        assert_eq!(mock.read_count(), 1 + writes.len());
    }

    #[test]
    fn test_read_response_collects_until_pending_clears() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        let data: Vec<u8> = (1..=20).collect();
        mock.queue_response(&data);

        session.write_frame(&Frame::empty(slot::DEVICE_SERIAL)).unwrap();
        let res = session.read_response(false).unwrap();

        assert_eq!(res.len(), 21);
        assert_eq!(&res[..20], &data[..]);
        let last = *mock.get_writes().last().unwrap();
        assert_eq!(last[7], DUMMY_REPORT_WRITE);
    }

    #[test]
    fn test_read_response_stops_on_sequence_wrap() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        mock.push_reports([
            [1, 1, 1, 1, 1, 1, 1, RESP_PENDING_FLAG],
            [2, 2, 2, 2, 2, 2, 2, RESP_PENDING_FLAG | 1],
            [3, 3, 3, 3, 3, 3, 3, RESP_PENDING_FLAG],
            [4, 4, 4, 4, 4, 4, 4, RESP_PENDING_FLAG | 1],
        ]);

        let res = session.read_response(false).unwrap();
        assert_eq!(res, vec![1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_write_and_verify_first_programming() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        let mut programmed = mock.status();
        programmed.pgm_seq = 1;
        programmed.touch_level = 0b01;
        mock.queue_reply(FrameReply::Status(programmed));

        let frame = Frame::new(slot::CONFIG, &[0x42; 64]).unwrap();
        let status = session.write_and_verify_config(&frame, 1, 0).unwrap();
        assert_eq!(status.pgm_seq, 1);
    }

    #[test]
    fn test_write_and_verify_unchanged_seq_fails() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);

        let frame = Frame::new(slot::CONFIG, &[0x42; 64]).unwrap();
        let err = session.write_and_verify_config(&frame, 1, 0).unwrap_err();
        assert!(matches!(
            err,
            YkError::ProgrammingFailed {
                before: 0,
                after: 0
            }
        ));
    }

    #[test]
    fn test_verify_programming_branches() {
        let mut status = Status {
            version_major: 2,
            version_minor: 3,
            pgm_seq: 5,
            touch_level: 0b11,
            ..Default::default()
        };
        assert!(verify_programming(4, &status).is_ok());
        assert!(verify_programming(5, &status).is_err());

        status.pgm_seq = 0;
        status.touch_level = 0;
        assert!(verify_programming(4, &status).is_ok());
        status.touch_level = 0b10;
        assert!(verify_programming(4, &status).is_err());

        status.pgm_seq = 2;
        assert!(verify_programming(0, &status).is_err());
    }

    #[test]
    fn test_events_trace_reports_and_states() {
        let mock = MockTransport::new();
        let observer = Arc::new(RecordingObserver::new());
        let mut session = HidSession::new(
            mock,
            SessionConfig::default(),
            observer.clone(),
            Box::new(RecordingSleeper::new()),
        )
        .unwrap();
        session.write_frame(&Frame::empty(slot::DEVICE_SERIAL)).unwrap();

        let events = observer.events();
        assert!(matches!(events[0], YkEvent::StateChanged { .. }));
        assert!(events.iter().any(|e| matches!(
            e,
            YkEvent::Report {
                direction: ReportDirection::Write,
                ..
            }
        )));
        assert!(events.contains(&YkEvent::FrameWritten {
            command: slot::DEVICE_SERIAL
        }));
    }

    #[test]
    fn test_close_returns_transport() {
        let mock = MockTransport::new();
        let (session, _) = session(&mock);
        let transport = session.close();
        assert_eq!(transport.read_count(), 1);
    }

    #[test]
    fn test_disconnect_surfaces_transport_error() {
        let mock = MockTransport::new();
        let (mut session, _) = session(&mock);
        mock.disconnect();

        let err = session.write_frame(&Frame::empty(slot::DEVICE_SERIAL)).unwrap_err();
        assert!(matches!(
            err,
            YkError::Transport(TransportError::Disconnected)
        ));
        assert!(!err.is_local());
        assert_eq!(session.state(), SessionState::Opened);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yk.toml");
        let config = SessionConfig {
            skip: 1,
            may_block: false,
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();
        assert_eq!(SessionConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: SessionConfig = toml::from_str("skip = 2").unwrap();
        assert_eq!(config.skip, 2);
        assert_eq!(config.poll_timeout_secs, 2);
        assert_eq!(config.max_block_secs, 20);
    }
}
