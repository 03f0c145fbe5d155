//! Mock HID transport for testing.
//!
//! Behaves like a small YubiKey: it reassembles written frames, answers them
//! with queued replies, raises the busy flag after writes and streams
//! responses as RESP_PENDING report sequences.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::traits::{HidTransport, TransportError};
use crate::crc::crc16;
use crate::protocol::constants::{
    DUMMY_REPORT_WRITE, FEATURE_RPT_DATA_SIZE, FEATURE_RPT_SIZE, FRAME_SIZE, PID_YUBIKEY,
    RESP_PENDING_FLAG, RESP_SEQ_MASK, SLOT_DATA_SIZE, SLOT_WRITE_FLAG, YUBICO_VID,
};
use crate::protocol::{FeatureReport, Status};

/// What the simulated device does once a complete frame has been written.
#[derive(Debug, Clone)]
pub enum FrameReply {
    /// Stream these bytes back as a pending response.
    Response(Vec<u8>),
    /// Replace the device status (e.g. bump pgm_seq after programming).
    Status(Status),
    /// Accept the frame silently.
    Nothing,
}

/// A frame as reassembled by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub command: u8,
    pub payload: Vec<u8>,
    pub crc: u16,
}

#[derive(Debug)]
struct DeviceState {
    status: Status,
    stuck_flags: Option<u8>,
    busy_reads: u32,
    busy_left: u32,
    pending: VecDeque<FeatureReport>,
    replies: VecDeque<FrameReply>,
    assembly: [u8; FRAME_SIZE],
    frames: Vec<CapturedFrame>,
    writes: Vec<FeatureReport>,
    reads: usize,
    connected: bool,
}

/// Mock transport for unit testing the session and device logic.
///
/// Clones share the same simulated device, so a test can keep a handle
/// after moving the transport into a session.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<DeviceState>>,
    vid: u16,
    pid: u16,
}

impl MockTransport {
    /// A classic YubiKey 2.2.3 with nothing programmed.
    pub fn new() -> Self {
        Self::with_status(Status {
            version_major: 2,
            version_minor: 2,
            version_build: 3,
            ..Default::default()
        })
    }

    pub fn with_status(status: Status) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                status,
                stuck_flags: None,
                busy_reads: 0,
                busy_left: 0,
                pending: VecDeque::new(),
                replies: VecDeque::new(),
                assembly: [0u8; FRAME_SIZE],
                frames: Vec::new(),
                writes: Vec::new(),
                reads: 0,
                connected: true,
            })),
            vid: YUBICO_VID,
            pid: PID_YUBIKEY,
        }
    }

    /// Append the device-style CRC (complemented, little-endian) to `data`.
    pub fn with_crc(data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        out.extend_from_slice(&(!crc16(data)).to_le_bytes());
        out
    }

    /// Queue the reply to the next complete frame.
    pub fn queue_reply(&self, reply: FrameReply) {
        self.state.lock().unwrap().replies.push_back(reply);
    }

    /// Queue a response payload for the next complete frame.
    pub fn queue_response(&self, data: &[u8]) {
        self.queue_reply(FrameReply::Response(data.to_vec()));
    }

    /// Queue raw reports to be returned on the next reads.
    pub fn push_reports(&self, reports: impl IntoIterator<Item = FeatureReport>) {
        self.state.lock().unwrap().pending.extend(reports);
    }

    /// Make every read report these flags (or stop doing so).
    pub fn set_stuck_flags(&self, flags: Option<u8>) {
        self.state.lock().unwrap().stuck_flags = flags;
    }

    /// Number of reads reporting SLOT_WRITE_FLAG after each write.
    pub fn set_busy_reads(&self, reads: u32) {
        self.state.lock().unwrap().busy_reads = reads;
    }

    pub fn set_status(&self, status: Status) {
        self.state.lock().unwrap().status = status;
    }

    pub fn status(&self) -> Status {
        self.state.lock().unwrap().status
    }

    /// Get all captured writes.
    pub fn get_writes(&self) -> Vec<FeatureReport> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Clear captured writes.
    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }

    /// Frames reassembled from the writes so far.
    pub fn frames(&self) -> Vec<CapturedFrame> {
        self.state.lock().unwrap().frames.clone()
    }

    pub fn read_count(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    /// Simulate device disconnect.
    pub fn disconnect(&self) {
        self.state.lock().unwrap().connected = false;
    }

    /// Simulate device reconnect.
    pub fn reconnect(&self) {
        self.state.lock().unwrap().connected = true;
    }

    /// Set VID/PID, e.g. to pose as a NEO.
    pub fn set_ids(&mut self, vid: u16, pid: u16) {
        self.vid = vid;
        self.pid = pid;
    }

    fn response_reports(data: &[u8]) -> Vec<FeatureReport> {
        data.chunks(FEATURE_RPT_DATA_SIZE)
            .enumerate()
            .map(|(seq, chunk)| {
                let mut report = [0u8; FEATURE_RPT_SIZE];
                report[..chunk.len()].copy_from_slice(chunk);
                report[FEATURE_RPT_DATA_SIZE] = RESP_PENDING_FLAG | (seq as u8 & RESP_SEQ_MASK);
                report
            })
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    fn status_report(&self, flags: u8) -> FeatureReport {
        let mut report = self.status.to_report();
        report[FEATURE_RPT_DATA_SIZE] = flags;
        report
    }

    fn frame_complete(&mut self) {
        let payload = self.assembly[..SLOT_DATA_SIZE].to_vec();
        let command = self.assembly[SLOT_DATA_SIZE];
        let crc = u16::from_le_bytes([
            self.assembly[SLOT_DATA_SIZE + 1],
            self.assembly[SLOT_DATA_SIZE + 2],
        ]);
        self.frames.push(CapturedFrame {
            command,
            payload,
            crc,
        });

        match self.replies.pop_front() {
            Some(FrameReply::Response(data)) => {
                self.pending = MockTransport::response_reports(&data).into();
            }
            Some(FrameReply::Status(status)) => self.status = status,
            Some(FrameReply::Nothing) | None => {}
        }
    }
}

impl HidTransport for MockTransport {
    fn read_feature_report(&self) -> Result<FeatureReport, TransportError> {
        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return Err(TransportError::Disconnected);
        }
        state.reads += 1;

        if let Some(flags) = state.stuck_flags {
            return Ok(state.status_report(flags));
        }
        if state.busy_left > 0 {
            state.busy_left -= 1;
            return Ok(state.status_report(SLOT_WRITE_FLAG));
        }
        if let Some(report) = state.pending.pop_front() {
            return Ok(report);
        }
        Ok(state.status_report(0))
    }

    fn write_feature_report(&self, report: &FeatureReport) -> Result<usize, TransportError> {
        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return Err(TransportError::Disconnected);
        }
        state.writes.push(*report);
        state.busy_left = state.busy_reads;

        let trailer = report[FEATURE_RPT_DATA_SIZE];
        if trailer == DUMMY_REPORT_WRITE {
            state.pending.clear();
            return Ok(report.len());
        }
        if trailer & SLOT_WRITE_FLAG != 0 {
            let seq = (trailer & !SLOT_WRITE_FLAG) as usize;
            if seq == 0 {
                state.assembly = [0u8; FRAME_SIZE];
            }
            let start = seq * FEATURE_RPT_DATA_SIZE;
            if start + FEATURE_RPT_DATA_SIZE <= FRAME_SIZE {
                state.assembly[start..start + FEATURE_RPT_DATA_SIZE]
                    .copy_from_slice(&report[..FEATURE_RPT_DATA_SIZE]);
            }
            if start + FEATURE_RPT_DATA_SIZE == FRAME_SIZE {
                state.frame_complete();
            }
        }
        Ok(report.len())
    }

    fn vendor_id(&self) -> u16 {
        self.vid
    }

    fn product_id(&self) -> u16 {
        self.pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Frame;
    use crate::protocol::constants::slot;

    fn write_frame(mock: &MockTransport, frame: &Frame) {
        for report in frame.to_feature_reports() {
            mock.write_feature_report(&report).unwrap();
        }
    }

    #[test]
    fn test_mock_reassembles_frames() {
        let mock = MockTransport::new();
        let mut payload = [0u8; 64];
        payload[..4].copy_from_slice(b"abcd");
        payload[40] = 0x55;
        let frame = Frame::new(slot::CHAL_HMAC2, &payload).unwrap();
        write_frame(&mock, &frame);

        let frames = mock.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, slot::CHAL_HMAC2);
        assert_eq!(frames[0].payload, payload.to_vec());
        assert_eq!(frames[0].crc, frame.crc());
    }

    #[test]
    fn test_mock_streams_response() {
        let mock = MockTransport::new();
        mock.queue_response(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        write_frame(&mock, &Frame::empty(slot::DEVICE_SERIAL));

        let first = mock.read_feature_report().unwrap();
        assert_eq!(first[7], RESP_PENDING_FLAG);
        assert_eq!(&first[..7], &[1, 2, 3, 4, 5, 6, 7]);
        let second = mock.read_feature_report().unwrap();
        assert_eq!(second[7], RESP_PENDING_FLAG | 1);
        let idle = mock.read_feature_report().unwrap();
        assert_eq!(idle[7], 0);
    }

    #[test]
    fn test_mock_busy_after_write() {
        let mock = MockTransport::new();
        mock.set_busy_reads(2);
        mock.write_feature_report(&[0, 0, 0, 0, 0, 0, 0, 0x80]).unwrap();
        assert_eq!(mock.read_feature_report().unwrap()[7], SLOT_WRITE_FLAG);
        assert_eq!(mock.read_feature_report().unwrap()[7], SLOT_WRITE_FLAG);
        assert_eq!(mock.read_feature_report().unwrap()[7], 0);
        assert_eq!(mock.read_count(), 3);
    }

    #[test]
    fn test_mock_reset_write_drops_response() {
        let mock = MockTransport::new();
        mock.push_reports([[0, 0, 0, 0, 0, 0, 0, RESP_PENDING_FLAG]]);
        mock.write_feature_report(&[0, 0, 0, 0, 0, 0, 0, DUMMY_REPORT_WRITE])
            .unwrap();
        assert_eq!(mock.read_feature_report().unwrap()[7], 0);
    }

    #[test]
    fn test_mock_disconnect() {
        let mock = MockTransport::new();
        mock.disconnect();
        assert!(mock.read_feature_report().is_err());
        assert!(mock.write_feature_report(&[0; 8]).is_err());
        mock.reconnect();
        assert!(mock.read_feature_report().is_ok());
    }
}
