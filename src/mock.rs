//! Scripted transceiver for the unit tests.
//!
//! `FakeRadio` records every frame it sends and answers each one with the
//! frames its responder returns. Time only moves while the radio is polled
//! for incoming frames, one millisecond per poll, so timeouts are exact.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::crc::fcs;
use crate::frame::Frame;
use crate::transceiver::Transceiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Off,
    Idle,
    Tx,
    Rx,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FakeError {
    NotInitialized,
    NotTransmitting,
    NotReceiving,
}

type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

pub(crate) type SentLog = Arc<Mutex<Vec<Vec<u8>>>>;

pub(crate) struct FakeRadio {
    pub mode: Mode,
    sent: SentLog,
    inbox: VecDeque<Vec<u8>>,
    responder: Responder,
    time: Arc<AtomicU64>,
}

impl core::fmt::Debug for FakeRadio {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FakeRadio")
            .field("mode", &self.mode)
            .field("inbox", &self.inbox.len())
            .finish()
    }
}

impl FakeRadio {
    pub fn new(responder: impl FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static) -> Self {
        Self {
            mode: Mode::Off,
            sent: Arc::new(Mutex::new(Vec::new())),
            inbox: VecDeque::new(),
            responder: Box::new(responder),
            time: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A radio nobody ever answers.
    pub fn silent() -> Self {
        Self::new(|_| Vec::new())
    }

    /// Powered up and idle, for tests that skip `Hub::new`.
    pub fn ready(mut self) -> Self {
        self.mode = Mode::Idle;
        self
    }

    pub fn sent(&self) -> SentLog {
        Arc::clone(&self.sent)
    }

    pub fn clock(&self) -> impl Fn() -> u64 + Send + 'static {
        let time = Arc::clone(&self.time);
        move || time.load(Ordering::SeqCst)
    }

    pub fn now(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }

    pub fn inject(&mut self, raw: Vec<u8>) {
        self.inbox.push_back(raw);
    }
}

impl Transceiver for FakeRadio {
    type Error = FakeError;

    fn initialize(&mut self) -> Result<(), FakeError> {
        self.mode = Mode::Idle;
        Ok(())
    }

    fn begin_transmit(&mut self) -> Result<(), FakeError> {
        if self.mode == Mode::Off {
            return Err(FakeError::NotInitialized);
        }
        self.mode = Mode::Tx;
        Ok(())
    }

    fn begin_receive(&mut self) -> Result<(), FakeError> {
        if self.mode == Mode::Off {
            return Err(FakeError::NotInitialized);
        }
        self.mode = Mode::Rx;
        Ok(())
    }

    fn send(&mut self, frame: &Frame) -> Result<(), FakeError> {
        if self.mode != Mode::Tx {
            return Err(FakeError::NotTransmitting);
        }
        let bytes = frame.as_bytes();
        self.sent.lock().unwrap().push(bytes.to_vec());
        let replies = (self.responder)(bytes);
        self.inbox.extend(replies);
        Ok(())
    }

    fn frame_available(&mut self) -> Result<bool, FakeError> {
        if self.mode != Mode::Rx {
            return Err(FakeError::NotReceiving);
        }
        let _ = self.time.fetch_add(1, Ordering::SeqCst);
        Ok(!self.inbox.is_empty())
    }

    fn frame_size(&mut self) -> Result<usize, FakeError> {
        Ok(self.inbox.front().map_or(0, Vec::len))
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, FakeError> {
        let frame = self.inbox.pop_front().unwrap_or_default();
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        Ok(len)
    }
}

/// Raw frame as a device would send it.
pub(crate) fn raw_frame(address: u16, code: u8, data: &[u8]) -> Vec<u8> {
    let mut raw = address.to_be_bytes().to_vec();
    raw.push(code);
    raw.extend_from_slice(data);
    let check = fcs(&raw);
    raw.extend_from_slice(&check);
    raw
}

/// `(address, command code)` of every frame in the log.
pub(crate) fn summary(log: &SentLog) -> Vec<(u16, u8)> {
    log.lock()
        .unwrap()
        .iter()
        .map(|f| header(f))
        .collect()
}

/// `(address, command code)` of a frame the hub sent.
pub(crate) fn header(frame: &[u8]) -> (u16, u8) {
    (u16::from_be_bytes([frame[0], frame[1]]), frame[2])
}
