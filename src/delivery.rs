//! Reliable, acknowledged delivery of single frames.
//!
//! Each message walks the same state machine:
//!
//! ```text
//! ENCODE --error--> FAILURE
//! ENCODE --> TRANSMIT --> WAIT_ACK --ack from target--> SUCCESS
//!                            |
//!                            +--timeout, or another command from target--> RESEND
//! RESEND --attempts left--> TRANSMIT
//! RESEND --budget spent---> FAILURE
//! ```
//!
//! While waiting, frames from other addresses are ignored and corrupted
//! frames are counted and dropped; neither ends the wait early nor restarts
//! the timeout. A message either completes within
//! [`LinkConfig::budget_millis`] or is reported as
//! [`Error::DeliveryTimeout`]. Nothing is queued for a later retry.

use crate::config::LinkConfig;
use crate::consts::MAX_FRAME_LEN;
use crate::error::{Error, Result};
use crate::frame::{self, Frame, ParsedFrame, Validation};
use crate::message::Message;
use crate::registry::DeviceRegistry;
use crate::timer::{Clock, elapsed_ms};
use crate::transceiver::{Transceiver, radio_error};

/// A successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Delivered {
    /// Transmissions it took, the last one being acknowledged.
    pub attempts: u8,
}

/// Link counters, in the spirit of a driver's good/bad frame counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    /// Frames handed to the transceiver.
    pub tx_frames: u32,
    /// Received frames that passed their integrity check.
    pub rx_good: u32,
    /// Received frames that failed their integrity check.
    pub rx_bad: u32,
}

/// How a wait for an acknowledgement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AckWait {
    Acked,
    Rejected { command_code: u8 },
    TimedOut,
}

/// Sends frames and waits for their acknowledgements.
///
/// The engine borrows the transceiver per call, so it can only be used by
/// whoever currently holds the radio lease.
#[derive(Debug)]
pub struct DeliveryEngine<C> {
    clock: C,
    link: LinkConfig,
    /// Frame counters since the engine was created.
    pub stats: LinkStats,
}

impl<C: Clock> DeliveryEngine<C> {
    /// Creates an engine measuring timeouts with `clock`.
    pub fn new(clock: C, link: LinkConfig) -> Self {
        Self {
            clock,
            link,
            stats: LinkStats::default(),
        }
    }

    /// The retry budget in use.
    pub fn link(&self) -> &LinkConfig {
        &self.link
    }

    /// Delivers `message` to its target device.
    ///
    /// # Errors
    /// - [`Error::UnknownDevice`] or [`Error::PayloadTooLarge`] if the message
    ///   cannot be encoded; nothing is transmitted
    /// - [`Error::DeliveryTimeout`] if no acknowledgement arrived within the
    ///   retry budget
    /// - [`Error::Transceiver`] if the driver failed
    pub fn deliver<R: Transceiver>(
        &mut self,
        radio: &mut R,
        registry: &DeviceRegistry,
        message: &Message,
    ) -> Result<Delivered> {
        let frame = match frame::encode_command(message, registry) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("cannot encode {:?} for {}: {}", message.command(), message.target(), err);
                return Err(err);
            }
        };
        let target = frame.address();

        for attempt in 1..=self.link.max_resend {
            self.transmit(radio, &frame)?;
            match self.wait_ack(radio, target)? {
                AckWait::Acked => {
                    debug!("{:#06x} acknowledged after {} attempt(s)", target, attempt);
                    return Ok(Delivered { attempts: attempt });
                }
                AckWait::Rejected { command_code } => {
                    debug!(
                        "{:#06x} answered with command {:#04x} instead of ACK, resending",
                        target,
                        command_code
                    );
                }
                AckWait::TimedOut => {
                    debug!("no ACK from {:#06x} on attempt {}", target, attempt);
                }
            }
        }

        warn!(
            "dropping {:?} for {}: no ACK after {} attempts",
            message.command(),
            message.target(),
            self.link.max_resend
        );
        Err(Error::DeliveryTimeout {
            attempts: self.link.max_resend,
        })
    }

    /// Acknowledges a frame received from `address`, then goes back to listening.
    pub fn send_ack<R: Transceiver>(&mut self, radio: &mut R, address: u16) -> Result<()> {
        let ack = frame::encode_ack(address);
        self.transmit(radio, &ack)?;
        radio.begin_receive().map_err(radio_error)
    }

    /// Listens for up to `budget_ms` for an intact frame from `address` that is
    /// not an acknowledgement.
    ///
    /// Returns `None` once the budget is spent.
    pub fn listen_for_report<R: Transceiver>(
        &mut self,
        radio: &mut R,
        address: u16,
        budget_ms: u64,
    ) -> Result<Option<ParsedFrame>> {
        radio.begin_receive().map_err(radio_error)?;
        let started = self.clock.now_ms();
        let mut buf = [0u8; MAX_FRAME_LEN];
        loop {
            if let Some(len) = self.read_frame(radio, &mut buf)? {
                match self.check(&buf[..len], address) {
                    Validation::Valid(frame) if !frame.is_ack() => return Ok(Some(frame)),
                    Validation::Valid(_) | Validation::WrongTarget(_) | Validation::IntegrityError => {}
                }
            }
            if elapsed_ms(&self.clock, started) >= budget_ms {
                return Ok(None);
            }
        }
    }

    fn transmit<R: Transceiver>(&mut self, radio: &mut R, frame: &Frame) -> Result<()> {
        radio.begin_transmit().map_err(radio_error)?;
        debug!("sending {:02x?}", frame.as_bytes());
        radio.send(frame).map_err(radio_error)?;
        self.stats.tx_frames = self.stats.tx_frames.wrapping_add(1);
        Ok(())
    }

    fn wait_ack<R: Transceiver>(&mut self, radio: &mut R, target: u16) -> Result<AckWait> {
        radio.begin_receive().map_err(radio_error)?;
        let started = self.clock.now_ms();
        let timeout = u64::from(self.link.max_waiting_millis);
        let mut buf = [0u8; MAX_FRAME_LEN];
        loop {
            if let Some(len) = self.read_frame(radio, &mut buf)? {
                match self.check(&buf[..len], target) {
                    Validation::Valid(frame) if frame.is_ack() => return Ok(AckWait::Acked),
                    Validation::Valid(frame) => {
                        return Ok(AckWait::Rejected {
                            command_code: frame.command_code(),
                        });
                    }
                    Validation::WrongTarget(_) | Validation::IntegrityError => {}
                }
            }
            if elapsed_ms(&self.clock, started) >= timeout {
                return Ok(AckWait::TimedOut);
            }
        }
    }

    /// Reads the next frame into `buf`, if one is waiting.
    fn read_frame<R: Transceiver>(&mut self, radio: &mut R, buf: &mut [u8]) -> Result<Option<usize>> {
        if !radio.frame_available().map_err(radio_error)? {
            return Ok(None);
        }
        let size = radio.frame_size().map_err(radio_error)?.min(buf.len());
        let len = radio.receive(&mut buf[..size]).map_err(radio_error)?;
        debug!("received {:02x?}", &buf[..len]);
        Ok(Some(len))
    }

    fn check(&mut self, raw: &[u8], expected: u16) -> Validation {
        let validation = frame::validate(raw, expected);
        match validation {
            Validation::IntegrityError => {
                self.stats.rx_bad = self.stats.rx_bad.wrapping_add(1);
                debug!("dropping corrupted frame {:02x?}", raw);
            }
            Validation::Valid(_) | Validation::WrongTarget(_) => {
                self.stats.rx_good = self.stats.rx_good.wrapping_add(1);
            }
        }
        validation
    }
}
