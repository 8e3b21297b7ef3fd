//! The radio the hub drives.
//!
//! Bring-up (power, channel, pipe addresses, pins) belongs to the driver
//! behind this trait. The hub only switches between the two half-duplex
//! modes, sends whole frames and drains whole frames.

use core::fmt::Debug;

use crate::error::Error;
use crate::frame::Frame;

/// A half-duplex packet transceiver, e.g. an nRF24L01 with dynamic payloads.
///
/// ## Contract
/// - [`send`](Transceiver::send) is only called after
///   [`begin_transmit`](Transceiver::begin_transmit)
/// - [`frame_available`](Transceiver::frame_available) is only polled after
///   [`begin_receive`](Transceiver::begin_receive)
/// - [`receive`](Transceiver::receive) is handed a buffer at least
///   [`frame_size`](Transceiver::frame_size) bytes long, capped at
///   [`MAX_FRAME_LEN`](crate::consts::MAX_FRAME_LEN)
pub trait Transceiver {
    /// Driver error.
    type Error: Debug;

    /// Powers up and configures the radio. Called once by [`Hub::new`](crate::hub::Hub::new).
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Stops listening so a frame can be sent.
    fn begin_transmit(&mut self) -> Result<(), Self::Error>;

    /// Starts listening for incoming frames.
    fn begin_receive(&mut self) -> Result<(), Self::Error>;

    /// Sends one frame.
    fn send(&mut self, frame: &Frame) -> Result<(), Self::Error>;

    /// Whether a received frame is waiting to be read.
    fn frame_available(&mut self) -> Result<bool, Self::Error>;

    /// Size of the next received frame.
    fn frame_size(&mut self) -> Result<usize, Self::Error>;

    /// Reads the next received frame into `buf`, returning its length.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Logs a driver error and folds it into [`Error::Transceiver`].
pub(crate) fn radio_error<E: Debug>(err: E) -> Error {
    warn!("transceiver error: {:?}", err);
    Error::Transceiver
}
