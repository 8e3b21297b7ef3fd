//! Radio frame codec.
//!
//! Every frame on the link has the same layout:
//!
//! ```text
//! [addr_hi][addr_lo][command][data ...][fcs_lo][fcs_hi]
//! ```
//!
//! - `addr`: the target address for frames sent by the hub, the source
//!   address for frames sent by a device, big-endian
//! - `command`: a [`Command`] code
//! - `data`: up to [`MAX_DATA_LEN`] bytes, absent in ACK frames
//! - `fcs`: ones' complement of the CRC-CCITT over everything before it,
//!   low byte first, so that running the CRC over a whole valid frame leaves
//!   [`FCS_RESIDUE`](crate::consts::FCS_RESIDUE)
//!
//! All functions here are pure.

use heapless::Vec;

use crate::consts::{FRAME_HEADER_LEN, MAX_DATA_LEN, MAX_FRAME_LEN, MIN_FRAME_LEN};
use crate::crc::{fcs, fcs_valid};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::registry::DeviceRegistry;

/// Data carried by a frame.
pub type Payload = Vec<u8, MAX_DATA_LEN>;

/// Command codes understood by the hub and its devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Acknowledges the last frame received from the peer.
    Ack = 0x01,
    /// Asks a sensor for its current status.
    StatusRequest = 0x02,
    /// Status sent by a sensor.
    StatusReport = 0x03,
    /// Diagnostic command; the hub keeps the radio idle for a while afterwards.
    Test = 0x04,
    /// Marks a bay as reserved.
    Reserve = 0x10,
    /// Clears a reservation.
    Cancel = 0x11,
    /// Marks the arrival of the reserving driver.
    CheckIn = 0x12,
}

impl Command {
    /// Wire code of the command.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Maps a wire code back to a command.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Ack),
            0x02 => Some(Self::StatusRequest),
            0x03 => Some(Self::StatusReport),
            0x04 => Some(Self::Test),
            0x10 => Some(Self::Reserve),
            0x11 => Some(Self::Cancel),
            0x12 => Some(Self::CheckIn),
            _ => None,
        }
    }

    /// Maps a command name used on the message channel to a command.
    ///
    /// Only commands a remote client may issue have a name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "status" => Some(Self::StatusRequest),
            "test" => Some(Self::Test),
            "reserve" => Some(Self::Reserve),
            "cancel" => Some(Self::Cancel),
            "checkin" => Some(Self::CheckIn),
            _ => None,
        }
    }

    /// Whether the radio is held idle after delivering this command.
    pub fn holds_cooldown(self) -> bool {
        self == Self::Test
    }
}

/// An encoded frame, ready for transmission.
///
/// Only the codec builds frames, so every `Frame` carries a valid FCS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl Frame {
    fn build(address: u16, command: Command, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_DATA_LEN {
            return Err(Error::PayloadTooLarge {
                size: data.len(),
                max: MAX_DATA_LEN,
            });
        }
        let mut bytes: Vec<u8, MAX_FRAME_LEN> = Vec::new();
        let [hi, lo] = address.to_be_bytes();
        // The length check above leaves room for every push below.
        let _ = bytes.push(hi);
        let _ = bytes.push(lo);
        let _ = bytes.push(command.code());
        let _ = bytes.extend_from_slice(data);
        let check = fcs(&bytes);
        let _ = bytes.extend_from_slice(&check);
        Ok(Self { bytes })
    }

    /// The raw bytes to hand to the transceiver.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Target (or source) address carried by the frame.
    pub fn address(&self) -> u16 {
        u16::from_be_bytes([self.bytes[0], self.bytes[1]])
    }

    /// Command code carried by the frame.
    pub fn command_code(&self) -> u8 {
        self.bytes[2]
    }

    /// Length of the frame on the wire.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for parity with `len`.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The fields of a frame that passed its integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    address: u16,
    command_code: u8,
    data: Payload,
}

impl ParsedFrame {
    /// Source (or target) address of the frame.
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Raw command code of the frame.
    pub fn command_code(&self) -> u8 {
        self.command_code
    }

    /// The command, if the code is one the hub knows.
    pub fn command(&self) -> Option<Command> {
        Command::from_code(self.command_code)
    }

    /// Data between the header and the FCS.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether this frame acknowledges something.
    pub fn is_ack(&self) -> bool {
        self.command() == Some(Command::Ack)
    }
}

/// Result of checking a received frame against the address it should come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Intact and from the expected device.
    Valid(ParsedFrame),
    /// Corrupted in transit.
    IntegrityError,
    /// Intact, but from some other device.
    WrongTarget(ParsedFrame),
}

/// Encodes a message for its target device.
///
/// # Errors
/// - [`Error::UnknownDevice`] if the target is not in the registry
/// - [`Error::PayloadTooLarge`] if the data does not fit in a frame
pub fn encode_command(message: &Message, registry: &DeviceRegistry) -> Result<Frame> {
    let address = registry.address_of(message.target())?;
    Frame::build(address, message.command(), message.data())
}

/// Builds the acknowledgement for a frame received from `address`.
pub fn encode_ack(address: u16) -> Frame {
    let [hi, lo] = address.to_be_bytes();
    let header = [hi, lo, Command::Ack.code()];
    let check = fcs(&header);
    let mut bytes = Vec::new();
    let _ = bytes.extend_from_slice(&header);
    let _ = bytes.extend_from_slice(&check);
    Frame { bytes }
}

/// Checks the FCS of a received frame and splits it into its fields.
///
/// Frames too short to hold a header and an FCS fail the check as well.
pub fn decode(raw: &[u8]) -> Result<ParsedFrame> {
    if raw.len() < MIN_FRAME_LEN || raw.len() > MAX_FRAME_LEN || !fcs_valid(raw) {
        return Err(Error::Integrity);
    }
    let data_end = raw.len() - 2;
    let data = Payload::from_slice(&raw[FRAME_HEADER_LEN..data_end]).map_err(|_| Error::Integrity)?;
    Ok(ParsedFrame {
        address: u16::from_be_bytes([raw[0], raw[1]]),
        command_code: raw[2],
        data,
    })
}

/// Decodes `raw` and checks that it comes from `expected`.
pub fn validate(raw: &[u8], expected: u16) -> Validation {
    match decode(raw) {
        Err(_) => Validation::IntegrityError,
        Ok(frame) if frame.address == expected => Validation::Valid(frame),
        Ok(frame) => Validation::WrongTarget(frame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DeviceRegistry {
        DeviceRegistry::from_tables(
            &[("S1", 0xFA01), ("Device 2", 0xFA02), ("Gate", 0x00FF)],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_command_layout() {
        let registry = registry();
        let message = Message::new(Command::Test, "S1")
            .unwrap()
            .with_data(&[0x42])
            .unwrap();
        let frame = encode_command(&message, &registry).unwrap();
        assert_eq!(&frame.as_bytes()[..4], &[0xfa, 0x01, 0x04, 0x42]);
        assert_eq!(frame.len(), 6);
        assert_eq!(frame.address(), 0xFA01);
        assert_eq!(frame.command_code(), Command::Test.code());
    }

    #[test]
    fn test_round_trip_for_every_device() {
        let registry = registry();
        for device in registry.devices() {
            for command in [Command::StatusRequest, Command::Test, Command::Reserve] {
                let message = Message::new(command, device.name()).unwrap();
                let frame = encode_command(&message, &registry).unwrap();
                let parsed = decode(frame.as_bytes()).unwrap();
                assert_eq!(parsed.address(), device.address());
                assert_eq!(parsed.command(), Some(command));
                assert!(parsed.data().is_empty());
            }
        }
    }

    #[test]
    fn test_unknown_target() {
        let message = Message::new(Command::Test, "Nobody").unwrap();
        assert_eq!(
            encode_command(&message, &registry()),
            Err(Error::UnknownDevice)
        );
    }

    #[test]
    fn test_ack_frame() {
        let frame = encode_ack(0xFA02);
        assert_eq!(frame.len(), 5);
        let parsed = decode(frame.as_bytes()).unwrap();
        assert!(parsed.is_ack());
        assert_eq!(parsed.address(), 0xFA02);
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        let message = Message::new(Command::Reserve, "Device 2")
            .unwrap()
            .with_data(b"bay 7")
            .unwrap();
        let frame = encode_command(&message, &registry()).unwrap();
        for (frame, ack) in [(frame, false), (encode_ack(0xFA01), true)] {
            for byte in 0..frame.len() {
                for bit in 0..8 {
                    let mut raw = frame.as_bytes().to_vec();
                    raw[byte] ^= 1 << bit;
                    assert_eq!(decode(&raw), Err(Error::Integrity), "ack={ack} byte={byte} bit={bit}");
                }
            }
        }
    }

    #[test]
    fn test_short_frames_fail_integrity() {
        assert_eq!(decode(&[]), Err(Error::Integrity));
        assert_eq!(decode(&[0xfa, 0x01, 0x01, 0x00]), Err(Error::Integrity));
    }

    #[test]
    fn test_validate_checks_source() {
        let ack = encode_ack(0xFA01);
        assert!(matches!(validate(ack.as_bytes(), 0xFA01), Validation::Valid(_)));
        assert!(matches!(
            validate(ack.as_bytes(), 0xFA02),
            Validation::WrongTarget(f) if f.address() == 0xFA01
        ));
        let mut raw = ack.as_bytes().to_vec();
        raw[2] ^= 0x80;
        assert_eq!(validate(&raw, 0xFA01), Validation::IntegrityError);
    }

    #[test]
    fn test_command_codes() {
        for command in [
            Command::Ack,
            Command::StatusRequest,
            Command::StatusReport,
            Command::Test,
            Command::Reserve,
            Command::Cancel,
            Command::CheckIn,
        ] {
            assert_eq!(Command::from_code(command.code()), Some(command));
        }
        assert_eq!(Command::from_code(0x7f), None);
        assert_eq!(Command::from_name("checkin"), Some(Command::CheckIn));
        assert_eq!(Command::from_name("ack"), None);
        assert!(Command::Test.holds_cooldown());
        assert!(!Command::Reserve.holds_cooldown());
    }
}
