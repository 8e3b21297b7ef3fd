//! Constants used across the hub protocol implementation.
//!
//! This module defines the frame layout, the fixed capacities of the
//! device tables, and the default timings used by the delivery engine,
//! the arbiter and the polling sweep.
//!
//! ## Key Concepts
//!
//! - **Frames**: A 2-byte big-endian address, a 1-byte command code, optional
//!   data and a 2-byte frame check sequence (FCS).
//! - **Payload Limits**: A frame has to fit in a single 32-byte radio payload.
//! - **Timings**: Per-attempt acknowledgement timeout and the retry budget.
//! - **Identity**: The default name and address of this hub.
//!
//! These values should be used wherever framing or buffer logic is implemented to ensure
//! consistent message boundaries.

/// Length (in bytes) of the address field at the start of every frame.
pub const FRAME_ADDRESS_LEN: usize = 2;

/// Length (in bytes) of the fixed header: address plus command code.
pub const FRAME_HEADER_LEN: usize = FRAME_ADDRESS_LEN + 1;

/// Length (in bytes) of the trailing frame check sequence.
pub const FRAME_FCS_LEN: usize = 2;

/// Maximum total length (in bytes) of a frame on the wire.
///
/// This is the largest dynamic payload a single nRF24L01-class transceiver carries.
pub const MAX_FRAME_LEN: usize = 32;

/// Smallest frame that can carry a header and an FCS (an ACK frame).
pub const MIN_FRAME_LEN: usize = FRAME_HEADER_LEN + FRAME_FCS_LEN;

/// Maximum size (in bytes) of the data carried by a single frame.
///
/// This is derived from the maximum frame size minus header and trailer bytes.
pub const MAX_DATA_LEN: usize = MAX_FRAME_LEN - FRAME_HEADER_LEN - FRAME_FCS_LEN;

/// Maximum length (in bytes) of a device or hub name.
pub const MAX_NAME_LEN: usize = 32;

/// Maximum length (in bytes) of a command name in an inbound notification.
pub const MAX_COMMAND_NAME_LEN: usize = 16;

/// Capacity of the device table.
pub const MAX_DEVICES: usize = 16;

/// Capacity of the sensor sub-table.
pub const MAX_SENSORS: usize = 16;

/// Number of auxiliary (actuator/indicator) endpoints bound to each sensor.
pub const SENSOR_AUX_COUNT: usize = 3;

/// Number of transmissions attempted before a message is dropped.
pub const MAX_RESEND: u8 = 5;

/// How long a single attempt waits for an acknowledgement.
pub const MAX_WAITING_MILLIS: u32 = 250;

/// Interval between arbiter checks while waiting for the radio.
pub const REQUEST_POLL_MILLIS: u32 = 100;

/// Pause between two polling sweeps.
pub const SWEEP_IDLE_MILLIS: u32 = 100;

/// How long the radio stays idle after a diagnostic test command.
pub const TEST_COOLDOWN_MILLIS: u32 = 10_000;

/// The default name this hub answers to on the message channel.
pub const HUB_NAME: &str = "Hub 1";

/// The default link address of this hub.
pub const HUB_ADDRESS: u16 = 0xFA00;

/// The value the CRC register holds after running over a frame with a valid FCS.
pub const FCS_RESIDUE: u16 = 0xf0b8;
