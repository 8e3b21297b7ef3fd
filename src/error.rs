//! Error type shared by every hub component.
//!
//! None of these are fatal: a failed delivery, a corrupted frame or a
//! malformed notification is logged by the caller and the hub carries on.

/// Errors that can occur while registering devices, framing messages or
/// exchanging them over the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// The device name is not in the registry.
    #[error("device is not registered")]
    UnknownDevice,

    /// No device is registered under the link address.
    #[error("no device registered at address {address:#06x}")]
    UnknownAddress {
        /// The address that was looked up.
        address: u16,
    },

    /// The name or the address is already taken by another device.
    #[error("device name or address is already registered")]
    DuplicateDevice,

    /// The fixed-capacity device or sensor table has no room left.
    #[error("device table is full")]
    RegistryFull,

    /// The frame check sequence did not match, or the frame is too short to carry one.
    #[error("frame failed its integrity check")]
    Integrity,

    /// The data does not fit in a single frame.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge {
        /// Size of the rejected data.
        size: usize,
        /// Largest size a frame can carry.
        max: usize,
    },

    /// No acknowledgement arrived within the retry budget.
    #[error("no acknowledgement after {attempts} attempts")]
    DeliveryTimeout {
        /// Number of transmissions made.
        attempts: u8,
    },

    /// The inbound notification could not be turned into a message.
    #[error("malformed notification")]
    MalformedNotification,

    /// The inbound notification is addressed to another hub.
    #[error("notification is addressed to another hub")]
    ForeignHub,

    /// The transceiver driver reported an error.
    #[error("transceiver error")]
    Transceiver,
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
