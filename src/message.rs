//! Messages and the notifications they are made from.
//!
//! A [`Notification`] is what the external message channel hands the hub.
//! A [`Message`] is what the delivery engine sends: a command, the name of
//! the target device and optional data.

use heapless::String;

use crate::consts::{MAX_COMMAND_NAME_LEN, MAX_DATA_LEN};
use crate::error::{Error, Result};
use crate::frame::{Command, Payload};
use crate::registry::{DeviceName, device_name};

/// A command addressed to a device by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    command: Command,
    target: DeviceName,
    data: Payload,
}

impl Message {
    /// Creates a message without data.
    ///
    /// # Errors
    /// [`Error::UnknownDevice`] if the name is too long to ever be registered.
    pub fn new(command: Command, target: &str) -> Result<Self> {
        Ok(Self {
            command,
            target: device_name(target).ok_or(Error::UnknownDevice)?,
            data: Payload::new(),
        })
    }

    /// Attaches data to the message.
    ///
    /// # Errors
    /// [`Error::PayloadTooLarge`] if the data does not fit in a frame.
    pub fn with_data(mut self, data: &[u8]) -> Result<Self> {
        self.data = Payload::from_slice(data).map_err(|_| Error::PayloadTooLarge {
            size: data.len(),
            max: MAX_DATA_LEN,
        })?;
        Ok(self)
    }

    /// Builds a message from a notification addressed to `hub_name`.
    ///
    /// # Errors
    /// - [`Error::ForeignHub`] if the notification names another hub
    /// - [`Error::MalformedNotification`] if the command is unknown or cannot
    ///   be issued remotely
    pub fn from_notification(notification: &Notification, hub_name: &str) -> Result<Self> {
        if notification.hub != hub_name {
            return Err(Error::ForeignHub);
        }
        let command =
            Command::from_name(&notification.command).ok_or(Error::MalformedNotification)?;
        Ok(Self {
            command,
            target: notification.target.clone(),
            data: notification.data.clone(),
        })
    }

    /// The command to deliver.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Name of the target device.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Data to carry, possibly empty.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A command notification received from the message channel.
///
/// With the `std` feature it can be parsed from JSON:
///
/// ```json
/// {"hub": "Hub 1", "command": "reserve", "target": "Device 1", "data": [7]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Notification {
    /// Name of the hub the notification is for.
    pub hub: DeviceName,
    /// Command name, e.g. `reserve` or `test`.
    pub command: String<MAX_COMMAND_NAME_LEN>,
    /// Name of the target device.
    pub target: DeviceName,
    /// Optional command data.
    #[cfg_attr(feature = "serde", serde(default))]
    pub data: Payload,
}

impl Notification {
    /// Parses a JSON notification.
    ///
    /// # Errors
    /// [`Error::MalformedNotification`] if the text is not a notification or a
    /// field is too long.
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|_| Error::MalformedNotification)
    }
}
