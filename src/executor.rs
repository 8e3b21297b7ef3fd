//! On-demand command execution.
//!
//! Each inbound notification becomes one [`Message`] that is delivered while
//! holding the radio. The radio is always handed back, whatever the outcome,
//! so the polling sweep is never starved. Failures are logged and dropped.

use embedded_hal::delay::DelayNs;

use crate::delivery::{Delivered, DeliveryEngine};
use crate::error::{Error, Result};
use crate::hub::Hub;
use crate::message::{Message, Notification};
use crate::timer::Clock;
use crate::transceiver::Transceiver;

/// The command side of a [`Hub`].
#[derive(Debug)]
pub struct CommandExecutor<'h, R, C, D> {
    hub: &'h Hub<R>,
    engine: DeliveryEngine<C>,
    delay: D,
}

impl<'h, R, C, D> CommandExecutor<'h, R, C, D>
where
    R: Transceiver,
    C: Clock,
    D: DelayNs,
{
    /// Creates an executor for the hub's devices.
    pub fn new(hub: &'h Hub<R>, clock: C, delay: D) -> Self {
        Self {
            hub,
            engine: DeliveryEngine::new(clock, hub.config().link),
            delay,
        }
    }

    /// The executor's delivery engine, for its counters.
    pub fn engine(&self) -> &DeliveryEngine<C> {
        &self.engine
    }

    /// Handles one notification from the message channel.
    ///
    /// Notifications for other hubs and malformed ones are dropped; so is a
    /// message that cannot be delivered.
    pub fn handle_external_message(&mut self, notification: &Notification) {
        let message = match Message::from_notification(notification, self.hub.config().hub_name) {
            Ok(message) => message,
            Err(Error::ForeignHub) => {
                debug!("ignoring notification for {}", notification.hub.as_str());
                return;
            }
            Err(err) => {
                warn!(
                    "dropping notification {:?} for {}: {}",
                    notification.command.as_str(),
                    notification.target.as_str(),
                    err
                );
                return;
            }
        };
        let _ = self.execute(&message);
    }

    /// Parses a JSON notification and handles it.
    #[cfg(feature = "std")]
    pub fn handle_json(&mut self, json: &str) {
        match Notification::from_json(json) {
            Ok(notification) => self.handle_external_message(&notification),
            Err(err) => warn!("dropping notification {:?}: {}", json, err),
        }
    }

    /// Delivers `message` while holding the radio.
    ///
    /// Commands that need a cooldown keep the radio idle for
    /// `test_cooldown_ms` before handing it back.
    pub fn execute(&mut self, message: &Message) -> Result<Delivered> {
        let hub = self.hub;
        let mut lease = hub.arbiter().acquire_for_request(&mut self.delay);
        let result = self.engine.deliver(&mut *lease, hub.registry(), message);
        if message.command().holds_cooldown() {
            self.delay.delay_ms(hub.config().test_cooldown_ms);
        }
        hub.arbiter().release(lease);

        match &result {
            Ok(delivered) => info!(
                "{:?} delivered to {} in {} attempt(s)",
                message.command(),
                message.target(),
                delivered.attempts
            ),
            Err(err) => warn!("{:?} to {} failed: {}", message.command(), message.target(), err),
        }
        result
    }
}
