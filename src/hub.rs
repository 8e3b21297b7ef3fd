//! The hub context object.
//!
//! [`Hub`] owns everything the two traffic sources share: the configuration,
//! the device registry and the arbiter holding the transceiver. The entry
//! point builds one, lends it to a [`CommandExecutor`] and a [`PollingSweep`],
//! and takes the radio back with [`Hub::shutdown`].
//!
//! ```rust,ignore
//! let hub = Hub::new(HubConfig::default(), registry, radio)?;
//! std::thread::scope(|s| {
//!     s.spawn(|| hub.sweep(StdClock::new(), delay_a).run_sweep_loop());
//!     let mut executor = hub.executor(StdClock::new(), delay_b);
//!     for json in channel {
//!         executor.handle_json(&json);
//!     }
//! });
//! ```

use embedded_hal::delay::DelayNs;

use crate::arbiter::Arbiter;
use crate::config::HubConfig;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::registry::DeviceRegistry;
use crate::sweep::PollingSweep;
use crate::timer::Clock;
use crate::transceiver::{Transceiver, radio_error};

/// Shared state of one hub.
#[derive(Debug)]
pub struct Hub<R> {
    config: HubConfig,
    registry: DeviceRegistry,
    arbiter: Arbiter<R>,
}

impl<R: Transceiver> Hub<R> {
    /// Brings the radio up and leaves it listening.
    ///
    /// # Errors
    /// [`Error::Transceiver`](crate::error::Error::Transceiver) if the radio
    /// cannot be initialized.
    pub fn new(config: HubConfig, registry: DeviceRegistry, mut radio: R) -> Result<Self> {
        radio.initialize().map_err(radio_error)?;
        radio.begin_receive().map_err(radio_error)?;
        info!(
            "{} ({:#06x}) up with {} devices, {} sensors",
            config.hub_name,
            config.hub_address,
            registry.len(),
            registry.sensors().count()
        );
        Ok(Self {
            config,
            registry,
            arbiter: Arbiter::new(radio, config.request_poll_ms),
        })
    }

    /// A command executor bound to this hub.
    pub fn executor<C: Clock, D: DelayNs>(&self, clock: C, delay: D) -> CommandExecutor<'_, R, C, D> {
        CommandExecutor::new(self, clock, delay)
    }

    /// A polling sweep bound to this hub.
    pub fn sweep<C: Clock, D: DelayNs>(&self, clock: C, delay: D) -> PollingSweep<'_, R, C, D> {
        PollingSweep::new(self, clock, delay)
    }
}

impl<R> Hub<R> {
    /// Identity and timings.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Known devices and sensors.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Transceiver ownership.
    pub fn arbiter(&self) -> &Arbiter<R> {
        &self.arbiter
    }

    /// Tears the hub down and returns the radio, if no lease was lost.
    pub fn shutdown(self) -> Option<R> {
        info!("{} shutting down", self.config.hub_name);
        self.arbiter.into_radio()
    }
}
