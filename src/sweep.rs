//! Periodic status polling of every known sensor.
//!
//! One sweep visits the sensors in registry order. For each one it:
//!
//! 1. takes the radio from the [`Arbiter`](crate::arbiter::Arbiter), waiting
//!    while a command is pending,
//! 2. delivers a [`Command::StatusRequest`],
//! 3. listens for up to [`LinkConfig::budget_millis`](crate::config::LinkConfig::budget_millis)
//!    for the sensor's status report and acknowledges it as soon as it arrives,
//! 4. hands the radio back and yields to any pending command.
//!
//! A sweep is never suspended in the middle of steps 2 and 3. The next sweep
//! always starts again from the first sensor.

use embedded_hal::delay::DelayNs;

use crate::delivery::DeliveryEngine;
use crate::error::{Error, Result};
use crate::frame::{Command, ParsedFrame};
use crate::hub::Hub;
use crate::message::Message;
use crate::registry::SensorEntity;
use crate::timer::Clock;
use crate::transceiver::Transceiver;

/// What one sensor exchange produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorPoll {
    /// Whether the status request was acknowledged.
    pub delivered: bool,
    /// The status report, if the sensor sent one in time.
    pub report: Option<ParsedFrame>,
}

/// Totals of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Sensors contacted.
    pub polled: usize,
    /// Status requests acknowledged.
    pub delivered: usize,
    /// Status reports received and acknowledged.
    pub reports: usize,
}

/// The polling side of a [`Hub`].
#[derive(Debug)]
pub struct PollingSweep<'h, R, C, D> {
    hub: &'h Hub<R>,
    engine: DeliveryEngine<C>,
    delay: D,
}

impl<'h, R, C, D> PollingSweep<'h, R, C, D>
where
    R: Transceiver,
    C: Clock,
    D: DelayNs,
{
    /// Creates a sweep over the hub's sensors.
    pub fn new(hub: &'h Hub<R>, clock: C, delay: D) -> Self {
        Self {
            hub,
            engine: DeliveryEngine::new(clock, hub.config().link),
            delay,
        }
    }

    /// The sweep's delivery engine, for its counters.
    pub fn engine(&self) -> &DeliveryEngine<C> {
        &self.engine
    }

    /// Polls every sensor once.
    pub fn run_sweep_once(&mut self) -> SweepReport {
        let hub = self.hub;
        let mut report = SweepReport::default();
        debug!("start polling");
        for sensor in hub.registry().sensors() {
            let mut lease = hub.arbiter().acquire_for_polling(&mut self.delay);
            let outcome = self.poll_sensor(&mut *lease, sensor);
            hub.arbiter().release(lease);

            report.polled += 1;
            match outcome {
                Ok(poll) => {
                    report.delivered += usize::from(poll.delivered);
                    if let Some(frame) = poll.report {
                        report.reports += 1;
                        info!(
                            "{} reported status {:02x?}",
                            sensor.name(),
                            frame.data()
                        );
                    }
                }
                Err(err) => warn!("polling {} failed: {}", sensor.name(), err),
            }

            hub.arbiter().yield_to_request(&mut self.delay);
        }
        debug!(
            "end polling: {} polled, {} acknowledged, {} reported",
            report.polled,
            report.delivered,
            report.reports
        );
        report
    }

    /// Runs one complete exchange with `sensor`.
    ///
    /// An unanswered status request does not skip the listening window; the
    /// sensor may still report on its own.
    pub fn poll_sensor(&mut self, radio: &mut R, sensor: &SensorEntity) -> Result<SensorPoll> {
        let registry = self.hub.registry();
        let request = Message::new(Command::StatusRequest, sensor.name())?;
        let delivered = match self.engine.deliver(radio, registry, &request) {
            Ok(_) => true,
            Err(Error::DeliveryTimeout { .. }) => false,
            Err(err) => return Err(err),
        };

        let budget = self.engine.link().budget_millis();
        let report = self
            .engine
            .listen_for_report(radio, sensor.sensor_address(), budget)?;
        if report.is_some() {
            self.engine.send_ack(radio, sensor.sensor_address())?;
        }
        Ok(SensorPoll { delivered, report })
    }

    /// Sweeps forever, pausing `sweep_idle_ms` between sweeps.
    ///
    /// Intended to own the main loop of single-purpose firmware, with commands
    /// arriving from another execution context.
    pub fn run_sweep_loop(&mut self) -> ! {
        let idle = self.hub.config().sweep_idle_ms;
        loop {
            let _ = self.run_sweep_once();
            self.delay.delay_ms(idle);
        }
    }
}
