//! Hub configuration.
//!
//! Everything here is plain data fixed at startup. The defaults come from
//! [`crate::consts`]; override individual fields with struct update syntax:
//!
//! ```rust
//! use rf24hub::config::{HubConfig, LinkConfig};
//!
//! let config = HubConfig {
//!     hub_name: "Hub 2",
//!     link: LinkConfig { max_resend: 3, ..LinkConfig::default() },
//!     ..HubConfig::default()
//! };
//! assert_eq!(config.link.max_waiting_millis, 250);
//! ```

use crate::consts::{
    HUB_ADDRESS, HUB_NAME, MAX_RESEND, MAX_WAITING_MILLIS, REQUEST_POLL_MILLIS,
    SWEEP_IDLE_MILLIS, TEST_COOLDOWN_MILLIS,
};

/// Retry budget of the reliable delivery engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Number of transmissions attempted before a message is dropped.
    pub max_resend: u8,
    /// How long a single attempt waits for an acknowledgement, in milliseconds.
    pub max_waiting_millis: u32,
}

impl LinkConfig {
    /// Worst-case time spent delivering one message, which is also how long the
    /// polling sweep listens for a sensor's status report.
    pub fn budget_millis(&self) -> u64 {
        u64::from(self.max_resend) * u64::from(self.max_waiting_millis)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_resend: MAX_RESEND,
            max_waiting_millis: MAX_WAITING_MILLIS,
        }
    }
}

/// Identity and timings of a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Name this hub answers to on the message channel.
    pub hub_name: &'static str,
    /// Link address of this hub.
    pub hub_address: u16,
    /// Retry budget for every frame exchange.
    pub link: LinkConfig,
    /// How often a blocked request or sweep re-checks the arbiter.
    pub request_poll_ms: u32,
    /// Pause between two polling sweeps.
    pub sweep_idle_ms: u32,
    /// How long the radio stays idle after a test command.
    pub test_cooldown_ms: u32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            hub_name: HUB_NAME,
            hub_address: HUB_ADDRESS,
            link: LinkConfig::default(),
            request_poll_ms: REQUEST_POLL_MILLIS,
            sweep_idle_ms: SWEEP_IDLE_MILLIS,
            test_cooldown_ms: TEST_COOLDOWN_MILLIS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_attempts_times_timeout() {
        let link = LinkConfig {
            max_resend: 4,
            max_waiting_millis: 30,
        };
        assert_eq!(link.budget_millis(), 120);
        assert_eq!(LinkConfig::default().budget_millis(), 1_250);
    }
}
