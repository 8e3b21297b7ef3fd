//! Exclusive, cooperative ownership of the transceiver.
//!
//! The radio has no preemptible primitive, so the command path and the
//! polling sweep take turns at whole-exchange granularity. The transceiver
//! itself is the token: it lives inside the arbiter and is handed out as a
//! [`Lease`] to exactly one holder at a time.
//!
//! - A command calls [`Arbiter::acquire_for_request`], which marks a request
//!   pending and waits until the sweep is between two sensors.
//! - The sweep calls [`Arbiter::yield_to_request`] between sensors and
//!   [`Arbiter::acquire_for_polling`] before each sensor exchange; it never
//!   starts an exchange while a request is pending.
//! - Both return the radio with [`Arbiter::release`].
//!
//! Shared state lives in `critical_section` mutexes, so the arbiter is `Sync`
//! whenever the transceiver is `Send` and can be shared between an interrupt
//! or a second core and the main loop, or between threads with `std`.
//!
//! ```rust
//! use embedded_hal_mock::eh1::delay::NoopDelay;
//! use rf24hub::arbiter::Arbiter;
//!
//! let arbiter = Arbiter::new(0u8, 100);
//! let mut delay = NoopDelay::new();
//!
//! let lease = arbiter.acquire_for_request(&mut delay);
//! assert!(arbiter.state().request_pending);
//! arbiter.release(lease);
//! assert!(!arbiter.state().request_pending);
//! ```

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use core::ops::{Deref, DerefMut};

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

/// Snapshot of the arbiter flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ArbiterState {
    /// A command is waiting for, or using, the radio.
    pub request_pending: bool,
    /// The sweep holds the radio for a sensor exchange.
    pub polling_active: bool,
}

#[derive(Debug, Clone, Copy)]
struct Flags {
    pending_requests: u8,
    polling_active: bool,
}

impl Flags {
    const IDLE: Self = Self {
        pending_requests: 0,
        polling_active: false,
    };
}

/// Which side of the arbiter a lease was handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Role {
    /// On-demand command execution.
    Request,
    /// The polling sweep.
    Polling,
}

/// Temporary ownership of the transceiver.
///
/// Dereferences to the transceiver. Hand it back with [`Arbiter::release`];
/// a lease that is dropped instead takes the radio with it.
#[derive(Debug)]
#[must_use = "a lease must be handed back with `Arbiter::release`"]
pub struct Lease<R> {
    radio: R,
    role: Role,
}

impl<R> Lease<R> {
    /// The side holding the radio.
    pub fn role(&self) -> Role {
        self.role
    }
}

impl<R> Deref for Lease<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.radio
    }
}

impl<R> DerefMut for Lease<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}

/// Two-party lock over the transceiver.
pub struct Arbiter<R> {
    flags: Mutex<Cell<Flags>>,
    radio: Mutex<RefCell<Option<R>>>,
    poll_interval_ms: u32,
}

impl<R> core::fmt::Debug for Arbiter<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arbiter")
            .field("state", &self.state())
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

impl<R> Arbiter<R> {
    /// Takes ownership of the radio. Both flags start cleared.
    ///
    /// Blocked callers re-check every `poll_interval_ms`.
    pub const fn new(radio: R, poll_interval_ms: u32) -> Self {
        Self {
            flags: Mutex::new(Cell::new(Flags::IDLE)),
            radio: Mutex::new(RefCell::new(Some(radio))),
            poll_interval_ms,
        }
    }

    /// Current flags.
    pub fn state(&self) -> ArbiterState {
        let flags = critical_section::with(|cs| self.flags.borrow(cs).get());
        ArbiterState {
            request_pending: flags.pending_requests > 0,
            polling_active: flags.polling_active,
        }
    }

    /// Marks a request pending, then waits for the radio.
    ///
    /// From the moment this is called the sweep starts no new exchange; one
    /// already in flight is allowed to finish.
    pub fn acquire_for_request<D: DelayNs>(&self, delay: &mut D) -> Lease<R> {
        critical_section::with(|cs| {
            let cell = self.flags.borrow(cs);
            let mut flags = cell.get();
            flags.pending_requests = flags.pending_requests.saturating_add(1);
            cell.set(flags);
        });
        loop {
            match self.try_take_for_request() {
                Ok(lease) => return lease,
                Err(nb::Error::WouldBlock) => delay.delay_ms(self.poll_interval_ms),
                Err(nb::Error::Other(never)) => match never {},
            }
        }
    }

    /// Hands the radio to an already pending request, if the sweep is not using it.
    fn try_take_for_request(&self) -> nb::Result<Lease<R>, Infallible> {
        critical_section::with(|cs| {
            if self.flags.borrow(cs).get().polling_active {
                return Err(nb::Error::WouldBlock);
            }
            match self.radio.borrow(cs).borrow_mut().take() {
                Some(radio) => Ok(Lease {
                    radio,
                    role: Role::Request,
                }),
                None => Err(nb::Error::WouldBlock),
            }
        })
    }

    /// Blocks while any request is pending.
    ///
    /// Called by the sweep between two sensor exchanges, when it holds no lease.
    pub fn yield_to_request<D: DelayNs>(&self, delay: &mut D) {
        let mut yielded = false;
        while self.state().request_pending {
            if !yielded {
                debug!("sweep yielding to a pending request");
                yielded = true;
            }
            delay.delay_ms(self.poll_interval_ms);
        }
        if yielded {
            debug!("sweep resuming");
        }
    }

    /// Waits until no request is pending, then hands the radio to the sweep.
    pub fn acquire_for_polling<D: DelayNs>(&self, delay: &mut D) -> Lease<R> {
        loop {
            self.yield_to_request(delay);
            match self.try_acquire_for_polling() {
                Ok(lease) => return lease,
                Err(nb::Error::WouldBlock) => delay.delay_ms(self.poll_interval_ms),
                Err(nb::Error::Other(never)) => match never {},
            }
        }
    }

    /// Hands the radio to the sweep if no request is pending and nobody holds it.
    ///
    /// The pending check and `polling_active` are updated in one critical
    /// section, so a request registered concurrently is never overtaken.
    pub fn try_acquire_for_polling(&self) -> nb::Result<Lease<R>, Infallible> {
        critical_section::with(|cs| {
            let cell = self.flags.borrow(cs);
            let mut flags = cell.get();
            if flags.pending_requests > 0 {
                return Err(nb::Error::WouldBlock);
            }
            let Some(radio) = self.radio.borrow(cs).borrow_mut().take() else {
                return Err(nb::Error::WouldBlock);
            };
            flags.polling_active = true;
            cell.set(flags);
            Ok(Lease {
                radio,
                role: Role::Polling,
            })
        })
    }

    /// Returns the radio.
    ///
    /// Releasing a request lease clears its pending mark; releasing a polling
    /// lease clears `polling_active`.
    pub fn release(&self, lease: Lease<R>) {
        let Lease { radio, role } = lease;
        critical_section::with(|cs| {
            let _ = self.radio.borrow(cs).replace(Some(radio));
            let cell = self.flags.borrow(cs);
            let mut flags = cell.get();
            match role {
                Role::Request => {
                    flags.pending_requests = flags.pending_requests.saturating_sub(1)
                }
                Role::Polling => flags.polling_active = false,
            }
            cell.set(flags);
        });
    }

    /// Shuts the arbiter down and returns the radio, unless a lease was dropped
    /// without being released.
    pub fn into_radio(self) -> Option<R> {
        self.radio.into_inner().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn test_starts_idle() {
        let arbiter = Arbiter::new((), 1);
        assert_eq!(arbiter.state(), ArbiterState::default());
    }

    #[test]
    fn test_request_lease_round_trip() {
        let arbiter = Arbiter::new(7u32, 1);
        let mut delay = NoopDelay::new();

        let mut lease = arbiter.acquire_for_request(&mut delay);
        assert_eq!(lease.role(), Role::Request);
        *lease += 1;
        assert_eq!(
            arbiter.state(),
            ArbiterState {
                request_pending: true,
                polling_active: false
            }
        );

        arbiter.release(lease);
        assert_eq!(arbiter.state(), ArbiterState::default());
        assert_eq!(arbiter.into_radio(), Some(8));
    }

    #[test]
    fn test_polling_lease_sets_flag() {
        let arbiter = Arbiter::new((), 1);
        let mut delay = NoopDelay::new();

        let lease = arbiter.acquire_for_polling(&mut delay);
        assert_eq!(lease.role(), Role::Polling);
        assert!(arbiter.state().polling_active);
        assert!(matches!(
            arbiter.try_acquire_for_polling(),
            Err(nb::Error::WouldBlock)
        ));
        assert!(matches!(
            arbiter.try_take_for_request(),
            Err(nb::Error::WouldBlock)
        ));

        arbiter.release(lease);
        assert!(!arbiter.state().polling_active);
    }

    #[test]
    fn test_pending_request_blocks_polling() {
        let arbiter = Arbiter::new((), 1);
        let mut delay = NoopDelay::new();

        let request = arbiter.acquire_for_request(&mut delay);
        assert!(matches!(
            arbiter.try_acquire_for_polling(),
            Err(nb::Error::WouldBlock)
        ));
        arbiter.release(request);

        let polling = arbiter.try_acquire_for_polling();
        assert!(polling.is_ok());
        if let Ok(lease) = polling {
            arbiter.release(lease);
        }
    }

    #[test]
    fn test_yield_returns_at_once_without_requests() {
        let arbiter = Arbiter::new((), 1);
        let mut delay = NoopDelay::new();
        arbiter.yield_to_request(&mut delay);
        assert_eq!(arbiter.state(), ArbiterState::default());
    }

    #[test]
    fn test_dropped_lease_loses_radio() {
        let arbiter = Arbiter::new(1u8, 1);
        let mut delay = NoopDelay::new();
        drop(arbiter.acquire_for_polling(&mut delay));
        assert_eq!(arbiter.into_radio(), None);
    }

    #[test]
    fn test_request_waits_for_sweep_exchange() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::thread;
        use std::time::Duration;

        let arbiter = Arbiter::new((), 1);
        let exchange_done = AtomicBool::new(false);

        let polling = arbiter.acquire_for_polling(&mut NoopDelay::new());
        thread::scope(|s| {
            let waiter = s.spawn(|| {
                let lease = arbiter.acquire_for_request(&mut NoopDelay::new());
                // The sweep's exchange finished before the command got the radio.
                assert!(exchange_done.load(Ordering::SeqCst));
                arbiter.release(lease);
            });
            while !arbiter.state().request_pending {
                thread::yield_now();
            }
            thread::sleep(Duration::from_millis(5));
            exchange_done.store(true, Ordering::SeqCst);
            arbiter.release(polling);
            waiter.join().unwrap();
        });
        assert_eq!(arbiter.state(), ArbiterState::default());
    }
}
