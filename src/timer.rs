//! Time sources.
//!
//! Waiting is done with [`embedded_hal::delay::DelayNs`]; measuring how long
//! an acknowledgement has been outstanding needs a monotonic clock as well,
//! which `embedded-hal` does not define. Anything that returns milliseconds
//! works:
//!
//! ```rust
//! use rf24hub::timer::Clock;
//!
//! let clock = || 1_000u64;
//! assert_eq!(clock.now_ms(), 1_000);
//! ```

/// A monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

impl<T: Fn() -> u64> Clock for T {
    #[inline]
    fn now_ms(&self) -> u64 {
        self()
    }
}

/// Milliseconds elapsed since `since`, as seen by `clock`.
pub(crate) fn elapsed_ms<C: Clock>(clock: &C, since: u64) -> u64 {
    clock.now_ms().saturating_sub(since)
}

/// [`Clock`] backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Starts a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
