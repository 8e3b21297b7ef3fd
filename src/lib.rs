//! # rf24hub
//!
//! A portable, no_std core for a radio hub that shares one half-duplex
//! 2.4 GHz transceiver (nRF24L01-class) between two kinds of traffic:
//!
//! - **on-demand commands** (reserve, cancel, check-in, test) arriving from a
//!   message channel, delivered with acknowledgement and bounded resend, and
//! - a **polling sweep** that asks every registered sensor for its status
//!   and acknowledges the reports.
//!
//! The crate provides:
//! - a compact frame format `[address][command][data][FCS]` protected by
//!   CRC-16/CCITT
//! - a stop-and-wait delivery engine over any [`Transceiver`]
//! - an interrupt-safe arbiter built on `critical-section` that lets a
//!   pending command take the radio between two sensor exchanges
//! - time sources through [`timer::Clock`] and `embedded-hal`'s `DelayNs`
//!
//! ## Crate features
//! | Feature           | Description |
//! |-------------------|-------------|
//! | `std`             | Disables `#![no_std]`, adds [`timer::StdClock`] and JSON notifications |
//! | `serde`           | Derives `Deserialize` for [`message::Notification`] |
//! | `log` (default)   | Uses `log` logging |
//! | `defmt-0-3`       | Derives `defmt::Format` for the public data types |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rf24hub::{DeviceRegistry, Hub, HubConfig};
//!
//! let registry = DeviceRegistry::from_tables(
//!     &[("Sensor 1", 0xFA01), ("Lamp", 0xFA10)],
//!     &[("Sensor 1", [0xAA01, 0xBB01, 0xCC01])],
//! )?;
//! let hub = Hub::new(HubConfig::default(), registry, radio)?;
//!
//! // Main loop: poll the sensors.
//! hub.sweep(clock, delay).run_sweep_loop();
//!
//! // Elsewhere: one executor per command source.
//! hub.executor(clock, delay).handle_external_message(&notification);
//! ```
//!
//! ## Integration Notes
//!
//! - Bring your own radio driver by implementing [`Transceiver`].
//! - Every exchange with a sensor runs to completion; commands wait at most
//!   one exchange, about `max_resend * max_waiting_millis` twice over.
//! - Only one transmission is ever in flight on the link.

#![deny(
    bad_style,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]
#![warn(dead_code, unused, unused_qualifications, unused_results)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

pub use critical_section;
pub use heapless;

pub mod arbiter;
pub mod config;
pub mod consts;
pub(crate) mod crc;
pub mod delivery;
pub mod error;
pub mod executor;
pub mod frame;
pub mod hub;
pub mod message;
pub mod registry;
pub mod sweep;
pub mod timer;
pub mod transceiver;

#[cfg(test)]
mod mock;

pub use config::{HubConfig, LinkConfig};
pub use error::{Error, Result};
pub use frame::Command;
pub use hub::Hub;
pub use message::{Message, Notification};
pub use registry::DeviceRegistry;
pub use transceiver::Transceiver;
