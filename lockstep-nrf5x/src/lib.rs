//! Lockstep drivers for the nRF52-series radio MCUs.
//!
//! Provides the hardware services the `lockstep` core asks for: the ESB
//! transceiver over the on-chip `RADIO` peripheral, the monotonic clock, the
//! periodic tick and debounce timers, and the UARTE link towards the attached
//! sensor host.

#![no_std]
#![warn(rust_2018_idioms)]

#[cfg(feature = "52832")]
use nrf52832_pac as pac;

#[cfg(feature = "52833")]
use nrf52833_pac as pac;

#[cfg(feature = "52840")]
use nrf52840_pac as pac;

pub mod radio;
pub mod timer;
pub mod uart;
pub mod utils;
