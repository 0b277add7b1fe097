//! The event multiplexer.
//!
//! Interrupt handlers and radio callbacks never run protocol logic; they mark
//! bits in a shared [`EventMask`], and the cooperative main loop drains the
//! whole set once per iteration. The mask is the only word of state shared
//! across every context, and it is only ever touched with atomic
//! read-modify-write operations.
//!
//! [`EventMask`]: struct.EventMask.html

use bitflags::bitflags;
use core::sync::atomic::{AtomicU32, Ordering};

bitflags! {
    /// Events pending for the main loop.
    pub struct Events: u32 {
        /// Debounced press edge of the start/stop button.
        const BUTTON = 1 << 0;
        /// A valid `START_TICK` frame arrived.
        const TICK_RX = 1 << 1;
        /// A valid `STOP` or `STOP_REQ` frame arrived.
        const STOP_RX = 1 << 2;
        /// The periodic tick timer expired (Coordinator only).
        const TICK_TIMER = 1 << 3;
        /// A radio transmission attempt completed, successfully or not.
        const TX_DONE = 1 << 4;
    }
}

/// Lock-free set of pending events.
///
/// Producers (interrupt handlers) only OR bits in; the consumer (main loop)
/// only swaps the whole set out. Any event raised strictly before the swap is
/// observed by that swap, which makes delivery wait-free and reorder-free
/// relative to state machine observation.
pub struct EventMask(AtomicU32);

impl EventMask {
    /// Creates an empty mask, usable as a `static`.
    pub const fn new() -> Self {
        EventMask(AtomicU32::new(0))
    }

    /// Marks `events` as pending. Callable from any context.
    pub fn raise(&self, events: Events) {
        self.0.fetch_or(events.bits(), Ordering::AcqRel);
    }

    /// Atomically drains and returns the entire pending set.
    pub fn take(&self) -> Events {
        Events::from_bits_truncate(self.0.swap(0, Ordering::AcqRel))
    }

    /// Atomically clears only `events`, returning whether any of them were
    /// pending.
    ///
    /// Other bits are left untouched. Used by bounded waits that must not
    /// steal events from the main loop.
    pub fn consume(&self, events: Events) -> bool {
        self.0.fetch_and(!events.bits(), Ordering::AcqRel) & events.bits() != 0
    }
}
