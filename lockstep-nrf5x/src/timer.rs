//! Timer drivers, usable with all three basic timers on the chip.
//!
//! All three run at 1 MHz so durations map 1:1 onto counter values. `CC[0]`
//! carries the expiry compare value, `CC[1]` is reserved for captures.

use crate::pac::{TIMER0, TIMER1, TIMER2};
use lockstep::time::{Duration, Instant, Ticker, Timer};

/// A free-running 1 MHz clock implementing [`Timer`].
///
/// [`Timer`]: ../../lockstep/time/trait.Timer.html
pub struct MonoClock<T: NrfTimerExt> {
    inner: T,
}

impl<T: NrfTimerExt> MonoClock<T> {
    /// Initializes the timer and starts it counting.
    pub fn init(mut peripheral: T) -> Self {
        peripheral.init_1mhz();
        peripheral.run();
        Self { inner: peripheral }
    }
}

impl<T: NrfTimerExt> Timer for MonoClock<T> {
    fn now(&self) -> Instant {
        self.inner.capture_now()
    }
}

/// The periodic tick source implementing [`Ticker`].
///
/// [`Ticker`]: ../../lockstep/time/trait.Ticker.html
pub struct TickTimer<T: NrfTimerExt> {
    inner: T,
}

impl<T: NrfTimerExt> TickTimer<T> {
    pub fn init(mut peripheral: T) -> Self {
        peripheral.init_1mhz();
        Self { inner: peripheral }
    }

    /// Acknowledges an expiry from the timer's interrupt handler.
    ///
    /// The handler has no access to the handle (the node owns it), so this
    /// goes through the peripheral address directly; it touches only the
    /// event register the handle never reads.
    pub unsafe fn acknowledge() {
        T::reset_expiry_raw();
    }
}

impl<T: NrfTimerExt> Ticker for TickTimer<T> {
    fn start(&mut self) {
        self.inner.start_periodic(Duration::TICK_PERIOD);
    }

    fn stop(&mut self) {
        self.inner.halt();
    }
}

/// One-shot timer driving the button debounce window.
pub struct DebounceTimer<T: NrfTimerExt> {
    inner: T,
}

impl<T: NrfTimerExt> DebounceTimer<T> {
    pub fn init(mut peripheral: T) -> Self {
        peripheral.init_1mhz();
        Self { inner: peripheral }
    }

    /// (Re)starts the settling window, discarding any pending expiry. Only
    /// the last edge within the window counts.
    pub fn rearm(&mut self) {
        self.inner.start_oneshot(Duration::DEBOUNCE);
    }

    /// Acknowledges an expiry; call from the interrupt handler before
    /// sampling the pin.
    pub fn acknowledge(&mut self) {
        self.inner.clear_expiry();
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Extension trait implemented for the nRF timer peripherals.
pub trait NrfTimerExt: sealed::Sealed {
    /// Configures the timer to count microseconds (32-bit, 1 MHz).
    fn init_1mhz(&mut self);

    /// Starts counting without any compare event.
    fn run(&mut self);

    /// Starts firing the `COMPARE0` event every `period`, first expiry one
    /// `period` from now.
    fn start_periodic(&mut self, period: Duration);

    /// Starts a single `COMPARE0` expiry `delay` from now, cancelling
    /// whatever was pending.
    fn start_oneshot(&mut self, delay: Duration);

    /// Stops counting and masks the compare interrupt.
    fn halt(&mut self);

    /// Acknowledges a pending `COMPARE0` event.
    fn clear_expiry(&mut self);

    /// Acknowledges `COMPARE0` without a handle, from interrupt context.
    unsafe fn reset_expiry_raw();

    /// Captures the current counter value.
    fn capture_now(&self) -> Instant;
}

macro_rules! impl_timer {
    ($ty:ident) => {
        impl NrfTimerExt for $ty {
            fn init_1mhz(&mut self) {
                self.bitmode.write(|w| w.bitmode()._32bit());
                // 16 MHz / 2^4 = 1 MHz, µs resolution
                self.prescaler.write(|w| unsafe { w.prescaler().bits(4) });
            }

            fn run(&mut self) {
                self.tasks_clear.write(|w| unsafe { w.bits(1) });
                self.tasks_start.write(|w| unsafe { w.bits(1) });
            }

            fn start_periodic(&mut self, period: Duration) {
                self.cc[0].write(|w| unsafe { w.bits(period.as_micros()) });
                // COMPARE0 wraps the counter, so the period repeats on its own.
                self.shorts.write(|w| w.compare0_clear().enabled());
                self.events_compare[0].reset();
                self.intenset.write(|w| w.compare0().set());
                self.run();
            }

            fn start_oneshot(&mut self, delay: Duration) {
                self.cc[0].write(|w| unsafe { w.bits(delay.as_micros()) });
                self.shorts
                    .write(|w| w.compare0_clear().enabled().compare0_stop().enabled());
                self.events_compare[0].reset();
                self.intenset.write(|w| w.compare0().set());
                self.run();
            }

            fn halt(&mut self) {
                self.tasks_stop.write(|w| unsafe { w.bits(1) });
                self.intenclr.write(|w| w.compare0().clear());
                self.events_compare[0].reset();
            }

            fn clear_expiry(&mut self) {
                self.events_compare[0].reset();
            }

            unsafe fn reset_expiry_raw() {
                (*Self::ptr()).events_compare[0].reset();
            }

            fn capture_now(&self) -> Instant {
                self.tasks_capture[1].write(|w| unsafe { w.bits(1) });
                Instant::from_raw_micros(self.cc[1].read().bits())
            }
        }

        impl sealed::Sealed for $ty {}
    };
}

impl_timer!(TIMER0);
impl_timer!(TIMER1);
impl_timer!(TIMER2);
