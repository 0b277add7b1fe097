//! Time APIs for the tick fabric.
//!
//! These are made for a soft-real-time protocol whose longest interval is a
//! few tens of milliseconds: microsecond resolution, 32-bit arithmetic.

use core::fmt;
use core::ops::{Add, AddAssign};

/// A duration with microsecond resolution.
///
/// Can represent a maximum duration of about 1 hour, far beyond anything the
/// protocol deals in.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(u32);

impl Duration {
    /// Interval between two Coordinator ticks.
    pub const TICK_PERIOD: Self = Duration(10_000);

    /// Width of the SYNC and STOP pulses.
    pub const PULSE_WIDTH: Self = Duration(50);

    /// Pause between two UART bytes sent to the attached host, whose own UART
    /// drops bytes when fed back to back.
    pub const BYTE_PACING: Self = Duration(50);

    /// Settling window of the button debouncer.
    pub const DEBOUNCE: Self = Duration(50_000);

    /// How long to wait for a transmission attempt to complete before moving
    /// on.
    pub const TX_TIMEOUT: Self = Duration(10_000);

    /// Creates a `Duration` from a number of microseconds.
    pub const fn from_micros(micros: u32) -> Self {
        Duration(micros)
    }

    /// Creates a `Duration` representing the given number of milliseconds.
    pub const fn from_millis(millis: u16) -> Self {
        Duration(millis as u32 * 1_000)
    }

    /// Returns the number of microseconds represented by `self`.
    pub const fn as_micros(&self) -> u32 {
        self.0
    }

    /// Returns the number of whole milliseconds that fit in `self`.
    pub const fn whole_millis(&self) -> u32 {
        self.0 / 1_000
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Duration(self.0.checked_add(rhs.0).expect("duration overflow"))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1_000 && self.0 % 1_000 == 0 {
            write!(f, "{}ms", self.0 / 1_000)
        } else {
            write!(f, "{}µs", self.0)
        }
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

/// A point in time, relative to an unspecified epoch.
///
/// This has microsecond resolution and may wrap around after >1 hour. Apart
/// from the wraparound, it is monotonic. `Instant`s are obtained from an
/// implementation of [`Timer`]; instants from different timers must not be
/// mixed.
///
/// [`Timer`]: trait.Timer.html
#[derive(Copy, Clone)]
pub struct Instant(u32);

impl Instant {
    /// The maximum time between two `Instant`s that can be handled by
    /// [`Instant::duration_since`]. A bounded wait in this protocol spans a
    /// few milliseconds at most; anything larger indicates a broken clock.
    ///
    /// [`Instant::duration_since`]: #method.duration_since
    pub const MAX_TIME_BETWEEN: Duration = Duration(1_000_000 * 60);

    /// Creates an `Instant` from raw microseconds since an arbitrary
    /// implementation-defined reference point.
    ///
    /// This should only be called from a [`Timer`] implementation.
    ///
    /// [`Timer`]: trait.Timer.html
    pub fn from_raw_micros(micros: u32) -> Self {
        Instant(micros)
    }

    /// Returns the raw value from which this `Instant` was created.
    pub fn raw_micros(&self) -> u32 {
        self.0
    }

    /// Calculates the duration of time that has passed between `earlier` and
    /// `self`.
    ///
    /// Both instants must come from the same [`Timer`], and must be no
    /// further apart than [`MAX_TIME_BETWEEN`] (debug-asserted): instants
    /// wrap around, so huge distances are almost certainly arithmetic bugs.
    ///
    /// [`Timer`]: trait.Timer.html
    /// [`MAX_TIME_BETWEEN`]: #associatedconstant.MAX_TIME_BETWEEN
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        let micros_passed = self.0.wrapping_sub(earlier.0);
        debug_assert!(
            micros_passed <= Self::MAX_TIME_BETWEEN.0,
            "{}µs between instants",
            micros_passed,
        );

        Duration(micros_passed)
    }
}

/// A [`Duration`] can be added to an [`Instant`], moving it forwards in time.
///
/// [`Duration`]: struct.Duration.html
/// [`Instant`]: struct.Instant.html
impl Add<Duration> for Instant {
    type Output = Self;

    fn add(self, d: Duration) -> Self {
        Instant(self.0.wrapping_add(d.as_micros()))
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}µs", self.0)
    }
}

/// Trait for time providers.
///
/// The hardware interface has to provide an implementation of `Timer` with
/// microsecond accuracy. This trait can also be implemented by a mock timer
/// for testing.
pub trait Timer {
    /// Obtains the current time as an [`Instant`].
    ///
    /// The returned instants must never move backwards in time, except when
    /// the underlying value wraps around.
    ///
    /// [`Instant`]: struct.Instant.html
    fn now(&self) -> Instant;
}

/// The periodic tick source.
///
/// Fires every [`Duration::TICK_PERIOD`] while started, raising the
/// `TICK_TIMER` event from interrupt context. It runs if and only if the node
/// is the Coordinator: the role state machine starts it on entry and stops it
/// on exit.
///
/// [`Duration::TICK_PERIOD`]: struct.Duration.html#associatedconstant.TICK_PERIOD
pub trait Ticker {
    /// Starts periodic expiry, the first one [`Duration::TICK_PERIOD`] from
    /// now.
    ///
    /// [`Duration::TICK_PERIOD`]: struct.Duration.html#associatedconstant.TICK_PERIOD
    fn start(&mut self);

    /// Stops the ticker; no further expiries fire until `start` is called
    /// again.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_arithmetic() {
        assert_eq!(Duration::from_millis(10), Duration::from_micros(10_000));
        assert_eq!(Duration::TICK_PERIOD.whole_millis(), 10);
        assert_eq!(
            Duration::from_millis(1) + Duration::from_micros(500),
            Duration::from_micros(1_500)
        );
    }

    #[test]
    fn instant_distance_wraps() {
        let before = Instant::from_raw_micros(u32::max_value() - 100);
        let after = before + Duration::from_micros(250);
        assert_eq!(after.raw_micros(), 149);
        assert_eq!(after.duration_since(before), Duration::from_micros(250));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Duration::TICK_PERIOD), "10ms");
        assert_eq!(format!("{}", Duration::PULSE_WIDTH), "50µs");
    }
}
