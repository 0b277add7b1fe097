//! Node configuration trait.
//!
//! This trait collects the hardware service types an application must
//! provide. Every firmware defines one type implementing [`Config`] and
//! supplies it to [`Node`].
//!
//! [`Config`]: trait.Config.html
//! [`Node`]: ../node/struct.Node.html

use crate::io::{Outputs, UartTx};
use crate::radio::EsbRadio;
use crate::time::{Ticker, Timer};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

/// Trait for node configurations.
pub trait Config {
    /// The ESB transceiver.
    type Radio: EsbRadio;

    /// A monotonic clock with microsecond resolution, used for bounded waits.
    type Clock: Timer;

    /// The periodic tick source, running only while this node coordinates.
    type Ticker: Ticker;

    /// SYNC, STOP and status LED lines.
    type Outputs: Outputs;

    /// UART towards the attached sensor host.
    type Uart: UartTx;

    /// Blocking busy-wait provider for pulse widths and byte pacing.
    type Delay: DelayUs<u32> + DelayMs<u32>;
}

/// Scoped access to a resource that is shared with an interrupt handler.
///
/// Mirrors RTIC's `Mutex`: the closure runs with the interrupt masked, so it
/// must stay short. The state machine never waits inside `with`; bounded
/// waits poll the event mask outside the critical section so the interrupt
/// can still deliver `TX_DONE`.
pub trait Shared<T> {
    fn with<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R;
}

/// Wrapper for a resource that is not actually shared with any interrupt
/// handler; access is granted directly.
pub struct Exclusive<T>(pub T);

impl<T> Shared<T> for Exclusive<T> {
    fn with<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0)
    }
}

/// The hardware a [`Node`] owns exclusively.
///
/// The radio is absent on purpose: it is shared with its interrupt handler
/// and passed to the node per call via [`Shared`].
///
/// [`Node`]: ../node/struct.Node.html
/// [`Shared`]: trait.Shared.html
pub struct Hardware<C: Config> {
    pub clock: C::Clock,
    pub ticker: C::Ticker,
    pub outputs: C::Outputs,
    pub uart: C::Uart,
    pub delay: C::Delay,
}
