//! Output lines towards the attached sensor host.
//!
//! Three outputs exist: the SYNC line (pulsed on every tick, drives the
//! host's sample-timestamp input), the STOP line (pulsed once when logging
//! ends), and a status LED communicating the current role. The UART carries
//! 5-byte timestamp records downstream at a rate the host can absorb.

/// Status LED colour. On boards with a single LED, anything but `Off` simply
/// turns it on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Led {
    Off,
    /// Idle, waiting for role election.
    Red,
    /// Acting as Coordinator.
    Green,
    /// Acting as Logger.
    Blue,
}

/// The GPIO outputs of a node.
///
/// Pulse timing is owned by the state machine; implementations only set
/// levels.
pub trait Outputs {
    fn set_led(&mut self, led: Led);
    fn set_sync(&mut self, high: bool);
    fn set_stop(&mut self, high: bool);
}

/// Blocking byte-wise UART transmitter towards the attached host.
///
/// 8-N-1; the baud rate is a property of the hardware variant (typically
/// 9600). Pacing between bytes is inserted by the caller.
pub trait UartTx {
    fn write_byte(&mut self, byte: u8);
}
