//! UARTE link towards the attached sensor host.
//!
//! The host's RTC records have no framing (the receiver simply counts five
//! bytes), so reception runs one byte per DMA transfer, re-armed by the
//! `ENDRX`→`STARTRX` shortcut, with an interrupt per byte. Transmission is
//! blocking, one byte per transfer, paced by the caller.
//!
//! The driver splits into independent TX and RX halves so the node can own
//! the transmitter while the receive interrupt feeds the record assembler.

use crate::pac::UARTE0;
use lockstep::io::UartTx;

/// A GPIO selected into the UARTE, by port and pin number.
#[derive(Copy, Clone)]
pub struct Psel {
    pub port: u8,
    pub pin: u8,
}

impl Psel {
    const fn bits(self) -> u32 {
        (self.port as u32) << 5 | self.pin as u32
    }
}

/// Blocking transmit half.
pub struct UarteTx {
    tx_buf: &'static mut [u8; 1],
}

/// Interrupt-driven receive half.
pub struct UarteRx {
    rx_buf: &'static mut [u8; 1],
}

/// Configures the UARTE at 9600 Bd, 8-N-1, starts reception, and splits the
/// peripheral into its two halves.
///
/// The buffers must live in RAM (EasyDMA cannot reach flash).
pub fn init(
    uarte: UARTE0,
    txd: Psel,
    rxd: Psel,
    tx_buf: &'static mut [u8; 1],
    rx_buf: &'static mut [u8; 1],
) -> (UarteTx, UarteRx) {
    uarte.psel.txd.write(|w| unsafe { w.bits(txd.bits()) });
    uarte.psel.rxd.write(|w| unsafe { w.bits(rxd.bits()) });
    uarte.baudrate.write(|w| w.baudrate().baud9600());
    // 8-N-1, no flow control
    uarte.config.reset();
    uarte.enable.write(|w| w.enable().enabled());

    // Every finished byte immediately re-arms reception into the same buffer.
    uarte.shorts.write(|w| w.endrx_startrx().enabled());
    uarte
        .rxd
        .ptr
        .write(|w| unsafe { w.bits(rx_buf.as_ptr() as u32) });
    uarte.rxd.maxcnt.write(|w| unsafe { w.bits(1) });
    uarte.intenset.write(|w| w.endrx().set());
    uarte.events_endrx.reset();
    uarte.tasks_startrx.write(|w| unsafe { w.bits(1) });

    (UarteTx { tx_buf }, UarteRx { rx_buf })
}

impl UartTx for UarteTx {
    fn write_byte(&mut self, byte: u8) {
        // TX half: only touches TXD registers and ENDTX.
        let uarte = unsafe { &*UARTE0::ptr() };

        self.tx_buf[0] = byte;
        uarte
            .txd
            .ptr
            .write(|w| unsafe { w.bits(self.tx_buf.as_ptr() as u32) });
        uarte.txd.maxcnt.write(|w| unsafe { w.bits(1) });
        uarte.events_endtx.reset();
        uarte.tasks_starttx.write(|w| unsafe { w.bits(1) });
        while uarte.events_endtx.read().bits() == 0 {}
        uarte.tasks_stoptx.write(|w| unsafe { w.bits(1) });
    }
}

impl UarteRx {
    /// Returns the byte that completed reception, if any. Call from the
    /// UARTE interrupt handler.
    pub fn read(&mut self) -> Option<u8> {
        // RX half: only touches ENDRX and the RX buffer.
        let uarte = unsafe { &*UARTE0::ptr() };

        if uarte.events_endrx.read().bits() == 0 {
            return None;
        }
        uarte.events_endrx.reset();
        Some(self.rx_buf[0])
    }
}
