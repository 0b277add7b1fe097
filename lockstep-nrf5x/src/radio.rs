//! Enhanced-ShockBurst-style transceiver on the nRF radio.
//!
//! The radio peripheral speaks the proprietary 2 Mbit/s format directly; this
//! driver adds the ESB conventions on top: eight pipes (a 3-byte address made
//! of a shared 2-byte base and a per-pipe prefix), a dynamic-length packet
//! header, and acknowledgements with optional payloads.
//!
//! On air, each packet looks like this (the radio itself prepends the
//! preamble and address and appends the CRC):
//!
//! ```notrust
//! +----------+---------+--------+----------------------------+----------+
//! | Preamble |  Base   | Prefix | Length | PID | NOACK | Data |  CRC-16  |
//! |  (1 B)   |  (2 B)  | (1 B)  | (6 b)  |(2 b)| (1 b) |      |  (2 B)   |
//! +----------+---------+--------+----------------------------+----------+
//! ```
//!
//! In RAM the header fields occupy one byte each (`LFLEN = 6`, `S1LEN = 3`),
//! so a packet buffer is the payload plus two header bytes.
//!
//! A primary receiver (PRX) listens on all pipes and answers every packet
//! that asks for an acknowledgement, attaching the payload queued for the
//! addressed pipe, if any. A primary transmitter (PTX) fires broadcasts
//! without expecting a reply, and after a unicast with `want_ack` it turns
//! around and listens on the same pipe for the acknowledgement.
//!
//! Hardware retransmissions stay off ([`RETRANSMIT_COUNT`] is zero): a
//! repeated tick arriving out of cadence would do more harm than a lost one.
//!
//! [`RETRANSMIT_COUNT`]: ../../lockstep/radio/constant.RETRANSMIT_COUNT.html

use crate::pac::RADIO;
use lockstep::frame::{Frame, FRAME_LEN};
use lockstep::radio::{Addresses, EsbRadio, Pipe, RadioEvent, RadioMode};
use lockstep::Error;

/// CRC-16 parameters of the ESB air format, computed over address and
/// payload.
const CRC_POLY: u32 = 0x0001_1021;
const CRC_INIT: u32 = 0x0000_FFFF;

/// In-RAM packet size: length byte, header byte, payload.
pub const MAX_PACKET: usize = FRAME_LEN + 2;

/// A buffer the radio DMA reads from or writes into.
pub type PacketBuffer = [u8; MAX_PACKET];

#[inline]
fn bytewise_bit_swap(value: u32) -> u32 {
    value.reverse_bits().swap_bytes()
}

#[inline]
fn address_conversion(value: u32) -> u32 {
    value.reverse_bits()
}

/// What the transceiver is currently doing.
#[derive(Copy, Clone, PartialEq, Eq)]
enum State {
    /// Nothing in flight (PTX between transmissions, or not yet started).
    Quiet,
    /// PRX: reception armed.
    Listening,
    /// PRX: acknowledgement going out.
    SendingAck,
    /// PTX: packet going out.
    Transmitting { pipe: Pipe, want_ack: bool },
    /// PTX: listening for the acknowledgement of the last unicast.
    AwaitingAck { pipe: Pipe },
}

/// A received payload, handed up from the interrupt handler.
pub struct Received {
    pipe: Pipe,
    len: u8,
    buf: [u8; FRAME_LEN],
}

impl Received {
    /// The pipe the packet arrived on.
    pub fn pipe(&self) -> Pipe {
        self.pipe
    }

    /// The raw payload bytes; [`Frame::decode`] validates them.
    ///
    /// [`Frame::decode`]: ../../lockstep/frame/struct.Frame.html#method.decode
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }
}

/// An interface to the nRF radio in ESB mode.
pub struct Esb {
    radio: RADIO,
    mode: RadioMode,
    state: State,
    addresses: Addresses,
    /// 2-bit packet id, incremented per transmitted packet.
    pid: u8,
    tx_buf: &'static mut PacketBuffer,
    rx_buf: &'static mut PacketBuffer,
    /// At most one pending ACK payload per pipe; re-queueing replaces.
    ack_slots: [Option<Frame>; 8],
    rx_pending: Option<Received>,
}

impl Esb {
    /// Takes ownership of the radio and the DMA buffers.
    ///
    /// The radio stays disabled until the first [`switch_mode`] call.
    ///
    /// [`switch_mode`]: #method.switch_mode
    pub fn new(
        radio: RADIO,
        tx_buf: &'static mut PacketBuffer,
        rx_buf: &'static mut PacketBuffer,
    ) -> Self {
        assert!(radio.state.read().state().is_disabled());

        Self {
            radio,
            mode: RadioMode::Prx,
            state: State::Quiet,
            addresses: Addresses::fleet_default(),
            pid: 0,
            tx_buf,
            rx_buf,
            ack_slots: Default::default(),
            rx_pending: None,
        }
    }

    /// Applies the full on-air configuration. Called on every mode switch so
    /// a switch always starts from a known register state.
    fn apply_config(&mut self) {
        self.radio.mode.write(|w| w.mode().nrf_2mbit());
        self.radio.txpower.write(|w| w.txpower().pos4d_bm());

        // Fast ramp-up; the legacy timings only matter for nRF24 hardware on
        // the same channel, which this fleet does not have.
        self.radio.modecnf0.modify(|_, w| w.ru().fast());

        unsafe {
            // Dynamic length header: 6-bit length, 2-bit PID, 1-bit NOACK.
            self.radio.pcnf0.write(|w| w.lflen().bits(6).s1len().bits(3));
            self.radio.pcnf1.write(|w| {
                w.maxlen()
                    .bits(FRAME_LEN as u8)
                    // 2-Byte base address + 1-Byte prefix
                    .balen()
                    .bits(2)
                    .statlen()
                    .bits(0)
                    .endian()
                    .big()
            });

            // 16-bit CRC over address and payload.
            self.radio.crccnf.write(|w| w.len().two());
            self.radio
                .crcinit
                .write(|w| w.crcinit().bits(CRC_INIT & 0x00FF_FFFF));
            self.radio
                .crcpoly
                .write(|w| w.crcpoly().bits(CRC_POLY & 0x00FF_FFFF));

            // Base 0 carries the broadcast pipe, base 1 the unicast pipes.
            // Bit order is converted to stay compatible with nRF24-style
            // addressing.
            let a = &self.addresses;
            let base0 = address_conversion(u32::from_le_bytes([a.base0[0], a.base0[1], 0, 0]));
            let base1 = address_conversion(u32::from_le_bytes([a.base1[0], a.base1[1], 0, 0]));
            let prefix0 = bytewise_bit_swap(u32::from_le_bytes([
                a.prefixes[0],
                a.prefixes[1],
                a.prefixes[2],
                a.prefixes[3],
            ]));
            let prefix1 = bytewise_bit_swap(u32::from_le_bytes([
                a.prefixes[4],
                a.prefixes[5],
                a.prefixes[6],
                a.prefixes[7],
            ]));
            self.radio.base0.write(|w| w.bits(base0));
            self.radio.base1.write(|w| w.bits(base1));
            self.radio.prefix0.write(|w| w.bits(prefix0));
            self.radio.prefix1.write(|w| w.bits(prefix1));

            self.radio
                .frequency
                .write(|w| w.frequency().bits(a.rf_channel));
        }
    }

    /// Forces the radio into the disabled state, leaving no events pending.
    fn force_disable(&mut self) {
        self.radio.intenclr.write(|w| w.disabled().clear());
        self.radio.events_disabled.reset();

        if !self.radio.state.read().state().is_disabled() {
            self.radio.tasks_disable.write(|w| unsafe { w.bits(1) });
            while self.radio.events_disabled.read().bits() == 0 {}
            self.radio.events_disabled.reset();
        }

        self.state = State::Quiet;
    }

    /// Arms reception. PRX listens on every pipe; a PTX waiting for its
    /// acknowledgement restricts the match to the polled pipe.
    fn start_rx(&mut self, pipes_mask: u8, next: State) {
        self.radio
            .packetptr
            .write(|w| unsafe { w.bits(self.rx_buf.as_ptr() as u32) });
        self.radio
            .rxaddresses
            .write(|w| unsafe { w.bits(u32::from(pipes_mask)) });
        self.radio.shorts.write(|w| {
            // start reception right after ramp-up, disable once a packet is in
            w.ready_start().enabled().end_disable().enabled()
        });
        self.radio.events_disabled.reset();
        self.radio.intenset.write(|w| w.disabled().set());
        self.state = next;
        self.radio.tasks_rxen.write(|w| unsafe { w.bits(1) });
    }

    /// Fills the TX buffer and fires. `noack` sets the header bit that tells
    /// the receiver not to acknowledge.
    fn transmit(&mut self, pipe: Pipe, frame: &Frame, noack: bool) {
        // Whatever was in flight loses to the fresher frame.
        self.force_disable();

        let bytes = frame.encode();
        self.pid = (self.pid + 1) & 0b11;
        self.tx_buf[0] = FRAME_LEN as u8;
        self.tx_buf[1] = (self.pid << 1) | noack as u8;
        self.tx_buf[2..2 + FRAME_LEN].copy_from_slice(&bytes);

        self.radio
            .packetptr
            .write(|w| unsafe { w.bits(self.tx_buf.as_ptr() as u32) });
        self.radio
            .txaddress
            .write(|w| unsafe { w.txaddress().bits(pipe.index()) });
        self.radio
            .shorts
            .write(|w| w.ready_start().enabled().end_disable().enabled());
        self.radio.events_disabled.reset();
        self.radio.intenset.write(|w| w.disabled().set());
        self.state = State::Transmitting {
            pipe,
            want_ack: !noack,
        };
        self.radio.tasks_txen.write(|w| unsafe { w.bits(1) });
    }

    /// Answers the packet just received on `pipe` with an acknowledgement,
    /// attaching the queued payload if one is pending.
    fn send_ack(&mut self, pipe: Pipe) {
        match self.ack_slots[usize::from(pipe.index())].take() {
            Some(frame) => {
                let bytes = frame.encode();
                self.tx_buf[0] = FRAME_LEN as u8;
                self.tx_buf[2..2 + FRAME_LEN].copy_from_slice(&bytes);
            }
            None => {
                // Empty acknowledgement.
                self.tx_buf[0] = 0;
            }
        }
        // Echo the PID, mark the ack itself as not-to-be-acked.
        self.tx_buf[1] = (self.rx_buf[1] & 0b110) | 1;

        self.radio
            .packetptr
            .write(|w| unsafe { w.bits(self.tx_buf.as_ptr() as u32) });
        self.radio
            .txaddress
            .write(|w| unsafe { w.txaddress().bits(pipe.index()) });
        self.radio.events_disabled.reset();
        self.radio.intenset.write(|w| w.disabled().set());
        self.state = State::SendingAck;
        self.radio.tasks_txen.write(|w| unsafe { w.bits(1) });
    }

    /// Copies the packet in the RX buffer into the pending slot.
    fn capture_rx(&mut self, pipe: Pipe) {
        let len = self.rx_buf[0];
        if usize::from(len) > FRAME_LEN {
            // Oversized packets cannot be ours.
            return;
        }
        let mut buf = [0; FRAME_LEN];
        buf[..usize::from(len)].copy_from_slice(&self.rx_buf[2..2 + usize::from(len)]);
        self.rx_pending = Some(Received { pipe, len, buf });
    }

    /// Advances the driver state machine. Call from the `RADIO` interrupt.
    ///
    /// Returns the transmission outcome, if one completed. Received payloads
    /// (including ACK payloads riding on a `TX_SUCCESS`) are drained
    /// separately through [`take_received`].
    ///
    /// [`take_received`]: #method.take_received
    pub fn on_interrupt(&mut self) -> Option<RadioEvent> {
        if self.radio.events_disabled.read().bits() == 0 {
            return None;
        }
        self.radio.events_disabled.reset();

        match self.state {
            State::Quiet => None,
            State::Transmitting { pipe, want_ack } => {
                if want_ack {
                    // Turn around and catch the acknowledgement on the same
                    // pipe. A missing ack is cleaned up by the next
                    // transmission.
                    self.start_rx(1 << pipe.index(), State::AwaitingAck { pipe });
                    None
                } else {
                    self.state = State::Quiet;
                    Some(RadioEvent::TxSuccess)
                }
            }
            State::AwaitingAck { pipe } => {
                self.state = State::Quiet;
                if self.radio.crcstatus.read().crcstatus().is_crcok() {
                    self.capture_rx(pipe);
                    Some(RadioEvent::TxSuccess)
                } else {
                    Some(RadioEvent::TxFailed)
                }
            }
            State::Listening => {
                if !self.radio.crcstatus.read().crcstatus().is_crcok() {
                    // Corrupted packets are dropped silently.
                    self.start_rx(0xFF, State::Listening);
                    return None;
                }
                let pipe = match Pipe::unicast(self.radio.rxmatch.read().bits() as u8) {
                    Some(pipe) => pipe,
                    None => Pipe::BROADCAST,
                };
                let noack = self.rx_buf[1] & 1 != 0;
                self.capture_rx(pipe);
                if noack {
                    self.start_rx(0xFF, State::Listening);
                } else {
                    self.send_ack(pipe);
                }
                Some(RadioEvent::RxReceived)
            }
            State::SendingAck => {
                // The acknowledgement is out; resume listening.
                self.start_rx(0xFF, State::Listening);
                None
            }
        }
    }

    /// Hands out the most recently received payload.
    pub fn take_received(&mut self) -> Option<Received> {
        self.rx_pending.take()
    }
}

impl EsbRadio for Esb {
    fn mode(&self) -> RadioMode {
        self.mode
    }

    fn switch_mode(&mut self, mode: RadioMode) -> Result<(), Error> {
        self.force_disable();
        self.flush_rx();
        self.flush_tx();
        self.apply_config();
        self.mode = mode;
        if mode == RadioMode::Prx {
            self.start_rx(0xFF, State::Listening);
        }
        Ok(())
    }

    fn send_broadcast(&mut self, frame: &Frame) -> Result<(), Error> {
        if self.mode != RadioMode::Ptx {
            return Err(Error::NotPermitted);
        }
        // The frame just handed in must be the one on the air; anything still
        // queued is stale.
        self.flush_tx();
        self.transmit(Pipe::BROADCAST, frame, true);
        Ok(())
    }

    fn send_unicast(&mut self, pipe: Pipe, frame: &Frame, want_ack: bool) -> Result<(), Error> {
        if self.mode != RadioMode::Ptx {
            return Err(Error::NotPermitted);
        }
        self.transmit(pipe, frame, !want_ack);
        Ok(())
    }

    fn queue_ack_payload(&mut self, pipe: Pipe, frame: &Frame) -> Result<(), Error> {
        if self.mode != RadioMode::Prx {
            return Err(Error::NotPermitted);
        }
        self.ack_slots[usize::from(pipe.index())] = Some(*frame);
        Ok(())
    }

    fn flush_rx(&mut self) {
        self.rx_pending = None;
    }

    fn flush_tx(&mut self) {
        if matches!(
            self.state,
            State::Transmitting { .. } | State::AwaitingAck { .. }
        ) {
            self.force_disable();
        }
        self.ack_slots = Default::default();
    }
}
