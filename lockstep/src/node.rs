//! The role state machine and protocol logic.
//!
//! Every node powers up in the [`Idle`] role. The first button press in the
//! fleet turns that node into the [`Coordinator`]; everyone who then hears a
//! tick becomes a [`Logger`]. A button press (or a Logger's relayed stop
//! request) ends logging fleet-wide and returns every node to idle, so roles
//! are re-elected on every power or logging cycle.
//!
//! All protocol decisions happen here, in main-loop context. Interrupt
//! handlers only feed the [`EventMask`] (and, for received frames, the
//! [`TickCache`]); [`Node::step`] drains one batch of events per loop
//! iteration and dispatches them against the current role. Events that a role
//! does not listen for are ignored.
//!
//! [`Idle`]: enum.Role.html#variant.Idle
//! [`Coordinator`]: enum.Role.html#variant.Coordinator
//! [`Logger`]: enum.Role.html#variant.Logger
//! [`EventMask`]: ../event/struct.EventMask.html
//! [`TickCache`]: struct.TickCache.html
//! [`Node::step`]: struct.Node.html#method.step

use crate::config::{Config, Hardware, Shared};
use crate::event::{EventMask, Events};
use crate::frame::{Command, Frame};
use crate::io::{Led, Outputs, UartTx};
use crate::radio::{EsbRadio, Pipe, PollCursor, RadioMode};
use crate::rtc::Timestamp;
use crate::time::{Duration, Ticker, Timer};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

/// Poll one Logger pipe every this many ticks.
///
/// With the 10 ms tick period this opens an ACK slot every 50 ms, bounding
/// the stop-request latency of a 7-Logger fleet to ≈350 ms — plenty for a
/// human-initiated stop.
pub const POLL_EVERY_N_TICKS: u32 = 5;

/// Device role, elected at run time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    /// Listening (PRX), waiting for a button press or a first tick.
    Idle,
    /// Driving the fleet clock (PTX).
    Coordinator,
    /// Following the Coordinator's ticks (PRX).
    Logger,
}

/// Frame triage, run in radio interrupt context.
///
/// Translates validated frames into event bits and caches the time of the
/// last tick. No protocol logic happens here, which keeps the interrupt path
/// short and free of reentrancy concerns.
pub struct TickCache {
    last: Timestamp,
}

impl TickCache {
    pub const fn new() -> Self {
        TickCache {
            last: Timestamp::ZERO,
        }
    }

    /// Sifts one received frame, returning the events it raises.
    ///
    /// A zero-time tick is a valid start-of-logging trigger but does not
    /// overwrite the cached time. `POLL` frames need no reaction at all: the
    /// ACK slot they open is serviced by the radio hardware.
    pub fn accept(&mut self, frame: &Frame) -> Events {
        trace!("rx {:?}", frame);
        match frame.command() {
            Command::StartTick => {
                let time = frame.timestamp();
                if !time.is_zero() {
                    self.last = time;
                }
                Events::TICK_RX
            }
            Command::Stop | Command::StopRequest => Events::STOP_RX,
            Command::Poll | Command::Unknown(_) => Events::empty(),
        }
    }

    /// The most recent non-zero tick time.
    pub fn last(&self) -> Timestamp {
        self.last
    }
}

/// Snapshot of the interrupt-written time registers, sampled once per loop
/// iteration.
///
/// Both registers are single-writer (UART interrupt and radio interrupt
/// respectively); the main loop reads them only after observing the matching
/// event bit, so a snapshot is always internally consistent.
#[derive(Debug, Copy, Clone, Default)]
pub struct Inputs {
    /// Most recent RTC record assembled from the attached host's UART.
    pub rtc: Timestamp,
    /// Time carried by the last valid tick received over the air.
    pub last_tick: Timestamp,
}

/// The unified Coordinator/Logger node.
pub struct Node<C: Config> {
    hw: Hardware<C>,
    events: &'static EventMask,
    pipe: Pipe,
    role: Role,
    cursor: PollCursor,
    ticks: u32,
}

impl<C: Config> Node<C> {
    /// Creates a node in the [`Idle`] role.
    ///
    /// `pipe` is this device's own unicast pipe (derived from its factory
    /// id); `events` is the mask fed by the interrupt handlers.
    ///
    /// [`Idle`]: enum.Role.html#variant.Idle
    pub fn new(hw: Hardware<C>, pipe: Pipe, events: &'static EventMask) -> Self {
        Node {
            hw,
            events,
            pipe,
            role: Role::Idle,
            cursor: PollCursor::new(),
            ticks: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Performs the idle entry actions. Call once before the first `step`.
    pub fn start(&mut self, radio: &mut impl Shared<C::Radio>) {
        self.enter_idle(radio);
    }

    /// Runs one iteration of the cooperative main loop.
    ///
    /// `events` is one drained batch from the event mask; `inputs` is a fresh
    /// snapshot of the time registers. When nothing of interest is pending,
    /// idle and Logger nodes sleep for a millisecond; the Coordinator returns
    /// immediately to keep tick handling jitter-free.
    pub fn step(&mut self, events: Events, radio: &mut impl Shared<C::Radio>, inputs: Inputs) {
        match self.role {
            Role::Idle => {
                if events.contains(Events::BUTTON) {
                    // First press in the fleet: this node drives the clock.
                    self.enter_coordinator(radio);
                } else if events.contains(Events::TICK_RX) {
                    // Somebody else started first.
                    self.enter_logger();
                } else {
                    self.hw.delay.delay_ms(1);
                }
            }
            Role::Coordinator => {
                if events.intersects(Events::BUTTON | Events::STOP_RX) {
                    self.shut_down_fleet(radio);
                } else if events.contains(Events::TICK_TIMER) {
                    self.tick(radio, inputs.rtc);
                }
            }
            Role::Logger => {
                if events.contains(Events::BUTTON) {
                    self.request_stop(radio);
                } else if events.contains(Events::STOP_RX) {
                    self.pulse_stop();
                    self.enter_idle(radio);
                } else if events.contains(Events::TICK_RX) {
                    self.follow_tick(inputs.last_tick);
                } else {
                    self.hw.delay.delay_ms(1);
                }
            }
        }
    }

    fn enter_idle(&mut self, radio: &mut impl Shared<C::Radio>) {
        debug!("-> idle");
        self.role = Role::Idle;
        self.hw.outputs.set_led(Led::Red);
        self.hw.outputs.set_sync(false);
        self.hw.outputs.set_stop(false);
        if let Err(e) = radio.with(|r| r.switch_mode(RadioMode::Prx)) {
            warn!("switch to PRX failed: {:?}", e);
        }
    }

    fn enter_coordinator(&mut self, radio: &mut impl Shared<C::Radio>) {
        debug!("-> coordinator");
        self.hw.outputs.set_led(Led::Green);
        if radio.with(|r| r.switch_mode(RadioMode::Ptx)).is_err() {
            // Radio bring-up failed; idle is the only safe place.
            self.enter_idle(radio);
            return;
        }
        self.role = Role::Coordinator;
        self.ticks = 0;

        // The initial tick carries zero time: it marks the start of logging
        // without claiming a valid clock.
        let _ = radio.with(|r| r.send_broadcast(&Frame::start_tick(Timestamp::ZERO)));
        self.pulse_sync();
        self.hw.ticker.start();
    }

    fn enter_logger(&mut self) {
        debug!("-> logger");
        self.role = Role::Logger;
        self.hw.outputs.set_led(Led::Blue);
        // Start logging on the attached host.
        self.pulse_sync();
    }

    /// One Coordinator tick: broadcast the global time, pulse SYNC, emit the
    /// signature to the host, and every few ticks open an ACK slot for the
    /// next Logger.
    fn tick(&mut self, radio: &mut impl Shared<C::Radio>, rtc: Timestamp) {
        let _ = radio.with(|r| r.send_broadcast(&Frame::start_tick(rtc)));
        self.pulse_sync();
        self.emit_record(Timestamp::SIGNATURE);

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % POLL_EVERY_N_TICKS == 0 {
            let pipe = self.cursor.advance();
            if let Err(e) = radio.with(|r| r.send_unicast(pipe, &Frame::poll(), true)) {
                warn!("poll of {:?} failed: {:?}", pipe, e);
            }
        }
    }

    /// Ends logging fleet-wide.
    ///
    /// `STOP` is broadcast twice, each attempt waited on with a bounded
    /// timeout. No acknowledgement is expected; the second broadcast is all
    /// that covers a loss of the first in a noisy RF environment.
    fn shut_down_fleet(&mut self, radio: &mut impl Shared<C::Radio>) {
        for _ in 0..2 {
            let _ = radio.with(|r| r.send_broadcast(&Frame::stop()));
            self.wait_tx_done(Duration::TX_TIMEOUT);
        }
        self.pulse_stop();
        self.hw.ticker.stop();
        self.enter_idle(radio);
    }

    /// Queues a `STOP_REQ` on our own pipe; the radio hardware delivers it
    /// whenever the Coordinator next polls us.
    fn request_stop(&mut self, radio: &mut impl Shared<C::Radio>) {
        let (pipe, frame) = (self.pipe, Frame::stop_request());
        if let Err(e) = radio.with(|r| r.queue_ack_payload(pipe, &frame)) {
            warn!("STOP_REQ not queued: {:?}", e);
        }
    }

    /// Forwards the cached global time to the attached host, then pulses
    /// SYNC.
    fn follow_tick(&mut self, last_tick: Timestamp) {
        self.emit_record(last_tick);
        self.pulse_sync();
    }

    /// Waits for a transmission attempt to complete.
    ///
    /// Polls only the `TX_DONE` bit, leaving all other events pending for the
    /// main loop, and runs outside the radio critical section so the radio
    /// interrupt can still deliver the bit. On timeout the protocol simply
    /// continues; a lost `STOP` is covered by its sibling broadcast.
    fn wait_tx_done(&mut self, timeout: Duration) -> bool {
        let started = self.hw.clock.now();
        loop {
            if self.events.consume(Events::TX_DONE) {
                return true;
            }
            if self.hw.clock.now().duration_since(started) >= timeout {
                return false;
            }
            self.hw.delay.delay_ms(1);
        }
    }

    /// Writes one 5-byte record to the host, pacing the bytes so the host's
    /// slow UART does not drop any.
    fn emit_record(&mut self, record: Timestamp) {
        for byte in record.to_bytes() {
            self.hw.uart.write_byte(byte);
            self.hw.delay.delay_us(Duration::BYTE_PACING.as_micros());
        }
    }

    fn pulse_sync(&mut self) {
        self.hw.outputs.set_sync(true);
        self.hw.delay.delay_us(Duration::PULSE_WIDTH.as_micros());
        self.hw.outputs.set_sync(false);
    }

    fn pulse_stop(&mut self) {
        self.hw.outputs.set_stop(true);
        self.hw.delay.delay_us(Duration::PULSE_WIDTH.as_micros());
        self.hw.outputs.set_stop(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Exclusive;
    use crate::Error;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Everything the node did, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Action {
        Mode(RadioMode),
        Broadcast(Frame),
        Unicast(Pipe, Frame, bool),
        AckQueued(Pipe, Frame),
        Led(Led),
        Sync(bool),
        Stop(bool),
        Uart(u8),
        TickerStart,
        TickerStop,
    }

    type Log = Rc<RefCell<Vec<Action>>>;

    struct MockRadio {
        log: Log,
        events: &'static EventMask,
        mode: RadioMode,
        ack_slots: [Option<Frame>; 8],
        /// Refuse to enter PTX, emulating a failed radio re-init.
        refuse_ptx: bool,
        /// Swallow transmissions without ever raising `TX_DONE`.
        silent: bool,
    }

    impl MockRadio {
        fn tx_done(&self) {
            if !self.silent {
                self.events.raise(Events::TX_DONE);
            }
        }
    }

    impl EsbRadio for MockRadio {
        fn mode(&self) -> RadioMode {
            self.mode
        }

        fn switch_mode(&mut self, mode: RadioMode) -> Result<(), Error> {
            if self.refuse_ptx && mode == RadioMode::Ptx {
                return Err(Error::Radio);
            }
            self.mode = mode;
            self.log.borrow_mut().push(Action::Mode(mode));
            Ok(())
        }

        fn send_broadcast(&mut self, frame: &Frame) -> Result<(), Error> {
            if self.mode != RadioMode::Ptx {
                return Err(Error::NotPermitted);
            }
            self.log.borrow_mut().push(Action::Broadcast(*frame));
            self.tx_done();
            Ok(())
        }

        fn send_unicast(&mut self, pipe: Pipe, frame: &Frame, want_ack: bool) -> Result<(), Error> {
            if self.mode != RadioMode::Ptx {
                return Err(Error::NotPermitted);
            }
            self.log
                .borrow_mut()
                .push(Action::Unicast(pipe, *frame, want_ack));
            self.tx_done();
            Ok(())
        }

        fn queue_ack_payload(&mut self, pipe: Pipe, frame: &Frame) -> Result<(), Error> {
            if self.mode != RadioMode::Prx {
                return Err(Error::NotPermitted);
            }
            self.ack_slots[pipe.index() as usize] = Some(*frame);
            self.log.borrow_mut().push(Action::AckQueued(pipe, *frame));
            Ok(())
        }

        fn flush_rx(&mut self) {}

        fn flush_tx(&mut self) {
            self.ack_slots = Default::default();
        }
    }

    struct MockClock(Rc<Cell<u32>>);

    impl Timer for MockClock {
        fn now(&self) -> crate::time::Instant {
            crate::time::Instant::from_raw_micros(self.0.get())
        }
    }

    struct MockDelay(Rc<Cell<u32>>);

    impl DelayUs<u32> for MockDelay {
        fn delay_us(&mut self, us: u32) {
            self.0.set(self.0.get().wrapping_add(us));
        }
    }

    impl DelayMs<u32> for MockDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.0.set(self.0.get().wrapping_add(ms * 1_000));
        }
    }

    struct MockTicker(Log);

    impl Ticker for MockTicker {
        fn start(&mut self) {
            self.0.borrow_mut().push(Action::TickerStart);
        }

        fn stop(&mut self) {
            self.0.borrow_mut().push(Action::TickerStop);
        }
    }

    struct MockOutputs(Log);

    impl crate::io::Outputs for MockOutputs {
        fn set_led(&mut self, led: Led) {
            self.0.borrow_mut().push(Action::Led(led));
        }

        fn set_sync(&mut self, high: bool) {
            self.0.borrow_mut().push(Action::Sync(high));
        }

        fn set_stop(&mut self, high: bool) {
            self.0.borrow_mut().push(Action::Stop(high));
        }
    }

    struct MockUart(Log);

    impl crate::io::UartTx for MockUart {
        fn write_byte(&mut self, byte: u8) {
            self.0.borrow_mut().push(Action::Uart(byte));
        }
    }

    enum TestConfig {}

    impl Config for TestConfig {
        type Radio = MockRadio;
        type Clock = MockClock;
        type Ticker = MockTicker;
        type Outputs = MockOutputs;
        type Uart = MockUart;
        type Delay = MockDelay;
    }

    struct Rig {
        node: Node<TestConfig>,
        radio: Exclusive<MockRadio>,
        log: Log,
    }

    impl Rig {
        fn new() -> Self {
            let log: Log = Rc::default();
            let micros = Rc::new(Cell::new(0u32));
            let events: &'static EventMask = Box::leak(Box::new(EventMask::new()));

            let hw = Hardware::<TestConfig> {
                clock: MockClock(micros.clone()),
                ticker: MockTicker(log.clone()),
                outputs: MockOutputs(log.clone()),
                uart: MockUart(log.clone()),
                delay: MockDelay(micros),
            };
            let mut node = Node::new(hw, Pipe::unicast(3).unwrap(), events);
            let mut radio = Exclusive(MockRadio {
                log: log.clone(),
                events,
                mode: RadioMode::Prx,
                ack_slots: Default::default(),
                refuse_ptx: false,
                silent: false,
            });
            node.start(&mut radio);
            log.borrow_mut().clear();
            Rig { node, radio, log }
        }

        fn step(&mut self, events: Events) {
            self.step_with(events, Inputs::default());
        }

        fn step_with(&mut self, events: Events, inputs: Inputs) {
            self.node.step(events, &mut self.radio, inputs);
        }

        fn actions(&self) -> Vec<Action> {
            self.log.borrow().clone()
        }

        fn clear(&mut self) {
            self.log.borrow_mut().clear();
        }
    }

    #[test]
    fn button_in_idle_elects_coordinator() {
        let mut rig = Rig::new();
        rig.step(Events::BUTTON);

        assert_eq!(rig.node.role(), Role::Coordinator);
        let initial = Frame::start_tick(Timestamp::ZERO);
        assert_eq!(
            rig.actions(),
            [
                Action::Led(Led::Green),
                Action::Mode(RadioMode::Ptx),
                Action::Broadcast(initial),
                Action::Sync(true),
                Action::Sync(false),
                Action::TickerStart,
            ]
        );
        // The initial tick on the wire, byte for byte.
        assert_eq!(initial.encode(), [0xAA, 0x00, 0, 0, 0, 0, 0, 0x78]);
    }

    #[test]
    fn button_wins_over_simultaneous_tick() {
        let mut rig = Rig::new();
        rig.step(Events::BUTTON | Events::TICK_RX);
        assert_eq!(rig.node.role(), Role::Coordinator);
    }

    #[test]
    fn tick_in_idle_elects_logger() {
        let mut rig = Rig::new();
        rig.step(Events::TICK_RX);

        assert_eq!(rig.node.role(), Role::Logger);
        assert_eq!(
            rig.actions(),
            [
                Action::Led(Led::Blue),
                Action::Sync(true),
                Action::Sync(false),
            ]
        );
    }

    #[test]
    fn failed_ptx_switch_falls_back_to_idle() {
        let mut rig = Rig::new();
        rig.radio.0.refuse_ptx = true;
        rig.step(Events::BUTTON);

        assert_eq!(rig.node.role(), Role::Idle);
        let actions = rig.actions();
        assert!(!actions.contains(&Action::TickerStart));
        assert!(!actions
            .iter()
            .any(|a| matches!(a, Action::Broadcast(_))));
        // Idle entry actions ran again.
        assert_eq!(actions.last(), Some(&Action::Mode(RadioMode::Prx)));
    }

    #[test]
    fn coordinator_tick_broadcasts_time_and_signature() {
        let mut rig = Rig::new();
        rig.step(Events::BUTTON);
        rig.clear();

        let rtc = Timestamp::new(0x6547_A1B0, 0x2A);
        rig.step_with(Events::TICK_TIMER, Inputs { rtc, ..Inputs::default() });

        let actions = rig.actions();
        assert_eq!(actions[0], Action::Broadcast(Frame::start_tick(rtc)));
        if let Action::Broadcast(frame) = actions[0] {
            assert_eq!(
                frame.encode(),
                [0xAA, 0x00, 0x65, 0x47, 0xA1, 0xB0, 0x2A, 0x7A]
            );
        }

        // SYNC pulse, then the paced signature record.
        assert_eq!(actions[1..3], [Action::Sync(true), Action::Sync(false)]);
        let uart: Vec<u8> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Uart(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(uart, [0, 0, 0, 0, 0xFF]);

        // The first tick must not poll yet.
        assert!(!actions.iter().any(|a| matches!(a, Action::Unicast(..))));
    }

    #[test]
    fn poll_cursor_round_robin_over_35_ticks() {
        let mut rig = Rig::new();
        rig.step(Events::BUTTON);
        rig.clear();

        for _ in 0..35 {
            rig.step(Events::TICK_TIMER);
        }
        let polls: Vec<(u8, Frame, bool)> = rig
            .actions()
            .iter()
            .filter_map(|a| match a {
                Action::Unicast(pipe, frame, ack) => Some((pipe.index(), *frame, *ack)),
                _ => None,
            })
            .collect();

        // One poll every 5 ticks, visiting pipes 1..=7 in order.
        assert_eq!(polls.len(), 7);
        for (i, (pipe, frame, ack)) in polls.iter().enumerate() {
            assert_eq!(*pipe, i as u8 + 1);
            assert_eq!(*frame, Frame::poll());
            assert!(*ack);
        }

        // Five more ticks wrap the cursor back to pipe 1.
        rig.clear();
        for _ in 0..5 {
            rig.step(Events::TICK_TIMER);
        }
        assert!(rig
            .actions()
            .contains(&Action::Unicast(Pipe::unicast(1).unwrap(), Frame::poll(), true)));
    }

    #[test]
    fn coordinator_stop_broadcasts_twice_and_idles() {
        let mut rig = Rig::new();
        rig.step(Events::BUTTON);
        rig.clear();

        rig.step(Events::STOP_RX);

        assert_eq!(rig.node.role(), Role::Idle);
        let actions = rig.actions();
        let stops = actions
            .iter()
            .filter(|a| **a == Action::Broadcast(Frame::stop()))
            .count();
        assert_eq!(stops, 2);

        // STOP pulse and ticker shutdown precede the idle entry actions.
        assert_eq!(
            actions[2..],
            [
                Action::Stop(true),
                Action::Stop(false),
                Action::TickerStop,
                Action::Led(Led::Red),
                Action::Sync(false),
                Action::Stop(false),
                Action::Mode(RadioMode::Prx),
            ]
        );
    }

    #[test]
    fn coordinator_stop_survives_missing_tx_done() {
        let mut rig = Rig::new();
        rig.step(Events::BUTTON);
        rig.radio.0.silent = true;
        rig.clear();

        // Both waits time out after 10 ms; the handshake still completes.
        rig.step(Events::BUTTON);
        assert_eq!(rig.node.role(), Role::Idle);
        let stops = rig
            .actions()
            .iter()
            .filter(|a| **a == Action::Broadcast(Frame::stop()))
            .count();
        assert_eq!(stops, 2);
    }

    #[test]
    fn logger_button_queues_a_single_stop_request() {
        let mut rig = Rig::new();
        rig.step(Events::TICK_RX);
        rig.clear();

        rig.step(Events::BUTTON);
        rig.step(Events::BUTTON);

        // Re-queueing before delivery replaces; one payload is pending.
        let pending: Vec<_> = rig.radio.0.ack_slots.iter().flatten().collect();
        assert_eq!(pending, [&Frame::stop_request()]);
        assert_eq!(
            rig.actions(),
            [
                Action::AckQueued(Pipe::unicast(3).unwrap(), Frame::stop_request()),
                Action::AckQueued(Pipe::unicast(3).unwrap(), Frame::stop_request()),
            ]
        );
    }

    #[test]
    fn logger_stop_pulses_and_idles() {
        let mut rig = Rig::new();
        rig.step(Events::TICK_RX);
        rig.clear();

        rig.step(Events::STOP_RX);

        assert_eq!(rig.node.role(), Role::Idle);
        let actions = rig.actions();
        assert_eq!(actions[..2], [Action::Stop(true), Action::Stop(false)]);
        assert_eq!(actions.last(), Some(&Action::Mode(RadioMode::Prx)));
    }

    #[test]
    fn logger_forwards_cached_time_before_sync_pulse() {
        let mut rig = Rig::new();
        rig.step(Events::TICK_RX);
        rig.clear();

        let last_tick = Timestamp::new(0x6547_A1B0, 0x2A);
        rig.step_with(
            Events::TICK_RX,
            Inputs {
                last_tick,
                ..Inputs::default()
            },
        );

        assert_eq!(
            rig.actions(),
            [
                Action::Uart(0x65),
                Action::Uart(0x47),
                Action::Uart(0xA1),
                Action::Uart(0xB0),
                Action::Uart(0x2A),
                Action::Sync(true),
                Action::Sync(false),
            ]
        );
    }

    #[test]
    fn tick_cache_classifies_frames() {
        let mut cache = TickCache::new();

        // A zero-time tick triggers but does not update the cache.
        assert_eq!(
            cache.accept(&Frame::start_tick(Timestamp::ZERO)),
            Events::TICK_RX
        );
        assert_eq!(cache.last(), Timestamp::ZERO);

        let time = Timestamp::new(1_700_000_000, 42);
        assert_eq!(cache.accept(&Frame::start_tick(time)), Events::TICK_RX);
        assert_eq!(cache.last(), time);

        assert_eq!(cache.accept(&Frame::stop()), Events::STOP_RX);
        assert_eq!(cache.accept(&Frame::stop_request()), Events::STOP_RX);
        assert_eq!(cache.accept(&Frame::poll()), Events::empty());

        // Another zero-time tick still leaves the cache alone.
        cache.accept(&Frame::start_tick(Timestamp::ZERO));
        assert_eq!(cache.last(), time);
    }
}
