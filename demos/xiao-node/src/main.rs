//! Unified Coordinator/Logger firmware for the Seeed XIAO nRF52840.
//!
//! Any node of the fleet runs this binary. At power-up the node idles; the
//! first button press makes it the Coordinator, receiving a tick makes it a
//! Logger. Interrupt handlers only post event bits (and keep the two time
//! registers current); the `idle` task runs the cooperative main loop.

#![no_std]
#![no_main]
#![warn(rust_2018_idioms)]

// We need to import this crate explicitly so we have a panic handler
use panic_halt as _;

#[rtic::app(device = nrf52840_hal::pac, peripherals = true)]
mod app {
    use embedded_hal::blocking::delay::DelayMs;
    use embedded_hal::digital::v2::{InputPin, OutputPin};
    use lockstep::config::{Config, Hardware, Shared as Scoped};
    use lockstep::debounce::Debouncer;
    use lockstep::event::{EventMask, Events};
    use lockstep::frame::Frame;
    use lockstep::io::{Led, Outputs};
    use lockstep::node::{Inputs, Node, TickCache};
    use lockstep::radio::RadioEvent;
    use lockstep::rtc::{RecordAssembler, Timestamp};
    use lockstep_nrf5x::radio::{Esb, PacketBuffer, MAX_PACKET};
    use lockstep_nrf5x::timer::{DebounceTimer, MonoClock, TickTimer};
    use lockstep_nrf5x::uart::{self, Psel, UarteRx, UarteTx};
    use lockstep_nrf5x::utils::device_pipe;
    use nrf52840_hal as hal;

    use hal::gpio::{p0, p1, Input, Level, Output, Pin, PullUp, PushPull};
    use hal::gpiote::Gpiote;
    use hal::pac::{TIMER1, TIMER2};

    /// Events pending for the main loop; the only lock-free shared state.
    static EVENTS: EventMask = EventMask::new();

    /// The XIAO's output lines. The on-board RGB LED is active low.
    pub struct Board {
        led_red: Pin<Output<PushPull>>,
        led_green: Pin<Output<PushPull>>,
        led_blue: Pin<Output<PushPull>>,
        sync: Pin<Output<PushPull>>,
        stop: Pin<Output<PushPull>>,
    }

    impl Outputs for Board {
        fn set_led(&mut self, led: Led) {
            self.led_red.set_high().unwrap();
            self.led_green.set_high().unwrap();
            self.led_blue.set_high().unwrap();
            match led {
                Led::Off => {}
                Led::Red => self.led_red.set_low().unwrap(),
                Led::Green => self.led_green.set_low().unwrap(),
                Led::Blue => self.led_blue.set_low().unwrap(),
            }
        }

        fn set_sync(&mut self, high: bool) {
            if high {
                self.sync.set_high().unwrap();
            } else {
                self.sync.set_low().unwrap();
            }
        }

        fn set_stop(&mut self, high: bool) {
            if high {
                self.stop.set_high().unwrap();
            } else {
                self.stop.set_low().unwrap();
            }
        }
    }

    /// Adapts RTIC's `Mutex` to the scoped access the node asks for.
    struct Gate<M>(M);

    impl<T, M: rtic::Mutex<T = T>> Scoped<T> for Gate<M> {
        fn with<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
            self.0.lock(f)
        }
    }

    pub enum XiaoConfig {}

    impl Config for XiaoConfig {
        type Radio = Esb;
        type Clock = MonoClock<hal::pac::TIMER0>;
        type Ticker = TickTimer<TIMER1>;
        type Outputs = Board;
        type Uart = UarteTx;
        type Delay = hal::Delay;
    }

    #[shared]
    struct Shared {
        radio: Esb,
        inbox: TickCache,
        rtc: Timestamp,
        debounce: DebounceTimer<TIMER2>,
    }

    #[local]
    struct Local {
        node: Node<XiaoConfig>,
        gpiote: Gpiote,
        button: Pin<Input<PullUp>>,
        debouncer: Debouncer,
        uart_rx: UarteRx,
        assembler: RecordAssembler,
    }

    #[init(local = [
        tx_buf: PacketBuffer = [0; MAX_PACKET],
        rx_buf: PacketBuffer = [0; MAX_PACKET],
        uart_tx_byte: [u8; 1] = [0],
        uart_rx_byte: [u8; 1] = [0],
    ])]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        // The radio needs the external HF oscillator.
        let _clocks = hal::clocks::Clocks::new(cx.device.CLOCK).enable_ext_hfosc();

        let p0 = p0::Parts::new(cx.device.P0);
        let p1 = p1::Parts::new(cx.device.P1);
        let mut delay = hal::Delay::new(cx.core.SYST);

        let mut led_green = p0.p0_30.into_push_pull_output(Level::High).degrade();
        let led_red = p0.p0_26.into_push_pull_output(Level::High).degrade();
        let led_blue = p0.p0_06.into_push_pull_output(Level::High).degrade();
        let sync = p0.p0_03.into_push_pull_output(Level::Low).degrade();
        let stop = p0.p0_28.into_push_pull_output(Level::Low).degrade();
        let button = p0.p0_02.into_pullup_input().degrade();

        // Power-on blink: prove the LED mapping and that the firmware runs,
        // before clock and radio bring-up can get in the way.
        for _ in 0..6 {
            led_green.set_low().unwrap();
            delay.delay_ms(150u32);
            led_green.set_high().unwrap();
            delay.delay_ms(150u32);
        }

        // Both button edges re-arm the debounce window; only the last edge
        // within it counts.
        let gpiote = Gpiote::new(cx.device.GPIOTE);
        gpiote
            .channel0()
            .input_pin(&button)
            .toggle()
            .enable_interrupt();
        let debouncer = Debouncer::new(button.is_low().unwrap());

        // The UARTE owns its pins once selected; hand them over configured.
        let _txd = p1.p1_11.into_push_pull_output(Level::High);
        let _rxd = p1.p1_12.into_floating_input();
        let (uart_tx, uart_rx) = uart::init(
            cx.device.UARTE0,
            Psel { port: 1, pin: 11 }, // XIAO D6
            Psel { port: 1, pin: 12 }, // XIAO D7
            cx.local.uart_tx_byte,
            cx.local.uart_rx_byte,
        );

        let radio = Esb::new(cx.device.RADIO, cx.local.tx_buf, cx.local.rx_buf);

        let hw = Hardware::<XiaoConfig> {
            clock: MonoClock::init(cx.device.TIMER0),
            ticker: TickTimer::init(cx.device.TIMER1),
            outputs: Board {
                led_red,
                led_green,
                led_blue,
                sync,
                stop,
            },
            uart: uart_tx,
            delay,
        };
        let node = Node::new(hw, device_pipe(), &EVENTS);

        (
            Shared {
                radio,
                inbox: TickCache::new(),
                rtc: Timestamp::ZERO,
                debounce: DebounceTimer::init(cx.device.TIMER2),
            },
            Local {
                node,
                gpiote,
                button,
                debouncer,
                uart_rx,
                assembler: RecordAssembler::new(),
            },
            init::Monotonics(),
        )
    }

    /// The cooperative main loop: drain one batch of events, snapshot the
    /// time registers, run one state machine step.
    #[idle(shared = [radio, inbox, rtc], local = [node])]
    fn idle(mut cx: idle::Context) -> ! {
        let mut radio = Gate(cx.shared.radio);
        cx.local.node.start(&mut radio);
        loop {
            let events = EVENTS.take();
            let inputs = Inputs {
                rtc: cx.shared.rtc.lock(|rtc| *rtc),
                last_tick: cx.shared.inbox.lock(|inbox| inbox.last()),
            };
            cx.local.node.step(events, &mut radio, inputs);
        }
    }

    /// Radio interrupt: advance the driver, then translate its results into
    /// event bits. No protocol logic happens here.
    #[task(binds = RADIO, shared = [radio, inbox], priority = 3)]
    fn radio_irq(cx: radio_irq::Context) {
        let radio_irq::SharedResources {
            mut radio,
            mut inbox,
        } = cx.shared;
        radio.lock(|radio| {
            match radio.on_interrupt() {
                // Success and failure both mean "the attempt is over".
                Some(RadioEvent::TxSuccess) | Some(RadioEvent::TxFailed) => {
                    EVENTS.raise(Events::TX_DONE);
                }
                Some(RadioEvent::RxReceived) | None => {}
            }
            while let Some(packet) = radio.take_received() {
                // Invalid frames are dropped without a trace.
                if let Ok(frame) = Frame::decode(packet.bytes()) {
                    inbox.lock(|inbox| EVENTS.raise(inbox.accept(&frame)));
                }
            }
        });
    }

    /// Periodic tick expiry (Coordinator only).
    #[task(binds = TIMER1, priority = 2)]
    fn tick_timer(_: tick_timer::Context) {
        // The node owns the ticker handle; acknowledge through the raw event
        // register instead.
        unsafe { TickTimer::<TIMER1>::acknowledge() };
        EVENTS.raise(Events::TICK_TIMER);
    }

    /// Button edge: restart the debounce window.
    #[task(binds = GPIOTE, shared = [debounce], local = [gpiote], priority = 2)]
    fn button_edge(mut cx: button_edge::Context) {
        cx.local.gpiote.reset_events();
        cx.shared.debounce.lock(|timer| timer.rearm());
    }

    /// Debounce window elapsed: commit the now-stable pin level.
    #[task(binds = TIMER2, shared = [debounce], local = [button, debouncer], priority = 2)]
    fn button_settle(mut cx: button_settle::Context) {
        cx.shared.debounce.lock(|timer| timer.acknowledge());
        let pressed = cx.local.button.is_low().unwrap();
        if cx.local.debouncer.settle(pressed) {
            EVENTS.raise(Events::BUTTON);
        }
    }

    /// One RTC byte from the attached host. Five of them make a record.
    #[task(binds = UARTE0_UART0, shared = [rtc], local = [uart_rx, assembler], priority = 2)]
    fn host_uart(mut cx: host_uart::Context) {
        while let Some(byte) = cx.local.uart_rx.read() {
            if let Some(record) = cx.local.assembler.push(byte) {
                cx.shared.rtc.lock(|rtc| *rtc = record);
            }
        }
    }
}
