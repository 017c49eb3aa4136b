//! Interrupt-driven serial transport

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use core::fmt;

use critical_section::Mutex;
use tinyhal_core::{high_byte, info, low_byte, warn, HalResult, RegisterBus};
use tinyhal_ringbuf::RingBuffer;

use crate::config::SerialConfig;
use crate::format::{self, Radix};
use crate::layout::{control_b, status_a, UsartLayout};
use crate::parse::{self, LookaheadMode};

/// Receive and transmit buffer capacity used when none is given
pub const DEFAULT_BUFFER_SIZE: usize = 64;

const LINE_END: &[u8] = b"\r\n";

/// Buffered USART
///
/// Meant to live in a `static` for the whole program, with the two
/// interrupt handlers calling [`on_receive_complete`](Self::on_receive_complete)
/// and [`on_data_register_empty`](Self::on_data_register_empty).
///
/// The receive buffer is filled only by the receive handler and drained
/// only by caller-context reads; the transmit buffer the other way round.
/// Both overwrite their oldest byte when full. On the transmit side
/// [`write_byte`](Self::write_byte) waits for room first, so with a single
/// caller-context writer nothing is ever evicted there.
pub struct Serial<B, const RX: usize = DEFAULT_BUFFER_SIZE, const TX: usize = DEFAULT_BUFFER_SIZE> {
    bus: B,
    layout: UsartLayout,
    cpu_hz: u32,
    rx: Mutex<RefCell<RingBuffer<RX>>>,
    tx: Mutex<RefCell<RingBuffer<TX>>>,
    written: Mutex<Cell<bool>>,
}

impl<B: RegisterBus, const RX: usize, const TX: usize> Serial<B, RX, TX> {
    /// Create a disabled port for a CPU running at `cpu_hz`
    pub const fn new(bus: B, layout: UsartLayout, cpu_hz: u32) -> Self {
        Self {
            bus,
            layout,
            cpu_hz,
            rx: Mutex::new(RefCell::new(RingBuffer::new())),
            tx: Mutex::new(RefCell::new(RingBuffer::new())),
            written: Mutex::new(Cell::new(false)),
        }
    }

    /// Program divisor and frame format, then enable the receiver, the
    /// transmitter and the receive interrupt
    ///
    /// The data-register-empty interrupt stays off until there is something
    /// to send.
    pub fn begin(&self, config: &SerialConfig) -> HalResult<()> {
        let divisor = config.divisor(self.cpu_hz).map_err(|e| {
            warn!("serial: no divisor for {=u32} baud", config.baud_rate);
            e
        })?;
        let l = &self.layout;

        critical_section::with(|cs| {
            self.bus.write_byte(l.baud_high, high_byte(divisor.ubrr));
            self.bus.write_byte(l.baud_low, low_byte(divisor.ubrr));
            let speed = if divisor.double_speed { 1 << status_a::U2X } else { 0 };
            self.bus.write_byte(l.status_a, speed);
            self.bus.write_byte(l.control_c, config.frame_bits());

            let mut b = self.bus.read_byte(l.control_b);
            b |= (1 << control_b::RXEN) | (1 << control_b::TXEN) | (1 << control_b::RXCIE);
            b &= !((1 << control_b::UDRIE) | (1 << control_b::UCSZ2));
            self.bus.write_byte(l.control_b, b);

            self.written.borrow(cs).set(false);
        });

        info!(
            "serial: {=u32} baud (ubrr={=u16}, u2x={=bool})",
            config.baud_rate,
            divisor.ubrr,
            divisor.double_speed
        );
        Ok(())
    }

    /// Drain pending output, disable the port and drop unread input
    pub fn end(&self) {
        self.flush();
        let l = &self.layout;
        critical_section::with(|cs| {
            let mut b = self.bus.read_byte(l.control_b);
            b &= !((1 << control_b::RXEN)
                | (1 << control_b::TXEN)
                | (1 << control_b::RXCIE)
                | (1 << control_b::UDRIE));
            self.bus.write_byte(l.control_b, b);
            self.rx.borrow(cs).borrow_mut().clear();
        });
        info!("serial: disabled");
    }

    // ----------------------------------------------------------------------
    // Interrupt handlers
    // ----------------------------------------------------------------------

    /// Receive-complete interrupt handler body
    ///
    /// Reads the data register once and queues the byte, evicting the
    /// oldest unread byte if the receive buffer is full.
    pub fn on_receive_complete(&self) {
        critical_section::with(|cs| {
            let byte = self.bus.read_byte(self.layout.data);
            self.rx.borrow(cs).borrow_mut().add(byte);
        });
    }

    /// Data-register-empty interrupt handler body
    ///
    /// Sends the next queued byte, or masks this interrupt once the transmit
    /// buffer is drained so it does not keep firing.
    pub fn on_data_register_empty(&self) {
        critical_section::with(|cs| match self.tx.borrow(cs).borrow_mut().pop_oldest() {
            Some(byte) => self.transmit(byte),
            None => self
                .bus
                .write_bit(self.layout.control_b, control_b::UDRIE, false),
        });
    }

    /// Load the data register and clear the transmit-complete flag
    ///
    /// Must run inside a critical section.
    fn transmit(&self, byte: u8) {
        let l = &self.layout;
        self.bus.write_byte(l.data, byte);
        // TXC clears by writing one; keep the mode bits, zero the rest.
        let a = self.bus.read_byte(l.status_a);
        let keep = (1 << status_a::U2X) | (1 << status_a::MPCM);
        self.bus.write_byte(l.status_a, (a & keep) | (1 << status_a::TXC));
    }

    // ----------------------------------------------------------------------
    // Reading
    // ----------------------------------------------------------------------

    /// Number of received bytes waiting to be read
    pub fn available(&self) -> usize {
        critical_section::with(|cs| self.rx.borrow(cs).borrow().count())
    }

    /// Oldest received byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        critical_section::with(|cs| self.rx.borrow(cs).borrow().peek())
    }

    /// Take the oldest received byte
    ///
    /// `WouldBlock` means nothing has been received.
    pub fn read_byte(&self) -> nb::Result<u8, Infallible> {
        critical_section::with(|cs| self.rx.borrow(cs).borrow_mut().pop_oldest())
            .ok_or(nb::Error::WouldBlock)
    }

    /// Copy out whatever has been received, up to `buf.len()` bytes
    pub fn read_bytes(&self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte() {
                Ok(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                Err(_) => break,
            }
        }
        n
    }

    fn wait_for_input(&self) -> u8 {
        loop {
            if let Some(byte) = self.peek() {
                return byte;
            }
            core::hint::spin_loop();
        }
    }

    fn discard_input(&self) {
        critical_section::with(|cs| self.rx.borrow(cs).borrow_mut().remove_oldest());
    }

    /// Read a decimal integer
    ///
    /// Discards leading bytes as `mode` allows, then takes an optional `-`
    /// and every following digit. The first byte after the number is left
    /// unread. Returns 0 if no digit follows the lookahead.
    ///
    /// Blocks on every byte, including the one that ends the number, and
    /// never gives up: it only returns once a terminating byte arrives.
    pub fn parse_integer(&self, mode: LookaheadMode) -> i32 {
        while mode.skips(self.wait_for_input()) {
            self.discard_input();
        }

        let negative = self.wait_for_input() == b'-';
        if negative {
            self.discard_input();
        }

        let mut magnitude = 0u32;
        let mut any_digit = false;
        loop {
            let byte = self.wait_for_input();
            if !byte.is_ascii_digit() {
                break;
            }
            magnitude = parse::push_digit(magnitude, byte);
            any_digit = true;
            self.discard_input();
        }

        if any_digit {
            parse::signed(magnitude, negative)
        } else {
            0
        }
    }

    // ----------------------------------------------------------------------
    // Writing
    // ----------------------------------------------------------------------

    /// Free space in the transmit buffer
    pub fn available_for_write(&self) -> usize {
        critical_section::with(|cs| self.tx.borrow(cs).borrow().free_capacity())
    }

    /// Queue one byte for transmission
    ///
    /// Spins while the transmit buffer is full. If the data register is
    /// idle the oldest queued byte goes straight to the hardware instead of
    /// waiting for the interrupt. Returns the number of bytes written (1).
    pub fn write_byte(&self, byte: u8) -> usize {
        while self.available_for_write() == 0 {
            core::hint::spin_loop();
        }

        let l = &self.layout;
        critical_section::with(|cs| {
            let mut tx = self.tx.borrow(cs).borrow_mut();
            tx.add(byte);
            self.written.borrow(cs).set(true);

            if self.bus.read_bit(l.status_a, status_a::UDRE) {
                if let Some(next) = tx.pop_oldest() {
                    self.transmit(next);
                }
            }
            if !tx.is_empty() {
                self.bus.write_bit(l.control_b, control_b::UDRIE, true);
            }
        });
        1
    }

    /// Queue every byte of `bytes`
    pub fn write_bytes(&self, bytes: &[u8]) -> usize {
        bytes.iter().map(|&b| self.write_byte(b)).sum()
    }

    /// Queue a string
    pub fn write_str(&self, s: &str) -> usize {
        self.write_bytes(s.as_bytes())
    }

    /// Same as [`write_str`](Self::write_str)
    pub fn print_str(&self, s: &str) -> usize {
        self.write_str(s)
    }

    /// Print `value` as ASCII in `radix`
    pub fn print_integer(&self, value: i32, radix: Radix) -> usize {
        self.write_bytes(&format::render(value, radix))
    }

    /// Print `s` followed by CR LF
    pub fn print_line(&self, s: &str) -> usize {
        self.write_str(s) + self.write_bytes(LINE_END)
    }

    /// Print `value` in `radix` followed by CR LF
    pub fn print_line_integer(&self, value: i32, radix: Radix) -> usize {
        self.print_integer(value, radix) + self.write_bytes(LINE_END)
    }

    /// Wait until every queued byte has left the shift register
    ///
    /// Returns immediately if nothing was written since `begin`, since the
    /// transmit-complete flag would never be set.
    pub fn flush(&self) {
        if !critical_section::with(|cs| self.written.borrow(cs).get()) {
            return;
        }
        loop {
            let drained = critical_section::with(|cs| self.tx.borrow(cs).borrow().is_empty());
            if drained && self.bus.read_bit(self.layout.status_a, status_a::TXC) {
                return;
            }
            core::hint::spin_loop();
        }
    }

    /// `core::fmt::Write` and `ufmt::uWrite` adapter
    pub fn writer(&self) -> SerialWriter<'_, B, RX, TX> {
        SerialWriter { serial: self }
    }
}

/// Borrowed handle implementing [`core::fmt::Write`] and [`ufmt::uWrite`]
pub struct SerialWriter<'a, B, const RX: usize, const TX: usize> {
    serial: &'a Serial<B, RX, TX>,
}

impl<B: RegisterBus, const RX: usize, const TX: usize> fmt::Write for SerialWriter<'_, B, RX, TX> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.serial.write_str(s);
        Ok(())
    }
}

impl<B: RegisterBus, const RX: usize, const TX: usize> ufmt::uWrite for SerialWriter<'_, B, RX, TX> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.serial.write_str(s);
        Ok(())
    }
}
