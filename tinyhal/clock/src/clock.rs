//! Software clock driven by the timer overflow interrupt

use core::cell::Cell;

use critical_section::Mutex;
use tinyhal_core::{debug, warn, HalError, HalResult, RegisterBus};

use crate::config::TickRate;
use crate::layout::{CounterWidth, TimerLayout, CLOCK_SELECT_MASK};

/// Anything that can tell the time
///
/// Readings are free-running 32-bit counters that wrap.
pub trait TimeSource {
    /// Milliseconds since the clock started
    fn millis(&self) -> u32;

    /// Microseconds since the clock started
    fn micros(&self) -> u32;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn millis(&self) -> u32 {
        (**self).millis()
    }

    fn micros(&self) -> u32 {
        (**self).micros()
    }
}

/// Longest stretch `delay_us` measures in one go
const MAX_WAIT_US: u32 = 1 << 30;

/// Whether a microsecond wait of `duration` is still running after
/// `elapsed`
///
/// Elapsed values in the upper half of the range are readings slightly
/// behind the start, not waits of more than 35 minutes, and count as zero.
pub(crate) const fn micros_pending(elapsed: u32, duration: u32) -> bool {
    (elapsed as i32) < 0 || elapsed < duration
}

/// State written by the overflow handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ClockState {
    millis: u32,
    fraction: u32,
    overflows: u32,
}

impl ClockState {
    const fn new() -> Self {
        Self {
            millis: 0,
            fraction: 0,
            overflows: 0,
        }
    }

    fn advance(&mut self, rate: &TickRate) {
        self.millis = self.millis.wrapping_add(rate.whole_millis);
        self.fraction += rate.fract_inc;
        if self.fraction >= rate.fract_max {
            self.fraction -= rate.fract_max;
            self.millis = self.millis.wrapping_add(1);
        }
        self.overflows = self.overflows.wrapping_add(1);
    }
}

/// Free-running software clock
///
/// There is one per program, shared between the timer overflow handler
/// (the only writer) and any number of readers. Keep it in a `static` and
/// call [`on_overflow`](Self::on_overflow) from the handler.
pub struct Clock<B> {
    bus: B,
    layout: TimerLayout,
    rate: TickRate,
    state: Mutex<Cell<ClockState>>,
}

impl<B: RegisterBus> Clock<B> {
    /// Create a stopped clock reading zero
    pub const fn new(bus: B, layout: TimerLayout, rate: TickRate) -> Self {
        Self {
            bus,
            layout,
            rate,
            state: Mutex::new(Cell::new(ClockState::new())),
        }
    }

    /// Conversion constants in use
    pub const fn rate(&self) -> &TickRate {
        &self.rate
    }

    /// Program the prescaler and enable the overflow interrupt
    ///
    /// Fails with [`HalError::ConfigurationError`] if the tick rate was
    /// derived for a longer counter period than the timer can count.
    pub fn start(&self) -> HalResult<()> {
        if self.rate.counter_period > self.layout.max_period() {
            warn!(
                "clock: period {=u32} exceeds counter range {=u32}",
                self.rate.counter_period,
                self.layout.max_period()
            );
            return Err(HalError::ConfigurationError);
        }
        critical_section::with(|_| {
            let control = self.bus.read_byte(self.layout.control_b);
            self.bus.write_byte(
                self.layout.control_b,
                (control & !CLOCK_SELECT_MASK) | self.rate.clock_select,
            );
            self.bus
                .write_bit(self.layout.interrupt_mask, self.layout.overflow_enable, true);
        });
        debug!("clock started, cs={=u8}", self.rate.clock_select);
        Ok(())
    }

    /// Disable the overflow interrupt; the clock stops advancing
    pub fn stop(&self) {
        critical_section::with(|_| {
            self.bus
                .write_bit(self.layout.interrupt_mask, self.layout.overflow_enable, false);
        });
    }

    /// Overflow interrupt handler body
    ///
    /// Fixed, short and allocation free. Inside a handler interrupts are
    /// already masked, so the critical section only hands out the token.
    pub fn on_overflow(&self) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            state.advance(&self.rate);
            cell.set(state);
        });
    }

    fn snapshot(&self) -> ClockState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Milliseconds since start, wrapping at 2^32
    pub fn millis(&self) -> u32 {
        self.snapshot().millis
    }

    /// Number of overflow interrupts seen, wrapping at 2^32
    pub fn overflow_count(&self) -> u32 {
        self.snapshot().overflows
    }

    /// Microseconds since start, wrapping at 2^32
    ///
    /// Samples the overflow count, the live counter and the pending
    /// overflow flag together. A counter that has already wrapped while the
    /// handler is still pending counts one more overflow, so readings never
    /// step back by a whole period. The counter keeps running during the
    /// sample, which leaves an error of at most one count.
    pub fn micros(&self) -> u32 {
        let (overflows, counter) = critical_section::with(|cs| {
            let overflows = self.state.borrow(cs).get().overflows;
            let counter = self.read_counter();
            let pending = self
                .bus
                .read_bit(self.layout.interrupt_flags, self.layout.overflow_pending);
            // A flag seen next to the top count belongs to the wrap still ahead.
            if pending && (counter as u32) < self.rate.counter_period - 1 {
                (overflows.wrapping_add(1), counter)
            } else {
                (overflows, counter)
            }
        });
        self.rate.counts_to_micros(overflows, counter)
    }

    fn read_counter(&self) -> u16 {
        match self.layout.width {
            CounterWidth::Eight => self.bus.read_byte(self.layout.counter) as u16,
            CounterWidth::Sixteen => self.bus.read_word(self.layout.counter),
        }
    }

    /// Busy-wait for `ms` milliseconds
    ///
    /// Returns only if the overflow interrupt keeps running.
    pub fn delay_ms(&self, ms: u32) {
        let start = self.millis();
        while self.millis().wrapping_sub(start) < ms {
            core::hint::spin_loop();
        }
    }

    /// Busy-wait for `us` microseconds
    ///
    /// The elapsed time is measured with wrap-safe subtraction, so a wait
    /// spanning a 32-bit wrap of `micros()` ends on time, and a reading
    /// that lands just behind the start keeps the wait going instead of
    /// ending it. Long waits are measured in stretches of 2^30 us.
    pub fn delay_us(&self, us: u32) {
        let mut left = us;
        while left > 0 {
            let stretch = left.min(MAX_WAIT_US);
            let start = self.micros();
            while micros_pending(self.micros().wrapping_sub(start), stretch) {
                core::hint::spin_loop();
            }
            left -= stretch;
        }
    }
}

impl<B: RegisterBus> TimeSource for Clock<B> {
    fn millis(&self) -> u32 {
        Clock::millis(self)
    }

    fn micros(&self) -> u32 {
        Clock::micros(self)
    }
}

impl<B: RegisterBus> embedded_hal::delay::DelayNs for &Clock<B> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        Clock::delay_us(self, us);
    }

    fn delay_ms(&mut self, ms: u32) {
        Clock::delay_ms(self, ms);
    }
}
