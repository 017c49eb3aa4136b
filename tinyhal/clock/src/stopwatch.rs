//! Elapsed-time accumulator on top of a [`TimeSource`]

use crate::clock::TimeSource;

/// Unit the stopwatch counts in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Microseconds, sampled from `micros()`
    Micros,
    /// Milliseconds, sampled from `millis()`
    Millis,
    /// Whole seconds, sampled from `millis()`
    Seconds,
}

/// Integer type a [`Stopwatch`] accumulates into
pub trait Accumulator: Copy + Default {
    /// Add a 32-bit delta, wrapping on overflow
    fn accumulate(self, delta: u32) -> Self;
}

impl Accumulator for u32 {
    fn accumulate(self, delta: u32) -> Self {
        self.wrapping_add(delta)
    }
}

impl Accumulator for u64 {
    fn accumulate(self, delta: u32) -> Self {
        self.wrapping_add(delta as u64)
    }
}

/// Start/stop elapsed-time counter
///
/// Elapsed time is folded in on every [`poll`](Self::poll) (and every
/// [`elapsed`](Self::elapsed)). A delta is only correct if it spans less
/// than one wrap of the sampled clock, so poll at least once every ~35
/// minutes at [`Resolution::Micros`] and every ~49 days otherwise. A
/// microsecond reading behind the last sample is skipped.
#[derive(Debug)]
pub struct Stopwatch<'a, C: ?Sized, T = u32> {
    clock: &'a C,
    elapsed: T,
    last: u32,
    resolution: Resolution,
    running: bool,
}

impl<'a, C: TimeSource + ?Sized, T: Accumulator> Stopwatch<'a, C, T> {
    /// Create a stopped stopwatch reading zero
    pub fn new(clock: &'a C, resolution: Resolution) -> Self {
        Self {
            clock,
            elapsed: T::default(),
            last: 0,
            resolution,
            running: false,
        }
    }

    fn now(&self) -> u32 {
        match self.resolution {
            Resolution::Micros => self.clock.micros(),
            Resolution::Millis | Resolution::Seconds => self.clock.millis(),
        }
    }

    /// Start (or resume) counting from now
    pub fn start(&mut self) {
        self.running = true;
        self.last = self.now();
    }

    /// Freeze the accumulated time
    ///
    /// Time since the last poll is discarded; call
    /// [`elapsed`](Self::elapsed) first to keep it.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the stopwatch is counting
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Configured resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Fold the time since the last sample into the accumulator
    pub fn poll(&mut self) {
        if !self.running {
            return;
        }
        let now = self.now();
        let delta = now.wrapping_sub(self.last);
        match self.resolution {
            Resolution::Seconds => {
                let secs = delta / 1_000;
                if secs == 0 {
                    return;
                }
                // Keep the sub-second remainder for the next poll.
                self.last = self.last.wrapping_add(secs * 1_000);
                self.elapsed = self.elapsed.accumulate(secs);
            }
            Resolution::Micros if (delta as i32) < 0 => {}
            Resolution::Micros | Resolution::Millis => {
                self.last = now;
                self.elapsed = self.elapsed.accumulate(delta);
            }
        }
    }

    /// Accumulated time in the configured unit, as of this call
    pub fn elapsed(&mut self) -> T {
        self.poll();
        self.elapsed
    }

    /// Zero the accumulator and restart sampling from now
    pub fn reset(&mut self) {
        self.elapsed = T::default();
        self.last = self.now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[derive(Default)]
    struct ManualClock {
        ms: Cell<u32>,
        us: Cell<u32>,
    }

    impl ManualClock {
        fn advance_ms(&self, ms: u32) {
            self.ms.set(self.ms.get().wrapping_add(ms));
            self.us.set(self.us.get().wrapping_add(ms.wrapping_mul(1_000)));
        }
    }

    impl TimeSource for ManualClock {
        fn millis(&self) -> u32 {
            self.ms.get()
        }

        fn micros(&self) -> u32 {
            self.us.get()
        }
    }

    #[test]
    fn test_initially_stopped() {
        let clock = ManualClock::default();
        let mut sw: Stopwatch<_> = Stopwatch::new(&clock, Resolution::Millis);
        assert!(!sw.is_running());
        clock.advance_ms(50);
        assert_eq!(sw.elapsed(), 0);
    }

    #[test]
    fn test_millis_accumulate() {
        let clock = ManualClock::default();
        let mut sw: Stopwatch<_> = Stopwatch::new(&clock, Resolution::Millis);
        sw.start();
        clock.advance_ms(30);
        sw.poll();
        clock.advance_ms(12);
        assert_eq!(sw.elapsed(), 42);
    }

    #[test]
    fn test_frozen_while_stopped() {
        let clock = ManualClock::default();
        let mut sw: Stopwatch<_> = Stopwatch::new(&clock, Resolution::Millis);
        sw.start();
        clock.advance_ms(10);
        let at_stop = sw.elapsed();
        sw.stop();
        clock.advance_ms(500);
        assert_eq!(sw.elapsed(), at_stop);
        assert_eq!(sw.elapsed(), at_stop);
    }

    #[test]
    fn test_reset_zeroes() {
        let clock = ManualClock::default();
        let mut sw: Stopwatch<_> = Stopwatch::new(&clock, Resolution::Millis);
        sw.start();
        clock.advance_ms(99);
        sw.reset();
        assert_eq!(sw.elapsed(), 0);
        clock.advance_ms(1);
        assert_eq!(sw.elapsed(), 1);
    }

    #[test]
    fn test_wrap_compensation() {
        let clock = ManualClock::default();
        clock.ms.set(u32::MAX - 4);
        let mut sw: Stopwatch<_, u64> = Stopwatch::new(&clock, Resolution::Millis);
        sw.start();
        clock.advance_ms(10);
        assert_eq!(sw.elapsed(), 10);
    }

    #[test]
    fn test_seconds_carry_remainder() {
        let clock = ManualClock::default();
        let mut sw: Stopwatch<_> = Stopwatch::new(&clock, Resolution::Seconds);
        sw.start();
        clock.advance_ms(700);
        assert_eq!(sw.elapsed(), 0);
        clock.advance_ms(700);
        assert_eq!(sw.elapsed(), 1);
        clock.advance_ms(700);
        // 2100 ms total, the 100 ms remainder is still pending
        assert_eq!(sw.elapsed(), 2);
        clock.advance_ms(900);
        assert_eq!(sw.elapsed(), 3);
    }

    #[test]
    fn test_micros_resolution() {
        let clock = ManualClock::default();
        let mut sw: Stopwatch<_> = Stopwatch::new(&clock, Resolution::Micros);
        sw.start();
        clock.advance_ms(3);
        assert_eq!(sw.elapsed(), 3_000);
        assert_eq!(sw.resolution(), Resolution::Micros);
    }

    #[test]
    fn test_micros_reading_behind_last_sample_is_skipped() {
        let clock = ManualClock::default();
        clock.us.set(10_000);
        let mut sw: Stopwatch<_> = Stopwatch::new(&clock, Resolution::Micros);
        sw.start();
        clock.us.set(9_996);
        assert_eq!(sw.elapsed(), 0);
        clock.us.set(10_020);
        assert_eq!(sw.elapsed(), 20);
    }
}
