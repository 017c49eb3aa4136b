//! Timer configuration and overflow-to-time conversion

use tinyhal_core::{HalError, HalResult};

/// Hardware timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// CPU clock in Hz
    pub cpu_hz: u32,
    /// Timer prescaler (1, 8, 64, 256 or 1024)
    pub prescaler: u16,
    /// Counts per overflow: 256 for an 8-bit counter, 65536 for 16-bit
    pub counter_period: u32,
}

impl ClockConfig {
    /// 16 MHz CPU, timer 0 at clk/64: one overflow every 1.024 ms
    pub const DEFAULT: Self = Self::new(16_000_000, 64, 256);

    /// Create a configuration
    pub const fn new(cpu_hz: u32, prescaler: u16, counter_period: u32) -> Self {
        Self {
            cpu_hz,
            prescaler,
            counter_period,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Clock-select bits for a supported prescaler
pub const fn clock_select_bits(prescaler: u16) -> Option<u8> {
    match prescaler {
        1 => Some(0b001),
        8 => Some(0b010),
        64 => Some(0b011),
        256 => Some(0b100),
        1024 => Some(0b101),
        _ => None,
    }
}

/// Conversion constants derived from a [`ClockConfig`]
///
/// One overflow lasts `whole_millis + fract_inc / fract_max` milliseconds
/// with the fraction in lowest terms. The overflow handler adds
/// `whole_millis` to the millisecond counter and `fract_inc` to a
/// fractional accumulator; whenever the accumulator reaches `fract_max` one
/// more millisecond is carried over. Since the ratio is exact the counter
/// equals `floor(overflows * ms_per_overflow)` forever and never drifts.
///
/// A counter tick lasts `micros_num / micros_den` microseconds, also in
/// lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate {
    pub(crate) whole_millis: u32,
    pub(crate) fract_inc: u32,
    pub(crate) fract_max: u32,
    pub(crate) micros_num: u32,
    pub(crate) micros_den: u32,
    pub(crate) counter_period: u32,
    pub(crate) clock_select: u8,
}

impl TickRate {
    /// Derive conversion constants, rejecting configurations the timer or
    /// the arithmetic cannot represent
    pub const fn try_new(config: ClockConfig) -> HalResult<Self> {
        let clock_select = match clock_select_bits(config.prescaler) {
            Some(bits) => bits,
            None => return Err(HalError::UnsupportedPrescaler(config.prescaler)),
        };
        if config.cpu_hz == 0 || config.counter_period == 0 || config.counter_period > 65_536 {
            return Err(HalError::InvalidParameter);
        }

        // Milliseconds per overflow as a reduced fraction.
        let num = config.prescaler as u64 * config.counter_period as u64 * 1_000;
        let den = config.cpu_hz as u64;
        let g = gcd(num, den);
        let (num, den) = (num / g, den / g);
        let whole = num / den;
        // The accumulator briefly holds up to 2 * fract_max - 1.
        if whole > u32::MAX as u64 || den > (u32::MAX / 2) as u64 {
            return Err(HalError::ConfigurationError);
        }

        // Microseconds per counter tick as a reduced fraction.
        let us_num = config.prescaler as u64 * 1_000_000;
        let g = gcd(us_num, config.cpu_hz as u64);
        let (us_num, us_den) = (us_num / g, config.cpu_hz as u64 / g);
        // counts_to_micros multiplies a value below us_den << 32 by us_num.
        if us_num * us_den > u32::MAX as u64 {
            return Err(HalError::ConfigurationError);
        }

        Ok(Self {
            whole_millis: whole as u32,
            fract_inc: (num % den) as u32,
            fract_max: den as u32,
            micros_num: us_num as u32,
            micros_den: us_den as u32,
            counter_period: config.counter_period,
            clock_select,
        })
    }

    /// Derive conversion constants for a configuration known to be valid
    ///
    /// # Panics
    ///
    /// Panics if [`try_new`](Self::try_new) rejects the configuration. In a
    /// `const` item that is a compile error.
    pub const fn new(config: ClockConfig) -> Self {
        match Self::try_new(config) {
            Ok(rate) => rate,
            Err(_) => panic!("unsupported clock configuration"),
        }
    }

    /// Whole milliseconds added per overflow
    pub const fn whole_millis(&self) -> u32 {
        self.whole_millis
    }

    /// Fractional increment per overflow, in units of `1 / fract_max` ms
    pub const fn fract_inc(&self) -> u32 {
        self.fract_inc
    }

    /// Fraction denominator
    pub const fn fract_max(&self) -> u32 {
        self.fract_max
    }

    /// Counts per overflow
    pub const fn counter_period(&self) -> u32 {
        self.counter_period
    }

    /// Convert an overflow count and a live counter value to microseconds
    ///
    /// `time = (overflows * counter_period + counter) * us_per_count`,
    /// truncated to 32 bits. When a count lasts a whole number of
    /// microseconds the result wraps cleanly at 2^32; otherwise there is one
    /// extra discontinuity when the overflow counter itself wraps.
    pub fn counts_to_micros(&self, overflows: u32, counter: u16) -> u32 {
        let counts = overflows as u64 * self.counter_period as u64 + counter as u64;
        // floor(c * n / d) mod 2^32 only depends on c mod (d << 32).
        let counts = counts % ((self.micros_den as u64) << 32);
        (counts * self.micros_num as u64 / self.micros_den as u64) as u32
    }
}
