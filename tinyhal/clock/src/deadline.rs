//! Caller-side timeouts
//!
//! The drivers never time out on their own. A [`Deadline`] lets a caller
//! bound any non-blocking primitive from the outside by polling it until it
//! either succeeds or the clock says time is up.

use tinyhal_core::{HalError, HalResult};

use crate::clock::{micros_pending, TimeSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Millis,
    Micros,
}

/// Point in time a wait must not outlast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: u32,
    duration: u32,
    unit: Unit,
}

impl Deadline {
    /// Deadline `ms` milliseconds from now
    pub fn after_millis<C: TimeSource + ?Sized>(clock: &C, ms: u32) -> Self {
        Self {
            start: clock.millis(),
            duration: ms,
            unit: Unit::Millis,
        }
    }

    /// Deadline `us` microseconds from now
    ///
    /// Durations are capped at `i32::MAX` microseconds (about 35 minutes).
    pub fn after_micros<C: TimeSource + ?Sized>(clock: &C, us: u32) -> Self {
        Self {
            start: clock.micros(),
            duration: us.min(i32::MAX as u32),
            unit: Unit::Micros,
        }
    }

    fn elapsed<C: TimeSource + ?Sized>(&self, clock: &C) -> u32 {
        let now = match self.unit {
            Unit::Millis => clock.millis(),
            Unit::Micros => clock.micros(),
        };
        now.wrapping_sub(self.start)
    }

    /// Whether the deadline has passed
    pub fn is_expired<C: TimeSource + ?Sized>(&self, clock: &C) -> bool {
        let elapsed = self.elapsed(clock);
        match self.unit {
            Unit::Millis => elapsed >= self.duration,
            Unit::Micros => !micros_pending(elapsed, self.duration),
        }
    }

    /// Time left, in the unit the deadline was created with
    pub fn remaining<C: TimeSource + ?Sized>(&self, clock: &C) -> u32 {
        let elapsed = self.elapsed(clock);
        match self.unit {
            Unit::Micros if (elapsed as i32) < 0 => self.duration,
            _ => self.duration.saturating_sub(elapsed),
        }
    }
}

/// Poll `op` until it completes or `deadline` expires
///
/// `op` is always tried at least once, so an operation that is ready
/// immediately succeeds even with an already expired deadline.
pub fn block_until<C, T, E, F>(clock: &C, deadline: &Deadline, mut op: F) -> HalResult<T>
where
    C: TimeSource + ?Sized,
    E: Into<HalError>,
    F: FnMut() -> nb::Result<T, E>,
{
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(nb::Error::Other(e)) => return Err(e.into()),
            Err(nb::Error::WouldBlock) => {
                if deadline.is_expired(clock) {
                    return Err(HalError::Timeout);
                }
                core::hint::spin_loop();
            }
        }
    }
}
