#![no_std]
#![forbid(unsafe_code)]

//! # tinyhal clock
//!
//! A free-running software clock advanced by a hardware timer overflow
//! interrupt, plus the client-side helpers built on it.
//!
//! - [`Clock`]: millisecond and microsecond time, busy-wait delays
//! - [`TickRate`]: exact rate conversion from timer overflows to milliseconds
//! - [`Stopwatch`]: wrap-compensating elapsed time accumulator
//! - [`Deadline`] / [`block_until`]: caller-composed timeouts around
//!   non-blocking operations
//!
//! All readings are 32-bit and wrap. Compute durations with
//! `later.wrapping_sub(earlier)`, never by comparing two readings.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tinyhal_clock::{Clock, ClockConfig, TickRate, TIMER0};
//! use tinyhal_core::Mmio;
//!
//! const RATE: TickRate = TickRate::new(ClockConfig::DEFAULT);
//! static CLOCK: Clock<Mmio> = Clock::new(unsafe { Mmio::steal() }, TIMER0, RATE);
//!
//! // In the TIMER0_OVF interrupt handler:
//! fn timer0_ovf() {
//!     CLOCK.on_overflow();
//! }
//!
//! CLOCK.start().unwrap();
//! CLOCK.delay_ms(250);
//! ```

pub mod clock;
pub mod config;
pub mod deadline;
pub mod layout;
pub mod stopwatch;

pub use clock::{Clock, TimeSource};
pub use config::{ClockConfig, TickRate};
pub use deadline::{block_until, Deadline};
pub use layout::{CounterWidth, TimerLayout, TIMER0};
pub use stopwatch::{Accumulator, Resolution, Stopwatch};
