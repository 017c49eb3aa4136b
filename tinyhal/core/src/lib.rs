#![no_std]
#![deny(unsafe_code)]

//! # tinyhal core
//!
//! Register-level building blocks shared by the tinyhal crates: the error
//! type, bit helpers, the register access contract and the digital pin
//! capability traits.
//!
//! Everything above this crate (the circular buffer, the software clock and
//! the serial transport) talks to hardware exclusively through
//! [`RegisterBus`], so the same driver code runs against real memory-mapped
//! registers ([`Mmio`]) on the target and against a [`RegisterFile`] on the
//! host.

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod bits;
pub mod error;
pub mod pin;
pub mod register;

pub use bits::*;
pub use error::{HalError, HalResult};
pub use pin::{
    digital_read, digital_write, pin_mode, DigitalPin, DigitalRead, DigitalWrite, IoPin, PinMode,
};
pub use register::{Address, Mmio, RegisterBus, RegisterFile};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
