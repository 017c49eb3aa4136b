#![no_std]
#![forbid(unsafe_code)]

//! # tinyhal serial
//!
//! Buffered USART transport. Two interrupt handlers and the caller-facing
//! API hand bytes to each other through a pair of overwriting ring buffers:
//!
//! - receive-complete handler → receive buffer → [`Serial::read_byte`] and friends
//! - [`Serial::write_byte`] and friends → transmit buffer → data-register-empty handler
//!
//! Every buffer add or remove happens inside a critical section, which makes
//! it the atomic unit in which a byte changes owner.
//!
//! Blocking operations ([`Serial::write_byte`] on a full buffer,
//! [`Serial::parse_integer`], [`Serial::flush`]) spin with no timeout and
//! never return if the interrupt side stalls. Wrap the non-blocking
//! primitives with a deadline (see `tinyhal_clock::block_until`) where
//! bounded latency matters.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tinyhal_core::Mmio;
//! use tinyhal_serial::{Radix, Serial, SerialConfig, USART0};
//!
//! static SERIAL: Serial<Mmio> = Serial::new(unsafe { Mmio::steal() }, USART0, 16_000_000);
//!
//! // USART_RX interrupt handler
//! fn usart_rx() {
//!     SERIAL.on_receive_complete();
//! }
//!
//! // USART_UDRE interrupt handler
//! fn usart_udre() {
//!     SERIAL.on_data_register_empty();
//! }
//!
//! SERIAL.begin(&SerialConfig::default()).unwrap();
//! SERIAL.print_line("ready");
//! SERIAL.print_line_integer(-42, Radix::Dec);
//! ```

pub mod config;
pub mod format;
pub mod layout;
pub mod parse;
pub mod serial;

pub use config::{BaudDivisor, DataBits, Parity, SerialConfig, StopBits};
pub use format::Radix;
pub use layout::{UsartLayout, USART0};
pub use parse::LookaheadMode;
pub use serial::{Serial, SerialWriter, DEFAULT_BUFFER_SIZE};
