//! Host model of one USART

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

use tinyhal_core::{Address, RegisterBus, RegisterFile};
use tinyhal_serial::layout::{control_b, status_a};
use tinyhal_serial::{Serial, USART0};

const IDLE: u8 = 0;
const LOADED: u8 = 1;
const SHIFTING: u8 = 2;
const COMPLETE: u8 = 3;

/// USART0 with a wire behind its data register
///
/// Reads of `UDR0` pop `incoming`, writes append to `wire`. `UDRE` reads
/// set unless the transmitter is held. `TXC` follows the hardware: a data
/// write starts a frame, writing one to `TXC` clears the flag, and the
/// next status read after that sees the frame finished.
pub struct FakeUsart {
    regs: RegisterFile,
    wire: Mutex<Vec<u8>>,
    incoming: Mutex<VecDeque<u8>>,
    hold: AtomicBool,
    frame: AtomicU8,
}

impl FakeUsart {
    pub const fn new() -> Self {
        Self {
            regs: RegisterFile::new(),
            wire: Mutex::new(Vec::new()),
            incoming: Mutex::new(VecDeque::new()),
            hold: AtomicBool::new(false),
            frame: AtomicU8::new(IDLE),
        }
    }

    /// Keep `UDRE` clear so every byte has to go through the buffer
    pub fn hold(&self, hold: bool) {
        self.hold.store(hold, Ordering::SeqCst);
    }

    /// Everything transmitted so far
    pub fn wire(&self) -> Vec<u8> {
        self.wire.lock().unwrap().clone()
    }

    pub fn raw(&self, addr: Address) -> u8 {
        self.regs.read_byte(addr)
    }

    /// Deliver bytes one receive interrupt at a time
    pub fn receive<const RX: usize, const TX: usize>(
        &self,
        serial: &Serial<&FakeUsart, RX, TX>,
        bytes: &[u8],
    ) {
        for &byte in bytes {
            self.incoming.lock().unwrap().push_back(byte);
            serial.on_receive_complete();
        }
    }

    /// Run the data-register-empty interrupt for as long as it is enabled
    pub fn drain<const RX: usize, const TX: usize>(&self, serial: &Serial<&FakeUsart, RX, TX>) {
        while self.regs.read_bit(USART0.control_b, control_b::UDRIE) {
            serial.on_data_register_empty();
        }
    }
}

impl RegisterBus for FakeUsart {
    fn read_byte(&self, addr: Address) -> u8 {
        if addr == USART0.data {
            return self.incoming.lock().unwrap().pop_front().unwrap_or(0);
        }
        if addr == USART0.status_a {
            let _ = self
                .frame
                .compare_exchange(SHIFTING, COMPLETE, Ordering::SeqCst, Ordering::SeqCst);
            let mut a = self.regs.read_byte(addr);
            if !self.hold.load(Ordering::SeqCst) {
                a |= 1 << status_a::UDRE;
            }
            if self.frame.load(Ordering::SeqCst) == COMPLETE {
                a |= 1 << status_a::TXC;
            }
            if !self.incoming.lock().unwrap().is_empty() {
                a |= 1 << status_a::RXC;
            }
            return a;
        }
        self.regs.read_byte(addr)
    }

    fn write_byte(&self, addr: Address, value: u8) {
        if addr == USART0.data {
            self.wire.lock().unwrap().push(value);
            self.frame.store(LOADED, Ordering::SeqCst);
            return;
        }
        if addr == USART0.status_a {
            if value & (1 << status_a::TXC) != 0 {
                let next = match self.frame.load(Ordering::SeqCst) {
                    LOADED => SHIFTING,
                    COMPLETE => IDLE,
                    other => other,
                };
                self.frame.store(next, Ordering::SeqCst);
            }
            let keep = (1 << status_a::U2X) | (1 << status_a::MPCM);
            self.regs.write_byte(addr, value & keep);
            return;
        }
        self.regs.write_byte(addr, value)
    }
}
