//! Register access contract
//!
//! Peripheral registers are opaque byte cells at fixed data-space addresses.
//! Every access is a fresh load or store; nothing here caches a register
//! value, so a read issued after an interrupt always observes what the
//! handler left behind.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::bits::{bit_read, bit_write};

/// Data-space address of an 8-bit register
pub type Address = usize;

/// Byte-wide register access
///
/// Implementations must give volatile semantics: one call, one bus access.
pub trait RegisterBus {
    /// Load the register at `addr`
    fn read_byte(&self, addr: Address) -> u8;

    /// Store `value` into the register at `addr`
    fn write_byte(&self, addr: Address, value: u8);

    /// Read a single bit of the register at `addr`
    fn read_bit(&self, addr: Address, pos: u8) -> bool {
        bit_read(self.read_byte(addr), pos)
    }

    /// Read-modify-write a single bit of the register at `addr`
    ///
    /// Not atomic with respect to interrupt handlers touching the same
    /// register; callers sharing a register with a handler must hold a
    /// critical section.
    fn write_bit(&self, addr: Address, pos: u8, value: bool) {
        let current = self.read_byte(addr);
        self.write_byte(addr, bit_write(current, pos, value));
    }

    /// Read a little-endian 16-bit register pair, low byte first
    ///
    /// On AVR reading the low byte latches the high byte into the shared
    /// TEMP register, so the order matters.
    fn read_word(&self, addr: Address) -> u16 {
        let low = self.read_byte(addr) as u16;
        let high = self.read_byte(addr + 1) as u16;
        low | (high << 8)
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for &T {
    fn read_byte(&self, addr: Address) -> u8 {
        (**self).read_byte(addr)
    }

    fn write_byte(&self, addr: Address, value: u8) {
        (**self).write_byte(addr, value)
    }
}

/// Memory-mapped register access for the real target
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

#[allow(unsafe_code)]
impl Mmio {
    /// Obtain the memory-mapped bus
    ///
    /// # Safety
    ///
    /// Every address later passed to this bus must be a valid peripheral
    /// register of the running MCU.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

#[allow(unsafe_code)]
impl RegisterBus for Mmio {
    #[inline]
    fn read_byte(&self, addr: Address) -> u8 {
        // SAFETY: `Mmio::steal` obliges the caller to only use valid
        // register addresses.
        unsafe { core::ptr::read_volatile(addr as *const u8) }
    }

    #[inline]
    fn write_byte(&self, addr: Address, value: u8) {
        // SAFETY: see `read_byte`.
        unsafe { core::ptr::write_volatile(addr as *mut u8, value) }
    }
}

/// Number of cells in a [`RegisterFile`]
pub const REGISTER_FILE_SIZE: usize = 256;

/// Host-side register file
///
/// Models the AVR I/O and extended I/O space (`0x00..=0xFF`) as plain
/// memory cells. Useful for simulation and tests; it has none of the
/// side effects real peripherals attach to reads and writes.
pub struct RegisterFile {
    cells: [AtomicU8; REGISTER_FILE_SIZE],
}

impl RegisterFile {
    /// Create a register file with every cell cleared
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const ZERO: AtomicU8 = AtomicU8::new(0);
        Self {
            cells: [ZERO; REGISTER_FILE_SIZE],
        }
    }

    fn cell(&self, addr: Address) -> &AtomicU8 {
        assert!(
            addr < REGISTER_FILE_SIZE,
            "register address {:#x} outside register file",
            addr
        );
        &self.cells[addr]
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for RegisterFile {
    fn read_byte(&self, addr: Address) -> u8 {
        self.cell(addr).load(Ordering::SeqCst)
    }

    fn write_byte(&self, addr: Address, value: u8) {
        self.cell(addr).store(value, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_file_bits() {
        let regs = RegisterFile::new();
        regs.write_bit(0x25, 3, true);
        assert_eq!(regs.read_byte(0x25), 0b0000_1000);
        assert!(regs.read_bit(0x25, 3));

        regs.write_bit(0x25, 0, true);
        regs.write_bit(0x25, 3, false);
        assert_eq!(regs.read_byte(0x25), 0b0000_0001);
    }

    #[test]
    fn test_read_word_little_endian() {
        let regs = RegisterFile::new();
        regs.write_byte(0x78, 0x34);
        regs.write_byte(0x79, 0x12);
        assert_eq!(regs.read_word(0x78), 0x1234);
    }

    #[test]
    fn test_bus_by_reference() {
        let regs = RegisterFile::new();
        let bus: &RegisterFile = &regs;
        bus.write_byte(0xC6, b'A');
        assert_eq!(regs.read_byte(0xC6), b'A');
    }

    #[test]
    #[allow(unsafe_code)]
    fn test_mmio_is_a_plain_handle() {
        // SAFETY: never dereferenced on the host.
        let bus = unsafe { Mmio::steal() };
        let copy = bus;
        assert_eq!(core::mem::size_of_val(&copy), 0);
    }

    #[test]
    #[should_panic(expected = "outside register file")]
    fn test_out_of_range_address() {
        let regs = RegisterFile::new();
        regs.read_byte(0x100);
    }
}
