//! Bit manipulation helpers
//!
//! Pure functions on register-sized integers. Bit positions are counted
//! from the least significant bit.

/// Mask with only bit `n` set
#[inline]
pub const fn bit(n: u8) -> u32 {
    1u32 << n
}

/// `x` with bit `n` cleared
#[inline]
pub const fn bit_clear(x: u8, n: u8) -> u8 {
    x & !(1u8 << n)
}

/// `x` with bit `n` set
#[inline]
pub const fn bit_set(x: u8, n: u8) -> u8 {
    x | (1u8 << n)
}

/// Whether bit `n` of `x` is set
#[inline]
pub const fn bit_read(x: u8, n: u8) -> bool {
    x & (1u8 << n) != 0
}

/// `x` with bit `n` forced to `value`
#[inline]
pub const fn bit_write(x: u8, n: u8, value: bool) -> u8 {
    if value {
        bit_set(x, n)
    } else {
        bit_clear(x, n)
    }
}

/// Least significant byte of `x`
#[inline]
pub const fn low_byte(x: u16) -> u8 {
    (x & 0xff) as u8
}

/// Second least significant byte of `x`
#[inline]
pub const fn high_byte(x: u16) -> u8 {
    (x >> 8) as u8
}
