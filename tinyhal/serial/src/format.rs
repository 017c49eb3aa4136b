//! Integer to ASCII rendering

use heapless::Vec;

/// Output base for printed integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Radix {
    Bin = 2,
    Oct = 8,
    Dec = 10,
    Hex = 16,
}

/// Longest rendering: 32 binary digits, or a sign plus 10 decimal digits
pub const MAX_RENDERED_LEN: usize = 32;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Render `value` as ASCII in `radix`
///
/// Only decimal output is signed. Other bases print the two's complement
/// bit pattern, so `-1` in hex is `ffffffff`.
pub fn render(value: i32, radix: Radix) -> Vec<u8, MAX_RENDERED_LEN> {
    let base = radix as u32;
    let negative = radix == Radix::Dec && value < 0;
    let mut n = if negative {
        value.unsigned_abs()
    } else {
        value as u32
    };

    let mut out: Vec<u8, MAX_RENDERED_LEN> = Vec::new();
    loop {
        // At most 32 digits, which is exactly the capacity.
        let _ = out.push(DIGITS[(n % base) as usize]);
        n /= base;
        if n == 0 {
            break;
        }
    }
    if negative {
        let _ = out.push(b'-');
    }
    out.reverse();
    out
}
