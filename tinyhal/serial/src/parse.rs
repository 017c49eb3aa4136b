//! Lookahead rules for integer parsing

/// Which leading bytes `parse_integer` throws away before the number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookaheadMode {
    /// Skip everything that is not a digit or a minus sign
    #[default]
    SkipAll,
    /// Skip nothing; a non-numeric first byte yields 0
    SkipNone,
    /// Skip spaces, tabs, CR and LF only
    SkipWhitespace,
}

impl LookaheadMode {
    /// Whether `byte` is discarded while looking for the number
    pub fn skips(self, byte: u8) -> bool {
        if byte.is_ascii_digit() || byte == b'-' {
            return false;
        }
        match self {
            Self::SkipAll => true,
            Self::SkipNone => false,
            Self::SkipWhitespace => matches!(byte, b' ' | b'\t' | b'\r' | b'\n'),
        }
    }
}

/// Fold one decimal digit into a magnitude
///
/// Wrapping, so `2147483648` survives to be negated into `i32::MIN`.
pub(crate) fn push_digit(magnitude: u32, digit: u8) -> u32 {
    magnitude.wrapping_mul(10).wrapping_add((digit - b'0') as u32)
}

/// Apply the sign to an accumulated magnitude
pub(crate) fn signed(magnitude: u32, negative: bool) -> i32 {
    let value = magnitude as i32;
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
