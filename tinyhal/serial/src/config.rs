//! Serial configuration: frame format and baud divisor

use tinyhal_core::{HalError, HalResult};

use crate::layout::control_c::{UCSZ0, UPM0, USBS};

/// UART data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// UART stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// UART parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// UART configuration, applied once by `Serial::begin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// Prefer double-speed (U2X) mode for a finer divisor
    pub double_speed: bool,
}

impl SerialConfig {
    /// 8N1 at the given baud rate
    pub const fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            double_speed: true,
        }
    }

    /// Frame format byte for `UCSRnC` (asynchronous mode)
    pub const fn frame_bits(&self) -> u8 {
        let size = match self.data_bits {
            DataBits::Five => 0b00,
            DataBits::Six => 0b01,
            DataBits::Seven => 0b10,
            DataBits::Eight => 0b11,
        };
        let parity = match self.parity {
            Parity::None => 0b00,
            Parity::Even => 0b10,
            Parity::Odd => 0b11,
        };
        let stop = match self.stop_bits {
            StopBits::One => 0,
            StopBits::Two => 1,
        };
        (parity << UPM0) | (stop << USBS) | (size << UCSZ0)
    }

    /// Baud divisor for a CPU running at `cpu_hz`
    ///
    /// Tries double-speed mode first when enabled and falls back to normal
    /// speed if the divisor does not fit in 12 bits.
    pub fn divisor(&self, cpu_hz: u32) -> HalResult<BaudDivisor> {
        if self.baud_rate == 0 || cpu_hz == 0 {
            return Err(HalError::InvalidParameter);
        }
        if self.double_speed {
            if let Some(ubrr) = ubrr(cpu_hz / 4 / self.baud_rate) {
                return Ok(BaudDivisor {
                    ubrr,
                    double_speed: true,
                });
            }
        }
        ubrr(cpu_hz / 8 / self.baud_rate)
            .map(|ubrr| BaudDivisor {
                ubrr,
                double_speed: false,
            })
            .ok_or(HalError::BaudRateOutOfRange(self.baud_rate))
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(9_600)
    }
}

/// Largest value the 12-bit `UBRRn` register holds
pub const UBRR_MAX: u32 = 0x0FFF;

/// Rounded divisor from `cpu_hz / (4 or 8) / baud`, i.e. twice the exact ratio
fn ubrr(twice_ratio: u32) -> Option<u16> {
    if twice_ratio == 0 {
        return None;
    }
    let ubrr = (twice_ratio - 1) / 2;
    (ubrr <= UBRR_MAX).then_some(ubrr as u16)
}

/// Value for `UBRRn` plus the speed mode it was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudDivisor {
    pub ubrr: u16,
    pub double_speed: bool,
}

impl BaudDivisor {
    /// Baud rate this divisor actually produces
    pub fn actual_baud(&self, cpu_hz: u32) -> u32 {
        let per_bit = if self.double_speed { 8 } else { 16 };
        cpu_hz / (per_bit * (self.ubrr as u32 + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const F_CPU: u32 = 16_000_000;

    #[test]
    fn test_default_frame_is_8n1() {
        assert_eq!(SerialConfig::default().frame_bits(), 0b0000_0110);
    }

    #[test]
    fn test_frame_bits() {
        let config = SerialConfig {
            data_bits: DataBits::Seven,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
            ..SerialConfig::default()
        };
        assert_eq!(config.frame_bits(), 0b0010_1100);

        let config = SerialConfig {
            data_bits: DataBits::Five,
            parity: Parity::Odd,
            ..SerialConfig::default()
        };
        assert_eq!(config.frame_bits(), 0b0011_0000);
    }

    #[test]
    fn test_double_speed_divisor() {
        let divisor = SerialConfig::new(9_600).divisor(F_CPU).unwrap();
        assert_eq!(divisor, BaudDivisor { ubrr: 207, double_speed: true });
        assert_eq!(divisor.actual_baud(F_CPU), 9_615);
    }

    #[test]
    fn test_normal_speed_divisor() {
        let config = SerialConfig {
            double_speed: false,
            ..SerialConfig::new(115_200)
        };
        assert_eq!(
            config.divisor(F_CPU).unwrap(),
            BaudDivisor { ubrr: 8, double_speed: false }
        );
    }

    #[test]
    fn test_slow_baud_falls_back_to_normal_speed() {
        let divisor = SerialConfig::new(300).divisor(F_CPU).unwrap();
        assert_eq!(divisor, BaudDivisor { ubrr: 3_332, double_speed: false });
    }

    #[test]
    fn test_unreachable_baud_rates() {
        assert_eq!(SerialConfig::new(0).divisor(F_CPU), Err(HalError::InvalidParameter));
        assert_eq!(
            SerialConfig::new(100).divisor(F_CPU),
            Err(HalError::BaudRateOutOfRange(100))
        );
        assert_eq!(
            SerialConfig::new(10_000_000).divisor(F_CPU),
            Err(HalError::BaudRateOutOfRange(10_000_000))
        );
    }
}
