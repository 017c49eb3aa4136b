//! Timer peripheral register layout

use tinyhal_core::Address;

/// Width of the free-running counter register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterWidth {
    /// 8-bit counter, one register
    Eight,
    /// 16-bit counter, low register followed by high register
    Sixteen,
}

/// Registers and bits of one hardware timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerLayout {
    /// Free-running counter (`TCNTn`)
    pub counter: Address,
    /// Counter width
    pub width: CounterWidth,
    /// Control register holding the clock-select bits (`TCCRnB`)
    pub control_b: Address,
    /// Interrupt mask register (`TIMSKn`)
    pub interrupt_mask: Address,
    /// Overflow interrupt enable bit (`TOIEn`)
    pub overflow_enable: u8,
    /// Interrupt flag register (`TIFRn`)
    pub interrupt_flags: Address,
    /// Pending overflow flag (`TOVn`), cleared by hardware when the handler runs
    pub overflow_pending: u8,
}

impl TimerLayout {
    /// Largest counter period the counter register can express
    pub const fn max_period(&self) -> u32 {
        match self.width {
            CounterWidth::Eight => 256,
            CounterWidth::Sixteen => 65_536,
        }
    }
}

/// Clock-select bits CSn2:0 occupy the low three bits of `TCCRnB`
pub const CLOCK_SELECT_MASK: u8 = 0b0000_0111;

/// ATmega328P timer/counter 0
pub const TIMER0: TimerLayout = TimerLayout {
    counter: 0x46,
    width: CounterWidth::Eight,
    control_b: 0x45,
    interrupt_mask: 0x6E,
    overflow_enable: 0,
    interrupt_flags: 0x35,
    overflow_pending: 0,
};
