//! USART peripheral register layout

use tinyhal_core::Address;

/// Registers of one USART
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsartLayout {
    /// Status register A (`UCSRnA`)
    pub status_a: Address,
    /// Control register B (`UCSRnB`)
    pub control_b: Address,
    /// Frame format register (`UCSRnC`)
    pub control_c: Address,
    /// Baud divisor, low byte (`UBRRnL`)
    pub baud_low: Address,
    /// Baud divisor, high nibble (`UBRRnH`)
    pub baud_high: Address,
    /// Data register (`UDRn`); reads pop the receiver, writes load the transmitter
    pub data: Address,
}

/// ATmega328P USART 0
pub const USART0: UsartLayout = UsartLayout {
    status_a: 0xC0,
    control_b: 0xC1,
    control_c: 0xC2,
    baud_low: 0xC4,
    baud_high: 0xC5,
    data: 0xC6,
};

/// `UCSRnA` bits
pub mod status_a {
    /// Receive complete
    pub const RXC: u8 = 7;
    /// Transmit complete; cleared by writing one
    pub const TXC: u8 = 6;
    /// Data register empty
    pub const UDRE: u8 = 5;
    /// Double transmission speed
    pub const U2X: u8 = 1;
    /// Multi-processor communication mode
    pub const MPCM: u8 = 0;
}

/// `UCSRnB` bits
pub mod control_b {
    /// Receive complete interrupt enable
    pub const RXCIE: u8 = 7;
    /// Data register empty interrupt enable
    pub const UDRIE: u8 = 5;
    /// Receiver enable
    pub const RXEN: u8 = 4;
    /// Transmitter enable
    pub const TXEN: u8 = 3;
    /// Character size bit 2 (nine-bit frames)
    pub const UCSZ2: u8 = 2;
}

/// `UCSRnC` bit offsets
pub mod control_c {
    /// Parity mode, two bits
    pub const UPM0: u8 = 4;
    /// Stop bit select
    pub const USBS: u8 = 3;
    /// Character size, two bits
    pub const UCSZ0: u8 = 1;
}
