/// Bit-banged SPI master for a 3-wire control port
///
/// Lines: CS (active low), CLK (idle low) and one shared DATA line. There is
/// no SPI peripheral; a software shift register (see `usi`) toggles CLK and
/// samples DATA.
///
/// Per byte:
/// - 8 clock pulses, MSB first
/// - master presents a bit while CLK is low, both sides sample on the rising
///   edge
/// - whatever the chip drives onto DATA during those pulses is the received
///   byte
///
/// Transactions hold CS low for one or more bytes. Nothing on this bus is
/// acknowledged, so none of these operations can fail.

mod hardware;
mod low_level;
mod usi;

pub use self::hardware::{
	Direction,
	Hardware,
	Pin,
	reliable_sleep,
};

pub use self::low_level::{
	LowLevel,
	Transaction,
};
