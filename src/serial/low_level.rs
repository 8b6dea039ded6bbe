use super::{
	Hardware,
	Pin,
	usi::{
		EDGE_BUDGET,
		Usi,
	},
};

/// Chip select held low for the lifetime of the value.
///
/// Dropping it releases chip select, which ends the transaction.
pub struct Transaction<'a, H: ?Sized+LowLevel+'a>(&'a mut H);

impl<'a, H: ?Sized+LowLevel> Transaction<'a, H> {
	/// Shift one byte out (MSB first) and return the 8 bits sampled from the
	/// shared data line during the same clock pulses.
	pub fn transfer_byte(&mut self, data: u8) -> u8 {
		let received = self.0._transfer_byte(data);
		trace!("SPI out: 0x{:02x}, in: 0x{:02x}", data, received);
		received
	}
}

impl<'a, H: ?Sized+LowLevel> Drop for Transaction<'a, H> {
	fn drop(&mut self) {
		self.0.deselect_chip();
	}
}

trait InternalLowLevel: Hardware {
	fn _transfer_byte(&mut self, data: u8) -> u8 {
		let mut usi = Usi::load(data);
		usi.clear_overflow();

		let mut budget = EDGE_BUDGET;
		while !usi.is_overflow() && budget > 0 {
			usi.strobe(self);
			budget -= 1;
		}
		debug_assert!(usi.is_overflow(), "USI didn't complete within {} clock edges", EDGE_BUDGET);

		usi.data()
	}
}

impl<H: Hardware+?Sized> InternalLowLevel for H {
}

pub trait LowLevel: Hardware {
	// chip select is active low
	fn select_chip(&mut self) {
		self.set_pin(Pin::ChipSelect, false);
	}

	fn deselect_chip(&mut self) {
		self.set_pin(Pin::ChipSelect, true);
	}

	fn start_transaction(&mut self) -> Transaction<Self> {
		self.select_chip();

		Transaction(self)
	}
}

impl<H: Hardware+?Sized> LowLevel for H {
}
