use super::{
	Hardware,
	Pin,
};

// one byte is 8 clock pulses, i.e. 16 clock edges
pub(super) const EDGE_BUDGET: usize = 16;

const COUNTER_MASK: u8 = 0x0f;

/// Universal serial interface in three-wire mode, strobed by software.
///
/// Like the hardware unit it stands in for, it is a data register plus a
/// 4-bit edge counter: every strobe toggles the clock and counts one edge,
/// and the counter overflowing (after 16 edges) is the "transfer complete"
/// flag.
///
/// - leading edge: present the MSB on the data line, sample the line, raise CLK
/// - trailing edge: drop CLK, shift the sampled bit in at the LSB
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) struct Usi {
	data: u8,
	latch: bool,
	counter: u8,
	overflow: bool,
}

impl Usi {
	pub fn load(data: u8) -> Self {
		Usi {
			data,
			latch: false,
			counter: 0,
			overflow: false,
		}
	}

	pub fn data(&self) -> u8 {
		self.data
	}

	pub fn output(&self) -> bool {
		0 != self.data & 0x80
	}

	pub fn is_overflow(&self) -> bool {
		self.overflow
	}

	pub fn clear_overflow(&mut self) {
		self.overflow = false;
		self.counter = 0;
	}

	pub fn strobe<H: Hardware + ?Sized>(&mut self, hw: &mut H) {
		if 0 == self.counter & 1 {
			hw.set_pin(Pin::Data, self.output());
			hw.delay(); // wait for pins to be stable
			self.latch = hw.read_pin(Pin::Data);
			hw.set_pin(Pin::Clock, true);
			hw.delay(); // wait for chip reading the pins
		} else {
			hw.set_pin(Pin::Clock, false);
			self.data = (self.data << 1) | (self.latch as u8);
		}

		self.counter = (self.counter + 1) & COUNTER_MASK;
		if 0 == self.counter {
			self.overflow = true;
		}
	}
}
