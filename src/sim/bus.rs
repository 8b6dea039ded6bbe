use std::time::Duration;

use crate::serial::{
	Direction,
	Hardware,
	Pin,
};

use super::model::Dit4192Model;

// simulated length of one `Hardware::delay`
const CLOCK_EDGE: Duration = Duration::from_nanos(250);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BusEvent {
	Direction(Pin, Direction),
	Level(Pin, bool),
	DelayMs(u32),
}

/// Bytes exchanged while chip select was low, as seen on the wire.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct BusTransaction {
	pub bytes: Vec<u8>,
	pub clock_pulses: usize,
	/// master clocked out a partial byte before releasing chip select
	pub trailing_bits: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum Frame {
	Start,
	Byte(u8),
	End,
}

/// Decodes SPI framing from line levels: CS low starts a frame, DATA is
/// sampled on rising CLK, MSB first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) struct FrameDecoder {
	selected: bool,
	clock: bool,
	shift: u8,
	bits: u8,
}

impl FrameDecoder {
	// undriven lines float high
	pub fn new() -> Self {
		FrameDecoder {
			selected: false,
			clock: true,
			shift: 0,
			bits: 0,
		}
	}

	pub fn is_selected(&self) -> bool {
		self.selected
	}

	// bits of the current byte received so far
	pub fn bits(&self) -> u8 {
		self.bits
	}

	pub fn update(&mut self, chip_select: bool, clock: bool, data: bool) -> Option<Frame> {
		let rising = clock && !self.clock;
		self.clock = clock;

		if chip_select {
			if self.selected {
				self.selected = false;
				return Some(Frame::End);
			}
			return None;
		}

		if !self.selected {
			self.selected = true;
			self.shift = 0;
			self.bits = 0;
			return Some(Frame::Start);
		}

		if rising {
			self.shift = (self.shift << 1) | (data as u8);
			self.bits += 1;
			if 8 == self.bits {
				self.bits = 0;
				return Some(Frame::Byte(self.shift));
			}
		}
		None
	}
}

/// `Hardware` backed by a simulated DIT4192 on the other end of the wires.
///
/// Pins start as inputs; an input pin isn't driven by the master and reads
/// as released (high), which also keeps CS inactive until it becomes an
/// output. The data line is wired-AND: the chip can only pull it low.
///
/// Time only advances through `delay`/`delay_ms`, nothing actually sleeps.
pub struct SimulatedBus {
	levels: [bool; 3],
	directions: [Direction; 3],
	events: Vec<BusEvent>,
	elapsed: Duration,
	decoder: FrameDecoder,
	transactions: Vec<BusTransaction>,
	current: Option<BusTransaction>,
	stray_clock_pulses: usize,
	chip: Dit4192Model,
}

impl SimulatedBus {
	pub fn new() -> Self {
		Self::with_chip(Dit4192Model::new())
	}

	pub fn with_chip(chip: Dit4192Model) -> Self {
		SimulatedBus {
			levels: [false; 3],
			directions: [Direction::Input; 3],
			events: Vec::new(),
			elapsed: Duration::from_secs(0),
			decoder: FrameDecoder::new(),
			transactions: Vec::new(),
			current: None,
			stray_clock_pulses: 0,
			chip,
		}
	}

	pub fn chip(&self) -> &Dit4192Model {
		&self.chip
	}

	pub fn chip_mut(&mut self) -> &mut Dit4192Model {
		&mut self.chip
	}

	pub fn events(&self) -> &[BusEvent] {
		&self.events
	}

	pub fn clear_events(&mut self) {
		self.events.clear();
	}

	/// completed transactions (chip select released again)
	pub fn transactions(&self) -> &[BusTransaction] {
		&self.transactions
	}

	/// rising clock edges while chip select was inactive
	pub fn stray_clock_pulses(&self) -> usize {
		self.stray_clock_pulses
	}

	pub fn is_selected(&self) -> bool {
		self.decoder.is_selected()
	}

	pub fn elapsed(&self) -> Duration {
		self.elapsed
	}

	/// level the master last set on `pin` (whether driven or not)
	pub fn level(&self, pin: Pin) -> bool {
		self.levels[pin.index()]
	}

	pub fn direction(&self, pin: Pin) -> Direction {
		self.directions[pin.index()]
	}

	fn line(&self, pin: Pin) -> bool {
		match self.direction(pin) {
			Direction::Output => self.level(pin),
			Direction::Input => true,
		}
	}

	fn update_lines(&mut self) {
		let chip_select = self.line(Pin::ChipSelect);
		let clock = self.line(Pin::Clock);
		let data = self.line(Pin::Data);
		let was_high = self.decoder.clock;

		let frame = self.decoder.update(chip_select, clock, data);

		if clock && !was_high {
			match self.current {
				Some(ref mut tx) => tx.clock_pulses += 1,
				None => self.stray_clock_pulses += 1,
			}
		}

		match frame {
			None => (),
			Some(Frame::Start) => {
				self.current = Some(BusTransaction::default());
				self.chip.start(self.elapsed);
			},
			Some(Frame::Byte(b)) => {
				if let Some(ref mut tx) = self.current {
					tx.bytes.push(b);
				}
				self.chip.byte(b);
			},
			Some(Frame::End) => {
				if let Some(mut tx) = self.current.take() {
					tx.trailing_bits = (tx.clock_pulses - 8 * tx.bytes.len()) as u8;
					debug!("bus transaction: {:02x?}", tx.bytes);
					self.transactions.push(tx);
				}
				self.chip.end();
			},
		}
	}
}

impl Default for SimulatedBus {
	fn default() -> Self {
		Self::new()
	}
}

impl Hardware for SimulatedBus {
	fn set_pin(&mut self, pin: Pin, level: bool) {
		self.levels[pin.index()] = level;
		self.events.push(BusEvent::Level(pin, level));
		self.update_lines();
	}

	fn read_pin(&mut self, pin: Pin) -> bool {
		match pin {
			Pin::Data => {
				// the chip only drives DATA while selected
				let chip = !self.decoder.is_selected() || self.chip.data_out(self.decoder.bits());
				self.line(Pin::Data) && chip
			},
			_ => self.line(pin),
		}
	}

	fn set_pin_direction(&mut self, pin: Pin, direction: Direction) {
		self.directions[pin.index()] = direction;
		self.events.push(BusEvent::Direction(pin, direction));
		self.update_lines();
	}

	fn delay(&mut self) {
		self.elapsed += CLOCK_EDGE;
	}

	fn delay_ms(&mut self, ms: u32) {
		self.elapsed += Duration::from_millis(u64::from(ms));
		self.events.push(BusEvent::DelayMs(ms));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pulse(bus: &mut SimulatedBus) {
		bus.set_pin(Pin::Clock, true);
		bus.set_pin(Pin::Clock, false);
	}

	fn driven_bus() -> SimulatedBus {
		let mut bus = SimulatedBus::new();
		bus.set_pin(Pin::ChipSelect, true);
		for pin in Pin::ALL.iter() {
			bus.set_pin_direction(*pin, Direction::Output);
		}
		bus
	}

	#[test]
	fn undriven_lines_read_high() {
		let mut bus = SimulatedBus::new();
		for pin in Pin::ALL.iter() {
			assert!(bus.read_pin(*pin));
		}
		assert!(!bus.is_selected());
	}

	#[test]
	fn taking_over_pins_is_quiet() {
		let bus = driven_bus();
		assert_eq!(bus.stray_clock_pulses(), 0);
		assert!(bus.transactions().is_empty());
		assert!(!bus.is_selected());
	}

	#[test]
	fn counts_stray_clock_pulses() {
		let mut bus = driven_bus();
		pulse(&mut bus);
		pulse(&mut bus);
		assert_eq!(bus.stray_clock_pulses(), 2);
		assert!(bus.transactions().is_empty());
	}

	#[test]
	fn records_partial_byte() {
		let mut bus = driven_bus();
		bus.set_pin(Pin::ChipSelect, false);
		bus.set_pin(Pin::Data, true);
		for _ in 0..11 {
			pulse(&mut bus);
		}
		bus.set_pin(Pin::ChipSelect, true);

		assert_eq!(bus.transactions(), &[BusTransaction {
			bytes: vec![0xff],
			clock_pulses: 11,
			trailing_bits: 3,
		}][..]);
	}

	#[test]
	fn delays_advance_time() {
		let mut bus = SimulatedBus::new();
		bus.delay();
		bus.delay_ms(2);
		assert_eq!(bus.elapsed(), Duration::from_nanos(2_000_250));
		assert_eq!(bus.events(), &[BusEvent::DelayMs(2)][..]);
	}
}
