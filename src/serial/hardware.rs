use std::thread;
use std::time::{
	Duration,
	Instant,
};

const CLOCK_EDGE: Duration = Duration::from_nanos(250);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// The three lines of the control port.
///
/// There is no separate data input: the chip shares the data line, so
/// reading `Pin::Data` samples whatever is on the wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Pin {
	ChipSelect,
	Clock,
	Data,
}

impl Pin {
	pub const ALL: [Pin; 3] = [Pin::ChipSelect, Pin::Clock, Pin::Data];

	pub fn index(self) -> usize {
		match self {
			Pin::ChipSelect => 0,
			Pin::Clock => 1,
			Pin::Data => 2,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	Output,
}

pub trait Hardware {
	fn set_pin(&mut self, pin: Pin, level: bool);
	fn read_pin(&mut self, pin: Pin) -> bool;
	fn set_pin_direction(&mut self, pin: Pin, direction: Direction);

	// delay for (at least) one clock edge
	fn delay(&mut self) {
		reliable_sleep(CLOCK_EDGE);
	}

	fn delay_ms(&mut self, ms: u32) {
		reliable_sleep(Duration::from_millis(u64::from(ms)));
	}
}

impl<'a, H: Hardware + ?Sized> Hardware for &'a mut H {
	fn set_pin(&mut self, pin: Pin, level: bool) {
		(**self).set_pin(pin, level)
	}

	fn read_pin(&mut self, pin: Pin) -> bool {
		(**self).read_pin(pin)
	}

	fn set_pin_direction(&mut self, pin: Pin, direction: Direction) {
		(**self).set_pin_direction(pin, direction)
	}

	fn delay(&mut self) {
		(**self).delay()
	}

	fn delay_ms(&mut self, ms: u32) {
		(**self).delay_ms(ms)
	}
}
