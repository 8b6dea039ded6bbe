// Software stand-ins for the hardware: a bus with a DIT4192 attached, and a
// CPU that records how it was put to sleep.

mod bus;
mod model;

pub use self::bus::{
	BusEvent,
	BusTransaction,
	SimulatedBus,
};

pub use self::model::{
	Dit4192Model,
	POWER_UP_SETTLE,
	REGISTER_COUNT,
};

use crate::bringup::{
	Platform,
	SleepMode,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SimulatedPlatform {
	interrupts_enabled: bool,
	sleep_mode: SleepMode,
	sleep_requests: usize,
}

impl SimulatedPlatform {
	pub fn new() -> Self {
		SimulatedPlatform {
			interrupts_enabled: true,
			sleep_mode: SleepMode::Idle,
			sleep_requests: 0,
		}
	}

	pub fn interrupts_enabled(&self) -> bool {
		self.interrupts_enabled
	}

	pub fn sleep_mode(&self) -> SleepMode {
		self.sleep_mode
	}

	pub fn sleep_requests(&self) -> usize {
		self.sleep_requests
	}

	/// sleeping with interrupts off: nothing but a reset wakes this up
	pub fn is_halted(&self) -> bool {
		self.sleep_requests > 0 && !self.interrupts_enabled
	}
}

impl Default for SimulatedPlatform {
	fn default() -> Self {
		Self::new()
	}
}

impl Platform for SimulatedPlatform {
	fn disable_interrupts(&mut self) {
		self.interrupts_enabled = false;
	}

	fn set_sleep_mode(&mut self, mode: SleepMode) {
		self.sleep_mode = mode;
	}

	fn sleep_cpu(&mut self) {
		self.sleep_requests += 1;
	}
}
