// Power-up sequence: configure the DIT4192 once, then sleep for good.
//
// `Uninitialized` -> `Configuring` -> `Sleeping`; there is no way back
// short of a hardware reset.

use std::fmt;

use crate::dit4192::{
	AudioSerialPort,
	Justification,
	MclkRate,
	PowerDownClock,
	Register,
	RegisterOperations,
	WordLength,
};
use crate::serial::{
	Direction,
	Hardware,
	LowLevel,
	Pin,
};

/// Settling time the DIT4192 needs after power-up before it listens.
pub const DEFAULT_SETTLE_MS: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SleepMode {
	Idle,
	AdcNoiseReduction,
	/// deepest mode: only a reset or an external interrupt wakes the CPU
	PowerDown,
}

pub trait Platform {
	fn disable_interrupts(&mut self);
	fn set_sleep_mode(&mut self, mode: SleepMode);
	/// On real hardware this doesn't return when interrupts are disabled.
	fn sleep_cpu(&mut self);
}

impl<'a, P: Platform + ?Sized> Platform for &'a mut P {
	fn disable_interrupts(&mut self) {
		(**self).disable_interrupts()
	}

	fn set_sleep_mode(&mut self, mode: SleepMode) {
		(**self).set_sleep_mode(mode)
	}

	fn sleep_cpu(&mut self) {
		(**self).sleep_cpu()
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum State {
	Uninitialized,
	Configuring,
	Sleeping,
}

/// Register values written during bring-up.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BringupConfig {
	pub audio_serial_port: AudioSerialPort,
	pub power_down_clock: PowerDownClock,
	pub settle_ms: u32,
}

impl Default for BringupConfig {
	// 20-bit right-justified audio, MCLK = 256fs, transmitter powered up
	fn default() -> Self {
		BringupConfig {
			audio_serial_port: AudioSerialPort {
				word_length: WordLength::Bits20,
				justification: Justification::Right,
				..AudioSerialPort::default()
			},
			power_down_clock: PowerDownClock {
				power_down: false,
				mclk_rate: MclkRate::Fs256,
				reset: false,
			},
			settle_ms: DEFAULT_SETTLE_MS,
		}
	}
}

impl fmt::Display for BringupConfig {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"{} {}, MCLK {}, settle {} ms",
			self.audio_serial_port.word_length,
			self.audio_serial_port.justification,
			self.power_down_clock.mclk_rate,
			self.settle_ms,
		)
	}
}

pub struct Bringup<H: Hardware, P: Platform> {
	hardware: H,
	platform: P,
	config: BringupConfig,
	state: State,
}

impl<H: Hardware, P: Platform> Bringup<H, P> {
	pub fn new(hardware: H, platform: P, config: BringupConfig) -> Self {
		Bringup {
			hardware,
			platform,
			config,
			state: State::Uninitialized,
		}
	}

	pub fn state(&self) -> State {
		self.state
	}

	pub fn config(&self) -> &BringupConfig {
		&self.config
	}

	pub fn hardware(&self) -> &H {
		&self.hardware
	}

	pub fn platform(&self) -> &P {
		&self.platform
	}

	pub fn into_parts(self) -> (H, P) {
		(self.hardware, self.platform)
	}

	/// Take over the pins and wait for the chip to settle.
	pub fn power_up(&mut self) {
		assert_eq!(self.state, State::Uninitialized, "bring-up already started");

		// CS high before it becomes an output, so the chip never sees a
		// select glitch
		self.hardware.deselect_chip();
		for pin in Pin::ALL.iter() {
			self.hardware.set_pin_direction(*pin, Direction::Output);
		}
		self.hardware.deselect_chip();
		self.hardware.delay_ms(self.config.settle_ms);

		self.state = State::Configuring;
		info!("DIT4192 bring-up: {}", self.config);
	}

	/// Write the configuration and put the CPU to sleep.
	pub fn configure(&mut self) {
		assert_eq!(self.state, State::Configuring, "configure before power-up or after sleep");

		self.hardware.write(Register::AudioSerialPortControl, self.config.audio_serial_port.value());
		self.hardware.write(Register::PowerDownClockControl, self.config.power_down_clock.value());

		self.platform.disable_interrupts();
		self.platform.set_sleep_mode(SleepMode::PowerDown);
		self.state = State::Sleeping;
		info!("DIT4192 configured, sleeping");
		self.platform.sleep_cpu();
	}

	/// Whole sequence; returns only if the platform refuses to sleep.
	pub fn bring_up(&mut self) {
		self.power_up();
		self.configure();
	}

	/// Firmware entry point: `fn main() -> ! { Bringup::new(pins, cpu, config).run() }`.
	///
	/// Never returns; if the CPU wakes up again it spins.
	pub fn run(mut self) -> ! {
		self.bring_up();

		// just in case the CPU didn't stay asleep
		loop {
			std::hint::spin_loop();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sim::{
		SimulatedBus,
		SimulatedPlatform,
	};

	fn bringup() -> Bringup<SimulatedBus, SimulatedPlatform> {
		Bringup::new(SimulatedBus::new(), SimulatedPlatform::new(), BringupConfig::default())
	}

	#[test]
	fn default_config_values() {
		let config = BringupConfig::default();
		assert_eq!(config.audio_serial_port.value(), 0x14);
		assert_eq!(config.power_down_clock.value(), 0x02);
		assert_eq!(config.settle_ms, 5);
	}

	#[test]
	fn states() {
		let mut b = bringup();
		assert_eq!(b.state(), State::Uninitialized);

		b.power_up();
		assert_eq!(b.state(), State::Configuring);
		assert!(b.hardware().transactions().is_empty());
		assert!(b.platform().interrupts_enabled());

		b.configure();
		assert_eq!(b.state(), State::Sleeping);
		assert_eq!(b.hardware().transactions().len(), 2);
	}

	#[test]
	fn power_up_drives_pins() {
		let mut b = bringup();
		b.power_up();

		let bus = b.hardware();
		for pin in Pin::ALL.iter() {
			assert_eq!(bus.direction(*pin), Direction::Output);
		}
		assert!(bus.level(Pin::ChipSelect));
		assert!(!bus.level(Pin::Clock));
		assert_eq!(bus.elapsed(), std::time::Duration::from_millis(5));
	}

	#[test]
	#[should_panic]
	fn power_up_twice() {
		let mut b = bringup();
		b.power_up();
		b.power_up();
	}

	#[test]
	#[should_panic]
	fn configure_before_power_up() {
		let mut b = bringup();
		b.configure();
	}

	#[test]
	#[should_panic]
	fn no_reconfiguration_after_sleep() {
		let mut b = bringup();
		b.bring_up();
		b.configure();
	}

	#[test]
	fn run_fits_a_diverging_main() {
		// spins forever, so only check it can stand in for `fn main() -> !`
		let entry: fn(Bringup<SimulatedBus, SimulatedPlatform>) -> ! = Bringup::run;
		let _ = entry;
	}
}
