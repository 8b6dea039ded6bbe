use std::time::Duration;

use crate::dit4192::{
	ADDRESS_MASK,
	AUTO_INCREMENT_FLAG,
	PowerDownClock,
	READ_FLAG,
	Register,
	fields,
};

pub const REGISTER_COUNT: usize = ADDRESS_MASK as usize + 1;

/// Time after power-up before the control port accepts transactions.
pub const POWER_UP_SETTLE: Duration = Duration::from_millis(5);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
	Idle,
	Ignored,
	Command,
	Dummy(Access),
	Data(Access),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Access {
	address: u8,
	read: bool,
	auto_increment: bool,
}

impl Access {
	fn decode(command: u8) -> Self {
		Access {
			address: command & ADDRESS_MASK,
			read: 0 != command & READ_FLAG,
			auto_increment: 0 != command & AUTO_INCREMENT_FLAG,
		}
	}
}

fn power_on_registers() -> [u8; REGISTER_COUNT] {
	let mut registers = [0u8; REGISTER_COUNT];
	registers[Register::PowerDownClockControl.address() as usize] = PowerDownClock::default().value();
	registers
}

/// Register-level model of the DIT4192 control port.
///
/// Fed with decoded frames by `SimulatedBus`. Every transaction is
/// `[command][dummy][data...]`; read data is latched after the dummy byte and
/// shifted out MSB first. Command bit 6 makes the address advance after
/// every data byte.
#[derive(Clone, Debug)]
pub struct Dit4192Model {
	registers: [u8; REGISTER_COUNT],
	settle_time: Duration,
	phase: Phase,
	output: u8,
	ignored_transactions: usize,
}

impl Dit4192Model {
	pub fn new() -> Self {
		Self::with_settle_time(POWER_UP_SETTLE)
	}

	pub fn with_settle_time(settle_time: Duration) -> Self {
		Dit4192Model {
			registers: power_on_registers(),
			settle_time,
			phase: Phase::Idle,
			output: 0xff,
			ignored_transactions: 0,
		}
	}

	pub fn register(&self, address: u8) -> u8 {
		self.registers[(address & ADDRESS_MASK) as usize]
	}

	pub fn value(&self, register: Register) -> u8 {
		self.register(register.address())
	}

	// backdoor, doesn't touch the bus
	pub fn set_register(&mut self, address: u8, value: u8) {
		self.registers[(address & ADDRESS_MASK) as usize] = value;
	}

	/// transactions started before the chip was ready
	pub fn ignored_transactions(&self) -> usize {
		self.ignored_transactions
	}

	pub fn is_powered_down(&self) -> bool {
		0 != fields::PDN.extract(self.value(Register::PowerDownClockControl))
	}

	pub(super) fn start(&mut self, now: Duration) {
		if now < self.settle_time {
			warn!("DIT4192: transaction {:?} after power-up, ignored (needs {:?})", now, self.settle_time);
			self.ignored_transactions += 1;
			self.phase = Phase::Ignored;
		} else {
			self.phase = Phase::Command;
		}
	}

	pub(super) fn byte(&mut self, data: u8) {
		let phase = self.phase;
		self.phase = match phase {
			Phase::Idle | Phase::Ignored => phase,
			Phase::Command => Phase::Dummy(Access::decode(data)),
			Phase::Dummy(access) => {
				if access.read {
					self.output = self.register(access.address);
				}
				Phase::Data(access)
			},
			Phase::Data(mut access) => {
				if !access.read {
					self.write(access.address, data);
				}
				if access.auto_increment {
					access.address = (access.address + 1) & ADDRESS_MASK;
				}
				if access.read {
					self.output = self.register(access.address);
				}
				Phase::Data(access)
			},
		};
	}

	pub(super) fn end(&mut self) {
		self.phase = Phase::Idle;
		self.output = 0xff;
	}

	// level the chip drives for bit `bit` (0 = MSB) of the current byte;
	// high means released
	pub(super) fn data_out(&self, bit: u8) -> bool {
		match self.phase {
			Phase::Data(Access { read: true, .. }) => 0 != (self.output << bit) & 0x80,
			_ => true,
		}
	}

	fn write(&mut self, address: u8, value: u8) {
		if address == Register::InterruptStatus.address() {
			debug!("DIT4192: write to read-only {} ignored", Register::InterruptStatus);
			return;
		}
		if address == Register::PowerDownClockControl.address() && 0 != fields::RST.extract(value) {
			debug!("DIT4192: software reset");
			self.registers = power_on_registers();
			return;
		}
		trace!("DIT4192: register 0x{:02x} = 0x{:02x}", address, value);
		self.registers[address as usize] = value;
	}
}

impl Default for Dit4192Model {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dit4192::RegisterOperations;
	use crate::serial::{
		Direction,
		Hardware,
		LowLevel,
		Pin,
	};
	use crate::sim::SimulatedBus;

	fn ready_bus() -> SimulatedBus {
		let mut bus = SimulatedBus::new();
		bus.deselect_chip();
		for pin in Pin::ALL.iter() {
			bus.set_pin_direction(*pin, Direction::Output);
		}
		bus.delay_ms(5);
		bus
	}

	#[test]
	fn power_on_defaults() {
		let chip = Dit4192Model::new();
		assert_eq!(chip.value(Register::PowerDownClockControl), 0x03);
		assert_eq!(chip.value(Register::AudioSerialPortControl), 0x00);
		assert!(chip.is_powered_down());
	}

	#[test]
	fn ignores_transactions_before_settling() {
		let mut bus = SimulatedBus::new();
		bus.deselect_chip();
		for pin in Pin::ALL.iter() {
			bus.set_pin_direction(*pin, Direction::Output);
		}
		bus.write_register(0x03, 0x14);

		assert_eq!(bus.chip().ignored_transactions(), 1);
		assert_eq!(bus.chip().value(Register::AudioSerialPortControl), 0x00);
		// still on the wire, the chip just didn't listen
		assert_eq!(bus.transactions()[0].bytes, vec![0x03, 0xff, 0x14]);
	}

	#[test]
	fn software_reset_restores_defaults() {
		let mut bus = ready_bus();
		bus.write_register(0x03, 0x14);
		bus.write_register(0x02, 0x02);
		assert!(!bus.chip().is_powered_down());

		bus.write_register(0x02, 0x08);
		assert_eq!(bus.chip().value(Register::AudioSerialPortControl), 0x00);
		assert_eq!(bus.chip().value(Register::PowerDownClockControl), 0x03);
	}

	#[test]
	fn interrupt_status_is_read_only() {
		let mut bus = ready_bus();
		bus.write_register(0x04, 0x55);
		assert_eq!(bus.chip().value(Register::InterruptStatus), 0x00);
	}

	#[test]
	fn auto_increment_advances_address() {
		let mut bus = ready_bus();
		{
			let mut tx = bus.start_transaction();
			tx.transfer_byte(AUTO_INCREMENT_FLAG | 0x05);
			tx.transfer_byte(0xff);
			tx.transfer_byte(0x11);
			tx.transfer_byte(0x22);
		}
		assert_eq!(bus.chip().value(Register::InterruptMask), 0x11);
		assert_eq!(bus.chip().value(Register::InterruptMode), 0x22);
	}

	#[test]
	fn without_auto_increment_address_stays() {
		let mut bus = ready_bus();
		{
			let mut tx = bus.start_transaction();
			tx.transfer_byte(0x05);
			tx.transfer_byte(0xff);
			tx.transfer_byte(0x11);
			tx.transfer_byte(0x22);
		}
		assert_eq!(bus.chip().value(Register::InterruptMask), 0x22);
		assert_eq!(bus.chip().value(Register::InterruptMode), 0x00);
	}

	#[test]
	fn drives_read_data_on_shared_line() {
		let mut bus = ready_bus();
		bus.chip_mut().set_register(0x07, 0x6c);
		{
			let mut tx = bus.start_transaction();
			assert_eq!(tx.transfer_byte(READ_FLAG | 0x07), READ_FLAG | 0x07);
			assert_eq!(tx.transfer_byte(0xff), 0xff);
			assert_eq!(tx.transfer_byte(0xff), 0x6c);
		}
		// the recorded bytes are what the master drove
		assert_eq!(bus.transactions()[0].bytes, vec![0x87, 0xff, 0xff]);
	}
}
