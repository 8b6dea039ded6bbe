/// Control port of the TI/Burr-Brown DIT4192 digital audio transmitter
///
/// Every access is a single transaction with chip select held low:
/// - command byte: bit 7 = read (1) / write (0), bit 6 = address
///   auto-increment, bits 5..0 = register address
/// - one dummy byte (0xff); the chip needs it to decode the command
/// - data byte(s): written by the master, or shifted out by the chip on the
///   shared data line while the master sends 0xff
///
/// There is no acknowledgement; a write is assumed to have happened.

mod registers;
mod settings;

pub use self::registers::{
	ADDRESS_MASK,
	FIELDS,
	Field,
	Register,
	fields,
};

pub use self::settings::{
	AudioSerialPort,
	ClockEdge,
	Justification,
	MclkRate,
	PortMode,
	PowerDownClock,
	SclkRate,
	SyncPolarity,
	WordLength,
};

use crate::serial::{
	Hardware,
	LowLevel,
};

pub const READ_FLAG: u8 = 0x80;
pub const AUTO_INCREMENT_FLAG: u8 = 0x40;
pub const DUMMY_BYTE: u8 = 0xff;

pub fn write_command(address: u8) -> u8 {
	address & ADDRESS_MASK
}

pub fn read_command(address: u8) -> u8 {
	(address & ADDRESS_MASK) | READ_FLAG
}

pub trait RegisterOperations: LowLevel {
	fn write_register(&mut self, address: u8, value: u8) {
		debug!("DIT4192 write 0x{:02x}: 0x{:02x}", address & ADDRESS_MASK, value);
		let mut tx = self.start_transaction();
		tx.transfer_byte(write_command(address));
		tx.transfer_byte(DUMMY_BYTE);
		tx.transfer_byte(value);
	}

	fn read_register(&mut self, address: u8) -> u8 {
		let value = {
			let mut tx = self.start_transaction();
			tx.transfer_byte(read_command(address));
			tx.transfer_byte(DUMMY_BYTE);
			tx.transfer_byte(DUMMY_BYTE)
		};
		debug!("DIT4192 read 0x{:02x}: 0x{:02x}", address & ADDRESS_MASK, value);
		value
	}

	fn write(&mut self, register: Register, value: u8) {
		self.write_register(register.address(), value)
	}

	fn read(&mut self, register: Register) -> u8 {
		self.read_register(register.address())
	}

	fn read_field(&mut self, field: Field) -> u8 {
		field.extract(self.read(field.register))
	}

	// read-modify-write; other fields keep their current value
	fn modify_field(&mut self, field: Field, value: u8) -> crate::AResult<()> {
		let current = self.read(field.register);
		let updated = field.insert(current, value)?;
		self.write(field.register, updated);
		Ok(())
	}
}

impl<H: Hardware+?Sized> RegisterOperations for H {
}
