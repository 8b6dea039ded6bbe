use std::fmt;

/// Register addresses are 6 bits; the upper two command bits are flags.
pub const ADDRESS_MASK: u8 = 0x3f;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Register {
	/// reserved for factory use
	Factory,
	TransmitterControl,
	PowerDownClockControl,
	AudioSerialPortControl,
	InterruptStatus,
	InterruptMask,
	InterruptMode,
	ChannelStatusBufferControl,
}

impl Register {
	pub const ALL: [Register; 8] = [
		Register::Factory,
		Register::TransmitterControl,
		Register::PowerDownClockControl,
		Register::AudioSerialPortControl,
		Register::InterruptStatus,
		Register::InterruptMask,
		Register::InterruptMode,
		Register::ChannelStatusBufferControl,
	];

	pub fn address(self) -> u8 {
		match self {
			Register::Factory => 0x00,
			Register::TransmitterControl => 0x01,
			Register::PowerDownClockControl => 0x02,
			Register::AudioSerialPortControl => 0x03,
			Register::InterruptStatus => 0x04,
			Register::InterruptMask => 0x05,
			Register::InterruptMode => 0x06,
			Register::ChannelStatusBufferControl => 0x07,
		}
	}

	pub fn from_address(address: u8) -> Option<Register> {
		Register::ALL.iter().cloned().find(|r| r.address() == address)
	}

	pub fn name(self) -> &'static str {
		match self {
			Register::Factory => "Factory",
			Register::TransmitterControl => "Transmitter Control",
			Register::PowerDownClockControl => "Power-Down and Clock Control",
			Register::AudioSerialPortControl => "Audio Serial Port Control",
			Register::InterruptStatus => "Interrupt Status",
			Register::InterruptMask => "Interrupt Mask",
			Register::InterruptMode => "Interrupt Mode",
			Register::ChannelStatusBufferControl => "Channel Status Buffer Control",
		}
	}

	/// fields documented for this register, lowest bit first
	pub fn fields(self) -> impl Iterator<Item = &'static Field> {
		FIELDS.iter().filter(move |f| f.register == self)
	}
}

impl fmt::Display for Register {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} (0x{:02x})", self.name(), self.address())
	}
}

/// A bit field inside one register.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Field {
	pub name: &'static str,
	pub register: Register,
	pub offset: u8,
	pub width: u8,
}

impl Field {
	/// largest value the field can hold
	pub fn max(&self) -> u8 {
		((1u16 << self.width) - 1) as u8
	}

	pub fn mask(&self) -> u8 {
		self.max() << self.offset
	}

	/// `value` moved into position; bits not fitting the field are dropped
	pub fn bits(&self, value: u8) -> u8 {
		(value << self.offset) & self.mask()
	}

	pub fn extract(&self, register_value: u8) -> u8 {
		(register_value & self.mask()) >> self.offset
	}

	pub fn insert(&self, register_value: u8, value: u8) -> crate::AResult<u8> {
		ensure!(value <= self.max(), "value {} doesn't fit into {} (max {})", value, self, self.max());
		Ok((register_value & !self.mask()) | self.bits(value))
	}
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if 1 == self.width {
			write!(f, "{} [{}]", self.name, self.offset)
		} else {
			write!(f, "{} [{}:{}]", self.name, self.offset + self.width - 1, self.offset)
		}
	}
}

macro_rules! fields {
	($( $(#[$attr:meta])* $name:ident: $register:ident [$offset:expr; $width:expr], )*) => {
		pub mod fields {
			use super::{
				Field,
				Register,
			};

			$(
				$(#[$attr])*
				pub const $name: Field = Field {
					name: stringify!($name),
					register: Register::$register,
					offset: $offset,
					width: $width,
				};
			)*
		}

		pub const FIELDS: &[Field] = &[ $( fields::$name, )* ];
	};
}

fields! {
	/// Block start mode: 0 = BLS is an input, 1 = BLS is an output
	BLSM: TransmitterControl [0; 1],
	/// 1 = invalid or non-PCM audio data
	VAL: TransmitterControl [1; 1],
	/// 1 = channel A and B audio data forced to zero
	MUTE: TransmitterControl [2; 1],
	/// 1 = take AES-3 data from RXP instead of the encoder
	BYPAS: TransmitterControl [3; 1],
	MONO: TransmitterControl [4; 1],
	/// channel select for mono / shared channel status (0 = left, 1 = right)
	MDAT: TransmitterControl [5; 1],
	/// 1 = same channel status data for both sub-frames
	MCSD: TransmitterControl [6; 1],
	/// 1 = line driver outputs forced to ground
	TXOFF: TransmitterControl [7; 1],

	/// power-down, set after reset
	PDN: PowerDownClockControl [0; 1],
	/// MCLK rate: 00 = 128fs, 01 = 256fs, 10 = 384fs, 11 = 512fs
	CLK: PowerDownClockControl [1; 2],
	/// software reset
	RST: PowerDownClockControl [3; 1],

	/// 1 = audio serial port is master
	MS: AudioSerialPortControl [0; 1],
	/// master mode SCLK: 0 = 64fs, 1 = 128fs
	SCLKR: AudioSerialPortControl [1; 1],
	/// word length: 00 = 24, 01 = 20, 10 = 18, 11 = 16 bits
	WLEN: AudioSerialPortControl [2; 2],
	/// 0 = left justified, 1 = right justified
	JUS: AudioSerialPortControl [4; 1],
	/// 1 = data starts one SCLK after the SYNC edge
	DELAY: AudioSerialPortControl [5; 1],
	/// 0 = sample SDATA on rising SCLK, 1 = on falling SCLK
	ISCLK: AudioSerialPortControl [6; 1],
	/// 0 = left channel while SYNC is high, 1 = while SYNC is low
	ISYNC: AudioSerialPortControl [7; 1],
}
