// Typed values for the DIT4192 configuration fields
//
// `Default` is always the chip's reset value.

use std::fmt;
use std::str;

use super::fields;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum WordLength {
	Bits24,
	Bits20,
	Bits18,
	Bits16,
}

impl WordLength {
	fn bits(self) -> u8 {
		match self {
			WordLength::Bits24 => 0b00,
			WordLength::Bits20 => 0b01,
			WordLength::Bits18 => 0b10,
			WordLength::Bits16 => 0b11,
		}
	}

	pub fn bit_count(self) -> u8 {
		match self {
			WordLength::Bits24 => 24,
			WordLength::Bits20 => 20,
			WordLength::Bits18 => 18,
			WordLength::Bits16 => 16,
		}
	}
}

impl Default for WordLength {
	fn default() -> Self {
		WordLength::Bits24
	}
}

impl fmt::Display for WordLength {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} bits", self.bit_count())
	}
}

impl str::FromStr for WordLength {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"24" => Ok(WordLength::Bits24),
			"20" => Ok(WordLength::Bits20),
			"18" => Ok(WordLength::Bits18),
			"16" => Ok(WordLength::Bits16),
			_ => bail!("invalid word length {:?} (24, 20, 18 or 16)", s),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Justification {
	Left,
	Right,
}

impl Default for Justification {
	fn default() -> Self {
		Justification::Left
	}
}

impl fmt::Display for Justification {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Justification::Left => write!(f, "left-justified"),
			Justification::Right => write!(f, "right-justified"),
		}
	}
}

impl str::FromStr for Justification {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"left" => Ok(Justification::Left),
			"right" => Ok(Justification::Right),
			_ => bail!("invalid justification {:?} (left or right)", s),
		}
	}
}

/// MCLK as a multiple of the sample rate
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum MclkRate {
	Fs128,
	Fs256,
	Fs384,
	Fs512,
}

impl MclkRate {
	fn bits(self) -> u8 {
		match self {
			MclkRate::Fs128 => 0b00,
			MclkRate::Fs256 => 0b01,
			MclkRate::Fs384 => 0b10,
			MclkRate::Fs512 => 0b11,
		}
	}

	pub fn multiplier(self) -> u16 {
		match self {
			MclkRate::Fs128 => 128,
			MclkRate::Fs256 => 256,
			MclkRate::Fs384 => 384,
			MclkRate::Fs512 => 512,
		}
	}
}

impl Default for MclkRate {
	fn default() -> Self {
		MclkRate::Fs256
	}
}

impl fmt::Display for MclkRate {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}fs", self.multiplier())
	}
}

impl str::FromStr for MclkRate {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = s.trim_end_matches("fs");
		let multiplier = with_context!(("invalid MCLK rate {:?}", s),
			Ok(digits.parse::<u16>()?)
		)?;
		match multiplier {
			128 => Ok(MclkRate::Fs128),
			256 => Ok(MclkRate::Fs256),
			384 => Ok(MclkRate::Fs384),
			512 => Ok(MclkRate::Fs512),
			_ => bail!("invalid MCLK rate {:?} (128, 256, 384 or 512)", s),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PortMode {
	Slave,
	Master,
}

impl Default for PortMode {
	fn default() -> Self {
		PortMode::Slave
	}
}

/// SCLK frequency, only used in master mode
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SclkRate {
	Fs64,
	Fs128,
}

impl Default for SclkRate {
	fn default() -> Self {
		SclkRate::Fs64
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ClockEdge {
	Rising,
	Falling,
}

impl Default for ClockEdge {
	fn default() -> Self {
		ClockEdge::Rising
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SyncPolarity {
	LeftHigh,
	LeftLow,
}

impl Default for SyncPolarity {
	fn default() -> Self {
		SyncPolarity::LeftHigh
	}
}

/// Audio Serial Port Control register (03H)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct AudioSerialPort {
	pub mode: PortMode,
	pub sclk_rate: SclkRate,
	pub word_length: WordLength,
	pub justification: Justification,
	/// data starts one SCLK period after the SYNC edge
	pub delayed: bool,
	pub sampling_edge: ClockEdge,
	pub sync_polarity: SyncPolarity,
}

impl AudioSerialPort {
	pub fn value(&self) -> u8 {
		fields::MS.bits((self.mode == PortMode::Master) as u8)
		| fields::SCLKR.bits((self.sclk_rate == SclkRate::Fs128) as u8)
		| fields::WLEN.bits(self.word_length.bits())
		| fields::JUS.bits((self.justification == Justification::Right) as u8)
		| fields::DELAY.bits(self.delayed as u8)
		| fields::ISCLK.bits((self.sampling_edge == ClockEdge::Falling) as u8)
		| fields::ISYNC.bits((self.sync_polarity == SyncPolarity::LeftLow) as u8)
	}
}

/// Power-Down and Clock Control register (02H)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PowerDownClock {
	pub power_down: bool,
	pub mclk_rate: MclkRate,
	pub reset: bool,
}

impl PowerDownClock {
	pub fn value(&self) -> u8 {
		fields::PDN.bits(self.power_down as u8)
		| fields::CLK.bits(self.mclk_rate.bits())
		| fields::RST.bits(self.reset as u8)
	}
}

impl Default for PowerDownClock {
	fn default() -> Self {
		PowerDownClock {
			power_down: true,
			mclk_rate: MclkRate::default(),
			reset: false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reset_values() {
		assert_eq!(AudioSerialPort::default().value(), 0x00);
		assert_eq!(PowerDownClock::default().value(), 0x03);
	}

	#[test]
	fn audio_serial_port_20bit_right() {
		let port = AudioSerialPort {
			word_length: WordLength::Bits20,
			justification: Justification::Right,
			..AudioSerialPort::default()
		};
		assert_eq!(port.value(), 0b0001_0100);
	}

	#[test]
	fn audio_serial_port_all_set() {
		let port = AudioSerialPort {
			mode: PortMode::Master,
			sclk_rate: SclkRate::Fs128,
			word_length: WordLength::Bits16,
			justification: Justification::Right,
			delayed: true,
			sampling_edge: ClockEdge::Falling,
			sync_polarity: SyncPolarity::LeftLow,
		};
		assert_eq!(port.value(), 0xff);
	}

	#[test]
	fn power_down_clock() {
		let running = PowerDownClock {
			power_down: false,
			mclk_rate: MclkRate::Fs256,
			reset: false,
		};
		assert_eq!(running.value(), 0x02);

		let reset = PowerDownClock {
			mclk_rate: MclkRate::Fs512,
			reset: true,
			..PowerDownClock::default()
		};
		assert_eq!(reset.value(), 0b0000_1111);
	}

	#[test]
	fn parse() {
		assert_eq!("20".parse::<WordLength>().unwrap(), WordLength::Bits20);
		assert!("32".parse::<WordLength>().is_err());
		assert_eq!("right".parse::<Justification>().unwrap(), Justification::Right);
		assert!("center".parse::<Justification>().is_err());
		assert_eq!("384".parse::<MclkRate>().unwrap(), MclkRate::Fs384);
		assert_eq!("512fs".parse::<MclkRate>().unwrap(), MclkRate::Fs512);
		assert!("256x".parse::<MclkRate>().is_err());
		assert!("100".parse::<MclkRate>().is_err());
	}
}
