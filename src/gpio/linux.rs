use std::fs;
use std::io::Write;
use std::os::unix::fs::FileExt;
use std::path::{
	Path,
	PathBuf,
};

use crate::serial::{
	Direction,
	Hardware,
	Pin,
};

use super::PinNumbers;

pub const GPIO_ROOT: &str = "/sys/class/gpio";

struct SysfsPin {
	number: u32,
	dir: PathBuf,
	value: fs::File,
	direction: Direction,
	// last requested level; an input pin only remembers it
	level: bool,
}

impl SysfsPin {
	fn export(root: &Path, number: u32) -> crate::AResult<()> {
		if root.join(format!("gpio{}", number)).exists() {
			return Ok(());
		}

		with_context!(("export GPIO {}", number), {
			fs::OpenOptions::new().write(true).open(root.join("export"))?.write_all(number.to_string().as_bytes())?;
			Ok(())
		})
	}

	fn open(root: &Path, number: u32) -> crate::AResult<Self> {
		Self::export(root, number)?;
		let dir = root.join(format!("gpio{}", number));

		let direction = with_context!(("read direction of GPIO {}", number), {
			let current = fs::read_to_string(dir.join("direction"))?;
			Ok(if "in" == current.trim() { Direction::Input } else { Direction::Output })
		})?;

		let value = with_context!(("open value of GPIO {}", number),
			Ok(fs::OpenOptions::new().read(true).write(true).open(dir.join("value"))?)
		)?;

		let mut pin = SysfsPin {
			number,
			dir,
			value,
			direction,
			level: false,
		};
		pin.level = pin.get();
		Ok(pin)
	}

	fn set(&mut self, level: bool) {
		self.level = level;
		if Direction::Input == self.direction {
			trace!("GPIO {}: input, level {} applies once it is an output", self.number, level as u8);
			return;
		}

		let data: &[u8] = if level { b"1" } else { b"0" };
		if let Err(e) = self.value.write_at(data, 0) {
			error!("GPIO {}: couldn't set value: {}", self.number, e);
		}
	}

	fn get(&mut self) -> bool {
		let mut buf = [0u8];
		match self.value.read_at(&mut buf, 0) {
			Ok(1) => b'1' == buf[0],
			Ok(_) => {
				error!("GPIO {}: empty value", self.number);
				false
			},
			Err(e) => {
				error!("GPIO {}: couldn't read value: {}", self.number, e);
				false
			},
		}
	}

	fn set_direction(&mut self, direction: Direction) {
		// "high"/"low" switch to output with the level already applied
		let data: &[u8] = match direction {
			Direction::Input => b"in",
			Direction::Output if self.level => b"high",
			Direction::Output => b"low",
		};
		if let Err(e) = fs::write(self.dir.join("direction"), data) {
			error!("GPIO {}: couldn't set direction {:?}: {}", self.number, direction, e);
			return;
		}
		self.direction = direction;
	}
}

/// `Hardware` on Linux GPIO lines through `/sys/class/gpio`.
///
/// Levels set on a pin that is still an input are kept and applied when it
/// turns into an output, so CS can be deselected before it is driven.
///
/// Without `data_in` reading DATA returns what the master itself drives;
/// register reads need the separate input line.
pub struct SysfsPins {
	chip_select: SysfsPin,
	clock: SysfsPin,
	data: SysfsPin,
	data_in: Option<SysfsPin>,
}

impl SysfsPins {
	pub fn open(pins: PinNumbers) -> crate::AResult<Self> {
		Self::open_at(Path::new(GPIO_ROOT), pins)
	}

	/// `root` is the GPIO class directory (normally `GPIO_ROOT`)
	pub fn open_at(root: &Path, pins: PinNumbers) -> crate::AResult<Self> {
		let mut data_in = match pins.data_in {
			None => None,
			Some(number) => Some(SysfsPin::open(root, number)?),
		};
		if let Some(ref mut pin) = data_in {
			pin.set_direction(Direction::Input);
		}

		Ok(SysfsPins {
			chip_select: SysfsPin::open(root, pins.chip_select)?,
			clock: SysfsPin::open(root, pins.clock)?,
			data: SysfsPin::open(root, pins.data)?,
			data_in,
		})
	}

	pub fn has_data_in(&self) -> bool {
		self.data_in.is_some()
	}

	fn pin(&mut self, pin: Pin) -> &mut SysfsPin {
		match pin {
			Pin::ChipSelect => &mut self.chip_select,
			Pin::Clock => &mut self.clock,
			Pin::Data => &mut self.data,
		}
	}
}

impl Hardware for SysfsPins {
	fn set_pin(&mut self, pin: Pin, level: bool) {
		self.pin(pin).set(level);
	}

	fn read_pin(&mut self, pin: Pin) -> bool {
		if Pin::Data == pin {
			if let Some(ref mut data_in) = self.data_in {
				return data_in.get();
			}
		}
		self.pin(pin).get()
	}

	fn set_pin_direction(&mut self, pin: Pin, direction: Direction) {
		self.pin(pin).set_direction(direction);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bringup::{
		Bringup,
		BringupConfig,
	};
	use crate::gpio::HostPlatform;

	const CS: u32 = 10;
	const CLK: u32 = 11;
	const DATA: u32 = 12;
	const DIN: u32 = 13;

	// fake class directory with exported input pins, all reading low
	fn fake_root(name: &str) -> PathBuf {
		let root = std::env::temp_dir().join(format!("dit4192-gpio-{}-{}", name, std::process::id()));
		let _ = fs::remove_dir_all(&root);
		for number in [CS, CLK, DATA, DIN].iter() {
			let dir = root.join(format!("gpio{}", number));
			fs::create_dir_all(&dir).unwrap();
			fs::write(dir.join("direction"), "in\n").unwrap();
			fs::write(dir.join("value"), "0\n").unwrap();
		}
		root
	}

	fn read(root: &Path, number: u32, name: &str) -> String {
		fs::read_to_string(root.join(format!("gpio{}", number)).join(name)).unwrap().trim().to_string()
	}

	fn pins(data_in: Option<u32>) -> PinNumbers {
		PinNumbers {
			chip_select: CS,
			clock: CLK,
			data: DATA,
			data_in,
		}
	}

	#[test]
	fn level_set_on_input_is_applied_with_direction() {
		let root = fake_root("cs");
		let mut hw = SysfsPins::open_at(&root, pins(None)).unwrap();

		hw.set_pin(Pin::ChipSelect, true);
		assert_eq!(read(&root, CS, "value"), "0");
		assert_eq!(read(&root, CS, "direction"), "in");

		hw.set_pin_direction(Pin::ChipSelect, Direction::Output);
		assert_eq!(read(&root, CS, "direction"), "high");

		hw.set_pin_direction(Pin::Clock, Direction::Output);
		assert_eq!(read(&root, CLK, "direction"), "low");

		hw.set_pin(Pin::ChipSelect, false);
		assert_eq!(read(&root, CS, "value"), "0");
		hw.set_pin(Pin::ChipSelect, true);
		assert_eq!(read(&root, CS, "value"), "1");

		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn power_up_never_drives_chip_select_low() {
		let root = fake_root("power-up");
		let hw = SysfsPins::open_at(&root, pins(None)).unwrap();

		let mut bringup = Bringup::new(hw, HostPlatform, BringupConfig { settle_ms: 0, ..BringupConfig::default() });
		bringup.power_up();

		assert_eq!(read(&root, CS, "direction"), "high");
		assert_eq!(read(&root, CS, "value"), "1");
		assert_eq!(read(&root, CLK, "direction"), "low");
		assert_eq!(read(&root, DATA, "direction"), "low");

		fs::remove_dir_all(&root).unwrap();
	}

	#[test]
	fn data_is_sampled_from_data_in() {
		let root = fake_root("din");
		let mut hw = SysfsPins::open_at(&root, pins(Some(DIN))).unwrap();
		assert!(hw.has_data_in());
		assert_eq!(read(&root, DIN, "direction"), "in");

		hw.set_pin_direction(Pin::Data, Direction::Output);
		hw.set_pin(Pin::Data, true);
		assert_eq!(read(&root, DATA, "value"), "1");
		assert!(!hw.read_pin(Pin::Data));

		fs::write(root.join(format!("gpio{}", DIN)).join("value"), "1\n").unwrap();
		assert!(hw.read_pin(Pin::Data));

		fs::remove_dir_all(&root).unwrap();
	}
}
