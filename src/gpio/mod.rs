use std::fmt;

use crate::bringup::{
	Platform,
	SleepMode,
};

// OS-specific. for now linux only.
mod linux;

pub use self::linux::SysfsPins;

/// Kernel GPIO numbers of the control port lines.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PinNumbers {
	pub chip_select: u32,
	pub clock: u32,
	pub data: u32,
	pub data_in: Option<u32>,
}

impl fmt::Display for PinNumbers {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "CS: {}, CLK: {}, DATA: {}", self.chip_select, self.clock, self.data)?;
		if let Some(data_in) = self.data_in {
			write!(f, " (in: {})", data_in)?;
		}
		Ok(())
	}
}

/// A Linux host can't be put to sleep on our behalf; log and carry on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
	fn disable_interrupts(&mut self) {
		debug!("host: not disabling interrupts");
	}

	fn set_sleep_mode(&mut self, mode: SleepMode) {
		debug!("host: sleep mode {:?} requested", mode);
	}

	fn sleep_cpu(&mut self) {
		info!("host: not sleeping, DIT4192 keeps its configuration");
	}
}
