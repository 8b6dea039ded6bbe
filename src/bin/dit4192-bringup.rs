#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate dit4192_bringup;
use dit4192_bringup::*;

use std::process::exit;

use dit4192_bringup::bringup::{
	Bringup,
	BringupConfig,
};
use dit4192_bringup::dit4192::{
	Register,
	RegisterOperations,
};
use dit4192_bringup::serial::Hardware;
use dit4192_bringup::sim::{
	SimulatedBus,
	SimulatedPlatform,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_optional_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	if matches.is_present(name) {
		get_param(matches, name).map(Some)
	} else {
		Ok(None)
	}
}

fn bringup_config(matches: &clap::ArgMatches) -> AResult<BringupConfig> {
	let mut config = BringupConfig::default();

	if let Some(word_length) = get_optional_param(matches, "wlen")? {
		config.audio_serial_port.word_length = word_length;
	}
	if let Some(justification) = get_optional_param(matches, "justify")? {
		config.audio_serial_port.justification = justification;
	}
	if let Some(mclk_rate) = get_optional_param(matches, "mclk")? {
		config.power_down_clock.mclk_rate = mclk_rate;
	}
	if let Some(settle_ms) = get_optional_param(matches, "settle")? {
		config.settle_ms = settle_ms;
	}

	Ok(config)
}

fn hex(bytes: &[u8]) -> String {
	bytes.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
}

// read the configured registers back over the bus
fn verify<H: Hardware>(hardware: &mut H, config: &BringupConfig) -> AResult<()> {
	let expected = [
		(Register::AudioSerialPortControl, config.audio_serial_port.value()),
		(Register::PowerDownClockControl, config.power_down_clock.value()),
	];
	for &(register, value) in expected.iter() {
		let actual = hardware.read(register);
		ensure!(actual == value,
			"{}: read 0x{:02x}, expected 0x{:02x}", register, actual, value
		);
	}
	Ok(())
}

fn simulate(sub_m: &clap::ArgMatches) -> AResult<()> {
	let config = bringup_config(sub_m)?;

	let mut bringup = Bringup::new(SimulatedBus::new(), SimulatedPlatform::new(), config);
	bringup.bring_up();
	let state = bringup.state();
	let (mut bus, platform) = bringup.into_parts();

	for (i, tx) in bus.transactions().iter().enumerate() {
		println!("#{}: {}", i, hex(&tx.bytes));
	}
	println!("state: {:?} (interrupts {}, sleep mode {:?})",
		state,
		if platform.interrupts_enabled() { "enabled" } else { "disabled" },
		platform.sleep_mode(),
	);

	let ignored = bus.chip().ignored_transactions();
	if ignored > 0 {
		warn!("simulated DIT4192 ignored {} transaction(s) sent before it settled", ignored);
	}

	if sub_m.is_present("dump") {
		for register in Register::ALL.iter() {
			println!("{:<44} 0x{:02x}", register.to_string(), bus.read(*register));
		}
	}

	if sub_m.is_present("verify") {
		verify(&mut bus, &config)?;
		println!("configuration verified");
	}

	Ok(())
}

fn run_gpio(sub_m: &clap::ArgMatches) -> AResult<()> {
	let config = bringup_config(sub_m)?;
	let pins = gpio::PinNumbers {
		chip_select: get_param(sub_m, "cs")?,
		clock: get_param(sub_m, "clock")?,
		data: get_param(sub_m, "data")?,
		data_in: get_optional_param(sub_m, "din")?,
	};
	info!("GPIO {}", pins);

	let hardware = gpio::SysfsPins::open(pins)?;
	let mut bringup = Bringup::new(hardware, gpio::HostPlatform, config);
	bringup.bring_up();

	if sub_m.is_present("verify") {
		let (mut hardware, _) = bringup.into_parts();
		verify(&mut hardware, &config)?;
		println!("configuration verified");
	}

	Ok(())
}

fn list_fields() -> AResult<()> {
	for register in Register::ALL.iter() {
		println!("{}", register);
		for field in register.fields() {
			println!("    {}", field);
		}
	}

	Ok(())
}

fn app() -> clap::App<'static, 'static> {
	clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand simulate =>
			(about: "run the bring-up sequence against a simulated DIT4192")
			(@arg wlen: --wlen +takes_value "audio word length in bits (24, 20, 18, 16; default 20)")
			(@arg justify: --justify +takes_value "audio data justification (left, right; default right)")
			(@arg mclk: --mclk +takes_value "MCLK rate in fs (128, 256, 384, 512; default 256)")
			(@arg settle: --settle +takes_value "power-up settling delay in ms (default 5)")
			(@arg dump: -d --dump "read back all control registers afterwards")
			(@arg verify: --verify "read back the configured registers and compare")
		)
		(@subcommand gpio =>
			(about: "run the bring-up sequence on Linux sysfs GPIO lines")
			(@arg cs: --cs +takes_value +required "GPIO number of chip select")
			(@arg clock: --clock +takes_value +required "GPIO number of the clock line")
			(@arg data: --data +takes_value +required "GPIO number of the data line")
			(@arg din: --din +takes_value "GPIO number wired to the data line as input (needed to read registers)")
			(@arg wlen: --wlen +takes_value "audio word length in bits (24, 20, 18, 16; default 20)")
			(@arg justify: --justify +takes_value "audio data justification (left, right; default right)")
			(@arg mclk: --mclk +takes_value "MCLK rate in fs (128, 256, 384, 512; default 256)")
			(@arg settle: --settle +takes_value "power-up settling delay in ms (default 5)")
			(@arg verify: --verify requires[din] "read back the configured registers and compare")
		)
		(@subcommand fields =>
			(about: "list DIT4192 control registers and their fields")
		)
	)
}

fn main_app() -> AResult<()> {
	let matches = app().get_matches();

	match matches.subcommand() {
		("simulate", Some(sub_m)) => {
			simulate(sub_m)
		}
		("gpio", Some(sub_m)) => {
			run_gpio(sub_m)
		}
		("fields", _) => {
			list_fields()
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
