use std::time::{Duration};

use anyhow::{Result as AnyResult};
use clap::{Parser};
use clap::builder::{TypedValueParser};
use vjoy_feeder::{DeviceId};

#[cfg_attr(not(windows), allow(dead_code))]
mod synthetic;

/// Feeds a vJoy device from a physical controller and optionally logs the force-feedback packets sent to it.
#[derive(Debug, Parser)]
#[cfg_attr(not(windows), allow(dead_code))]
#[command(author, version, about, long_about = None)]
struct Args {
	/// vJoy device to feed (1-16).
	#[arg(short, long, default_value = "1")]
	device: DeviceId,

	/// Updates per second.
	#[arg(short, long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..=1000))]
	rate: u32,

	/// Decode and log FFB packets for the device.
	#[arg(long)]
	ffb: bool,

	/// Also log the raw bytes of every FFB packet.
	#[arg(long, requires = "ffb")]
	dump_frames: bool,

	/// Physical button (0-based) to keep released. May be repeated.
	#[arg(short, long = "mask", value_name = "BUTTON")]
	masked: Vec<usize>,

	/// Record axis ranges until the trigger is pressed before feeding.
	#[arg(long)]
	calibrate: bool,

	/// Physical controller to read, by its number in the listing. Defaults to the first one.
	#[arg(short, long, value_name = "NUMBER", value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
	joystick: Option<usize>,

	/// Feed generated sine-wave input instead of reading a physical controller.
	#[arg(long, conflicts_with = "joystick")]
	synthetic: bool,
}

impl Args {
	fn period(&self) -> Duration {
		Duration::from_nanos(1_000_000_000 / u64::from(self.rate))
	}
}

fn main() -> AnyResult<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	log::debug!("{:?}", args);

	run(args)
}

#[cfg(not(windows))]
fn run(_args: Args) -> AnyResult<()> {
	anyhow::bail!("vJoy is only available on Windows.")
}

#[cfg(windows)]
fn run(args: Args) -> AnyResult<()> {
	use anyhow::{Context as _};
	use vjoy_feeder::{AxisLimits, Gamepads, Interface};
	use vjoy_feeder::ffb::sys::{FfbListener};

	use crate::synthetic::{SyntheticJoystick};

	let id = args.device;
	let vjoy = Interface::new()?;
	println!("{}", vjoy.attributes());

	let slot = vjoy.device_slot(id)?
		.with_context(|| format!("vJoy Device {} is not installed or disabled", id))?;

	let status = slot.status();
	println!("{}", status.describe(id));
	if !status.is_usable() {
		anyhow::bail!("Cannot continue with vJoy Device {}.", id);
	}

	println!("\nvJoy Device {} capabilities:\n{}\n", id, slot.capabilities()?);
	println!("{}", vjoy.versions());

	let mut limits = AxisLimits::default();
	for axis in slot.axes() {
		limits.set(axis, slot.axis_range(axis)?);
	}

	let buttons = slot.num_buttons()?;
	let device = slot.acquire()
		.map_err(|_| anyhow::anyhow!("Failed to acquire vJoy device number {}.", id))?;
	println!("Acquired: vJoy device number {}.", id);

	// Stays registered with the driver for as long as the process runs.
	let _listener = match (args.ffb, device.supports_ffb()) {
		(true, true) => {
			let mut listener = FfbListener::new(args.dump_frames);
			listener.register(&device);
			Some(listener)
		},
		(true, false) => {
			log::warn!("vJoy Device {} was not configured with force feedback.", id);
			None
		},
		(false, _) => None,
	};

	if args.synthetic {
		return feed(&args, SyntheticJoystick::new(buttons), device, limits);
	}

	let gamepads = Gamepads::new()?;
	for pad in gamepads.list() {
		println!("{}: {}", pad.number, pad.name);
	}

	let joystick = gamepads.open(args.joystick)?;
	println!("Using device: {}", joystick.name());
	feed(&args, joystick, device, limits)
}

#[cfg(windows)]
fn feed<J: vjoy_feeder::PhysicalJoystick>(
	args: &Args,
	joystick: J,
	device: vjoy_feeder::OwnedDeviceSlot,
	limits: vjoy_feeder::AxisLimits,
) -> AnyResult<()> {
	use vjoy_feeder::{ButtonMask, Feeder};

	let id = device.id();
	let mut feeder = Feeder::new(joystick, device, id)
		.with_mask(ButtonMask::new(args.masked.iter().copied()))
		.with_limits(limits);

	if args.calibrate {
		println!("Move every axis through its range, then press the trigger.");
		feeder.calibrate(args.period(), |c| log::trace!("Calibration sample {}", c.samples()))?;
		log::info!("Calibrated from {} samples.", feeder.calibration().map_or(0, |c| c.samples()));
	}

	feeder.run(args.period(), |_| false)?;
	Ok(())
}
