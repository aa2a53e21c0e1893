use std::fmt::{Display};

use log::{Level};

use crate::{DeviceId};
use crate::ffb::convert;
use crate::ffb::frame::{FrameDump};
use crate::ffb::source::{FfbSource};
use crate::ffb::types::*;

/// One human-readable observation about a decoded packet.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Diagnostic {
	pub level: Level,
	pub message: String,
}

impl Diagnostic {
	pub fn info(message: impl Into<String>) -> Diagnostic {
		Diagnostic { level: Level::Info, message: message.into() }
	}

	pub fn warn(message: impl Into<String>) -> Diagnostic {
		Diagnostic { level: Level::Warn, message: message.into() }
	}

	pub fn is_warning(&self) -> bool {
		self.level <= Level::Warn
	}
}

impl Display for Diagnostic {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.message)
	}
}

/// Decodes FFB packets delivered by a driver into [`Diagnostic`]s.
///
/// The decoder keeps a cached copy of the driver's PID block, refreshed after device resets,
/// block frees and effect creation. It holds no locks: the driver delivers at most one packet at a
/// time per registered device, and the decoder relies on the caller to uphold that. Any wrapper
/// that routes packets from several threads must serialize calls to [`FfbDecoder::decode`].
#[derive(Debug)]
pub struct FfbDecoder<S> {
	source: S,
	device: Option<DeviceId>,
	pid: PidBlock,
	registered: bool,
	dump_frames: bool,
}

/// State of a single decode: the packet, the device it addresses, and the lines produced so far.
struct Pass<'p, P: ?Sized> {
	packet: &'p P,
	device: Option<DeviceId>,
	out: Vec<Diagnostic>,
}

impl<P: ?Sized> Pass<'_, P> {
	fn info(&mut self, message: impl Into<String>) {
		self.out.push(Diagnostic::info(message));
	}

	fn warn(&mut self, message: impl Into<String>) {
		self.out.push(Diagnostic::warn(message));
	}

	/// Reports a coded field, at warning level if the code is unknown.
	fn coded<T: Display>(&mut self, label: &str, value: Result<T, UnknownCode>) {
		match value {
			Ok(known) => self.info(format!("{}: {}", label, known)),
			Err(unknown) => self.warn(format!("{}: {}", label, unknown)),
		}
	}
}

type Extractor<S> = fn(&mut FfbDecoder<S>, &mut Pass<'_, <S as FfbSource>::Packet>);

/// Bound on the lines a single packet can produce, used to size the output up front.
const MAX_LINES: usize = 48;

impl<S: FfbSource> FfbDecoder<S> {
	/// Sub-record extractors, in the order they are attempted. The header comes first since it names
	/// the device every later extractor refers to.
	const EXTRACTORS: [(&'static str, Extractor<S>); 12] = [
		("header", Self::extract_header),
		("packet type", Self::extract_packet_type),
		("device control", Self::extract_device_control),
		("new effect", Self::extract_new_effect),
		("condition", Self::extract_condition),
		("effect report", Self::extract_effect_report),
		("effect operation", Self::extract_effect_operation),
		("device gain", Self::extract_device_gain),
		("envelope", Self::extract_envelope),
		("periodic", Self::extract_periodic),
		("ramp", Self::extract_ramp),
		("constant", Self::extract_constant),
	];

	pub fn new(source: S) -> FfbDecoder<S> {
		FfbDecoder {
			source,
			device: None,
			pid: PidBlock::default(),
			registered: false,
			dump_frames: false,
		}
	}

	/// Appends a hex dump of each packet's raw frame, when the source can provide one.
	pub fn with_frame_dump(mut self, dump_frames: bool) -> FfbDecoder<S> {
		self.dump_frames = dump_frames;
		self
	}

	/// Binds the decoder to `device` and reads its PID block.
	///
	/// The device must support force feedback; this is not checked. Returns `true` only for the
	/// first registration, which is when the caller should route the driver's packets to this
	/// decoder. Later calls rebind and re-read the PID block, but must not subscribe again.
	pub fn register(&mut self, device: DeviceId) -> bool {
		self.device = Some(device);
		match self.source.read_pid_block(device) {
			Some(pid) => self.pid = pid,
			None => log::warn!("Failed to read the PID block of vJoy device #{}.", device),
		}

		let first = !self.registered;
		self.registered = true;

		if first {
			log::debug!("FFB decoder registered for vJoy device #{}.", device);
		}

		first
	}

	pub fn device(&self) -> Option<DeviceId> {
		self.device
	}

	pub fn is_registered(&self) -> bool {
		self.registered
	}

	pub fn pid_block(&self) -> &PidBlock {
		&self.pid
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	/// Decodes one packet. Sub-records the packet does not carry are silently skipped.
	pub fn decode(&mut self, packet: &S::Packet) -> Vec<Diagnostic> {
		let mut pass = Pass {
			packet,
			device: self.device,
			out: Vec::with_capacity(MAX_LINES),
		};

		for (name, extract) in Self::EXTRACTORS {
			let before = pass.out.len();
			extract(self, &mut pass);
			if pass.out.len() > before {
				log::trace!("FFB {} sub-record decoded.", name);
			}
		}

		if self.dump_frames {
			if let Some(frame) = self.source.raw_frame(packet) {
				pass.info(FrameDump(frame).to_string());
			}
		}

		pass.out
	}

	/// Re-reads the PID block of `device`, the device the current packet addresses. On failure
	/// the previous snapshot is kept.
	fn refresh_pid(&mut self, device: Option<DeviceId>) -> Result<(), RefreshError> {
		let device = device.ok_or(RefreshError::NoDevice)?;
		self.pid = self.source.read_pid_block(device)
			.ok_or(RefreshError::ReadFailed(device))?;
		Ok(())
	}

	fn extract_header(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(header) = self.source.header(pass.packet) else { return };

		if let Ok(id) = DeviceId::from_raw(header.device_id) {
			pass.device = Some(id);
		}

		match header.block_index {
			Some(index) => pass.info(format!("Device ID: {}, Effect Block Index: {}", header.device_id, index)),
			None => pass.info(format!("Device ID: {}", header.device_id)),
		}
	}

	fn extract_packet_type(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(code) = self.source.packet_type(pass.packet) else { return };

		match PacketType::try_from(code) {
			Ok(ty @ (PacketType::PoolReport | PacketType::BlockLoad)) => {
				pass.info(format!("Packet Type: {} (handled by driver)", ty));
			},

			// One line whether or not the refresh succeeds.
			Ok(ty @ PacketType::BlockFree) => match self.refresh_pid(pass.device) {
				Ok(()) => pass.info(format!("Packet Type: {}, next free effect id {}", ty, self.pid.next_free_effect_id)),
				Err(e) => pass.warn(format!("Packet Type: {}, PID block unavailable ({})", ty, e)),
			},

			other => pass.coded("Packet Type", other),
		}
	}

	fn extract_device_control(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(code) = self.source.device_control(pass.packet) else { return };

		let command = ControlCommand::try_from(code);
		pass.coded("PID Device Control", command);

		// The driver drops every effect on reset.
		if command == Ok(ControlCommand::DeviceReset) {
			if let Err(e) = self.refresh_pid(pass.device) {
				pass.warn(e.to_string());
			}
		}
	}

	fn extract_new_effect(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(effect) = self.source.new_effect(pass.packet) else { return };

		let refreshed = self.refresh_pid(pass.device);
		if let Err(e) = &refreshed {
			pass.warn(e.to_string());
		}

		pass.coded("Effect Type", EffectType::decode(effect.effect_type));
		pass.info(format!("New Effect ID: {}", effect.block_index));

		if refreshed.is_err() {
			return;
		}

		let load = self.pid.block_load;
		if effect.block_index != load.block_index {
			pass.warn(format!("New effect block index {} does not match PID block load index {}.",
				effect.block_index, load.block_index));
		}

		pass.coded("Load Status", LoadStatus::try_from(load.status));
	}

	fn extract_condition(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(cond) = self.source.condition(pass.packet) else { return };

		pass.info(format!("Condition: {} Axis", if cond.is_y { "Y" } else { "X" }));
		pass.info(format!("Center Point Offset: {}", cond.center_point_offset));
		pass.info(format!("Positive Coefficient: {}", cond.positive_coefficient));
		pass.info(format!("Negative Coefficient: {}", cond.negative_coefficient));
		pass.info(format!("Positive Saturation: {}", cond.positive_saturation));
		pass.info(format!("Negative Saturation: {}", cond.negative_saturation));
		pass.info(format!("Dead Band: {}", cond.dead_band));
	}

	fn extract_effect_report(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(effect) = self.source.effect_report(pass.packet) else { return };

		pass.coded("Effect Report", EffectType::decode(effect.effect_type));
		pass.info(format!("Axes Enabled Direction: {}", effect.axes_enabled_direction));

		match effect.direction {
			Direction::Polar(polar) => {
				pass.info(format!("Direction: {} deg ({})", convert::polar_to_degrees(polar), polar));
			},

			Direction::Cartesian { x, y } => {
				pass.info(format!("X Direction: {}", x));
				pass.info(format!("Y Direction: {}", y));
			},
		}

		pass.info(format!("Duration: {}", Limit(effect.duration, " ms")));
		pass.info(format!("Trigger Repeat: {}", Limit(effect.trigger_repeat, "")));
		pass.info(format!("Sample Period: {}", Limit(effect.sample_period, "")));

		if effect.start_delay == convert::INFINITE_WORD {
			pass.info("Start Delay: max");
		} else {
			pass.info(format!("Start Delay: {}", effect.start_delay));
		}

		pass.info(format!("Gain: {}%", convert::byte_to_percent(effect.gain)));
	}

	fn extract_effect_operation(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(op) = self.source.effect_operation(pass.packet) else { return };

		pass.coded("Effect Operation", Operation::try_from(op.operation));
		if op.loops_until_stopped() {
			pass.info("Loop until stopped");
		} else {
			pass.info(format!("Loop {} times", op.loop_count));
		}
	}

	fn extract_device_gain(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(gain) = self.source.device_gain(pass.packet) else { return };
		pass.info(format!("Global Device Gain: {}%", convert::byte_to_percent(gain)));
	}

	fn extract_envelope(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(env) = self.source.envelope(pass.packet) else { return };

		pass.info(format!("Attack Level: {}", env.attack_level));
		pass.info(format!("Fade Level: {}", env.fade_level));
		pass.info(format!("Attack Time: {}", env.attack_time));
		pass.info(format!("Fade Time: {}", env.fade_time));
	}

	fn extract_periodic(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(prd) = self.source.periodic(pass.packet) else { return };

		let phase = convert::phase_to_decidegrees(prd.phase);
		pass.info(format!("Magnitude: {}", prd.magnitude));
		pass.info(format!("Offset: {}", prd.offset));
		pass.info(format!("Phase: {}.{} deg", phase / 10, phase % 10));
		pass.info(format!("Period: {}", prd.period));
	}

	fn extract_ramp(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(ramp) = self.source.ramp(pass.packet) else { return };

		pass.info(format!("Ramp Start: {}", ramp.start));
		pass.info(format!("Ramp End: {}", ramp.end));
	}

	fn extract_constant(&mut self, pass: &mut Pass<'_, S::Packet>) {
		let Some(cst) = self.source.constant(pass.packet) else { return };

		pass.info(format!("Constant Block Index: {}", cst.block_index));
		pass.info(format!("Constant Magnitude: {}", cst.magnitude));
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
enum RefreshError {
	#[error("PID block not refreshed: the packet names no device.")]
	NoDevice,

	#[error("Failed to read the PID block of device {0}; keeping the previous snapshot.")]
	ReadFailed(DeviceId),
}

/// A duration-like field where `0xFFFF` means "no limit".
struct Limit(u16, &'static str);

impl Display for Limit {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.0 == convert::INFINITE_WORD {
			f.write_str("infinite")
		} else {
			write!(f, "{}{}", self.0, self.1)
		}
	}
}
