use std::fmt::{Display};

use crate::ffb::convert;

/// An enumerated field held a value outside the set this crate knows about.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
#[error("Unknown({0})")]
pub struct UnknownCode(pub u32);

macro_rules! coded_enum {
	(
		$(#[$meta:meta])*
		pub enum $name:ident {
			$($variant:ident = $code:literal => $label:literal,)+
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
		#[repr(u32)]
		pub enum $name {
			$($variant = $code,)+
		}

		impl $name {
			pub fn all() -> impl Iterator<Item = $name> + DoubleEndedIterator + ExactSizeIterator {
				[$($name::$variant,)+].into_iter()
			}

			pub fn code(self) -> u32 {
				self as u32
			}

			pub fn label(self) -> &'static str {
				match self {
					$($name::$variant => $label,)+
				}
			}
		}

		impl Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.label())
			}
		}

		impl TryFrom<u32> for $name {
			type Error = UnknownCode;

			fn try_from(code: u32) -> Result<Self, UnknownCode> {
				match code {
					$($code => Ok($name::$variant),)+
					_ => Err(UnknownCode(code)),
				}
			}
		}
	};
}

coded_enum! {
	/// The primary subject of an FFB packet.
	pub enum PacketType {
		EffectReport = 0x01 => "Effect Report",
		EnvelopeReport = 0x02 => "Envelope Report",
		ConditionReport = 0x03 => "Condition Report",
		PeriodicReport = 0x04 => "Periodic Report",
		ConstantForceReport = 0x05 => "Constant Force Report",
		RampForceReport = 0x06 => "Ramp Force Report",
		CustomForceData = 0x07 => "Custom Force Data Report",
		DownloadForceSample = 0x08 => "Download Force Sample",
		EffectOperation = 0x0A => "Effect Operation Report",
		BlockFree = 0x0B => "PID Block Free Report",
		DeviceControl = 0x0C => "PID Device Control",
		DeviceGain = 0x0D => "Device Gain Report",
		SetCustomForce = 0x0E => "Set Custom Force Report",
		CreateNewEffect = 0x11 => "Create New Effect Report",
		BlockLoad = 0x12 => "Block Load Report",
		PoolReport = 0x13 => "PID Pool Report",
	}
}

coded_enum! {
	/// The kind of effect an effect slot holds. `None` is the driver's "no effect" marker and is
	/// never a meaningful effect kind.
	pub enum EffectType {
		None = 0 => "None",
		Constant = 1 => "Constant Force",
		Ramp = 2 => "Ramp",
		Square = 3 => "Square",
		Sine = 4 => "Sine",
		Triangle = 5 => "Triangle",
		SawtoothUp = 6 => "Sawtooth Up",
		SawtoothDown = 7 => "Sawtooth Down",
		Spring = 8 => "Spring",
		Damper = 9 => "Damper",
		Inertia = 10 => "Inertia",
		Friction = 11 => "Friction",
		Custom = 12 => "Custom Force",
	}
}

coded_enum! {
	pub enum ControlCommand {
		EnableActuators = 1 => "Enable Actuators",
		DisableActuators = 2 => "Disable Actuators",
		StopAll = 3 => "Stop All Effects",
		DeviceReset = 4 => "Device Reset",
		DevicePause = 5 => "Device Pause",
		DeviceContinue = 6 => "Device Continue",
	}
}

coded_enum! {
	pub enum Operation {
		Start = 1 => "Effect Start",
		SoloStart = 2 => "Effect Solo Start",
		Stop = 3 => "Effect Stop",
	}
}

coded_enum! {
	/// Outcome of the most recent effect block load.
	pub enum LoadStatus {
		Success = 1 => "Success",
		Full = 2 => "Full",
		Error = 3 => "Error",
	}
}

impl EffectType {
	/// Decodes an effect type code, treating the "no effect" marker as unknown.
	pub fn decode(code: u32) -> Result<EffectType, UnknownCode> {
		match EffectType::try_from(code)? {
			EffectType::None => Err(UnknownCode(code)),
			known => Ok(known),
		}
	}
}

/// A signed field as packed by the driver. Older drivers pack condition and force values into a
/// single byte, newer ones into a 16-bit word; both use two's complement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SignedField {
	Byte(u8),
	Word(u16),
}

impl SignedField {
	pub fn value(self) -> i32 {
		match self {
			SignedField::Byte(b) => convert::twos_complement_byte(b),
			SignedField::Word(w) => convert::twos_complement_word(w),
		}
	}
}

impl Default for SignedField {
	fn default() -> Self {
		SignedField::Word(0)
	}
}

impl Display for SignedField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.value().fmt(f)
	}
}

/// Device ID and effect block index carried by (almost) every packet.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Header {
	pub device_id: u8,

	/// Absent for packets that do not address a single effect slot (gain, device control, ...).
	pub block_index: Option<u8>,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct NewEffect {
	pub effect_type: u32,
	pub block_index: u8,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Condition {
	pub block_index: u8,
	pub is_y: bool,
	pub center_point_offset: SignedField,
	pub positive_coefficient: SignedField,
	pub negative_coefficient: SignedField,
	pub positive_saturation: u16,
	pub negative_saturation: u16,
	pub dead_band: u16,
}

/// Push direction of an effect.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
	Polar(u16),
	Cartesian { x: u16, y: u16 },
}

impl Default for Direction {
	fn default() -> Self {
		Direction::Cartesian { x: 0, y: 0 }
	}
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EffectReport {
	pub block_index: u8,
	pub effect_type: u32,
	pub axes_enabled_direction: u8,
	pub direction: Direction,
	pub duration: u16,
	pub trigger_repeat: u16,
	pub sample_period: u16,
	pub start_delay: u16,
	pub gain: u8,
	pub trigger_button: u8,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EffectOperation {
	pub block_index: u8,
	pub operation: u32,
	pub loop_count: u8,
}

impl EffectOperation {
	pub fn loops_until_stopped(&self) -> bool {
		self.loop_count == convert::LOOP_UNTIL_STOPPED
	}
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Envelope {
	pub block_index: u8,
	pub attack_level: u16,
	pub fade_level: u16,
	pub attack_time: u32,
	pub fade_time: u32,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Periodic {
	pub block_index: u8,
	pub magnitude: u16,
	pub offset: SignedField,
	pub phase: u16,
	pub period: u32,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Ramp {
	pub block_index: u8,
	pub start: SignedField,
	pub end: SignedField,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Constant {
	pub block_index: u8,
	pub magnitude: SignedField,
}

/// Result of the driver's most recent effect block load.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct BlockLoad {
	pub block_index: u8,
	pub status: u32,
	pub ram_pool_available: u16,
}

/// Snapshot of the driver's PID parameter block.
///
/// This is a diagnostic copy only: it is accurate immediately after being read and nothing else
/// may rely on it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PidBlock {
	pub next_free_effect_id: u8,
	pub last_effect_id: u8,
	pub block_load: BlockLoad,
}

/// The raw bytes of an FFB packet as delivered by the driver, used for frame dumps.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RawFrame<'a> {
	pub command: u32,
	pub data: &'a [u8],
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn packet_types_round_trip_through_codes() {
		assert_eq!(PacketType::all().len(), 16);
		for ty in PacketType::all() {
			assert_eq!(PacketType::try_from(ty.code()), Ok(ty));
		}
		assert_eq!(PacketType::try_from(0x09), Err(UnknownCode(9)));
		assert_eq!(PacketType::try_from(0x14), Err(UnknownCode(0x14)));
	}

	#[test]
	fn effect_none_is_not_a_known_effect() {
		assert_eq!(EffectType::decode(0), Err(UnknownCode(0)));
		assert_eq!(EffectType::decode(8), Ok(EffectType::Spring));
		assert_eq!(EffectType::decode(13), Err(UnknownCode(13)));
	}

	#[test]
	fn labels() {
		assert_eq!(ControlCommand::DeviceReset.to_string(), "Device Reset");
		assert_eq!(Operation::SoloStart.to_string(), "Effect Solo Start");
		assert_eq!(UnknownCode(42).to_string(), "Unknown(42)");
	}

	#[test]
	fn signed_fields_use_their_width() {
		assert_eq!(SignedField::Byte(0xFF).value(), -1);
		assert_eq!(SignedField::Word(0x00FF).value(), 255);
		assert_eq!(SignedField::Word(0xFF00).to_string(), "-256");
	}
}
