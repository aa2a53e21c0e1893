use crate::{DeviceId};
use crate::ffb::types::*;

/// Field accessors over a driver-owned FFB packet.
///
/// Each accessor is independent: it returns `None` when the requested sub-record is not
/// present in the packet, which is the normal case for most accessors on most packets. Several
/// accessors may succeed on the same packet.
///
/// Implementations are called from whatever thread the driver delivers packets on, and must not
/// block.
pub trait FfbSource {
	/// The packet handle type. Packets are borrowed for the duration of a single decode and never
	/// retained.
	type Packet: ?Sized;

	/// Reads the driver's current PID block for `device`, or `None` if the driver refuses.
	fn read_pid_block(&self, device: DeviceId) -> Option<PidBlock>;

	fn header(&self, packet: &Self::Packet) -> Option<Header>;

	/// Raw packet type code; see [`PacketType`].
	fn packet_type(&self, packet: &Self::Packet) -> Option<u32>;

	/// Raw device control code; see [`ControlCommand`].
	fn device_control(&self, packet: &Self::Packet) -> Option<u32>;

	fn new_effect(&self, packet: &Self::Packet) -> Option<NewEffect>;

	fn condition(&self, packet: &Self::Packet) -> Option<Condition>;

	fn effect_report(&self, packet: &Self::Packet) -> Option<EffectReport>;

	fn effect_operation(&self, packet: &Self::Packet) -> Option<EffectOperation>;

	/// Global device gain, 0..=255.
	fn device_gain(&self, packet: &Self::Packet) -> Option<u8>;

	fn envelope(&self, packet: &Self::Packet) -> Option<Envelope>;

	fn periodic(&self, packet: &Self::Packet) -> Option<Periodic>;

	fn ramp(&self, packet: &Self::Packet) -> Option<Ramp>;

	fn constant(&self, packet: &Self::Packet) -> Option<Constant>;

	/// The packet's raw bytes, if the source can expose them.
	fn raw_frame<'p>(&self, _packet: &'p Self::Packet) -> Option<RawFrame<'p>> {
		None
	}
}

impl<S: FfbSource + ?Sized> FfbSource for &S {
	type Packet = S::Packet;

	fn read_pid_block(&self, device: DeviceId) -> Option<PidBlock> { (**self).read_pid_block(device) }
	fn header(&self, packet: &Self::Packet) -> Option<Header> { (**self).header(packet) }
	fn packet_type(&self, packet: &Self::Packet) -> Option<u32> { (**self).packet_type(packet) }
	fn device_control(&self, packet: &Self::Packet) -> Option<u32> { (**self).device_control(packet) }
	fn new_effect(&self, packet: &Self::Packet) -> Option<NewEffect> { (**self).new_effect(packet) }
	fn condition(&self, packet: &Self::Packet) -> Option<Condition> { (**self).condition(packet) }
	fn effect_report(&self, packet: &Self::Packet) -> Option<EffectReport> { (**self).effect_report(packet) }
	fn effect_operation(&self, packet: &Self::Packet) -> Option<EffectOperation> { (**self).effect_operation(packet) }
	fn device_gain(&self, packet: &Self::Packet) -> Option<u8> { (**self).device_gain(packet) }
	fn envelope(&self, packet: &Self::Packet) -> Option<Envelope> { (**self).envelope(packet) }
	fn periodic(&self, packet: &Self::Packet) -> Option<Periodic> { (**self).periodic(packet) }
	fn ramp(&self, packet: &Self::Packet) -> Option<Ramp> { (**self).ramp(packet) }
	fn constant(&self, packet: &Self::Packet) -> Option<Constant> { (**self).constant(packet) }
	fn raw_frame<'p>(&self, packet: &'p Self::Packet) -> Option<RawFrame<'p>> { (**self).raw_frame(packet) }
}
