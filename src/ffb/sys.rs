//! [`FfbSource`] over the vJoy interface library's `Ffb_h_*` accessors, and the callback that
//! routes the driver's packets into an [`FfbDecoder`].

use std::ffi::{c_void};
use std::ptr::{NonNull};

use vjoy_sys::{FFB_DATA};

use crate::{DeviceId, OwnedDeviceSlot};
use crate::ffb::*;

const ERROR_SUCCESS: u32 = 0;

/// Size of the `size`/`cmd` prefix the driver counts into `FFB_DATA::size`.
const FRAME_PREFIX: usize = 8;

/// The vJoy interface library's FFB accessors.
///
/// The accessors only read the packet they are handed, so this needs no [`crate::VJoyLock`] and
/// may be used from the driver's callback thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct VJoyFfb;

static_assertions::assert_impl_all!(VJoyFfb: Send, Sync);
static_assertions::assert_impl_all!(FfbDecoder<VJoyFfb>: Send);

/// Runs an accessor against a zeroed out-parameter, keeping the value only on success.
unsafe fn extract<T>(accessor: impl FnOnce(*mut T) -> u32) -> Option<T> {
	let mut out: T = std::mem::zeroed();
	(accessor(&mut out) == ERROR_SUCCESS).then_some(out)
}

impl FfbSource for VJoyFfb {
	type Packet = FFB_DATA;

	fn read_pid_block(&self, device: DeviceId) -> Option<PidBlock> {
		let mut pid: vjoy_sys::FFB_DEVICE_PID = unsafe { std::mem::zeroed() };
		let read = unsafe { vjoy_sys::FfbReadPID(device.to_raw() as u32, &mut pid) } != 0;

		read.then(|| PidBlock {
			next_free_effect_id: pid.NextFreeEID as u8,
			last_effect_id: pid.LastEID as u8,
			block_load: BlockLoad {
				block_index: pid.PIDBlockLoad.EffectBlockIndex as u8,
				status: pid.PIDBlockLoad.LoadStatus as u32,
				ram_pool_available: pid.PIDBlockLoad.RAMPoolAvailable as u16,
			},
		})
	}

	fn header(&self, packet: &FFB_DATA) -> Option<Header> {
		unsafe {
			let device_id = extract(|id| vjoy_sys::Ffb_h_DeviceID(packet, id))?;
			let block_index = extract(|index| vjoy_sys::Ffb_h_EBI(packet, index));

			Some(Header {
				device_id: device_id as u8,
				block_index: block_index.map(|i| i as u8),
			})
		}
	}

	fn packet_type(&self, packet: &FFB_DATA) -> Option<u32> {
		unsafe { extract(|ty| vjoy_sys::Ffb_h_Type(packet, ty)) }
			.map(|ty| ty as u32)
	}

	fn device_control(&self, packet: &FFB_DATA) -> Option<u32> {
		unsafe { extract(|ctrl| vjoy_sys::Ffb_h_DevCtrl(packet, ctrl)) }
			.map(|ctrl| ctrl as u32)
	}

	fn new_effect(&self, packet: &FFB_DATA) -> Option<NewEffect> {
		let mut effect_type: vjoy_sys::FFBEType = unsafe { std::mem::zeroed() };
		let mut block_index = 0;
		let status = unsafe { vjoy_sys::Ffb_h_CreateNewEffect(packet, &mut effect_type, &mut block_index) };

		(status == ERROR_SUCCESS).then(|| NewEffect {
			effect_type: effect_type as u32,
			block_index: block_index as u8,
		})
	}

	fn condition(&self, packet: &FFB_DATA) -> Option<Condition> {
		let c: vjoy_sys::FFB_EFF_COND = unsafe { extract(|c| vjoy_sys::Ffb_h_Eff_Cond(packet, c)) }?;

		Some(Condition {
			block_index: c.EffectBlockIndex as u8,
			is_y: c.isY != 0,
			center_point_offset: SignedField::Word(c.CenterPointOffset as u16),
			positive_coefficient: SignedField::Word(c.PosCoeff as u16),
			negative_coefficient: SignedField::Word(c.NegCoeff as u16),
			positive_saturation: c.PosSatur as u16,
			negative_saturation: c.NegSatur as u16,
			dead_band: c.DeadBand as u16,
		})
	}

	fn effect_report(&self, packet: &FFB_DATA) -> Option<EffectReport> {
		let e: vjoy_sys::FFB_EFF_REPORT = unsafe { extract(|e| vjoy_sys::Ffb_h_Eff_Report(packet, e)) }?;

		// Direction and DirX share storage; Polar says which one the driver wrote.
		let direction = unsafe {
			if e.Polar != 0 {
				Direction::Polar(e.__bindgen_anon_1.Direction as u16)
			} else {
				Direction::Cartesian { x: e.__bindgen_anon_1.DirX as u16, y: e.DirY as u16 }
			}
		};

		Some(EffectReport {
			block_index: e.EffectBlockIndex as u8,
			effect_type: e.EffectType as u32,
			axes_enabled_direction: e.AxesEnabledDirection as u8,
			direction,
			duration: e.Duration as u16,
			trigger_repeat: e.TrigerRpt as u16,
			sample_period: e.SamplePrd as u16,
			start_delay: e.StartDelay as u16,
			gain: e.Gain as u8,
			trigger_button: e.TrigerBtn as u8,
		})
	}

	fn effect_operation(&self, packet: &FFB_DATA) -> Option<EffectOperation> {
		let op: vjoy_sys::FFB_EFF_OP = unsafe { extract(|op| vjoy_sys::Ffb_h_EffOp(packet, op)) }?;

		Some(EffectOperation {
			block_index: op.EffectBlockIndex as u8,
			operation: op.EffectOp as u32,
			loop_count: op.LoopCount as u8,
		})
	}

	fn device_gain(&self, packet: &FFB_DATA) -> Option<u8> {
		unsafe { extract(|gain| vjoy_sys::Ffb_h_DevGain(packet, gain)) }
			.map(|gain| gain as u8)
	}

	fn envelope(&self, packet: &FFB_DATA) -> Option<Envelope> {
		let env: vjoy_sys::FFB_EFF_ENVLP = unsafe { extract(|env| vjoy_sys::Ffb_h_Eff_Envlp(packet, env)) }?;

		Some(Envelope {
			block_index: env.EffectBlockIndex as u8,
			attack_level: env.AttackLevel as u16,
			fade_level: env.FadeLevel as u16,
			attack_time: env.AttackTime as u32,
			fade_time: env.FadeTime as u32,
		})
	}

	fn periodic(&self, packet: &FFB_DATA) -> Option<Periodic> {
		let prd: vjoy_sys::FFB_EFF_PERIOD = unsafe { extract(|prd| vjoy_sys::Ffb_h_Eff_Period(packet, prd)) }?;

		Some(Periodic {
			block_index: prd.EffectBlockIndex as u8,
			magnitude: prd.Magnitude as u16,
			offset: SignedField::Word(prd.Offset as u16),
			phase: prd.Phase as u16,
			period: prd.Period as u32,
		})
	}

	fn ramp(&self, packet: &FFB_DATA) -> Option<Ramp> {
		let ramp: vjoy_sys::FFB_EFF_RAMP = unsafe { extract(|ramp| vjoy_sys::Ffb_h_Eff_Ramp(packet, ramp)) }?;

		Some(Ramp {
			block_index: ramp.EffectBlockIndex as u8,
			start: SignedField::Word(ramp.Start as u16),
			end: SignedField::Word(ramp.End as u16),
		})
	}

	fn constant(&self, packet: &FFB_DATA) -> Option<Constant> {
		let cst: vjoy_sys::FFB_EFF_CONSTANT = unsafe { extract(|cst| vjoy_sys::Ffb_h_Eff_Constant(packet, cst)) }?;

		Some(Constant {
			block_index: cst.EffectBlockIndex as u8,
			magnitude: SignedField::Word(cst.Magnitude as u16),
		})
	}

	fn raw_frame<'p>(&self, packet: &'p FFB_DATA) -> Option<RawFrame<'p>> {
		let len = (packet.size as usize).checked_sub(FRAME_PREFIX)?;
		if packet.data.is_null() {
			return None;
		}

		// The driver keeps `data` alive for as long as the packet itself.
		let data = unsafe { std::slice::from_raw_parts(packet.data as *const u8, len) };
		Some(RawFrame { command: packet.cmd as u32, data })
	}
}

/// Routes the driver's FFB packets into an [`FfbDecoder`] and logs the result.
///
/// The driver invokes the callback from a thread of its own, one packet at a time. The decoder is
/// handed to the driver by address and the driver offers no way to take it back, so it lives for
/// the rest of the process; dropping the listener leaks it.
#[derive(Debug)]
pub struct FfbListener {
	decoder: NonNull<FfbDecoder<VJoyFfb>>,
}

impl FfbListener {
	pub fn new(dump_frames: bool) -> FfbListener {
		let decoder = Box::new(FfbDecoder::new(VJoyFfb).with_frame_dump(dump_frames));

		FfbListener {
			decoder: NonNull::from(Box::leak(decoder)),
		}
	}

	/// Registers the decoder for `device` and, the first time only, installs the driver callback.
	///
	/// The device must support force feedback ([`crate::DeviceSlot::supports_ffb`]). Calling this
	/// again rebinds the decoder and must not race with packet delivery.
	pub fn register(&mut self, device: &OwnedDeviceSlot) {
		// Exclusive access: the callback is not installed yet, or the caller has ensured the
		// driver is quiescent.
		let decoder = unsafe { self.decoder.as_mut() };

		if decoder.register(device.id()) {
			unsafe { vjoy_sys::FfbRegisterGenCB(Some(on_packet), self.decoder.as_ptr() as *mut c_void); }
			log::info!("Listening for FFB packets of vJoy device #{}.", device.id());
		}
	}
}

unsafe extern "C" fn on_packet(data: *mut c_void, user: *mut c_void) {
	let packet = (data as *const FFB_DATA).as_ref();
	let decoder = (user as *mut FfbDecoder<VJoyFfb>).as_mut();

	let (Some(packet), Some(decoder)) = (packet, decoder) else { return };

	log::info!("============= FFB Packet =============");
	for line in decoder.decode(packet) {
		log::log!(line.level, " >> {}", line);
	}
}
