use std::cell::{RefCell};
use std::ops::{Deref, RangeInclusive};

use crate::{ApplyError, Axis, DeviceId, Report, ReportSink};
use crate::lock::{VJoyLock};

/// A vJoy device slot, which may or may not hold a configured device.
#[derive(Clone, Debug)]
pub struct DeviceSlot {
	id: DeviceId,

	// Keeps the interface locked to this thread for as long as the slot exists.
	_lock: VJoyLock,
}

impl DeviceSlot {
	pub(crate) fn new(id: DeviceId, lock: VJoyLock) -> DeviceSlot {
		DeviceSlot { id, _lock: lock }
	}

	fn raw_id(&self) -> u32 {
		self.id.to_raw() as u32
	}

	/// Takes ownership of the device so that reports can be fed to it. Fails, handing the slot
	/// back, if the device is missing or owned by another feeder.
	pub fn acquire(self) -> Result<OwnedDeviceSlot, DeviceSlot> {
		match self.status() {
			Status::Free if unsafe { vjoy_sys::AcquireVJD(self.raw_id()) } != 0 => Ok(OwnedDeviceSlot::new(self)),
			_ => Err(self),
		}
	}

	pub fn axes(&self) -> impl Iterator<Item = Axis> {
		let device = self.clone();

		Axis::all()
			.filter(move |a| device.has_axis(*a))
	}

	#[cfg(feature = "const-range")]
	pub fn axis_range(&self, _axis: Axis) -> Result<RangeInclusive<i32>, AxisRangeError> {
		Ok(0..=vjoy_sys::VJOY_AXIS_MAX_VALUE as i32)
	}

	#[cfg(not(feature = "const-range"))]
	pub fn axis_range(&self, axis: Axis) -> Result<RangeInclusive<i32>, AxisRangeError> {
		let mut min = 0;
		if unsafe { vjoy_sys::GetVJDAxisMin(self.raw_id(), axis.usage(), &mut min) } == 0 {
			return Err(AxisRangeError::MinFailure);
		}

		let mut max = 0;
		if unsafe { vjoy_sys::GetVJDAxisMax(self.raw_id(), axis.usage(), &mut max) } == 0 {
			return Err(AxisRangeError::MaxFailure);
		}

		(min <= max)
			.then_some(min..=max)
			.ok_or(AxisRangeError::Invalid)
	}

	pub fn has_axis(&self, axis: Axis) -> bool {
		// GetVJDAxisExist reports axes that are not configured; the minimum query fails for them.
		let mut min = 0;
		unsafe { vjoy_sys::GetVJDAxisMin(self.raw_id(), axis.usage(), &mut min) != 0 }
	}

	pub fn id(&self) -> DeviceId {
		self.id
	}

	pub fn num_buttons(&self) -> Result<usize, CapabilityError> {
		let raw = unsafe { vjoy_sys::GetVJDButtonNumber(self.raw_id()) };
		raw.try_into().map_err(|_| CapabilityError::Buttons)
	}

	pub fn num_cont_pov(&self) -> Result<usize, CapabilityError> {
		let raw = unsafe { vjoy_sys::GetVJDContPovNumber(self.raw_id()) };
		raw.try_into().map_err(|_| CapabilityError::ContinuousPovs)
	}

	pub fn num_disc_pov(&self) -> Result<usize, CapabilityError> {
		let raw = unsafe { vjoy_sys::GetVJDDiscPovNumber(self.raw_id()) };
		raw.try_into().map_err(|_| CapabilityError::DiscretePovs)
	}

	pub fn status(&self) -> Status {
		let raw = unsafe { vjoy_sys::GetVJDStatus(self.raw_id()) };
		Status::from(raw)
	}

	/// Whether the device was configured with force feedback. Only such devices may have an FFB
	/// decoder registered for them.
	pub fn supports_ffb(&self) -> bool {
		unsafe { vjoy_sys::IsDeviceFfb(self.raw_id()) != 0 }
	}

	pub fn capabilities(&self) -> Result<Capabilities, CapabilityError> {
		Ok(Capabilities {
			buttons: self.num_buttons()?,
			cont_povs: self.num_cont_pov()?,
			disc_povs: self.num_disc_pov()?,
			axes: Axis::all().map(|a| (a, self.has_axis(a))).collect(),
			ffb: self.supports_ffb(),
		})
	}
}

/// Summary of what a configured device exposes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Capabilities {
	pub buttons: usize,
	pub cont_povs: usize,
	pub disc_povs: usize,
	pub axes: Vec<(Axis, bool)>,
	pub ffb: bool,
}

impl std::fmt::Display for Capabilities {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "Number of buttons\t\t{}", self.buttons)?;
		writeln!(f, "Number of Continuous POVs\t{}", self.cont_povs)?;
		writeln!(f, "Number of Discrete POVs\t\t{}", self.disc_povs)?;
		for (axis, present) in &self.axes {
			writeln!(f, "Axis {}\t\t{}", axis.name(), if *present { "Yes" } else { "No" })?;
		}
		write!(f, "Force feedback\t\t{}", if self.ffb { "Yes" } else { "No" })
	}
}

/// A device acquired by this feeder. The device is relinquished when this is dropped.
#[derive(Debug)]
pub struct OwnedDeviceSlot {
	slot: DeviceSlot,
	position: RefCell<vjoy_sys::JOYSTICK_POSITION>,
}

impl OwnedDeviceSlot {
	fn new(slot: DeviceSlot) -> OwnedDeviceSlot {
		let mut position: vjoy_sys::JOYSTICK_POSITION = unsafe { std::mem::zeroed() };
		position.bDevice = slot.id.to_raw();

		OwnedDeviceSlot {
			position: RefCell::new(position),
			slot,
		}
	}

	/// Copies `report` into the pending position, to be sent by the next [`OwnedDeviceSlot::apply`].
	pub fn load(&self, report: &Report) {
		let mut pos = self.position.borrow_mut();

		pos.wAxisX = report.axis(Axis::X);
		pos.wAxisY = report.axis(Axis::Y);
		pos.wAxisZ = report.axis(Axis::Z);
		pos.wAxisXRot = report.axis(Axis::RX);
		pos.wAxisYRot = report.axis(Axis::RY);
		pos.wAxisZRot = report.axis(Axis::RZ);
		pos.wSlider = report.axis(Axis::Slider);
		pos.wDial = report.axis(Axis::Dial);

		pos.lButtons = report.buttons[0] as _;
		pos.lButtonsEx1 = report.buttons[1] as _;
		pos.lButtonsEx2 = report.buttons[2] as _;
		pos.lButtonsEx3 = report.buttons[3] as _;

		pos.bHats = report.hats[0] as _;
		pos.bHatsEx1 = report.hats[1] as _;
		pos.bHatsEx2 = report.hats[2] as _;
		pos.bHatsEx3 = report.hats[3] as _;
	}

	/// Sends the pending position to the driver in a single update.
	pub fn apply(&self) -> Result<(), ApplyError> {
		let mut pos = self.position.borrow_mut();
		let success = unsafe { vjoy_sys::UpdateVJD(self.raw_id(), &mut *pos as *mut _ as *mut _) } != 0;
		success.then_some(()).ok_or(ApplyError::Failed)
	}
}

impl ReportSink for OwnedDeviceSlot {
	fn submit(&mut self, report: &Report) -> Result<(), ApplyError> {
		self.load(report);
		self.apply()
	}

	fn reacquire(&mut self) -> bool {
		let acquired = unsafe { vjoy_sys::AcquireVJD(self.raw_id()) } != 0;
		if acquired {
			log::info!("Reacquired vJoy device #{}.", self.id);
		}

		acquired
	}
}

impl Deref for OwnedDeviceSlot {
	type Target = DeviceSlot;

	fn deref(&self) -> &Self::Target {
		&self.slot
	}
}

impl Drop for OwnedDeviceSlot {
	fn drop(&mut self) {
		unsafe { vjoy_sys::RelinquishVJD(self.raw_id()); }
		log::debug!("Relinquished vJoy device #{}.", self.id);
	}
}

impl Axis {
	pub fn usage(&self) -> u32 {
		match self {
			Axis::X => vjoy_sys::HID_USAGE_X,
			Axis::Y => vjoy_sys::HID_USAGE_Y,
			Axis::Z => vjoy_sys::HID_USAGE_Z,
			Axis::RX => vjoy_sys::HID_USAGE_RX,
			Axis::RY => vjoy_sys::HID_USAGE_RY,
			Axis::RZ => vjoy_sys::HID_USAGE_RZ,
			Axis::Slider => vjoy_sys::HID_USAGE_SL0,
			Axis::Dial => vjoy_sys::HID_USAGE_SL1,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Status {
	Free,
	Acquired,
	Busy,
	Missing,
	Unknown,
}

impl Status {
	/// Whether a feeder can go on using the device in this state.
	pub fn is_usable(&self) -> bool {
		matches!(self, Status::Free | Status::Acquired)
	}

	/// Operator-facing description of the device's state.
	pub fn describe(&self, id: DeviceId) -> String {
		match self {
			Status::Acquired => format!("vJoy Device {} is already owned by this feeder", id),
			Status::Free => format!("vJoy Device {} is free", id),
			Status::Busy => format!("vJoy Device {} is already owned by another feeder", id),
			Status::Missing => format!("vJoy Device {} is not installed or disabled", id),
			Status::Unknown => format!("vJoy Device {} general error", id),
		}
	}
}

impl From<vjoy_sys::VjdStat> for Status {
	fn from(status: vjoy_sys::VjdStat) -> Self {
		match status {
			vjoy_sys::VjdStat_VJD_STAT_FREE => Status::Free,
			vjoy_sys::VjdStat_VJD_STAT_OWN => Status::Acquired,
			vjoy_sys::VjdStat_VJD_STAT_BUSY => Status::Busy,
			vjoy_sys::VjdStat_VJD_STAT_MISS => Status::Missing,
			_ => Status::Unknown,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum AxisRangeError {
	#[error("The vJoy Interface returned an invalid range (min >= max).")]
	Invalid,

	#[error("The vJoy Interface reported an error in retrieving the axis maximum.")]
	MaxFailure,

	#[error("The vJoy Interface reported an error in retrieving the axis minimum.")]
	MinFailure,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum CapabilityError {
	#[error("The vJoy Interface returned an error in retrieving the number of buttons for the vJoy device.")]
	Buttons,

	#[error("The vJoy Interface returned an error in retrieving the number of continuous POVs for the vJoy device.")]
	ContinuousPovs,

	#[error("The vJoy Interface returned an error in retrieving the number of discrete POVs for the vJoy device.")]
	DiscretePovs,
}
