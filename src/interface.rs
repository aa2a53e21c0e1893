use std::fmt::{Display};
use std::string::{FromUtf16Error};

use crate::{DeviceId, DeviceSlot, Version, Versions, VJoyLock};

/// A handle to the vJoy interface library.
///
/// Only one `Interface` (and the device slots derived from it) may exist at a time; see
/// [`VJoyLock`].
#[derive(Clone, Debug)]
pub struct Interface {
	lock: VJoyLock,
}

impl Interface {
	pub fn new() -> Result<Interface, NewInterfaceError> {
		let lock = VJoyLock::new()
			.ok_or(NewInterfaceError::Locked)?;

		let enabled = unsafe { vjoy_sys::vJoyEnabled() } != 0;
		enabled.then_some(Interface { lock })
			.ok_or(NewInterfaceError::NotAvailable)
	}

	/// Vendor, product and serial strings of the installed driver.
	pub fn attributes(&self) -> Attributes {
		unsafe {
			Attributes {
				manufacturer: wide_to_string(vjoy_sys::GetvJoyManufacturerString() as *const u16),
				product: wide_to_string(vjoy_sys::GetvJoyProductString() as *const u16),
				serial: wide_to_string(vjoy_sys::GetvJoySerialNumberString() as *const u16),
			}
		}
	}

	pub fn device_slot(&self, id: DeviceId) -> Result<Option<DeviceSlot>, DeviceSlotError> {
		if self.num_slots()? < id.to_raw() as usize {
			return Ok(None);
		}

		Ok(Some(DeviceSlot::new(id, self.lock.clone())))
	}

	#[cfg(feature = "const-slots")]
	pub fn num_slots(&self) -> Result<usize, NumSlotsError> {
		u8::try_from(vjoy_sys::VJOY_MAX_N_DEVICES)
			.map_err(|_| NumSlotsError::Invalid)
			.map(|n| n as usize)
	}

	#[cfg(not(feature = "const-slots"))]
	pub fn num_slots(&self) -> Result<usize, NumSlotsError> {
		let mut num = 0;
		let success = unsafe { vjoy_sys::GetvJoyMaxDevices(&mut num) } != 0;

		success.then_some(num)
			.ok_or(NumSlotsError::Failed)
			.and_then(|n| u8::try_from(n)
				.map_err(|_| NumSlotsError::Invalid)
				.map(|n| n as usize))
	}

	pub fn versions(&self) -> Versions {
		let (mut interface_version, mut driver_version) = (0u16, 0u16);
		let matched = unsafe { vjoy_sys::DriverMatch(&mut interface_version, &mut driver_version) } != 0;

		Versions {
			driver_version: Version::from_raw(driver_version),
			interface_version: Version::from_raw(interface_version),
			matched,
		}
	}
}

/// Identification strings of the vJoy driver. A string that is not valid UTF-16 is kept as the
/// decoding error.
#[derive(Debug)]
pub struct Attributes {
	pub manufacturer: Result<String, FromUtf16Error>,
	pub product: Result<String, FromUtf16Error>,
	pub serial: Result<String, FromUtf16Error>,
}

impl Display for Attributes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let show = |s: &Result<String, FromUtf16Error>| s.as_deref().unwrap_or("(not valid UTF-16)").to_owned();
		write!(f, " Vendor: {}\nProduct: {}\nVersion: {}", show(&self.manufacturer), show(&self.product), show(&self.serial))
	}
}

/// Decodes a NUL-terminated UTF-16 string owned by the interface library.
unsafe fn wide_to_string(ptr: *const u16) -> Result<String, FromUtf16Error> {
	if ptr.is_null() {
		return Ok(String::new());
	}

	let mut len = 0;
	while ptr.add(len).read() != 0 {
		len += 1;
	}

	String::from_utf16(std::slice::from_raw_parts(ptr, len))
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum DeviceSlotError {
	#[error(transparent)]
	MaxDevices(#[from] NumSlotsError),
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum NewInterfaceError {
	#[error("An instance of the vJoy interface already exists.")]
	Locked,

	#[error("vJoy driver not enabled: Failed Getting vJoy attributes.")]
	NotAvailable,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum NumSlotsError {
	#[error("The vJoy Interface library reported failure in getting the number of device slots.")]
	Failed,

	#[error("The vJoy Interface library returned an invalid number of device slots.")]
	Invalid,
}
