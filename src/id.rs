use std::fmt::{Display};
use std::num::{NonZeroU8};
use std::str::{FromStr};

/// A `DeviceId` is a numeric ID representing which slot a vJoy device is in.
///
/// IDs start at 1. A standard vJoy driver exposes at most [`DeviceId::MAX_STANDARD`] slots; the
/// type itself admits anything up to 255 so that packets from non-standard drivers still carry a
/// usable ID.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct DeviceId(NonZeroU8);
type RawDeviceId = u8;

impl DeviceId {
	pub const MAX_STANDARD: RawDeviceId = 16;

	pub fn from_index(index: usize) -> Result<DeviceId, DeviceIdFromIndexError> {
		index.checked_add(1)
			.and_then(|i| i.try_into().ok())
			.and_then(NonZeroU8::new)
			.ok_or(DeviceIdFromIndexError::TooLarge)
			.map(DeviceId)
	}

	pub fn from_raw(raw: RawDeviceId) -> Result<DeviceId, DeviceIdFromRawError> {
		NonZeroU8::new(raw)
			.ok_or(DeviceIdFromRawError::Zero)
			.map(DeviceId)
	}

	/// Like [`DeviceId::from_raw`], but also rejects IDs a standard driver cannot expose.
	pub fn from_raw_standard(raw: RawDeviceId) -> Result<DeviceId, DeviceIdFromRawError> {
		if raw > Self::MAX_STANDARD {
			return Err(DeviceIdFromRawError::OutOfRange(raw));
		}

		DeviceId::from_raw(raw)
	}

	pub fn to_index(self) -> usize {
		self.to_raw() as usize - 1
	}

	pub fn to_raw(self) -> RawDeviceId {
		self.0.get()
	}
}

impl Display for DeviceId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

impl FromStr for DeviceId {
	type Err = ParseDeviceIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let raw = s.trim().parse::<RawDeviceId>()
			.map_err(|_| ParseDeviceIdError::NotANumber)?;
		Ok(DeviceId::from_raw_standard(raw)?)
	}
}

impl From<DeviceId> for NonZeroU8 {
	fn from(value: DeviceId) -> Self {
		value.0
	}
}

impl From<DeviceId> for RawDeviceId {
	fn from(value: DeviceId) -> Self {
		value.to_raw()
	}
}

impl From<NonZeroU8> for DeviceId {
	fn from(value: NonZeroU8) -> Self {
		DeviceId(value)
	}
}

impl TryFrom<RawDeviceId> for DeviceId {
	type Error = DeviceIdFromRawError;

	fn try_from(raw: RawDeviceId) -> Result<Self, Self::Error> {
		DeviceId::from_raw(raw)
	}
}

impl TryFrom<usize> for DeviceId {
	type Error = DeviceIdFromIndexError;

	fn try_from(i: usize) -> Result<Self, Self::Error> {
		DeviceId::from_index(i)
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum DeviceIdFromIndexError {
	#[error("The index is too large to represent with a DeviceId.")]
	TooLarge,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum DeviceIdFromRawError {
	#[error("DeviceId may not be 0.")]
	Zero,

	#[error("Illegal device ID {0}; vJoy devices are numbered 1 to 16.")]
	OutOfRange(RawDeviceId),
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum ParseDeviceIdError {
	#[error("The device ID is not a number.")]
	NotANumber,

	#[error(transparent)]
	Raw(#[from] DeviceIdFromRawError),
}
