use std::fmt::{Debug, Display};
use std::num::{NonZeroU16};

/// Version numbers reported by the vJoy driver, the interface DLL, and the SDK this crate was
/// built against.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Versions {
	pub(crate) driver_version: Option<Version>,
	pub(crate) interface_version: Option<Version>,
	pub(crate) matched: bool,
}

impl Versions {
	pub fn driver_version(&self) -> Result<Version, DriverVersionError> {
		self.driver_version.ok_or(DriverVersionError::Missing)
	}

	pub fn interface_version(&self) -> Result<Version, InterfaceVersionError> {
		self.interface_version.ok_or(InterfaceVersionError::Missing)
	}

	/// Whether the driver reported that its version matches the interface DLL's.
	pub fn matched(&self) -> bool {
		self.matched
	}

	pub fn sdk_version(&self) -> Version {
		static_assertions::const_assert_eq!(vjoy_sys::VERSION_N as u16 as u32, vjoy_sys::VERSION_N);
		static_assertions::const_assert_ne!(vjoy_sys::VERSION_N as u16, 0);

		Version::from_raw(vjoy_sys::VERSION_N as u16)
			.unwrap_or(Version(NonZeroU16::MIN))
	}
}

impl Debug for Versions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Versions")
			.field("driver", &self.driver_version)
			.field("interface", &self.interface_version)
			.field("matched", &self.matched)
			.finish()
	}
}

impl Display for Versions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match (self.matched, self.driver_version, self.interface_version) {
			(true, _, Some(dll)) => write!(f, "Version of Driver Matches DLL Version ({:X})", dll.into_raw().get()),
			(_, Some(drv), Some(dll)) => write!(f, "Version of Driver ({:X}) does NOT match SDK DLL Version ({:X})", drv.into_raw().get(), dll.into_raw().get()),
			_ => f.write_str("Driver and DLL versions unavailable"),
		}
	}
}

/// A packed `0xMNP` version number.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(NonZeroU16);

impl Version {
	pub fn from_raw(raw: u16) -> Option<Self> {
		NonZeroU16::new(raw).map(Version)
	}

	pub fn into_raw(self) -> NonZeroU16 {
		self.0
	}

	pub fn major(&self) -> u8 {
		(self.0.get() >> 8) as u8 & 0xf
	}

	pub fn minor(&self) -> u8 {
		(self.0.get() >> 4) as u8 & 0xf
	}

	pub fn patch(&self) -> u8 {
		self.0.get() as u8 & 0xf
	}
}

impl Debug for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Version(0x{:04x}/{})", self.0, self)
	}
}

impl Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
	}
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum DriverVersionError {
	#[error("The vJoy interface did not return a driver version number.")]
	Missing,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, thiserror::Error)]
pub enum InterfaceVersionError {
	#[error("The vJoy interface did not return an interface version number.")]
	Missing,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn packed_parts() {
		let v = Version::from_raw(0x219).unwrap();
		assert_eq!((v.major(), v.minor(), v.patch()), (2, 1, 9));
		assert_eq!(v.to_string(), "2.1.9");
		assert!(Version::from_raw(0).is_none());
	}

	#[test]
	fn match_line() {
		let v = Version::from_raw(0x221);
		let matched = Versions { driver_version: v, interface_version: v, matched: true };
		assert_eq!(matched.to_string(), "Version of Driver Matches DLL Version (221)");

		let mismatched = Versions { driver_version: Version::from_raw(0x219), interface_version: v, matched: false };
		assert_eq!(mismatched.to_string(), "Version of Driver (219) does NOT match SDK DLL Version (221)");
	}
}
